/// Notification endpoints
///
/// Notifications are created as side effects of task and comment mutations;
/// these endpoints only read them and flip the read flag.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::notification::Notification,
};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    /// Notifications that were unread before the call
    pub count: u64,
}

/// `GET /notifications`: the caller's 50 most recent, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(
        Notification::list_recent(&state.db, auth.user_id).await?,
    ))
}

/// `PUT /notifications/:id/read`
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Notification>> {
    let notification = Notification::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;
    authorization::require_recipient(auth.user_id, &notification)?;

    let notification = Notification::mark_read(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Ok(Json(notification))
}

/// `PUT /notifications/read-all`
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MarkAllReadResponse>> {
    let count = Notification::mark_all_read(&state.db, auth.user_id).await?;
    Ok(Json(MarkAllReadResponse { count }))
}

/// Comment endpoints
///
/// Members of the task's project may comment and read comments. Only the
/// author edits a comment; the author or the project owner may delete it.
/// Both require the caller to still have access to the project.

use super::{accessible_project, find_comment, find_task, MessageResponse};
use crate::{
    app::AppState,
    error::{validate, ApiResult},
    views::CommentView,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use taskboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::comment::{Comment, CreateComment, UpdateComment},
    notify,
};
use tracing::info;
use uuid::Uuid;

/// `POST /comments`
///
/// Notifies the task's assignee unless they wrote the comment.
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateComment>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let task = find_task(&state.db, req.task_id).await?;
    accessible_project(&state.db, task.project_id, auth.user_id).await?;
    validate(&req)?;

    let comment = Comment::create(&state.db, req, auth.user_id).await?;
    info!(comment_id = %comment.id, task_id = %task.id, "Comment added");

    notify::comment_added(&state.db, &comment, &task).await;

    let view = CommentView::load(&state.db, comment).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /comments/task/:task_id`, newest first
pub async fn list_task_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let task = find_task(&state.db, task_id).await?;
    accessible_project(&state.db, task.project_id, auth.user_id).await?;

    let comments = Comment::list_by_task(&state.db, task_id).await?;
    Ok(Json(CommentView::load_all(&state.db, comments).await?))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateComment>,
) -> ApiResult<Json<CommentView>> {
    let mut comment = find_comment(&state.db, id).await?;
    let task = find_task(&state.db, comment.task_id).await?;
    accessible_project(&state.db, task.project_id, auth.user_id).await?;
    authorization::require_comment_author(auth.user_id, &comment)?;
    validate(&req)?;

    req.apply(&mut comment);
    let comment = Comment::save(&state.db, &comment).await?;

    Ok(Json(CommentView::load(&state.db, comment).await?))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let comment = find_comment(&state.db, id).await?;
    let task = find_task(&state.db, comment.task_id).await?;
    let project = accessible_project(&state.db, task.project_id, auth.user_id).await?;
    authorization::require_comment_delete(auth.user_id, &comment, &project)?;

    Comment::delete(&state.db, id).await?;
    info!(comment_id = %id, "Comment deleted");

    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}

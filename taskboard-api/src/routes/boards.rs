/// Board endpoints
///
/// Boards are readable and editable by any project member; deleting one is
/// owner-only. A board never moves to another project.

use super::{accessible_project, find_board, MessageResponse};
use crate::{
    app::AppState,
    error::{validate, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use taskboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::board::{Board, CreateBoard, UpdateBoard},
};
use tracing::info;
use uuid::Uuid;

pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBoard>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    accessible_project(&state.db, req.project_id, auth.user_id).await?;
    validate(&req)?;

    let board = Board::create(&state.db, req).await?;
    info!(board_id = %board.id, project_id = %board.project_id, "Board created");

    Ok((StatusCode::CREATED, Json(board)))
}

/// `GET /boards/project/:project_id`, newest first
pub async fn list_project_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Board>>> {
    accessible_project(&state.db, project_id, auth.user_id).await?;

    Ok(Json(Board::list_by_project(&state.db, project_id).await?))
}

pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Board>> {
    let board = find_board(&state.db, id).await?;
    accessible_project(&state.db, board.project_id, auth.user_id).await?;

    Ok(Json(board))
}

pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBoard>,
) -> ApiResult<Json<Board>> {
    let mut board = find_board(&state.db, id).await?;
    accessible_project(&state.db, board.project_id, auth.user_id).await?;
    validate(&req)?;

    req.apply(&mut board);

    Ok(Json(Board::save(&state.db, &board).await?))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let board = find_board(&state.db, id).await?;
    let project = accessible_project(&state.db, board.project_id, auth.user_id).await?;
    authorization::require_owner(auth.user_id, &project)
        .map_err(|_| ApiError::Forbidden("Only project owner can delete boards".to_string()))?;

    Board::delete(&state.db, id).await?;
    info!(board_id = %id, "Board deleted");

    Ok(Json(MessageResponse::new("Board deleted successfully")))
}

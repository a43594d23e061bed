/// Task endpoints
///
/// Every project member may create, read and update tasks. Deletion is
/// owner-only. Creating or reassigning a task notifies the new assignee.

use super::{accessible_project, find_board, find_task, MessageResponse};
use crate::{
    app::AppState,
    error::{validate, ApiError, ApiResult},
    views::TaskView,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::PgPool;
use taskboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        task::{CreateTask, Task, UpdateTask},
        user::User,
    },
    notify,
};
use tracing::info;
use uuid::Uuid;

/// The board must exist and belong to `project_id`
async fn check_board(db: &PgPool, board_id: Uuid, project_id: Uuid) -> ApiResult<()> {
    let board = find_board(db, board_id).await?;

    if board.project_id != project_id {
        return Err(ApiError::BadRequest(
            "Board does not belong to this project".to_string(),
        ));
    }

    Ok(())
}

async fn check_assignee(db: &PgPool, user_id: Uuid) -> ApiResult<()> {
    if !User::exists(db, user_id).await? {
        return Err(ApiError::NotFound("Assigned user not found".to_string()));
    }
    Ok(())
}

/// `POST /tasks`
///
/// # Errors
///
/// - `404 Not Found`: Project, board or assignee does not exist
/// - `400 Bad Request`: Board belongs to another project
/// - `403 Forbidden`: Caller is not a member of the project
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTask>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    let project = accessible_project(&state.db, req.project_id, auth.user_id).await?;
    validate(&req)?;

    if let Some(board_id) = req.board_id {
        check_board(&state.db, board_id, project.id).await?;
    }
    if let Some(assignee) = req.assigned_to {
        check_assignee(&state.db, assignee).await?;
    }

    let task = Task::create(&state.db, req, auth.user_id).await?;
    info!(task_id = %task.id, project_id = %task.project_id, "Task created");

    notify::task_assigned(&state.db, auth.user_id, &task, None).await;

    let view = TaskView::load(&state.db, task).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /tasks/project/:project_id`, newest first
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskView>>> {
    accessible_project(&state.db, project_id, auth.user_id).await?;

    let tasks = Task::list_by_project(&state.db, project_id).await?;
    Ok(Json(TaskView::load_all(&state.db, tasks).await?))
}

/// `GET /tasks/board/:board_id`, newest first
pub async fn list_board_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskView>>> {
    let board = find_board(&state.db, board_id).await?;
    accessible_project(&state.db, board.project_id, auth.user_id).await?;

    let tasks = Task::list_by_board(&state.db, board_id).await?;
    Ok(Json(TaskView::load_all(&state.db, tasks).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskView>> {
    let task = find_task(&state.db, id).await?;
    accessible_project(&state.db, task.project_id, auth.user_id).await?;

    Ok(Json(TaskView::load(&state.db, task).await?))
}

/// `PUT /tasks/:id`
///
/// Supplied fields overwrite, omitted fields are kept. `null` clears the
/// nullable fields (`description`, `dueDate`, `boardId`, `assignedTo`).
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTask>,
) -> ApiResult<Json<TaskView>> {
    let mut task = find_task(&state.db, id).await?;
    accessible_project(&state.db, task.project_id, auth.user_id).await?;
    validate(&req)?;

    if let Some(board_id) = req.new_board() {
        check_board(&state.db, board_id, task.project_id).await?;
    }
    if let Some(assignee) = req.new_assignee() {
        check_assignee(&state.db, assignee).await?;
    }

    let previous_assignee = task.assigned_to;
    req.apply(&mut task);
    let task = Task::save(&state.db, &task).await?;

    notify::task_assigned(&state.db, auth.user_id, &task, previous_assignee).await;

    Ok(Json(TaskView::load(&state.db, task).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let task = find_task(&state.db, id).await?;
    let project = accessible_project(&state.db, task.project_id, auth.user_id).await?;
    authorization::require_owner(auth.user_id, &project)
        .map_err(|_| ApiError::Forbidden("Only project owner can delete tasks".to_string()))?;

    Task::delete(&state.db, id).await?;
    info!(task_id = %id, "Task deleted");

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

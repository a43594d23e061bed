/// API route handlers, one module per resource
///
/// Handlers follow the same order: resolve the referenced entities (404),
/// authorize against the owning project (403), validate and apply the
/// change, persist, then return the entity with user references expanded.

pub mod auth;
pub mod boards;
pub mod comments;
pub mod health;
pub mod notifications;
pub mod projects;
pub mod realtime;
pub mod tasks;

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use taskboard_shared::{
    auth::authorization,
    models::{board::Board, comment::Comment, project::Project, task::Task},
};
use uuid::Uuid;

/// Body of delete responses
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub(crate) async fn find_project(db: &PgPool, id: Uuid) -> ApiResult<Project> {
    Project::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

/// Loads a project the caller is the owner or a member of
pub(crate) async fn accessible_project(db: &PgPool, id: Uuid, caller: Uuid) -> ApiResult<Project> {
    let project = find_project(db, id).await?;
    authorization::require_access(caller, &project)?;
    Ok(project)
}

pub(crate) async fn find_board(db: &PgPool, id: Uuid) -> ApiResult<Board> {
    Board::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))
}

pub(crate) async fn find_task(db: &PgPool, id: Uuid) -> ApiResult<Task> {
    Task::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

pub(crate) async fn find_comment(db: &PgPool, id: Uuid) -> ApiResult<Comment> {
    Comment::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))
}

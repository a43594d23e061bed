/// Project endpoints
///
/// Any member may read a project. Updating, deleting and managing members is
/// reserved to the owner.

use super::{accessible_project, find_project, MessageResponse};
use crate::{
    app::AppState,
    error::{validate, ApiError, ApiResult},
    views::ProjectView,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        project::{MemberRole, NewProject, Project, UpdateProject},
        user::User,
    },
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Uuid,

    #[serde(default)]
    pub role: MemberRole,
}

/// `POST /projects`
///
/// The caller becomes the owner and the sole member, with role `owner`.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectView>)> {
    validate(&req)?;

    let project = Project::create(
        &state.db,
        NewProject {
            name: req.name,
            description: req.description,
            owner_id: auth.user_id,
            tags: req.tags,
        },
    )
    .await?;

    info!(project_id = %project.id, owner_id = %auth.user_id, "Project created");

    let view = ProjectView::load(&state.db, project).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /projects`, newest first
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectView>>> {
    let projects = Project::list_for_user(&state.db, auth.user_id).await?;
    Ok(Json(ProjectView::load_all(&state.db, projects).await?))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectView>> {
    let project = accessible_project(&state.db, id, auth.user_id).await?;
    Ok(Json(ProjectView::load(&state.db, project).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProject>,
) -> ApiResult<Json<ProjectView>> {
    let mut project = find_project(&state.db, id).await?;
    authorization::require_owner(auth.user_id, &project)?;
    validate(&req)?;

    req.apply(&mut project);
    let project = Project::save(&state.db, &project).await?;

    Ok(Json(ProjectView::load(&state.db, project).await?))
}

/// Boards and tasks of the project are not removed
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let project = find_project(&state.db, id).await?;
    authorization::require_owner(auth.user_id, &project)
        .map_err(|_| ApiError::Forbidden("Only project owner can delete the project".to_string()))?;

    Project::delete(&state.db, id).await?;
    info!(project_id = %id, "Project deleted");

    Ok(Json(MessageResponse::new("Project deleted successfully")))
}

/// `POST /projects/:id/members`
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<ProjectView>> {
    let project = find_project(&state.db, id).await?;
    authorization::require_owner(auth.user_id, &project)?;

    if req.role == MemberRole::Owner {
        return Err(ApiError::BadRequest(
            "A project has exactly one owner".to_string(),
        ));
    }

    if !User::exists(&state.db, req.user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Project::add_member(&state.db, id, req.user_id, req.role)
        .await?
        .ok_or_else(|| ApiError::Conflict("User is already a member".to_string()))?;

    info!(project_id = %id, user_id = %req.user_id, role = req.role.as_str(), "Member added");

    let project = find_project(&state.db, id).await?;
    Ok(Json(ProjectView::load(&state.db, project).await?))
}

/// `DELETE /projects/:id/members/:user_id`
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ProjectView>> {
    let project = find_project(&state.db, id).await?;
    authorization::require_owner(auth.user_id, &project)?;

    if user_id == project.owner_id {
        return Err(ApiError::BadRequest(
            "Cannot remove the project owner".to_string(),
        ));
    }

    if !Project::remove_member(&state.db, id, user_id).await? {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    info!(project_id = %id, user_id = %user_id, "Member removed");

    let project = find_project(&state.db, id).await?;
    Ok(Json(ProjectView::load(&state.db, project).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let req: CreateProjectRequest = serde_json::from_str(r#"{"name": "Demo"}"#).unwrap();
        assert_eq!(req.name, "Demo");
        assert!(req.description.is_none());
        assert!(req.tags.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let req: CreateProjectRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_add_member_role_defaults_to_member() {
        let id = Uuid::new_v4();
        let req: AddMemberRequest =
            serde_json::from_str(&format!(r#"{{"userId": "{id}"}}"#)).unwrap();

        assert_eq!(req.user_id, id);
        assert_eq!(req.role, MemberRole::Member);
    }
}

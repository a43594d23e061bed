/// Project model and database operations
///
/// A project is the unit of authorization: boards, tasks and comments inherit
/// access from the project they belong to. The member list lives in
/// `project_members` and is loaded alongside the project row.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('active', 'archived', 'completed');
/// CREATE TYPE member_role AS ENUM ('owner', 'admin', 'member');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     status project_status NOT NULL DEFAULT 'active',
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role member_role NOT NULL DEFAULT 'member',
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{NewProject, Project};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(owner_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project = Project::create(&pool, NewProject {
///     name: "Demo".to_string(),
///     description: None,
///     owner_id,
///     tags: vec![],
/// }).await?;
///
/// assert_eq!(project.members.len(), 1);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::patch::{self, double_option};

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
    Completed,
}

/// Role a member holds within a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// The project owner; exactly one per project
    Owner,
    Admin,
    #[default]
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
        }
    }
}

/// One entry of a project's member list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    #[serde(skip_serializing)]
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

/// Project with its member list
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub status: ProjectStatus,
    pub tags: Vec<String>,

    /// Populated from `project_members` after the row is read
    #[sqlx(skip)]
    pub members: Vec<ProjectMember>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project; the owner comes from the caller
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub tags: Vec<String>,
}

/// Partial update for a project
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub status: Option<ProjectStatus>,

    pub tags: Option<Vec<String>>,
}

impl UpdateProject {
    /// Overwrites every supplied field of `project`
    pub fn apply(self, project: &mut Project) {
        patch::apply(&mut project.name, self.name);
        patch::apply(&mut project.description, self.description);
        patch::apply(&mut project.status, self.status);
        patch::apply(&mut project.tags, self.tags);
    }
}

const PROJECT_COLUMNS: &str =
    "id, name, description, owner_id, status, tags, created_at, updated_at";

impl Project {
    /// True when `user_id` appears in the member list
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    /// Every user referenced by this project (owner first, then members)
    pub fn referenced_users(&self) -> Vec<Uuid> {
        let mut ids = vec![self.owner_id];
        for member in &self.members {
            if !ids.contains(&member.user_id) {
                ids.push(member.user_id);
            }
        }
        ids
    }

    /// Creates a project and records the owner as its first member
    ///
    /// Both rows are written in one transaction.
    pub async fn create(pool: &PgPool, data: NewProject) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut project = sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (name, description, owner_id, tags)
             VALUES ($1, $2, $3, $4)
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.owner_id)
        .bind(data.tags)
        .fetch_one(&mut *tx)
        .await?;

        let owner = sqlx::query_as::<_, ProjectMember>(
            "INSERT INTO project_members (project_id, user_id, role)
             VALUES ($1, $2, 'owner')
             RETURNING project_id, user_id, role, joined_at",
        )
        .bind(project.id)
        .bind(project.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        project.members = vec![owner];
        Ok(project)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match project {
            Some(mut project) => {
                project.members = Self::members(pool, project.id).await?;
                Ok(Some(project))
            }
            None => Ok(None),
        }
    }

    /// Projects the user owns or is a member of, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let mut projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE owner_id = $1
                OR id IN (SELECT project_id FROM project_members WHERE user_id = $1)
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
        let mut by_project = Self::members_for(pool, &ids).await?;

        for project in &mut projects {
            project.members = by_project.remove(&project.id).unwrap_or_default();
        }

        Ok(projects)
    }

    /// Writes every mutable column back and bumps `updated_at`
    pub async fn save(pool: &PgPool, project: &Project) -> Result<Self, sqlx::Error> {
        let mut saved = sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects
             SET name = $2, description = $3, status = $4, tags = $5, updated_at = NOW()
             WHERE id = $1
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status)
        .bind(&project.tags)
        .fetch_one(pool)
        .await?;

        saved.members = Self::members(pool, saved.id).await?;
        Ok(saved)
    }

    /// Deletes the project and its member rows
    ///
    /// Boards and tasks that reference the project are left in place.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adds a member; returns `None` when the user is already a member
    pub async fn add_member(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<ProjectMember>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            "INSERT INTO project_members (project_id, user_id, role)
             VALUES ($1, $2, $3)
             ON CONFLICT (project_id, user_id) DO NOTHING
             RETURNING project_id, user_id, role, joined_at",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(pool)
        .await
    }

    pub async fn remove_member(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn members(pool: &PgPool, project_id: Uuid) -> Result<Vec<ProjectMember>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            "SELECT project_id, user_id, role, joined_at
             FROM project_members
             WHERE project_id = $1
             ORDER BY joined_at ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    async fn members_for(
        pool: &PgPool,
        project_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<ProjectMember>>, sqlx::Error> {
        if project_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ProjectMember>(
            "SELECT project_id, user_id, role, joined_at
             FROM project_members
             WHERE project_id = ANY($1)
             ORDER BY joined_at ASC",
        )
        .bind(project_ids)
        .fetch_all(pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<ProjectMember>> = HashMap::new();
        for row in rows {
            grouped.entry(row.project_id).or_default().push(row);
        }
        Ok(grouped)
    }
}

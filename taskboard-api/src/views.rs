/// Response bodies with user references expanded
///
/// Projects, tasks and comments store bare user IDs. Before they are returned
/// those IDs are swapped for `{id, username, email}` summaries, loaded in one
/// query per response. A reference to a user that no longer exists renders as
/// `null`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use taskboard_shared::models::{
    comment::Comment,
    project::{MemberRole, Project, ProjectStatus},
    task::{Task, TaskPriority, TaskStatus},
    user::{User, UserSummary},
};
use uuid::Uuid;

type Summaries = HashMap<Uuid, UserSummary>;

fn lookup(users: &Summaries, id: Uuid) -> Option<UserSummary> {
    users.get(&id).cloned()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub user: Option<UserSummary>,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<UserSummary>,
    pub members: Vec<MemberView>,
    pub status: ProjectStatus,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectView {
    pub fn build(project: Project, users: &Summaries) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            owner: lookup(users, project.owner_id),
            members: project
                .members
                .into_iter()
                .map(|m| MemberView {
                    user: lookup(users, m.user_id),
                    role: m.role,
                    joined_at: m.joined_at,
                })
                .collect(),
            status: project.status,
            tags: project.tags,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }

    pub async fn load(pool: &PgPool, project: Project) -> Result<Self, sqlx::Error> {
        let users = User::summaries(pool, &project.referenced_users()).await?;
        Ok(Self::build(project, &users))
    }

    pub async fn load_all(pool: &PgPool, projects: Vec<Project>) -> Result<Vec<Self>, sqlx::Error> {
        let ids: Vec<Uuid> = projects.iter().flat_map(Project::referenced_users).collect();
        let users = User::summaries(pool, &ids).await?;

        Ok(projects
            .into_iter()
            .map(|project| Self::build(project, &users))
            .collect())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Uuid,
    pub board_id: Option<Uuid>,
    pub created_by: Option<UserSummary>,
    pub assigned_to: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskView {
    pub fn build(task: Task, users: &Summaries) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            project_id: task.project_id,
            board_id: task.board_id,
            created_by: lookup(users, task.created_by),
            assigned_to: task.assigned_to.and_then(|id| lookup(users, id)),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }

    pub async fn load(pool: &PgPool, task: Task) -> Result<Self, sqlx::Error> {
        let users = User::summaries(pool, &task.referenced_users()).await?;
        Ok(Self::build(task, &users))
    }

    pub async fn load_all(pool: &PgPool, tasks: Vec<Task>) -> Result<Vec<Self>, sqlx::Error> {
        let ids: Vec<Uuid> = tasks.iter().flat_map(Task::referenced_users).collect();
        let users = User::summaries(pool, &ids).await?;

        Ok(tasks
            .into_iter()
            .map(|task| Self::build(task, &users))
            .collect())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub author: Option<UserSummary>,
    pub task_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    pub fn build(comment: Comment, users: &Summaries) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            author: lookup(users, comment.author_id),
            task_id: comment.task_id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }

    pub async fn load(pool: &PgPool, comment: Comment) -> Result<Self, sqlx::Error> {
        let users = User::summaries(pool, &[comment.author_id]).await?;
        Ok(Self::build(comment, &users))
    }

    pub async fn load_all(pool: &PgPool, comments: Vec<Comment>) -> Result<Vec<Self>, sqlx::Error> {
        let ids: Vec<Uuid> = comments.iter().map(|c| c.author_id).collect();
        let users = User::summaries(pool, &ids).await?;

        Ok(comments
            .into_iter()
            .map(|comment| Self::build(comment, &users))
            .collect())
    }
}

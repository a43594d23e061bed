/// Task model and database operations
///
/// Tasks always belong to a project and optionally sit on one of that
/// project's boards. The creator is fixed; the assignee can change freely and
/// each change to a new assignee triggers a notification (see [`crate::notify`]).
///
/// # Workflow
///
/// ```text
/// todo → in_progress → review → done
/// ```
///
/// Status is free-form: any value can be set from any other.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high', 'urgent');
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'review', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     priority task_priority NOT NULL DEFAULT 'medium',
///     status task_status NOT NULL DEFAULT 'todo',
///     due_date TIMESTAMPTZ,
///     project_id UUID NOT NULL,
///     board_id UUID,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{CreateTask, Task, TaskPriority};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(project_id: Uuid, caller: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "Write release notes".to_string(),
///     description: None,
///     priority: TaskPriority::High,
///     status: Default::default(),
///     due_date: None,
///     project_id,
///     board_id: None,
///     assigned_to: None,
/// }, caller).await?;
///
/// let tasks = Task::list_by_project(&pool, project_id).await?;
/// assert_eq!(tasks[0].id, task.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::patch::{self, double_option};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,

    /// Owning project (required, immutable)
    pub project_id: Uuid,

    /// Board within the project, if any
    pub board_id: Option<Uuid>,

    /// Creator (immutable)
    pub created_by: Uuid,

    pub assigned_to: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task; the creator comes from the caller
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub status: TaskStatus,

    /// RFC 3339 timestamp or `YYYY-MM-DD` (midnight UTC)
    #[serde(default, deserialize_with = "due_date::optional")]
    pub due_date: Option<DateTime<Utc>>,

    pub project_id: Uuid,

    pub board_id: Option<Uuid>,

    pub assigned_to: Option<Uuid>,
}

/// Due dates arrive either as full timestamps or as plain calendar dates
mod due_date {
    use super::*;

    struct DueDate(DateTime<Utc>);

    impl<'de> Deserialize<'de> for DueDate {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = String::deserialize(deserializer)?;
            parse(&raw).map(DueDate).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "invalid due date `{}`: expected RFC 3339 or YYYY-MM-DD",
                    raw
                ))
            })
        }
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(at.with_timezone(&Utc));
        }

        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
    }

    pub fn optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<DueDate>::deserialize(deserializer).map(|due| due.map(|d| d.0))
    }

    pub fn patch<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        double_option::<DueDate, D>(deserializer).map(|due| due.map(|d| d.map(|d| d.0)))
    }
}

/// Partial update for a task
///
/// `projectId` is not accepted; a task never moves between projects.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub priority: Option<TaskPriority>,

    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "due_date::patch")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "double_option")]
    pub board_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<Uuid>>,
}

impl UpdateTask {
    /// Board the update points the task at, when it sets one
    pub fn new_board(&self) -> Option<Uuid> {
        self.board_id.flatten()
    }

    /// Assignee the update sets, when it sets one
    pub fn new_assignee(&self) -> Option<Uuid> {
        self.assigned_to.flatten()
    }

    pub fn apply(self, task: &mut Task) {
        patch::apply(&mut task.title, self.title);
        patch::apply(&mut task.description, self.description);
        patch::apply(&mut task.priority, self.priority);
        patch::apply(&mut task.status, self.status);
        patch::apply(&mut task.due_date, self.due_date);
        patch::apply(&mut task.board_id, self.board_id);
        patch::apply(&mut task.assigned_to, self.assigned_to);
    }
}

const TASK_COLUMNS: &str = "id, title, description, priority, status, due_date, project_id, \
                            board_id, created_by, assigned_to, created_at, updated_at";

impl Task {
    /// Users this task refers to: creator, then assignee
    pub fn referenced_users(&self) -> Vec<Uuid> {
        let mut ids = vec![self.created_by];
        if let Some(assignee) = self.assigned_to {
            if assignee != self.created_by {
                ids.push(assignee);
            }
        }
        ids
    }

    pub async fn create(
        pool: &PgPool,
        data: CreateTask,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, priority, status, due_date,
                                project_id, board_id, created_by, assigned_to)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.due_date)
        .bind(data.project_id)
        .bind(data.board_id)
        .bind(created_by)
        .bind(data.assigned_to)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Tasks of a project, newest first
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE project_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Tasks on a board, newest first
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE board_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(board_id)
        .fetch_all(pool)
        .await
    }

    /// Writes every mutable column back and bumps `updated_at`
    ///
    /// `project_id` and `created_by` are never written.
    pub async fn save(pool: &PgPool, task: &Task) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = $2, description = $3, priority = $4, status = $5,
                 due_date = $6, board_id = $7, assigned_to = $8, updated_at = NOW()
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.board_id)
        .bind(task.assigned_to)
        .fetch_one(pool)
        .await
    }

    /// Deletes the task together with its comments
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

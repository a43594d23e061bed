/// Board model and database operations
///
/// A board is an ordered set of columns inside one project. Its `project_id`
/// is fixed at creation and is not part of the update payload.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     project_id UUID NOT NULL,
///     columns TEXT[] NOT NULL DEFAULT ARRAY['To Do', 'In Progress', 'Done'],
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::patch::{self, double_option};

/// Columns a board gets when none are supplied
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

pub fn default_columns() -> Vec<String> {
    DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub project_id: Uuid,
    pub columns: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a board
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoard {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    pub description: Option<String>,

    pub project_id: Uuid,

    /// Defaults to [`DEFAULT_COLUMNS`]
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
}

/// Partial update for a board
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoard {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub columns: Option<Vec<String>>,
}

impl UpdateBoard {
    pub fn apply(self, board: &mut Board) {
        patch::apply(&mut board.name, self.name);
        patch::apply(&mut board.description, self.description);
        patch::apply(&mut board.columns, self.columns);
    }
}

const BOARD_COLUMNS: &str = "id, name, description, project_id, columns, created_at, updated_at";

impl Board {
    pub async fn create(pool: &PgPool, data: CreateBoard) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Board>(&format!(
            "INSERT INTO boards (name, description, project_id, columns)
             VALUES ($1, $2, $3, $4)
             RETURNING {BOARD_COLUMNS}"
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.project_id)
        .bind(data.columns)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(&format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Boards of a project, newest first
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards
             WHERE project_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Writes name, description and columns back; `project_id` is never updated
    pub async fn save(pool: &PgPool, board: &Board) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Board>(&format!(
            "UPDATE boards
             SET name = $2, description = $3, columns = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {BOARD_COLUMNS}"
        ))
        .bind(board.id)
        .bind(&board.name)
        .bind(&board.description)
        .bind(&board.columns)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> Board {
        Board {
            id: Uuid::new_v4(),
            name: "Sprint 1".to_string(),
            description: None,
            project_id: Uuid::new_v4(),
            columns: default_columns(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_defaults_columns() {
        let project_id = Uuid::new_v4();
        let body = format!(r#"{{"name": "Main", "projectId": "{}"}}"#, project_id);
        let create: CreateBoard = serde_json::from_str(&body).unwrap();

        assert_eq!(create.project_id, project_id);
        assert_eq!(create.columns, vec!["To Do", "In Progress", "Done"]);
        assert!(create.validate().is_ok());
    }

    #[test]
    fn test_update_ignores_project_id() {
        let mut board = sample_board();
        let original_project = board.project_id;
        let body = format!(
            r#"{{"projectId": "{}", "columns": ["Backlog", "Done"]}}"#,
            Uuid::new_v4()
        );

        serde_json::from_str::<UpdateBoard>(&body)
            .unwrap()
            .apply(&mut board);

        assert_eq!(board.project_id, original_project);
        assert_eq!(board.columns, vec!["Backlog", "Done"]);
        assert_eq!(board.name, "Sprint 1");
    }

    #[test]
    fn test_update_sets_and_clears_description() {
        let mut board = sample_board();

        serde_json::from_str::<UpdateBoard>(r#"{"description": "Q3"}"#)
            .unwrap()
            .apply(&mut board);
        assert_eq!(board.description.as_deref(), Some("Q3"));

        serde_json::from_str::<UpdateBoard>(r#"{"description": null}"#)
            .unwrap()
            .apply(&mut board);
        assert_eq!(board.description, None);
    }
}

/// Comment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     content TEXT NOT NULL,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     task_id UUID NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::patch;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub content: String,

    /// Author (immutable)
    pub author_id: Uuid,

    pub task_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,

    pub task_id: Uuid,
}

/// Only the content of a comment can change
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComment {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: Option<String>,
}

impl UpdateComment {
    pub fn apply(self, comment: &mut Comment) {
        patch::apply(&mut comment.content, self.content);
    }
}

const COMMENT_COLUMNS: &str = "id, content, author_id, task_id, created_at, updated_at";

impl Comment {
    pub async fn create(
        pool: &PgPool,
        data: CreateComment,
        author_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (content, author_id, task_id)
             VALUES ($1, $2, $3)
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(data.content)
        .bind(author_id)
        .bind(data.task_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Comments on a task, newest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments
             WHERE task_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(task_id)
        .fetch_all(pool)
        .await
    }

    pub async fn save(pool: &PgPool, comment: &Comment) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments
             SET content = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment.id)
        .bind(&comment.content)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn comment_by(author_id: Uuid, task_id: Uuid) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            content: "Looks good".to_string(),
            author_id,
            task_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_update_content_only() {
        let author = Uuid::new_v4();
        let mut comment = comment_by(author, Uuid::new_v4());
        let body = format!(r#"{{"content": "Edited", "authorId": "{}"}}"#, Uuid::new_v4());

        serde_json::from_str::<UpdateComment>(&body)
            .unwrap()
            .apply(&mut comment);

        assert_eq!(comment.content, "Edited");
        assert_eq!(comment.author_id, author);
    }

    #[test]
    fn test_create_validation() {
        let ok = CreateComment {
            content: "hi".to_string(),
            task_id: Uuid::new_v4(),
        };
        assert!(ok.validate().is_ok());

        let empty = CreateComment {
            content: String::new(),
            task_id: Uuid::new_v4(),
        };
        assert!(empty.validate().is_err());
    }
}

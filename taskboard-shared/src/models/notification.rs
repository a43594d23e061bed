/// Notification model and database operations
///
/// Notifications are never created through the API directly. They are written
/// by [`crate::notify`] as a side effect of task and comment mutations.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE notification_kind AS ENUM ('task_assigned', 'comment_added');
///
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     recipient_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     kind notification_kind NOT NULL,
///     message TEXT NOT NULL,
///     related_task_id UUID,
///     related_project_id UUID,
///     read BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Most recent notifications returned by [`Notification::list_recent`]
pub const RECENT_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskAssigned,
    CommentAdded,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub related_task_id: Option<Uuid>,
    pub related_project_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub related_task_id: Option<Uuid>,
    pub related_project_id: Option<Uuid>,
}

const NOTIFICATION_COLUMNS: &str =
    "id, recipient_id, kind, message, related_task_id, related_project_id, read, created_at";

impl Notification {
    pub async fn create(pool: &PgPool, data: NewNotification) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications
                 (recipient_id, kind, message, related_task_id, related_project_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(data.recipient_id)
        .bind(data.kind)
        .bind(data.message)
        .bind(data.related_task_id)
        .bind(data.related_project_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// The recipient's [`RECENT_LIMIT`] newest notifications
    pub async fn list_recent(pool: &PgPool, recipient_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE recipient_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        ))
        .bind(recipient_id)
        .bind(RECENT_LIMIT)
        .fetch_all(pool)
        .await
    }

    pub async fn mark_read(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications SET read = TRUE
             WHERE id = $1
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Marks every unread notification of the recipient; returns how many changed
    pub async fn mark_all_read(pool: &PgPool, recipient_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE recipient_id = $1 AND read = FALSE",
        )
        .bind(recipient_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_unread(pool: &PgPool, recipient_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn notification_for(recipient_id: Uuid) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            recipient_id,
            kind: NotificationKind::TaskAssigned,
            message: "You have been assigned to task: Write docs".to_string(),
            related_task_id: Some(Uuid::new_v4()),
            related_project_id: Some(Uuid::new_v4()),
            read: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(notification_for(Uuid::new_v4())).unwrap();

        assert_eq!(json["type"], "task_assigned");
        assert_eq!(json["read"], false);
        assert!(json.get("relatedTaskId").is_some());
        assert!(json.get("recipientId").is_some());
    }
}

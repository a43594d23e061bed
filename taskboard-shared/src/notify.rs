/// Notifications emitted as a side effect of task and comment mutations
///
/// Two triggers exist:
///
/// - a task is created or updated with an assignee who is neither the caller
///   nor the task's previous assignee → `task_assigned` for the new assignee
/// - a comment is added to a task whose assignee is not the comment author
///   → `comment_added` for the assignee (every comment, no deduplication)
///
/// Emission is best-effort. A failed insert is logged and swallowed; the
/// triggering mutation has already been persisted and is still reported as a
/// success.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::notify;
/// # use taskboard_shared::models::task::Task;
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, caller: Uuid, task: Task) {
/// // after persisting a new task
/// notify::task_assigned(&pool, caller, &task, None).await;
/// # }
/// ```

use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::comment::Comment;
use crate::models::notification::{NewNotification, Notification, NotificationKind};
use crate::models::task::Task;

/// Who, if anyone, should hear about an assignment change
pub fn assignment_recipient(
    caller: Uuid,
    new_assignee: Option<Uuid>,
    previous_assignee: Option<Uuid>,
) -> Option<Uuid> {
    new_assignee.filter(|&assignee| assignee != caller && Some(assignee) != previous_assignee)
}

/// Who, if anyone, should hear about a new comment
pub fn comment_recipient(author: Uuid, assignee: Option<Uuid>) -> Option<Uuid> {
    assignee.filter(|&assignee| assignee != author)
}

pub fn task_assigned_notification(recipient_id: Uuid, task: &Task) -> NewNotification {
    NewNotification {
        recipient_id,
        kind: NotificationKind::TaskAssigned,
        message: format!("You have been assigned to task: {}", task.title),
        related_task_id: Some(task.id),
        related_project_id: Some(task.project_id),
    }
}

pub fn comment_added_notification(recipient_id: Uuid, task: &Task) -> NewNotification {
    NewNotification {
        recipient_id,
        kind: NotificationKind::CommentAdded,
        message: format!("New comment on task: {}", task.title),
        related_task_id: Some(task.id),
        related_project_id: Some(task.project_id),
    }
}

/// Emits `task_assigned` when the assignment rules call for it
///
/// `previous_assignee` is `None` for a freshly created task.
pub async fn task_assigned(
    pool: &PgPool,
    caller: Uuid,
    task: &Task,
    previous_assignee: Option<Uuid>,
) -> Option<Notification> {
    let recipient = assignment_recipient(caller, task.assigned_to, previous_assignee)?;
    emit(pool, task_assigned_notification(recipient, task)).await
}

/// Emits `comment_added` when the task has an assignee other than the author
pub async fn comment_added(pool: &PgPool, comment: &Comment, task: &Task) -> Option<Notification> {
    let recipient = comment_recipient(comment.author_id, task.assigned_to)?;
    emit(pool, comment_added_notification(recipient, task)).await
}

async fn emit(pool: &PgPool, data: NewNotification) -> Option<Notification> {
    let recipient_id = data.recipient_id;
    let kind = data.kind;

    match Notification::create(pool, data).await {
        Ok(notification) => {
            debug!(
                notification_id = %notification.id,
                recipient_id = %recipient_id,
                kind = ?kind,
                "Notification created"
            );
            Some(notification)
        }
        Err(e) => {
            warn!(
                error = %e,
                recipient_id = %recipient_id,
                kind = ?kind,
                "Failed to create notification"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::tests::task_in;

    #[test]
    fn test_assignment_to_someone_else_notifies() {
        let caller = Uuid::new_v4();
        let assignee = Uuid::new_v4();

        assert_eq!(assignment_recipient(caller, Some(assignee), None), Some(assignee));
    }

    #[test]
    fn test_self_assignment_is_silent() {
        let caller = Uuid::new_v4();
        assert_eq!(assignment_recipient(caller, Some(caller), None), None);
    }

    #[test]
    fn test_unchanged_assignee_is_silent() {
        let caller = Uuid::new_v4();
        let assignee = Uuid::new_v4();

        assert_eq!(assignment_recipient(caller, Some(assignee), Some(assignee)), None);
    }

    #[test]
    fn test_reassignment_notifies_new_assignee() {
        let caller = Uuid::new_v4();
        let before = Uuid::new_v4();
        let after = Uuid::new_v4();

        assert_eq!(assignment_recipient(caller, Some(after), Some(before)), Some(after));
    }

    #[test]
    fn test_unassignment_is_silent() {
        assert_eq!(assignment_recipient(Uuid::new_v4(), None, Some(Uuid::new_v4())), None);
    }

    #[test]
    fn test_comment_recipient() {
        let author = Uuid::new_v4();
        let assignee = Uuid::new_v4();

        assert_eq!(comment_recipient(author, Some(assignee)), Some(assignee));
        assert_eq!(comment_recipient(author, Some(author)), None);
        assert_eq!(comment_recipient(author, None), None);
    }

    #[test]
    fn test_notification_payloads() {
        let assignee = Uuid::new_v4();
        let task = task_in(Uuid::new_v4(), Uuid::new_v4(), Some(assignee));

        let assigned = task_assigned_notification(assignee, &task);
        assert_eq!(assigned.kind, NotificationKind::TaskAssigned);
        assert_eq!(assigned.message, "You have been assigned to task: Write docs");
        assert_eq!(assigned.related_task_id, Some(task.id));
        assert_eq!(assigned.related_project_id, Some(task.project_id));

        let commented = comment_added_notification(assignee, &task);
        assert_eq!(commented.kind, NotificationKind::CommentAdded);
        assert_eq!(commented.message, "New comment on task: Write docs");
    }
}

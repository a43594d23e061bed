/// Ownership and membership policy
///
/// Every check is a pure function over records the handler has already
/// loaded. Handlers resolve the entity first (404 when missing) and only then
/// consult the policy (403 when denied).
///
/// # Rules
///
/// | Action | Allowed for |
/// |---|---|
/// | read/modify a project's boards, tasks, comments | owner or member |
/// | update a project, manage members, delete project/board/task | owner |
/// | edit a comment | author |
/// | delete a comment | author or project owner |
/// | read/mark a notification | recipient |
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::authorization::{can_access, can_delete};
/// # use taskboard_shared::models::project::Project;
/// # fn example(project: &Project) {
/// let caller = project.owner_id;
/// assert!(can_access(caller, project));
/// assert!(can_delete(caller, project));
/// # }
/// ```

use uuid::Uuid;

use crate::models::comment::Comment;
use crate::models::notification::Notification;
use crate::models::project::Project;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("Not a member of project {0}")]
    NotMember(Uuid),

    #[error("Only the project owner can perform this action")]
    NotOwner,

    #[error("Only the comment author can perform this action")]
    NotAuthor,

    #[error("Notification belongs to another user")]
    NotRecipient,
}

/// Caller is the owner or appears in the member list
pub fn can_access(caller: Uuid, project: &Project) -> bool {
    project.owner_id == caller || project.has_member(caller)
}

/// Destructive and administrative actions are owner-only
pub fn can_delete(caller: Uuid, project: &Project) -> bool {
    project.owner_id == caller
}

pub fn can_modify_comment(caller: Uuid, comment: &Comment) -> bool {
    comment.author_id == caller
}

pub fn can_delete_comment(caller: Uuid, comment: &Comment, project: &Project) -> bool {
    can_modify_comment(caller, comment) || can_delete(caller, project)
}

pub fn can_read_notification(caller: Uuid, notification: &Notification) -> bool {
    notification.recipient_id == caller
}

pub fn require_access(caller: Uuid, project: &Project) -> Result<(), AuthzError> {
    if !can_access(caller, project) {
        return Err(AuthzError::NotMember(project.id));
    }
    Ok(())
}

pub fn require_owner(caller: Uuid, project: &Project) -> Result<(), AuthzError> {
    if !can_delete(caller, project) {
        return Err(AuthzError::NotOwner);
    }
    Ok(())
}

pub fn require_comment_author(caller: Uuid, comment: &Comment) -> Result<(), AuthzError> {
    if !can_modify_comment(caller, comment) {
        return Err(AuthzError::NotAuthor);
    }
    Ok(())
}

pub fn require_comment_delete(
    caller: Uuid,
    comment: &Comment,
    project: &Project,
) -> Result<(), AuthzError> {
    if !can_delete_comment(caller, comment, project) {
        return Err(AuthzError::NotAuthor);
    }
    Ok(())
}

pub fn require_recipient(caller: Uuid, notification: &Notification) -> Result<(), AuthzError> {
    if !can_read_notification(caller, notification) {
        return Err(AuthzError::NotRecipient);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::comment::tests::comment_by;
    use crate::models::notification::tests::notification_for;
    use crate::models::project::tests::project_with;

    #[test]
    fn test_access_owner_or_member_only() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let project = project_with(owner, &[member]);

        assert!(can_access(owner, &project));
        assert!(can_access(member, &project));
        assert!(!can_access(outsider, &project));

        assert_eq!(
            require_access(outsider, &project),
            Err(AuthzError::NotMember(project.id))
        );
    }

    #[test]
    fn test_owner_without_member_row_still_has_access() {
        let owner = Uuid::new_v4();
        let mut project = project_with(owner, &[]);
        project.members.clear();

        assert!(can_access(owner, &project));
    }

    #[test]
    fn test_delete_owner_only() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let project = project_with(owner, &[member]);

        assert!(can_delete(owner, &project));
        assert!(!can_delete(member, &project));
        assert_eq!(require_owner(member, &project), Err(AuthzError::NotOwner));
    }

    #[test]
    fn test_comment_rules() {
        let owner = Uuid::new_v4();
        let author = Uuid::new_v4();
        let other = Uuid::new_v4();
        let project = project_with(owner, &[author, other]);
        let comment = comment_by(author, Uuid::new_v4());

        assert!(can_modify_comment(author, &comment));
        assert!(!can_modify_comment(owner, &comment));

        assert!(can_delete_comment(author, &comment, &project));
        assert!(can_delete_comment(owner, &comment, &project));
        assert!(!can_delete_comment(other, &comment, &project));

        assert_eq!(require_comment_author(other, &comment), Err(AuthzError::NotAuthor));
        assert!(require_comment_delete(owner, &comment, &project).is_ok());
    }

    #[test]
    fn test_notification_recipient_only() {
        let recipient = Uuid::new_v4();
        let notification = notification_for(recipient);

        assert!(can_read_notification(recipient, &notification));
        assert_eq!(
            require_recipient(Uuid::new_v4(), &notification),
            Err(AuthzError::NotRecipient)
        );
    }
}

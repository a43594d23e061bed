/// Database models for Taskboard
///
/// This module contains all database models and their CRUD operations.
/// Every operation takes the pool explicitly and returns `sqlx::Error`; the
/// API layer maps those into HTTP errors.
///
/// # Models
///
/// - `user`: Accounts and the user summaries other entities expand to
/// - `project`: Projects with their member lists
/// - `board`: Column layouts inside a project
/// - `task`: Work items, optionally placed on a board
/// - `comment`: Discussion on a task
/// - `notification`: Per-user inbox entries
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{NewProject, Project};
/// use taskboard_shared::models::user::{CreateUser, User};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let project = Project::create(&pool, NewProject {
///     name: "Demo".to_string(),
///     description: None,
///     owner_id: user.id,
///     tags: vec![],
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod board;
pub mod comment;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;

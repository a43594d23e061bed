//! # Taskboard Shared Library
//!
//! This crate contains the entity store, authentication and authorization
//! primitives, and the realtime fan-out used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `db`: Connection pool and embedded migrations
//! - `auth`: Password hashing, JWT tokens, auth middleware, authorization policy
//! - `patch`: Helpers for partial-update payloads
//! - `notify`: Notifications created as a side effect of task/comment mutations
//! - `realtime`: Per-project topic hub and the optional Redis relay
//! - `redis`: Redis client wrapper

pub mod auth;
pub mod db;
pub mod models;
pub mod notify;
pub mod patch;
pub mod realtime;
pub mod redis;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

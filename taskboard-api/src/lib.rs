//! # Taskboard API Server Library
//!
//! HTTP and WebSocket surface of the collaborative task tracker.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Environment configuration
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Tower middleware
//! - `routes`: Route handlers, one module per resource
//! - `views`: Response bodies with user references expanded

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod views;

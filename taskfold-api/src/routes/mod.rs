/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `users`: The caller's own profile
/// - `tasks`: Task CRUD and search, personal and per folder
/// - `folders`: Folder CRUD
/// - `members`: Folder membership management

use serde::Serialize;

pub mod auth;
pub mod folders;
pub mod health;
pub mod members;
pub mod tasks;
pub mod users;

/// Body of mutations that return no entity
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

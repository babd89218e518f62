//! # TaskFold Shared Library
//!
//! The TaskFold core: data models, access control, the task mutation and
//! filter engines, the entity stores and the services the API calls.
//!
//! ## Module Organization
//!
//! - `models`: Row types, inputs and their SQL queries
//! - `engine`: Store-independent task rules (mutation, recurrence, filter)
//! - `auth`: Passwords, tokens, principal resolution, access control
//! - `store`: The `EntityStore` trait with PostgreSQL and in-memory backends
//! - `service`: Authorize, validate, apply entry points
//! - `db`: Connection pool and migrations
//! - `error`: Core error taxonomy

pub mod auth;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

/// Current version of the TaskFold shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

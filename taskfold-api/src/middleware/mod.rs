/// Middleware for the API server
///
/// - `security`: hardening headers on every response
///
/// Bearer authentication lives in [`crate::app`] next to the router it guards.

pub mod security;

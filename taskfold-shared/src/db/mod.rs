/// Database plumbing for the PostgreSQL store
///
/// - `pool`: connection pool construction and health checks
/// - `migrations`: embedded schema migrations
///
/// Queries themselves live on the models in [`crate::models`].

pub mod migrations;
pub mod pool;

/// Data models for TaskFold
///
/// Each model carries its row type, its input types and the sqlx queries that
/// read and write it. The queries are generic over `PgExecutor` so the
/// Postgres store can run them on the pool or inside a transaction.
///
/// # Models
///
/// - `user`: User accounts
/// - `folder`: Folders grouping tasks
/// - `membership`: User-folder relationships with roles
/// - `task`: To-do tasks, their enums and the update patch
///
/// # Example
///
/// ```no_run
/// use taskfold_shared::models::folder::{Folder, CreateFolder};
/// use taskfold_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let folder = Folder::create(&pool, CreateFolder {
///     name: "Work".to_string(),
///     owner_id: Uuid::new_v4(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod folder;
pub mod membership;
pub mod task;
pub mod user;

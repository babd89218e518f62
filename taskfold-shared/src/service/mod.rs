/// Core entry points
///
/// Each method runs the same three phases in a fixed order:
///
/// 1. **authorize** the principal against the target folder or task
/// 2. **validate** the input without touching the store
/// 3. **apply** the change through the [`crate::store::EntityStore`]
///
/// A failure in any phase ends the call; nothing after it runs.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskfold_shared::auth::middleware::Principal;
/// use taskfold_shared::models::task::NewTask;
/// use taskfold_shared::service::TaskService;
/// use taskfold_shared::store::{EntityStore, MemoryStore};
///
/// # async fn example(principal: Principal) -> Result<(), taskfold_shared::error::CoreError> {
/// let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
/// let tasks = TaskService::new(store);
///
/// let task = tasks
///     .create(&principal, None, NewTask {
///         title: Some("Water the plants".to_string()),
///         ..Default::default()
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

pub mod folders;
pub mod tasks;

pub use folders::FolderService;
pub use tasks::TaskService;

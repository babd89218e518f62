/// Entity store
///
/// The single persistence seam of the core. Services and the access control
/// evaluator only ever talk to an [`EntityStore`]; they never see a pool or a
/// lock.
///
/// # Backends
///
/// - [`postgres::PgStore`]: PostgreSQL through sqlx, one transaction per
///   mutation
/// - [`memory::MemoryStore`]: in-process tables behind a `tokio` `RwLock`,
///   used by tests and local runs without a database
///
/// # Guarantees
///
/// - Every mutation is atomic. [`EntityStore::update_task`] runs its
///   [`TaskMutation`] against the locked record and writes all of the result
///   or nothing.
/// - Creating a folder writes the folder and its owner's membership row
///   together.
/// - Deleting a folder removes its tasks and memberships.
/// - Duplicate emails and duplicate (folder, user) memberships fail with
///   [`CoreError::Conflict`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::engine::filter::{Page, TaskFilter, TaskScope};
use crate::error::{CoreError, CoreResult};
use crate::models::folder::{CreateFolder, Folder};
use crate::models::membership::{CreateFolderMember, FolderMember, FolderRole};
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Read-modify-write step applied to a locked task
///
/// Returning `Err` aborts the update without writing anything.
pub type TaskMutation = Box<dyn FnOnce(Task) -> CoreResult<Task> + Send>;

pub(crate) const DUPLICATE_EMAIL: &str = "Email already registered";
pub(crate) const DUPLICATE_MEMBER: &str = "User is already a member of this folder";

/// Persistence operations over users, folders, memberships and tasks
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Checks that the backend is reachable
    async fn ping(&self) -> CoreResult<()>;

    /// Inserts a user; fails with `Conflict` if the email is taken
    async fn create_user(&self, data: CreateUser) -> CoreResult<User>;

    async fn find_user(&self, id: Uuid) -> CoreResult<Option<User>>;

    /// Looks a user up by (normalized) email
    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    /// Inserts a folder together with the owner's `owner` membership row
    async fn create_folder(&self, data: CreateFolder) -> CoreResult<(Folder, FolderMember)>;

    async fn find_folder(&self, id: Uuid) -> CoreResult<Option<Folder>>;

    /// Folders the user owns or is a member of, oldest first
    async fn list_folders_visible_to(&self, user_id: Uuid) -> CoreResult<Vec<Folder>>;

    async fn rename_folder(&self, id: Uuid, name: &str) -> CoreResult<Option<Folder>>;

    /// Deletes a folder with its tasks and memberships
    async fn delete_folder(&self, id: Uuid) -> CoreResult<bool>;

    /// Inserts a membership; fails with `Conflict` if one already exists
    async fn add_member(&self, data: CreateFolderMember) -> CoreResult<FolderMember>;

    async fn find_member(&self, folder_id: Uuid, user_id: Uuid)
        -> CoreResult<Option<FolderMember>>;

    async fn update_member_role(
        &self,
        folder_id: Uuid,
        user_id: Uuid,
        role: FolderRole,
    ) -> CoreResult<Option<FolderMember>>;

    async fn remove_member(&self, folder_id: Uuid, user_id: Uuid) -> CoreResult<bool>;

    /// Members of a folder, oldest first
    async fn list_members(&self, folder_id: Uuid) -> CoreResult<Vec<FolderMember>>;

    async fn insert_task(&self, data: CreateTask) -> CoreResult<Task>;

    async fn find_task(&self, id: Uuid) -> CoreResult<Option<Task>>;

    /// Applies `mutation` to the task atomically
    ///
    /// Returns `Ok(None)` if the task does not exist and propagates the
    /// mutation's error unchanged.
    async fn update_task(&self, id: Uuid, mutation: TaskMutation) -> CoreResult<Option<Task>>;

    async fn delete_task(&self, id: Uuid) -> CoreResult<bool>;

    /// Tasks in `scope` matching `filter`, newest first
    async fn search_tasks(
        &self,
        scope: TaskScope,
        filter: &TaskFilter,
        page: Page,
    ) -> CoreResult<Vec<Task>>;
}

/// Maps a unique violation to `Conflict`, everything else to `Database`
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> CoreError {
    let is_unique = err
        .as_database_error()
        .map_or(false, |db_err| db_err.is_unique_violation());

    if is_unique {
        CoreError::conflict(message)
    } else {
        CoreError::Database(err)
    }
}

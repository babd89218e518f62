/// Access control evaluator
///
/// Decides whether a principal may act on a folder or a task. Evaluation is
/// a pure read: it loads the folder (or task) and the principal's membership
/// row and never writes.
///
/// # Access Levels
///
/// | Level    | Granted to                                             |
/// |----------|--------------------------------------------------------|
/// | `Owner`  | the folder owner                                       |
/// | `Editor` | the folder owner, members with role `owner`/`editor`   |
/// | `Member` | the folder owner, any member                           |
///
/// # Tasks
///
/// Personal tasks (no folder) are accessible to their creator only. Folder
/// tasks are checked against their folder. A caller who cannot even see the
/// task gets `NotFound`, so task IDs do not leak; a member lacking editor
/// rights on a write gets `Forbidden`.
///
/// # Example
///
/// ```no_run
/// use taskfold_shared::auth::authorization::{authorize, AccessLevel};
/// use taskfold_shared::auth::middleware::Principal;
/// use taskfold_shared::store::EntityStore;
/// use uuid::Uuid;
///
/// # async fn example(store: &dyn EntityStore, principal: &Principal, folder_id: Uuid)
/// #     -> Result<(), taskfold_shared::error::CoreError> {
/// let folder = authorize(store, principal, folder_id, AccessLevel::Editor).await?;
/// # Ok(())
/// # }
/// ```

use tracing::{debug, warn};
use uuid::Uuid;

use super::middleware::Principal;
use crate::error::{CoreError, CoreResult};
use crate::models::folder::Folder;
use crate::models::membership::FolderRole;
use crate::models::task::Task;
use crate::store::EntityStore;

/// Access level required by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Owner,
    Editor,
    Member,
}

impl AccessLevel {
    /// Lowest membership role that satisfies this level
    ///
    /// `Owner` is never satisfied by a membership row alone; see [`evaluate`].
    fn minimum_role(&self) -> FolderRole {
        match self {
            AccessLevel::Owner => FolderRole::Owner,
            AccessLevel::Editor => FolderRole::Editor,
            AccessLevel::Member => FolderRole::Viewer,
        }
    }

    fn forbidden_message(&self) -> &'static str {
        match self {
            AccessLevel::Owner => "Folder owner access required",
            AccessLevel::Editor => "Folder editor access required",
            AccessLevel::Member => "Folder membership required",
        }
    }
}

/// Decides access from already loaded data
///
/// `role` is the principal's membership role on `folder`, if any.
pub fn evaluate(
    folder: &Folder,
    role: Option<FolderRole>,
    principal_id: Uuid,
    level: AccessLevel,
) -> bool {
    if folder.owner_id == principal_id {
        return true;
    }

    if level == AccessLevel::Owner {
        return false;
    }

    role.map_or(false, |role| role.has_permission(&level.minimum_role()))
}

async fn role_of(
    store: &dyn EntityStore,
    folder: &Folder,
    principal_id: Uuid,
) -> CoreResult<Option<FolderRole>> {
    if folder.owner_id == principal_id {
        return Ok(Some(FolderRole::Owner));
    }

    Ok(store
        .find_member(folder.id, principal_id)
        .await?
        .map(|member| member.role))
}

/// Authorizes a principal on a folder and returns the folder
///
/// # Errors
///
/// - `NotFound` if the folder does not exist
/// - `Forbidden` if the principal lacks `level`
pub async fn authorize(
    store: &dyn EntityStore,
    principal: &Principal,
    folder_id: Uuid,
    level: AccessLevel,
) -> CoreResult<Folder> {
    let folder = store
        .find_folder(folder_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Folder not found"))?;

    let role = role_of(store, &folder, principal.id).await?;

    if !evaluate(&folder, role, principal.id, level) {
        warn!(
            user_id = %principal.id,
            folder_id = %folder_id,
            required = ?level,
            "Folder access denied"
        );
        return Err(CoreError::forbidden(level.forbidden_message()));
    }

    debug!(user_id = %principal.id, folder_id = %folder_id, level = ?level, "Folder access granted");

    Ok(folder)
}

/// Authorizes a principal on a task and returns the task
///
/// # Errors
///
/// - `NotFound` if the task does not exist or is not visible to the principal
/// - `Forbidden` if the principal can see the task but lacks `level`
pub async fn authorize_task(
    store: &dyn EntityStore,
    principal: &Principal,
    task_id: Uuid,
    level: AccessLevel,
) -> CoreResult<Task> {
    let task = store
        .find_task(task_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task not found"))?;

    let Some(folder_id) = task.folder_id else {
        if task.user_id == principal.id {
            return Ok(task);
        }
        warn!(user_id = %principal.id, task_id = %task_id, "Personal task of another user");
        return Err(CoreError::not_found("Task not found"));
    };

    let folder = store
        .find_folder(folder_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task not found"))?;

    let role = role_of(store, &folder, principal.id).await?;

    if !evaluate(&folder, role, principal.id, AccessLevel::Member) {
        warn!(user_id = %principal.id, task_id = %task_id, "Task hidden from non-member");
        return Err(CoreError::not_found("Task not found"));
    }

    if !evaluate(&folder, role, principal.id, level) {
        warn!(
            user_id = %principal.id,
            task_id = %task_id,
            required = ?level,
            "Task access denied"
        );
        return Err(CoreError::forbidden(level.forbidden_message()));
    }

    Ok(task)
}

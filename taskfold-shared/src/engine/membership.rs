/// Membership rules
///
/// Checks applied by folder membership management before the store is
/// touched. Callers have already authorized the principal as folder owner.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::folder::Folder;
use crate::models::membership::FolderRole;

/// Rejects roles that cannot be granted through membership management
///
/// `owner` is established only by folder creation.
pub fn ensure_assignable(role: FolderRole) -> CoreResult<FolderRole> {
    match role {
        FolderRole::Owner => Err(CoreError::validation(
            "owner role can only be assigned by creating a folder",
        )),
        role => Ok(role),
    }
}

/// Rejects a role change on the folder owner's own row
pub fn ensure_role_change_allowed(folder: &Folder, user_id: Uuid) -> CoreResult<()> {
    if folder.owner_id == user_id {
        return Err(CoreError::validation(
            "folder owner's role cannot be changed",
        ));
    }
    Ok(())
}

/// Rejects removing the folder owner's row
pub fn ensure_removable(folder: &Folder, user_id: Uuid) -> CoreResult<()> {
    if folder.owner_id == user_id {
        return Err(CoreError::validation("folder owner cannot be removed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn folder() -> Folder {
        Folder {
            id: Uuid::new_v4(),
            name: "Work".to_string(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_role_not_assignable() {
        assert!(matches!(
            ensure_assignable(FolderRole::Owner),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(ensure_assignable(FolderRole::Editor).unwrap(), FolderRole::Editor);
        assert_eq!(ensure_assignable(FolderRole::Viewer).unwrap(), FolderRole::Viewer);
    }

    #[test]
    fn test_owner_row_is_protected() {
        let folder = folder();

        assert!(ensure_role_change_allowed(&folder, folder.owner_id).is_err());
        assert!(ensure_removable(&folder, folder.owner_id).is_err());

        let other = Uuid::new_v4();
        assert!(ensure_role_change_allowed(&folder, other).is_ok());
        assert!(ensure_removable(&folder, other).is_ok());
    }
}

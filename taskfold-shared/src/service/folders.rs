use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::{authorize, AccessLevel};
use crate::auth::middleware::Principal;
use crate::engine::membership::{ensure_assignable, ensure_removable, ensure_role_change_allowed};
use crate::error::{CoreError, CoreResult};
use crate::models::folder::{validate_folder_name, CreateFolder, Folder};
use crate::models::membership::{CreateFolderMember, FolderMember, FolderRole};
use crate::store::EntityStore;

/// Folder and membership operations
#[derive(Clone)]
pub struct FolderService {
    store: Arc<dyn EntityStore>,
}

impl FolderService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Creates a folder owned by the principal, with its owner membership
    pub async fn create(&self, principal: &Principal, name: &str) -> CoreResult<Folder> {
        let name = validate_folder_name(name)?;

        let (folder, _) = self
            .store
            .create_folder(CreateFolder {
                name,
                owner_id: principal.id,
            })
            .await?;

        info!(folder_id = %folder.id, owner_id = %principal.id, "Folder created");

        Ok(folder)
    }

    /// Folders the principal owns or belongs to
    pub async fn list(&self, principal: &Principal) -> CoreResult<Vec<Folder>> {
        self.store.list_folders_visible_to(principal.id).await
    }

    pub async fn get(&self, principal: &Principal, folder_id: Uuid) -> CoreResult<Folder> {
        authorize(self.store.as_ref(), principal, folder_id, AccessLevel::Member).await
    }

    pub async fn rename(
        &self,
        principal: &Principal,
        folder_id: Uuid,
        name: &str,
    ) -> CoreResult<Folder> {
        authorize(self.store.as_ref(), principal, folder_id, AccessLevel::Owner).await?;

        let name = validate_folder_name(name)?;

        let folder = self
            .store
            .rename_folder(folder_id, &name)
            .await?
            .ok_or_else(|| CoreError::not_found("Folder not found"))?;

        info!(folder_id = %folder_id, "Folder renamed");

        Ok(folder)
    }

    /// Deletes a folder with all of its tasks and memberships
    pub async fn delete(&self, principal: &Principal, folder_id: Uuid) -> CoreResult<()> {
        authorize(self.store.as_ref(), principal, folder_id, AccessLevel::Owner).await?;

        if !self.store.delete_folder(folder_id).await? {
            return Err(CoreError::not_found("Folder not found"));
        }

        info!(folder_id = %folder_id, user_id = %principal.id, "Folder deleted");

        Ok(())
    }

    pub async fn list_members(
        &self,
        principal: &Principal,
        folder_id: Uuid,
    ) -> CoreResult<Vec<FolderMember>> {
        authorize(self.store.as_ref(), principal, folder_id, AccessLevel::Owner).await?;

        self.store.list_members(folder_id).await
    }

    /// Adds an existing user to the folder as editor or viewer
    pub async fn add_member(
        &self,
        principal: &Principal,
        folder_id: Uuid,
        user_id: Uuid,
        role: FolderRole,
    ) -> CoreResult<FolderMember> {
        authorize(self.store.as_ref(), principal, folder_id, AccessLevel::Owner).await?;

        let role = ensure_assignable(role)?;

        if self.store.find_user(user_id).await?.is_none() {
            return Err(CoreError::not_found("User not found"));
        }

        let member = self
            .store
            .add_member(CreateFolderMember {
                folder_id,
                user_id,
                role,
            })
            .await?;

        info!(
            folder_id = %folder_id,
            user_id = %user_id,
            role = role.as_str(),
            "Member added"
        );

        Ok(member)
    }

    pub async fn change_role(
        &self,
        principal: &Principal,
        folder_id: Uuid,
        user_id: Uuid,
        role: FolderRole,
    ) -> CoreResult<FolderMember> {
        let folder =
            authorize(self.store.as_ref(), principal, folder_id, AccessLevel::Owner).await?;

        let role = ensure_assignable(role)?;
        ensure_role_change_allowed(&folder, user_id)?;

        let member = self
            .store
            .update_member_role(folder_id, user_id, role)
            .await?
            .ok_or_else(|| CoreError::not_found("Membership not found"))?;

        info!(
            folder_id = %folder_id,
            user_id = %user_id,
            role = role.as_str(),
            "Member role changed"
        );

        Ok(member)
    }

    pub async fn remove_member(
        &self,
        principal: &Principal,
        folder_id: Uuid,
        user_id: Uuid,
    ) -> CoreResult<()> {
        let folder =
            authorize(self.store.as_ref(), principal, folder_id, AccessLevel::Owner).await?;

        ensure_removable(&folder, user_id)?;

        if !self.store.remove_member(folder_id, user_id).await? {
            return Err(CoreError::not_found("Membership not found"));
        }

        info!(folder_id = %folder_id, user_id = %user_id, "Member removed");

        Ok(())
    }
}

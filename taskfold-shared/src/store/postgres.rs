/// PostgreSQL entity store
///
/// Thin adapter from [`EntityStore`] to the sqlx queries on the models.
/// Multi-statement mutations (folder creation, task update) run in one
/// transaction; everything else is a single statement on the pool.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{conflict_on_unique, EntityStore, TaskMutation, DUPLICATE_EMAIL, DUPLICATE_MEMBER};
use crate::db::pool::health_check;
use crate::engine::filter::{Page, TaskFilter, TaskScope};
use crate::error::{CoreError, CoreResult};
use crate::models::folder::{CreateFolder, Folder};
use crate::models::membership::{CreateFolderMember, FolderMember, FolderRole};
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};

/// Entity store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for migrations and shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn ping(&self) -> CoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> CoreResult<User> {
        User::create(&self.pool, data)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_EMAIL))
    }

    async fn find_user(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn create_folder(&self, data: CreateFolder) -> CoreResult<(Folder, FolderMember)> {
        let mut tx = self.pool.begin().await?;

        let folder = Folder::create(&mut *tx, data).await?;
        let owner = FolderMember::create(
            &mut *tx,
            CreateFolderMember {
                folder_id: folder.id,
                user_id: folder.owner_id,
                role: FolderRole::Owner,
            },
        )
        .await?;

        tx.commit().await?;

        debug!(folder_id = %folder.id, owner_id = %folder.owner_id, "Folder inserted with owner membership");

        Ok((folder, owner))
    }

    async fn find_folder(&self, id: Uuid) -> CoreResult<Option<Folder>> {
        Ok(Folder::find_by_id(&self.pool, id).await?)
    }

    async fn list_folders_visible_to(&self, user_id: Uuid) -> CoreResult<Vec<Folder>> {
        Ok(Folder::list_visible_to(&self.pool, user_id).await?)
    }

    async fn rename_folder(&self, id: Uuid, name: &str) -> CoreResult<Option<Folder>> {
        Ok(Folder::rename(&self.pool, id, name).await?)
    }

    async fn delete_folder(&self, id: Uuid) -> CoreResult<bool> {
        Ok(Folder::delete(&self.pool, id).await?)
    }

    async fn add_member(&self, data: CreateFolderMember) -> CoreResult<FolderMember> {
        FolderMember::create(&self.pool, data)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_MEMBER))
    }

    async fn find_member(
        &self,
        folder_id: Uuid,
        user_id: Uuid,
    ) -> CoreResult<Option<FolderMember>> {
        Ok(FolderMember::find(&self.pool, folder_id, user_id).await?)
    }

    async fn update_member_role(
        &self,
        folder_id: Uuid,
        user_id: Uuid,
        role: FolderRole,
    ) -> CoreResult<Option<FolderMember>> {
        Ok(FolderMember::update_role(&self.pool, folder_id, user_id, role).await?)
    }

    async fn remove_member(&self, folder_id: Uuid, user_id: Uuid) -> CoreResult<bool> {
        Ok(FolderMember::delete(&self.pool, folder_id, user_id).await?)
    }

    async fn list_members(&self, folder_id: Uuid) -> CoreResult<Vec<FolderMember>> {
        Ok(FolderMember::list_by_folder(&self.pool, folder_id).await?)
    }

    async fn insert_task(&self, data: CreateTask) -> CoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: Uuid) -> CoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn update_task(&self, id: Uuid, mutation: TaskMutation) -> CoreResult<Option<Task>> {
        let mut tx = self.pool.begin().await?;

        let Some(current) = Task::find_by_id_for_update(&mut *tx, id).await? else {
            return Ok(None);
        };

        // dropping `tx` on error rolls the transaction back
        let next = mutation(current)?;

        let saved = Task::save(&mut *tx, &next)
            .await?
            .ok_or_else(|| CoreError::not_found("Task not found"))?;

        tx.commit().await?;

        Ok(Some(saved))
    }

    async fn delete_task(&self, id: Uuid) -> CoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }

    async fn search_tasks(
        &self,
        scope: TaskScope,
        filter: &TaskFilter,
        page: Page,
    ) -> CoreResult<Vec<Task>> {
        Ok(Task::search(&self.pool, scope, filter, page).await?)
    }
}

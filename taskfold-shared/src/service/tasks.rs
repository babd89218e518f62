use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::{authorize, authorize_task, AccessLevel};
use crate::auth::middleware::Principal;
use crate::engine::filter::{Page, TaskFilter, TaskScope};
use crate::engine::mutation::{apply_update, prepare_create};
use crate::error::{CoreError, CoreResult};
use crate::models::task::{NewTask, Task, TaskPatch};
use crate::store::EntityStore;

/// Task operations
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn EntityStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Creates a personal task, or a task in `folder_id` (requires editor)
    pub async fn create(
        &self,
        principal: &Principal,
        folder_id: Option<Uuid>,
        input: NewTask,
    ) -> CoreResult<Task> {
        if let Some(folder_id) = folder_id {
            authorize(self.store.as_ref(), principal, folder_id, AccessLevel::Editor).await?;
        }

        let data = prepare_create(input, principal.id, folder_id, Utc::now())?;

        let task = self.store.insert_task(data).await?;

        info!(
            task_id = %task.id,
            user_id = %principal.id,
            folder_id = ?task.folder_id,
            "Task created"
        );

        Ok(task)
    }

    pub async fn get(&self, principal: &Principal, task_id: Uuid) -> CoreResult<Task> {
        authorize_task(self.store.as_ref(), principal, task_id, AccessLevel::Member).await
    }

    /// Applies a patch, rolling a completed repeating task over
    ///
    /// The stored task is unchanged unless the whole update succeeds.
    pub async fn update(
        &self,
        principal: &Principal,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> CoreResult<Task> {
        authorize_task(self.store.as_ref(), principal, task_id, AccessLevel::Editor).await?;

        let patch = patch.validate()?;

        let task = self
            .store
            .update_task(task_id, Box::new(move |current| apply_update(current, patch)))
            .await?
            .ok_or_else(|| CoreError::not_found("Task not found"))?;

        info!(
            task_id = %task.id,
            user_id = %principal.id,
            completed = task.completed.as_str(),
            "Task updated"
        );

        Ok(task)
    }

    pub async fn delete(&self, principal: &Principal, task_id: Uuid) -> CoreResult<()> {
        authorize_task(self.store.as_ref(), principal, task_id, AccessLevel::Editor).await?;

        if !self.store.delete_task(task_id).await? {
            return Err(CoreError::not_found("Task not found"));
        }

        info!(task_id = %task_id, user_id = %principal.id, "Task deleted");

        Ok(())
    }

    /// Tasks visible to the principal matching `filter`
    pub async fn search(
        &self,
        principal: &Principal,
        filter: &TaskFilter,
        page: Page,
    ) -> CoreResult<Vec<Task>> {
        self.store
            .search_tasks(TaskScope::VisibleTo(principal.id), filter, page)
            .await
    }

    /// Tasks of one folder matching `filter` (requires membership)
    pub async fn search_folder(
        &self,
        principal: &Principal,
        folder_id: Uuid,
        filter: &TaskFilter,
        page: Page,
    ) -> CoreResult<Vec<Task>> {
        authorize(self.store.as_ref(), principal, folder_id, AccessLevel::Member).await?;

        self.store
            .search_tasks(TaskScope::Folder(folder_id), filter, page)
            .await
    }
}

/// In-memory entity store
///
/// All tables sit behind one `tokio::sync::RwLock`. Reads share the lock;
/// every mutation takes the write guard for its whole read-modify-write, so
/// mutations are serialized and atomic. Foreign keys, cascades and unique
/// constraints of the SQL schema are emulated.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskfold_shared::store::{EntityStore, MemoryStore};
///
/// let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
/// ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EntityStore, TaskMutation, DUPLICATE_EMAIL, DUPLICATE_MEMBER};
use crate::engine::filter::{Page, TaskFilter, TaskScope};
use crate::error::{CoreError, CoreResult};
use crate::models::folder::{CreateFolder, Folder};
use crate::models::membership::{CreateFolderMember, FolderMember, FolderRole};
use crate::models::task::{CreateTask, Task};
use crate::models::user::{normalize_email, CreateUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    folders: HashMap<Uuid, Folder>,
    members: HashMap<(Uuid, Uuid), FolderMember>,
    tasks: HashMap<Uuid, Task>,
}

impl Tables {
    fn require_user(&self, id: Uuid) -> CoreResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(CoreError::not_found("User not found"))
        }
    }

    fn require_folder(&self, id: Uuid) -> CoreResult<()> {
        if self.folders.contains_key(&id) {
            Ok(())
        } else {
            Err(CoreError::not_found("Folder not found"))
        }
    }

    fn visible_folder_ids(&self, user_id: Uuid) -> Vec<Uuid> {
        self.folders
            .values()
            .filter(|folder| {
                folder.owner_id == user_id
                    || self.members.contains_key(&(folder.id, user_id))
            })
            .map(|folder| folder.id)
            .collect()
    }
}

/// Entity store holding everything in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn ping(&self) -> CoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> CoreResult<User> {
        let mut tables = self.tables.write().await;
        let email = normalize_email(&data.email);

        if tables.users.values().any(|user| user.email == email) {
            return Err(CoreError::conflict(DUPLICATE_EMAIL));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: data.password_hash,
            is_active: true,
            is_verified: false,
            is_superuser: false,
            created_at: Utc::now(),
        };

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let email = normalize_email(email);
        let tables = self.tables.read().await;

        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    async fn create_folder(&self, data: CreateFolder) -> CoreResult<(Folder, FolderMember)> {
        let mut tables = self.tables.write().await;
        tables.require_user(data.owner_id)?;

        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            name: data.name,
            owner_id: data.owner_id,
            created_at: now,
        };
        let owner = FolderMember {
            folder_id: folder.id,
            user_id: folder.owner_id,
            role: FolderRole::Owner,
            created_at: now,
        };

        tables.folders.insert(folder.id, folder.clone());
        tables.members.insert((folder.id, folder.owner_id), owner.clone());

        Ok((folder, owner))
    }

    async fn find_folder(&self, id: Uuid) -> CoreResult<Option<Folder>> {
        Ok(self.tables.read().await.folders.get(&id).cloned())
    }

    async fn list_folders_visible_to(&self, user_id: Uuid) -> CoreResult<Vec<Folder>> {
        let tables = self.tables.read().await;

        let mut folders: Vec<Folder> = tables
            .visible_folder_ids(user_id)
            .into_iter()
            .filter_map(|id| tables.folders.get(&id).cloned())
            .collect();
        folders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(folders)
    }

    async fn rename_folder(&self, id: Uuid, name: &str) -> CoreResult<Option<Folder>> {
        let mut tables = self.tables.write().await;

        Ok(tables.folders.get_mut(&id).map(|folder| {
            folder.name = name.to_string();
            folder.clone()
        }))
    }

    async fn delete_folder(&self, id: Uuid) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.folders.remove(&id).is_none() {
            return Ok(false);
        }

        tables.members.retain(|(folder_id, _), _| *folder_id != id);
        tables.tasks.retain(|_, task| task.folder_id != Some(id));

        Ok(true)
    }

    async fn add_member(&self, data: CreateFolderMember) -> CoreResult<FolderMember> {
        let mut tables = self.tables.write().await;
        tables.require_folder(data.folder_id)?;
        tables.require_user(data.user_id)?;

        let key = (data.folder_id, data.user_id);
        if tables.members.contains_key(&key) {
            return Err(CoreError::conflict(DUPLICATE_MEMBER));
        }

        let member = FolderMember {
            folder_id: data.folder_id,
            user_id: data.user_id,
            role: data.role,
            created_at: Utc::now(),
        };

        tables.members.insert(key, member.clone());
        Ok(member)
    }

    async fn find_member(
        &self,
        folder_id: Uuid,
        user_id: Uuid,
    ) -> CoreResult<Option<FolderMember>> {
        Ok(self
            .tables
            .read()
            .await
            .members
            .get(&(folder_id, user_id))
            .cloned())
    }

    async fn update_member_role(
        &self,
        folder_id: Uuid,
        user_id: Uuid,
        role: FolderRole,
    ) -> CoreResult<Option<FolderMember>> {
        let mut tables = self.tables.write().await;

        Ok(tables.members.get_mut(&(folder_id, user_id)).map(|member| {
            member.role = role;
            member.clone()
        }))
    }

    async fn remove_member(&self, folder_id: Uuid, user_id: Uuid) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.members.remove(&(folder_id, user_id)).is_some())
    }

    async fn list_members(&self, folder_id: Uuid) -> CoreResult<Vec<FolderMember>> {
        let tables = self.tables.read().await;

        let mut members: Vec<FolderMember> = tables
            .members
            .values()
            .filter(|member| member.folder_id == folder_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.user_id.cmp(&b.user_id))
        });

        Ok(members)
    }

    async fn insert_task(&self, data: CreateTask) -> CoreResult<Task> {
        let mut tables = self.tables.write().await;
        tables.require_user(data.user_id)?;
        if let Some(folder_id) = data.folder_id {
            tables.require_folder(folder_id)?;
        }

        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            completed: data.completed,
            due: data.due,
            priority: data.priority,
            repeat_type: data.repeat_type,
            repeat_amount: data.repeat_amount,
            created: data.created,
            user_id: data.user_id,
            folder_id: data.folder_id,
        };

        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> CoreResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn update_task(&self, id: Uuid, mutation: TaskMutation) -> CoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;

        let Some(current) = tables.tasks.get(&id).cloned() else {
            return Ok(None);
        };

        let mut next = mutation(current.clone())?;

        // server-owned columns are never written by an update
        next.id = current.id;
        next.created = current.created;
        next.user_id = current.user_id;
        next.folder_id = current.folder_id;

        tables.tasks.insert(id, next.clone());
        Ok(Some(next))
    }

    async fn delete_task(&self, id: Uuid) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.tasks.remove(&id).is_some())
    }

    async fn search_tasks(
        &self,
        scope: TaskScope,
        filter: &TaskFilter,
        page: Page,
    ) -> CoreResult<Vec<Task>> {
        let tables = self.tables.read().await;

        let visible_folders = match scope {
            TaskScope::VisibleTo(user_id) => tables.visible_folder_ids(user_id),
            TaskScope::Folder(_) => Vec::new(),
        };

        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|task| scope.contains(task, &visible_folders) && filter.matches(task))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created.cmp(&a.created).then(a.id.cmp(&b.id)));

        Ok(page.slice(tasks))
    }
}

/// Folder membership model and database operations
///
/// Links a user to a folder with a role. There is at most one row per
/// (folder, user) pair. The folder owner's `owner` row is written together
/// with the folder itself; the `owner` role is never granted through
/// membership management.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE folder_role AS ENUM ('owner', 'editor', 'viewer');
///
/// CREATE TABLE folder_members (
///     folder_id UUID NOT NULL REFERENCES folders(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role folder_role NOT NULL DEFAULT 'viewer',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (folder_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner**: Full control, manage members, rename and delete the folder
/// - **editor**: Create, modify and delete tasks in the folder
/// - **viewer**: Read-only access to the folder's tasks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Roles a user can hold on a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "folder_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FolderRole {
    /// Folder creator, full control
    Owner,

    /// Can create, modify and delete tasks
    Editor,

    /// Read-only access
    Viewer,
}

impl FolderRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderRole::Owner => "owner",
            FolderRole::Editor => "editor",
            FolderRole::Viewer => "viewer",
        }
    }

    /// Checks if this role satisfies the required role
    ///
    /// Hierarchy: Owner > Editor > Viewer
    pub fn has_permission(&self, required: &FolderRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            FolderRole::Owner => 3,
            FolderRole::Editor => 2,
            FolderRole::Viewer => 1,
        }
    }
}

/// Membership of a user in a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FolderMember {
    /// Folder ID
    pub folder_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the folder
    pub role: FolderRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a membership
#[derive(Debug, Clone)]
pub struct CreateFolderMember {
    /// Folder ID
    pub folder_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role to assign
    pub role: FolderRole,
}

impl FolderMember {
    /// Inserts a membership row
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `folder_members_pkey` if the user is
    /// already a member, or a foreign key violation if folder or user is missing.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        data: CreateFolderMember,
    ) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, FolderMember>(
            r#"
            INSERT INTO folder_members (folder_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING folder_id, user_id, role, created_at
            "#,
        )
        .bind(data.folder_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(executor)
        .await?;

        Ok(member)
    }

    /// Finds the membership row for a (folder, user) pair
    pub async fn find<'e, E: PgExecutor<'e>>(
        executor: E,
        folder_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, FolderMember>(
            r#"
            SELECT folder_id, user_id, role, created_at
            FROM folder_members
            WHERE folder_id = $1 AND user_id = $2
            "#,
        )
        .bind(folder_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(member)
    }

    /// Updates a member's role
    ///
    /// Returns None if the membership doesn't exist.
    pub async fn update_role<'e, E: PgExecutor<'e>>(
        executor: E,
        folder_id: Uuid,
        user_id: Uuid,
        role: FolderRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, FolderMember>(
            r#"
            UPDATE folder_members
            SET role = $3
            WHERE folder_id = $1 AND user_id = $2
            RETURNING folder_id, user_id, role, created_at
            "#,
        )
        .bind(folder_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(executor)
        .await?;

        Ok(member)
    }

    /// Removes a member from a folder
    ///
    /// Returns false if the membership didn't exist.
    pub async fn delete<'e, E: PgExecutor<'e>>(
        executor: E,
        folder_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM folder_members WHERE folder_id = $1 AND user_id = $2")
            .bind(folder_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all members of a folder, oldest first
    pub async fn list_by_folder<'e, E: PgExecutor<'e>>(
        executor: E,
        folder_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, FolderMember>(
            r#"
            SELECT folder_id, user_id, role, created_at
            FROM folder_members
            WHERE folder_id = $1
            ORDER BY created_at ASC, user_id ASC
            "#,
        )
        .bind(folder_id)
        .fetch_all(executor)
        .await?;

        Ok(members)
    }
}

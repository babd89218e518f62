/// Folder model and database operations
///
/// A folder groups tasks and is shared through folder memberships. It has
/// exactly one owner, fixed at creation. Deleting a folder cascades to its
/// tasks and memberships.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE folders (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::CoreError;

/// Maximum folder name length in characters
pub const MAX_FOLDER_NAME_LEN: usize = 100;

/// Folder of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Owning user, immutable
    pub owner_id: Uuid,

    /// When the folder was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Display name
    pub name: String,

    /// Owning user
    pub owner_id: Uuid,
}

/// Trims and checks a folder name
pub fn validate_folder_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(CoreError::validation("folder name required"));
    }

    if name.chars().count() > MAX_FOLDER_NAME_LEN {
        return Err(CoreError::validation(format!(
            "folder name must be at most {} characters",
            MAX_FOLDER_NAME_LEN
        )));
    }

    Ok(name.to_string())
}

impl Folder {
    /// Inserts a folder row
    ///
    /// The owner's membership row is inserted separately, in the same
    /// transaction, by the store.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        data: CreateFolder,
    ) -> Result<Self, sqlx::Error> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            INSERT INTO folders (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.owner_id)
        .fetch_one(executor)
        .await?;

        Ok(folder)
    }

    /// Finds a folder by ID
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            SELECT id, name, owner_id, created_at
            FROM folders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(folder)
    }

    /// Lists folders the user owns or is a member of
    pub async fn list_visible_to<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let folders = sqlx::query_as::<_, Folder>(
            r#"
            SELECT f.id, f.name, f.owner_id, f.created_at
            FROM folders f
            WHERE f.owner_id = $1
               OR EXISTS (
                   SELECT 1 FROM folder_members m
                   WHERE m.folder_id = f.id AND m.user_id = $1
               )
            ORDER BY f.created_at ASC, f.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(folders)
    }

    /// Renames a folder
    ///
    /// Returns None if the folder doesn't exist.
    pub async fn rename<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            UPDATE folders
            SET name = $2
            WHERE id = $1
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(executor)
        .await?;

        Ok(folder)
    }

    /// Deletes a folder
    ///
    /// ⚠️  Tasks and memberships are removed by ON DELETE CASCADE.
    pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Task model and database operations
///
/// A task is a to-do item owned by the user who created it and, optionally,
/// by a folder. Personal tasks have no folder.
///
/// # Completion
///
/// Completion is tri-state, not a boolean:
///
/// ```text
/// false → in_progress → true
///   ↑                     │
///   └──── rollover ───────┘   (repeating tasks only)
/// ```
///
/// Marking a repeating task `true` advances its due date by one repeat
/// interval and reopens it; see [`crate::engine::mutation`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE completed_status AS ENUM ('false', 'in_progress', 'true');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
/// CREATE TYPE repeat_type AS ENUM ('never', 'daily', 'weekly', 'monthly', 'yearly');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title TEXT NOT NULL,
///     description TEXT,
///     completed completed_status NOT NULL DEFAULT 'false',
///     due TIMESTAMPTZ,
///     priority task_priority,
///     repeat_type repeat_type NOT NULL DEFAULT 'never',
///     repeat_amount INTEGER NOT NULL DEFAULT 1 CHECK (repeat_amount >= 1),
///     created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     folder_id UUID REFERENCES folders(id) ON DELETE CASCADE,
///     CONSTRAINT tasks_repeat_requires_due CHECK (repeat_type = 'never' OR due IS NOT NULL)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::engine::filter::{Page, TaskFilter, TaskScope};

/// Task completion status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "completed_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CompletedStatus {
    /// Not started
    #[default]
    False,

    /// Work has started
    InProgress,

    /// Done
    True,
}

impl CompletedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletedStatus::False => "false",
            CompletedStatus::InProgress => "in_progress",
            CompletedStatus::True => "true",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Recurrence unit of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "repeat_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RepeatType {
    /// One-off task
    #[default]
    Never,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RepeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatType::Never => "never",
            RepeatType::Daily => "daily",
            RepeatType::Weekly => "weekly",
            RepeatType::Monthly => "monthly",
            RepeatType::Yearly => "yearly",
        }
    }

    /// True for every unit except `never`
    pub fn is_repeating(&self) -> bool {
        !matches!(self, RepeatType::Never)
    }
}

/// To-do task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Title, never empty
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Tri-state completion
    pub completed: CompletedStatus,

    /// Due timestamp, required while the task repeats
    pub due: Option<DateTime<Utc>>,

    /// Optional priority
    pub priority: Option<Priority>,

    /// Recurrence unit
    pub repeat_type: RepeatType,

    /// Number of units per recurrence step, at least 1
    pub repeat_amount: i32,

    /// Server-assigned creation timestamp
    pub created: DateTime<Utc>,

    /// Creating user
    pub user_id: Uuid,

    /// Containing folder (None for personal tasks)
    pub folder_id: Option<Uuid>,
}

/// Client input for creating a task
///
/// Server-owned attributes (`id`, `created`, `user_id`, `folder_id`) are not
/// accepted here and are ignored if present in the payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<CompletedStatus>,
    pub due: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub repeat_type: Option<RepeatType>,
    pub repeat_amount: Option<i32>,
}

/// Partial update of a task
///
/// Each field distinguishes three states:
///
/// - `None`: field absent from the payload, left unchanged
/// - `Some(None)`: field explicitly set to null
/// - `Some(Some(v))`: field set to `v`
///
/// Only editable fields exist here; `id`, `created`, `user_id` and
/// `folder_id` cannot be changed through an update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub completed: Option<Option<CompletedStatus>>,

    #[serde(default, deserialize_with = "present")]
    pub due: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "present")]
    pub priority: Option<Option<Priority>>,

    #[serde(default, deserialize_with = "present")]
    pub repeat_type: Option<Option<RepeatType>>,

    #[serde(default, deserialize_with = "present")]
    pub repeat_amount: Option<Option<i32>>,
}

/// Maps a present field (null or not) to `Some`, leaving absence to `default`
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Validated insert data for a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: CompletedStatus,
    pub due: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub repeat_type: RepeatType,
    pub repeat_amount: i32,
    pub created: DateTime<Utc>,
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
}

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.completed, t.due, t.priority, \
     t.repeat_type, t.repeat_amount, t.created, t.user_id, t.folder_id";

impl Task {
    /// Inserts a task
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, completed, due, priority,
                               repeat_type, repeat_amount, created, user_id, folder_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, title, description, completed, due, priority,
                      repeat_type, repeat_amount, created, user_id, folder_id
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.completed)
        .bind(data.due)
        .bind(data.priority)
        .bind(data.repeat_type)
        .bind(data.repeat_amount)
        .bind(data.created)
        .bind(data.user_id)
        .bind(data.folder_id)
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks t WHERE t.id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID and locks the row until the transaction ends
    pub async fn find_by_id_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks t WHERE t.id = $1 FOR UPDATE",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Writes every mutable column of `task` in a single statement
    ///
    /// `id`, `created`, `user_id` and `folder_id` are never written.
    pub async fn save<'e, E: PgExecutor<'e>>(
        executor: E,
        task: &Task,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                completed = $4,
                due = $5,
                priority = $6,
                repeat_type = $7,
                repeat_amount = $8
            WHERE id = $1
            RETURNING id, title, description, completed, due, priority,
                      repeat_type, repeat_amount, created, user_id, folder_id
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.due)
        .bind(task.priority)
        .bind(task.repeat_type)
        .bind(task.repeat_amount)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists tasks within a visibility scope matching a filter
    ///
    /// The scope predicate is always emitted first; filter predicates are
    /// AND-ed on top of it.
    pub async fn search<'e, E: PgExecutor<'e>>(
        executor: E,
        scope: TaskScope,
        filter: &TaskFilter,
        page: Page,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM tasks t WHERE ", TASK_COLUMNS));

        scope.push_predicate(&mut query);
        filter.push_predicates(&mut query);

        query.push(" ORDER BY t.created DESC, t.id ASC LIMIT ");
        query.push_bind(page.limit);
        query.push(" OFFSET ");
        query.push_bind(page.offset);

        let tasks = query.build_query_as::<Task>().fetch_all(executor).await?;

        Ok(tasks)
    }
}

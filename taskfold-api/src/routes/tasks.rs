/// Task endpoints
///
/// # Endpoints
///
/// - `GET    /v1/tasks` - Search tasks visible to the caller
/// - `POST   /v1/tasks` - Create a personal task
/// - `GET    /v1/tasks/:task_id` - Get a task
/// - `PUT    /v1/tasks/:task_id` - Update a task (field by field)
/// - `DELETE /v1/tasks/:task_id` - Delete a task
/// - `GET    /v1/folders/:folder_id/tasks` - Search tasks of a folder
/// - `POST   /v1/folders/:folder_id/tasks` - Create a task in a folder
///
/// # Search Parameters
///
/// `title` and `description` match case-insensitive substrings; `completed`,
/// `priority` and `repeat_type` match exactly; `due` and `created` take a
/// `YYYY-MM-DD` date and match the whole UTC day. `limit` (default 100,
/// max 500) and `offset` page the newest-first result.
///
/// ```text
/// GET /v1/tasks?title=report&completed=false&due=2024-03-08&limit=20
/// ```
///
/// # Update Semantics
///
/// Absent fields are left alone. `null` clears `description`, `due` and
/// `priority`, and is rejected for `title`, `completed`, `repeat_type` and
/// `repeat_amount`. Completing a repeating task moves its due date one
/// interval forward and reopens it.
///
/// ```json
/// { "completed": "true" }
/// ```

use super::MessageResponse;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskfold_shared::{
    auth::middleware::Principal,
    engine::filter::{Page, TaskFilter},
    models::task::{CompletedStatus, NewTask, Priority, RepeatType, Task, TaskPatch},
};
use uuid::Uuid;

/// Query string of the task search endpoints
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<CompletedStatus>,
    pub due: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub repeat_type: Option<RepeatType>,
    pub created: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TaskQuery {
    /// Splits the query into a filter and a page window
    pub fn into_parts(self) -> (TaskFilter, Page) {
        let filter = TaskFilter {
            title: self.title.filter(|t| !t.is_empty()),
            description: self.description.filter(|d| !d.is_empty()),
            completed: self.completed,
            due: self.due,
            priority: self.priority,
            repeat_type: self.repeat_type,
            created: self.created,
        };

        (filter, Page::new(self.limit, self.offset))
    }
}

/// Envelope returned by task mutations
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub message: &'static str,
    pub task: Task,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(query) = query?;
    let (filter, page) = query.into_parts();

    let tasks = state.tasks.search(&principal, &filter, page).await?;

    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let Json(input) = payload?;

    let task = state.tasks.create(&principal, None, input).await?;

    Ok(Json(TaskResponse {
        message: "Task Created",
        task,
    }))
}

pub async fn get_task(
    State(state): State<AppState>,
    principal: Principal,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.get(&principal, task_id).await?))
}

/// Applies a field-by-field patch; nothing is written unless it all succeeds
pub async fn update_task(
    State(state): State<AppState>,
    principal: Principal,
    Path(task_id): Path<Uuid>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let Json(patch) = payload?;

    let task = state.tasks.update(&principal, task_id, patch).await?;

    Ok(Json(TaskResponse {
        message: "Task Updated",
        task,
    }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    principal: Principal,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.tasks.delete(&principal, task_id).await?;

    Ok(Json(MessageResponse {
        message: "Task Deleted",
    }))
}

pub async fn list_folder_tasks(
    State(state): State<AppState>,
    principal: Principal,
    Path(folder_id): Path<Uuid>,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(query) = query?;
    let (filter, page) = query.into_parts();

    let tasks = state
        .tasks
        .search_folder(&principal, folder_id, &filter, page)
        .await?;

    Ok(Json(tasks))
}

pub async fn create_folder_task(
    State(state): State<AppState>,
    principal: Principal,
    Path(folder_id): Path<Uuid>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let Json(input) = payload?;

    let task = state.tasks.create(&principal, Some(folder_id), input).await?;

    Ok(Json(TaskResponse {
        message: "Task Created",
        task,
    }))
}

/// Folder endpoints
///
/// # Endpoints
///
/// - `GET    /v1/folders` - Folders the caller owns or belongs to
/// - `POST   /v1/folders` - Create a folder (caller becomes its owner)
/// - `GET    /v1/folders/:folder_id` - Get a folder (member)
/// - `PATCH  /v1/folders/:folder_id` - Rename a folder (owner)
/// - `DELETE /v1/folders/:folder_id` - Delete a folder with its tasks (owner)
///
/// # Request Body
///
/// ```json
/// { "name": "Work" }
/// ```

use super::MessageResponse;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use taskfold_shared::{auth::middleware::Principal, models::folder::Folder};
use uuid::Uuid;

/// Create and rename body
#[derive(Debug, Deserialize)]
pub struct FolderRequest {
    pub name: String,
}

/// Envelope returned by folder mutations
#[derive(Debug, Serialize)]
pub struct FolderResponse {
    pub message: &'static str,
    pub folder: Folder,
}

pub async fn list_folders(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<Vec<Folder>>> {
    Ok(Json(state.folders.list(&principal).await?))
}

pub async fn create_folder(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<FolderRequest>, JsonRejection>,
) -> ApiResult<Json<FolderResponse>> {
    let Json(req) = payload?;

    let folder = state.folders.create(&principal, &req.name).await?;

    Ok(Json(FolderResponse {
        message: "Folder Created",
        folder,
    }))
}

pub async fn get_folder(
    State(state): State<AppState>,
    principal: Principal,
    Path(folder_id): Path<Uuid>,
) -> ApiResult<Json<Folder>> {
    Ok(Json(state.folders.get(&principal, folder_id).await?))
}

pub async fn rename_folder(
    State(state): State<AppState>,
    principal: Principal,
    Path(folder_id): Path<Uuid>,
    payload: Result<Json<FolderRequest>, JsonRejection>,
) -> ApiResult<Json<FolderResponse>> {
    let Json(req) = payload?;

    let folder = state.folders.rename(&principal, folder_id, &req.name).await?;

    Ok(Json(FolderResponse {
        message: "Folder Updated",
        folder,
    }))
}

pub async fn delete_folder(
    State(state): State<AppState>,
    principal: Principal,
    Path(folder_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.folders.delete(&principal, folder_id).await?;

    Ok(Json(MessageResponse {
        message: "Folder Deleted",
    }))
}

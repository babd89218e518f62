/// Folder membership endpoints (folder owner only)
///
/// # Endpoints
///
/// - `GET    /v1/folders/:folder_id/members` - List members
/// - `POST   /v1/folders/:folder_id/members` - Add a member
/// - `PUT    /v1/folders/:folder_id/members/:user_id` - Change a member's role
/// - `DELETE /v1/folders/:folder_id/members/:user_id` - Remove a member
///
/// Roles are `editor` or `viewer`; `owner` is only ever assigned by creating
/// the folder, and the owner's own row can be neither changed nor removed.
///
/// ```json
/// { "user_id": "uuid", "role": "editor" }
/// ```

use super::MessageResponse;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use taskfold_shared::{
    auth::middleware::Principal,
    models::membership::{FolderMember, FolderRole},
};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role: FolderRole,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: FolderRole,
}

/// Envelope returned by membership mutations
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub message: &'static str,
    pub member: FolderMember,
}

pub async fn list_members(
    State(state): State<AppState>,
    principal: Principal,
    Path(folder_id): Path<Uuid>,
) -> ApiResult<Json<Vec<FolderMember>>> {
    Ok(Json(state.folders.list_members(&principal, folder_id).await?))
}

pub async fn add_member(
    State(state): State<AppState>,
    principal: Principal,
    Path(folder_id): Path<Uuid>,
    payload: Result<Json<AddMemberRequest>, JsonRejection>,
) -> ApiResult<Json<MemberResponse>> {
    let Json(req) = payload?;

    let member = state
        .folders
        .add_member(&principal, folder_id, req.user_id, req.role)
        .await?;

    Ok(Json(MemberResponse {
        message: "Member Added",
        member,
    }))
}

pub async fn change_role(
    State(state): State<AppState>,
    principal: Principal,
    Path((folder_id, user_id)): Path<(Uuid, Uuid)>,
    payload: Result<Json<ChangeRoleRequest>, JsonRejection>,
) -> ApiResult<Json<MemberResponse>> {
    let Json(req) = payload?;

    let member = state
        .folders
        .change_role(&principal, folder_id, user_id, req.role)
        .await?;

    Ok(Json(MemberResponse {
        message: "Member Updated",
        member,
    }))
}

pub async fn remove_member(
    State(state): State<AppState>,
    principal: Principal,
    Path((folder_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .folders
        .remove_member(&principal, folder_id, user_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Member Removed",
    }))
}

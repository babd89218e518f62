/// Current user endpoint
///
/// `GET /v1/users/me` returns the authenticated user's profile. The
/// password hash is never serialized.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use taskfold_shared::{auth::middleware::Principal, models::user::User};

pub async fn me(State(state): State<AppState>, principal: Principal) -> ApiResult<Json<User>> {
    let user = state
        .store
        .find_user(principal.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

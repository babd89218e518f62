/// Principal resolution for Axum
///
/// Turns an `Authorization: Bearer <jwt>` header into a [`Principal`]: the
/// token is validated, its subject is looked up in the entity store, and
/// inactive accounts are refused. The API's auth layer stores the principal
/// in the request extensions; handlers take it as an extractor.
///
/// # Example
///
/// ```no_run
/// use taskfold_shared::auth::middleware::Principal;
///
/// async fn whoami(principal: Principal) -> String {
///     principal.id.to_string()
/// }
/// ```

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use crate::error::CoreError;
use crate::models::user::User;
use crate::store::EntityStore;

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_superuser: bool,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            is_active: user.is_active,
            is_verified: user.is_verified,
            is_superuser: user.is_superuser,
        }
    }
}

/// Error type for principal resolution
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredentials,

    #[error("Expected Bearer token")]
    InvalidFormat,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),

    /// Token subject no longer exists
    #[error("Unknown user")]
    UnknownUser,

    #[error("Account is inactive")]
    Inactive,

    #[error(transparent)]
    Store(#[from] CoreError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidFormat
            | AuthError::InvalidToken(_)
            | AuthError::UnknownUser => StatusCode::UNAUTHORIZED,
            AuthError::Inactive => StatusCode::FORBIDDEN,
            AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Inactive => "forbidden",
            AuthError::Store(_) => "internal_error",
            _ => "unauthorized",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::Store(e) => {
                tracing::error!(error = %e, "Store failure during authentication");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(serde_json::json!({
            "error": self.code(),
            "message": message,
        }));

        (self.status(), body).into_response()
    }
}

/// Extracts the token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidFormat)
}

/// Validates an access token and loads the principal it names
pub async fn resolve_principal(
    store: &dyn EntityStore,
    token: &str,
    secret: &str,
) -> Result<Principal, AuthError> {
    let claims = validate_access_token(token, secret)?;

    let user = store
        .find_user(claims.sub)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    if !user.is_active {
        warn!(user_id = %user.id, "Inactive account presented a valid token");
        return Err(AuthError::Inactive);
    }

    debug!(user_id = %user.id, "Principal resolved");

    Ok(Principal::from(&user))
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .ok_or(AuthError::MissingCredentials)
    }
}

/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
/// - Token refresh
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use taskfold_shared::{
    auth::{
        jwt::{self, Claims, TokenType},
        password,
    },
    models::user::{normalize_email, CreateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token pair issued on register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// User ID
    pub user_id: Uuid,

    /// Access token
    pub access_token: String,

    /// Refresh token
    pub refresh_token: String,

    /// Always `Bearer`
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token
    pub access_token: String,

    /// Always `Bearer`
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

fn issue_access_token(state: &AppState, user_id: Uuid) -> ApiResult<String> {
    let claims = Claims::with_expiration(user_id, TokenType::Access, state.config.jwt.access_ttl());
    Ok(jwt::create_token(&claims, state.jwt_secret())?)
}

fn issue_tokens(state: &AppState, user: &User) -> ApiResult<TokenResponse> {
    let refresh_claims =
        Claims::with_expiration(user.id, TokenType::Refresh, state.config.jwt.refresh_ttl());

    Ok(TokenResponse {
        user_id: user.id,
        access_token: issue_access_token(state, user.id)?,
        refresh_token: jwt::create_token(&refresh_claims, state.jwt_secret())?,
        token_type: "Bearer".to_string(),
        expires_in: state.config.jwt.access_ttl_seconds,
    })
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "alice@example.com",
///   "password": "Tasks4ever"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "user_id": "uuid",
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "token_type": "Bearer",
///   "expires_in": 3600
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or weak password
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    password::validate_password_strength(&req.password)
        .map_err(|message| ApiError::field("password", message))?;

    let password_hash = password::hash_password(&req.password)?;

    let user = state
        .store
        .create_user(CreateUser {
            email: normalize_email(&req.email),
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(issue_tokens(&state, &user)?))
}

/// Login endpoint
///
/// Unknown email and wrong password produce the same 401.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
/// - `403 Forbidden`: Account is inactive
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .store
        .find_user_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Login with wrong password");
        return Err(invalid());
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is inactive".to_string()));
    }

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(issue_tokens(&state, &user)?))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token. The account must still
/// exist and be active.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token, or unknown user
/// - `403 Forbidden`: Account is inactive
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<RefreshResponse>> {
    let Json(req) = payload?;

    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is inactive".to_string()));
    }

    Ok(Json(RefreshResponse {
        access_token: issue_access_token(&state, user.id)?,
        token_type: "Bearer".to_string(),
        expires_in: state.config.jwt.access_ttl_seconds,
    }))
}

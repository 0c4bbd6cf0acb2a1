//! Authentication endpoints
//!
//! - `POST /v1/auth/register` - Register a new user
//! - `POST /v1/auth/login` - Login and get tokens
//! - `POST /v1/auth/refresh` - Refresh an access token
//!
//! Registration reports precise field-level failures; login deliberately
//! does not. Whatever went wrong with a login — unknown username, wrong
//! password, missing field — the response is the same
//! `400 {"error": "Invalid credentials"}`, so the endpoint cannot be used
//! to probe which usernames exist.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskwarden_shared::{
    auth::{jwt, password},
    models::{
        role::Role,
        user::{CreateUser, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Register request
///
/// The fields are `Option` so that a missing field becomes a field-keyed
/// validation error instead of a deserialization failure. Unknown extra
/// fields are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username (required, non-empty)
    #[validate(
        required(message = "This field is required."),
        length(min = 1, message = "This field may not be blank.")
    )]
    pub username: Option<String>,

    /// Password (required, non-empty; hashed before storage)
    #[validate(
        required(message = "This field is required."),
        length(min = 1, message = "This field may not be blank.")
    )]
    pub password: Option<String>,

    /// Requested role; anything outside the registry is coerced to `user`
    pub role: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Roles held after registration
    pub roles: Vec<Role>,
}

/// Login request
///
/// No validator here: a missing field is a login failure like any other
/// and must produce the uniform invalid-credentials response, never a
/// field-keyed validation error.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username
    pub username: Option<String>,

    /// Password
    pub password: Option<String>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: Uuid,

    /// Access token (24h); same value as `access_token`, kept for clients
    /// that track a single credential
    pub token: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Register a new user
///
/// Hashes the password, creates the user with its registration role, and
/// returns the created account.
///
/// # Errors
///
/// - `400` validation failure (missing/blank username or password), with
///   the failing fields as keys of the error payload
/// - `400` username already taken
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    // Guaranteed present and non-empty by validation above
    let username = req.username.unwrap_or_default();
    let raw_password = req.password.unwrap_or_default();

    // Unknown role names are coerced, not rejected: only names in the
    // registry grant anything beyond the default.
    let role = Role::coerce(req.role.as_deref());

    let password_hash = password::hash_password(&raw_password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username,
            password_hash,
            role,
        },
    )
    .await?;

    let roles = User::roles(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, "registered user");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            username: user.username,
            roles,
        }),
    ))
}

/// Login endpoint
///
/// Verifies credentials and mints a fresh access/refresh token pair.
///
/// # Errors
///
/// - `400 {"error": "Invalid credentials"}` for every failure mode
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (Some(username), Some(raw_password)) = (req.username.as_deref(), req.password.as_deref())
    else {
        return Err(ApiError::InvalidCredentials);
    };

    let user = User::verify_credentials(&state.db, username, raw_password)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    User::update_last_login(&state.db, user.id).await?;

    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse {
        user_id: user.id,
        token: access_token.clone(),
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a valid refresh token for a new access token.
///
/// # Errors
///
/// - `401` invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

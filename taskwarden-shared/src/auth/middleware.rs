//! Authentication middleware for Axum
//!
//! Extracts the `Authorization: Bearer <token>` header, validates the
//! access token, resolves the subject against the database, and stores an
//! [`Identity`] in the request extensions for handlers to pick up with
//! Axum's `Extension` extractor.
//!
//! The role set is loaded fresh per request rather than trusted from the
//! token, so grants made after login apply immediately and a deleted user's
//! still-signed tokens stop working.
//!
//! # Example
//!
//! ```no_run
//! use axum::{middleware, routing::get, Extension, Router};
//! use sqlx::PgPool;
//! use taskwarden_shared::auth::middleware::{create_bearer_middleware, Identity};
//!
//! async fn whoami(Extension(identity): Extension<Identity>) -> String {
//!     identity.username
//! }
//!
//! fn protected(pool: PgPool) -> Router {
//!     Router::new()
//!         .route("/whoami", get(whoami))
//!         .layer(middleware::from_fn(create_bearer_middleware(
//!             pool,
//!             "jwt-secret".to_string(),
//!         )))
//! }
//! ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use crate::models::role::Role;
use crate::models::user::User;

/// Authenticated caller, attached to request extensions
#[derive(Debug, Clone)]
pub struct Identity {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Username, for logging and responses
    pub username: String,

    /// Roles held at the time of this request
    pub roles: Vec<Role>,
}

impl Identity {
    /// Checks whether this identity holds a role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Error type for the authentication middleware
///
/// Every failure to present a usable token maps to 401; only database
/// faults surface as 500. The bodies use the same `{"error": ...}` shape
/// as the rest of the API.
#[derive(Debug)]
pub enum AuthError {
    /// Missing or non-Bearer authorization header
    MissingCredentials,

    /// Token failed validation (bad signature, expired, wrong type)
    InvalidToken(String),

    /// Token was valid but its subject no longer exists
    UnknownSubject,

    /// Database error while resolving the subject
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided".to_string(),
            ),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::UnknownSubject => {
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AuthError::DatabaseError(msg) => {
                tracing::error!("auth middleware database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Bearer authentication middleware
///
/// Validates the access token from the `Authorization: Bearer <token>`
/// header and attaches the resolved [`Identity`] to the request.
///
/// # Errors
///
/// Returns 401 if the header is missing or malformed, the token fails
/// signature/expiry/type checks, or the subject no longer exists; 500 for
/// database faults during resolution.
pub async fn bearer_auth_middleware(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingCredentials)?;

    let claims = validate_access_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        _ => AuthError::InvalidToken("Invalid token".to_string()),
    })?;

    let user = User::find_by_id(&pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownSubject)?;

    let roles = User::roles(&pool, user.id)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    let identity = Identity {
        user_id: user.id,
        username: user.username,
        roles,
    };
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Creates a bearer authentication middleware closure
///
/// Captures the pool and secret so the result can be handed straight to
/// `axum::middleware::from_fn`.
pub fn create_bearer_middleware(
    pool: PgPool,
    secret: String,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>
       + Clone {
    move |req, next| {
        let pool = pool.clone();
        let secret = secret.clone();
        Box::pin(bearer_auth_middleware(pool, secret, req, next))
    }
}

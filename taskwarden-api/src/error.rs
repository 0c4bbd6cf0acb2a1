//! Error handling for the API server
//!
//! A unified error type that maps the whole failure taxonomy onto HTTP
//! responses. Handlers return `Result<T, ApiError>`; conversion to status
//! codes and `{"error": ...}` bodies happens in one place.
//!
//! # Status mapping
//!
//! | Variant | Status |
//! |---|---|
//! | `Validation` | 400 |
//! | `Conflict` | 400 |
//! | `InvalidCredentials` | 400 |
//! | `Unauthenticated` | 401 |
//! | `Forbidden` | 403 |
//! | `NotFound` | 404 |
//! | `Internal` | 500 |
//!
//! Validation failures additionally surface each failing field as a
//! top-level key of the body, so a client can test for e.g. `"title"`:
//!
//! ```json
//! { "error": "Request validation failed", "title": ["This field may not be blank."] }
//! ```
//!
//! Internal details are logged and never echoed to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

use taskwarden_shared::auth::{authorization::AuthzError, jwt::JwtError, password::PasswordError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing required input (400)
    Validation(Vec<FieldError>),

    /// Duplicate unique key (400)
    Conflict(String),

    /// Login failure, deliberately undifferentiated (400)
    InvalidCredentials,

    /// Missing, invalid, or expired token (401)
    Unauthenticated(String),

    /// Authenticated but not permitted (403)
    Forbidden(String),

    /// Resource id absent (404)
    NotFound(String),

    /// Internal fault, e.g. storage connectivity (500)
    Internal(String),
}

/// A single field-level validation failure
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ApiError {
    /// Builds a validation error for a single field
    pub fn validation_field(field: &str, message: &str) -> Self {
        ApiError::Validation(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => {
                let mut body = Map::new();
                body.insert(
                    "error".to_string(),
                    Value::String("Request validation failed".to_string()),
                );
                for error in errors {
                    let entry = body
                        .entry(error.field)
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if let Some(messages) = entry.as_array_mut() {
                        messages.push(Value::String(error.message));
                    }
                }
                (StatusCode::BAD_REQUEST, Value::Object(body))
            }
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid credentials" }),
            ),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An internal error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique constraint violations are client conflicts, not faults
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("username") {
                        return ApiError::Conflict(
                            "A user with that username already exists".to_string(),
                        );
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert authorization decisions to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => ApiError::Unauthenticated(err.to_string()),
            AuthzError::Forbidden => ApiError::Forbidden(err.to_string()),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthenticated("Token expired".to_string()),
            _ => ApiError::Unauthenticated("Invalid token".to_string()),
        }
    }
}

/// Convert password hashing errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert validator failures to field-keyed validation errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let errors: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::Validation(errors)
    }
}

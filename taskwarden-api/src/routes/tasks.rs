//! Shared task collection endpoints
//!
//! - `GET    /v1/tasks`     - list shared tasks (any authenticated identity)
//! - `POST   /v1/tasks`     - create a shared task (admin only)
//! - `GET    /v1/tasks/:id` - fetch a shared task (any authenticated identity)
//! - `PUT    /v1/tasks/:id` - replace a shared task (admin only)
//! - `DELETE /v1/tasks/:id` - delete a shared task (admin only)
//!
//! Every handler follows the same order: resolve existence (404), consult
//! the authorization engine (403), validate input (400), mutate. That
//! ordering is what makes a missing id always a 404 — never a 403 — for
//! any authenticated caller.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskwarden_shared::{
    auth::authorization::{authorize, Action, TaskScope},
    auth::middleware::Identity,
    models::task::{CreateTask, Task, UpdateTask},
};
use uuid::Uuid;

/// Task create/update payload
///
/// The explicit field list is the allow-list: unknown fields in the
/// request body are dropped during deserialization and can never reach
/// storage or the response.
#[derive(Debug, Deserialize)]
pub struct TaskPayload {
    /// Title (required, non-empty after trimming)
    pub title: Option<String>,

    /// Description (optional; empty on create when omitted, unchanged on
    /// update when omitted)
    pub description: Option<String>,
}

impl TaskPayload {
    /// Validates and trims the title
    ///
    /// # Errors
    ///
    /// Returns a `title`-keyed validation error when the title is missing
    /// or blank after trimming.
    pub fn validated_title(&self) -> Result<String, ApiError> {
        match self.title.as_deref().map(str::trim) {
            None => Err(ApiError::validation_field(
                "title",
                "This field is required.",
            )),
            Some("") => Err(ApiError::validation_field(
                "title",
                "This field may not be blank.",
            )),
            Some(title) => Ok(title.to_string()),
        }
    }
}

/// Parses a path segment as a task id
///
/// A segment that is not a UUID cannot name any task, so it maps to 404
/// rather than a malformed-request error.
pub(crate) fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

/// Lists the shared task collection
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<Task>>> {
    authorize(Some(&identity), Action::List, &TaskScope::Shared)?;

    let tasks = Task::list_shared(&state.db).await?;
    Ok(Json(tasks))
}

/// Creates a shared task (admin only)
pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<TaskPayload>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    authorize(Some(&identity), Action::Create, &TaskScope::Shared)?;

    let title = payload.validated_title()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title,
            description: payload.description.unwrap_or_default(),
            owner_id: None,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, user_id = %identity.user_id, "created shared task");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetches a shared task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let task = Task::find_shared_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    authorize(Some(&identity), Action::Get, &TaskScope::Shared)?;

    Ok(Json(task))
}

/// Replaces a shared task (admin only)
pub async fn update_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(payload): Json<TaskPayload>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    Task::find_shared_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    authorize(Some(&identity), Action::Update, &TaskScope::Shared)?;

    let title = payload.validated_title()?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title,
            description: payload.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Deletes a shared task (admin only)
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_task_id(&id)?;

    Task::find_shared_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    authorize(Some(&identity), Action::Delete, &TaskScope::Shared)?;

    Task::delete(&state.db, id).await?;

    tracing::info!(task_id = %id, user_id = %identity.user_id, "deleted shared task");

    Ok(StatusCode::NO_CONTENT)
}

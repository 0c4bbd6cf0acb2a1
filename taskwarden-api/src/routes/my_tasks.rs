//! Per-owner task collection endpoints
//!
//! - `GET    /v1/my/tasks`     - list own tasks
//! - `POST   /v1/my/tasks`     - create a task owned by the caller
//! - `GET    /v1/my/tasks/:id` - fetch an owned task
//! - `PUT    /v1/my/tasks/:id` - replace an owned task
//! - `DELETE /v1/my/tasks/:id` - delete an owned task
//!
//! Ownership alone governs this collection: the authorization engine denies
//! anyone who is not the recorded owner, admins included. Existence is
//! still resolved first, so an id that names nothing is a 404 while an id
//! that names someone else's task is a 403.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use taskwarden_shared::{
    auth::authorization::{authorize, Action, TaskScope},
    auth::middleware::Identity,
    models::task::{CreateTask, Task, UpdateTask},
};

use super::tasks::{parse_task_id, TaskPayload};

/// Lists the caller's own tasks
pub async fn list_my_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<Task>>> {
    authorize(
        Some(&identity),
        Action::List,
        &TaskScope::Owned {
            owner_id: Some(identity.user_id),
        },
    )?;

    let tasks = Task::list_by_owner(&state.db, identity.user_id).await?;
    Ok(Json(tasks))
}

/// Creates a task owned by the caller
pub async fn create_my_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<TaskPayload>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    authorize(
        Some(&identity),
        Action::Create,
        &TaskScope::Owned {
            owner_id: Some(identity.user_id),
        },
    )?;

    let title = payload.validated_title()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title,
            description: payload.description.unwrap_or_default(),
            owner_id: Some(identity.user_id),
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, user_id = %identity.user_id, "created owned task");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetches one of the caller's tasks
pub async fn get_my_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    authorize(
        Some(&identity),
        Action::Get,
        &TaskScope::Owned {
            owner_id: task.owner_id,
        },
    )?;

    Ok(Json(task))
}

/// Replaces one of the caller's tasks
pub async fn update_my_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(payload): Json<TaskPayload>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    authorize(
        Some(&identity),
        Action::Update,
        &TaskScope::Owned {
            owner_id: task.owner_id,
        },
    )?;

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

/// Deletes one of the caller's tasks
pub async fn delete_my_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_task_id(&id)?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    authorize(
        Some(&identity),
        Action::Delete,
        &TaskScope::Owned {
            owner_id: task.owner_id,
        },
    )?;

    Task::delete(&state.db, id).await?;

    tracing::info!(task_id = %id, user_id = %identity.user_id, "deleted owned task");

    Ok(StatusCode::NO_CONTENT)
}

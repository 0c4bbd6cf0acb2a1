//! Task model and database operations
//!
//! Tasks are the resource the whole permission system exists to protect.
//! A task either belongs to the shared collection (`owner_id IS NULL`,
//! admin-managed, readable by every authenticated user) or to exactly one
//! owner (`owner_id = <user>`, accessible to that user alone).
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     title VARCHAR(256) NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     owner_id UUID REFERENCES users(id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Input validation (non-empty title, dropping unknown fields) happens at
//! the API layer before these operations run; this layer persists what it
//! is given and keeps `updated_at` honest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Title, non-empty after trimming
    pub title: String,

    /// Free-form description, empty string when not provided
    pub description: String,

    /// Owning user, or `None` for the shared collection
    pub owner_id: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Title (already validated and trimmed)
    pub title: String,

    /// Description, defaults to empty
    pub description: String,

    /// Owner, or `None` for the shared collection
    pub owner_id: Option<Uuid>,
}

/// Input for updating a task
///
/// The title is always replaced (updates revalidate it like creates do);
/// a `None` description leaves the stored description unchanged.
#[derive(Debug, Clone)]
pub struct UpdateTask {
    /// New title (already validated and trimmed)
    pub title: String,

    /// New description, or `None` to keep the current one
    pub description: Option<String>,
}

impl Task {
    /// Creates a task and returns the persisted entity
    ///
    /// The ID and both timestamps are server-assigned.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, owner_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID regardless of collection
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, owner_id, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID within the shared collection
    ///
    /// An owned task looked up through here is `None`: it is not part of
    /// the shared collection, so the shared endpoints report it absent.
    pub async fn find_shared_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, owner_id, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND owner_id IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists the shared collection, oldest first
    pub async fn list_shared(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, owner_id, created_at, updated_at
            FROM tasks
            WHERE owner_id IS NULL
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists a user's own tasks, oldest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, owner_id, created_at, updated_at
            FROM tasks
            WHERE owner_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task and returns the persisted entity
    ///
    /// Refreshes `updated_at`. Returns `None` if the task does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2,
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// Returns true if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

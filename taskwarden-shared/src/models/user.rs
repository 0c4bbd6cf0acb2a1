//! User model and database operations
//!
//! Users are the authentication principals of TaskWarden. Passwords are
//! stored as Argon2id hashes, never in plaintext, and role membership lives
//! in the `user_roles` join table (see [`crate::models::role`]).
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     username VARCHAR(150) NOT NULL UNIQUE,
//!     password_hash VARCHAR(255) NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     last_login_at TIMESTAMPTZ
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use taskwarden_shared::models::role::Role;
//! use taskwarden_shared::models::user::{CreateUser, User};
//! use taskwarden_shared::auth::password::hash_password;
//! # use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let user = User::create(
//!     &pool,
//!     CreateUser {
//!         username: "alice".to_string(),
//!         password_hash: hash_password("pw1")?,
//!         role: Role::User,
//!     },
//! )
//! .await?;
//!
//! // Later: credential check
//! let verified = User::verify_credentials(&pool, "alice", "pw1").await?;
//! assert!(verified.is_some());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password;
use crate::models::role::Role;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Username, unique across all users
    pub username: String,

    /// Argon2id password hash (PHC string format)
    ///
    /// Never store plaintext passwords.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
///
/// The password must already be hashed; this layer never sees raw passwords.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Username (unique)
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Role assigned at registration
    pub role: Role,
}

impl User {
    /// Creates a new user with its registration role
    ///
    /// The user row and its role membership are inserted in one transaction
    /// so a user can never exist without a role.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The username already exists (unique constraint violation)
    /// - The role registry has not been seeded
    /// - The database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            "#,
        )
        .bind(user.id)
        .bind(data.role.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at, updated_at, last_login_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Verifies a username/password pair
    ///
    /// Returns the user on success and `None` on any mismatch. An unknown
    /// username and a wrong password are deliberately indistinguishable to
    /// callers: both collapse to `None`, and the Argon2 comparison itself is
    /// constant-time. A stored hash that fails to parse also collapses to
    /// `None` rather than surfacing a distinguishable error.
    ///
    /// # Errors
    ///
    /// Returns an error only for database faults.
    pub async fn verify_credentials(
        pool: &PgPool,
        username: &str,
        raw_password: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(user) = Self::find_by_username(pool, username).await? else {
            return Ok(None);
        };

        match password::verify_password(raw_password, &user.password_hash) {
            Ok(true) => Ok(Some(user)),
            _ => Ok(None),
        }
    }

    /// Grants a role to a user
    ///
    /// Idempotent: granting a role the user already holds is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the database fails.
    pub async fn add_role(pool: &PgPool, user_id: Uuid, role: Role) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists the roles a user holds
    ///
    /// Role names outside the registered set are skipped; the database is
    /// seeded only with registry names, so in practice nothing is dropped.
    pub async fn roles(pool: &PgPool, user_id: Uuid) -> Result<Vec<Role>, sqlx::Error> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(names.iter().filter_map(|n| Role::parse(n)).collect())
    }

    /// Checks whether a user holds a role
    pub async fn has_role(pool: &PgPool, user_id: Uuid, role: Role) -> Result<bool, sqlx::Error> {
        let held: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_roles ur
                JOIN roles r ON r.id = ur.role_id
                WHERE ur.user_id = $1 AND r.name = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .fetch_one(pool)
        .await?;

        Ok(held)
    }

    /// Updates the last login timestamp
    ///
    /// Called after successful authentication.
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }

    // Database-backed operations are exercised by the API integration tests.
}

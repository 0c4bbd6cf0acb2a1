//! Role registry and membership roles
//!
//! TaskWarden has a fixed set of roles used for access control decisions:
//!
//! - **admin**: full CRUD over the shared task collection
//! - **user**: read-only on shared tasks, full CRUD on own tasks
//!
//! The set is mirrored by a `roles` table so that membership rows can
//! reference it, and is seeded once at startup by [`Role::ensure_exist`].
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE roles (
//!     id SERIAL PRIMARY KEY,
//!     name VARCHAR(50) NOT NULL UNIQUE
//! );
//!
//! CREATE TABLE user_roles (
//!     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
//!     PRIMARY KEY (user_id, role_id)
//! );
//! ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Access-control roles
///
/// Every user holds exactly one of these at registration time (default
/// `user`); additional roles may be granted later via `User::add_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full CRUD over the shared task collection
    Admin,

    /// Read-only on shared tasks, full CRUD on own tasks
    User,
}

impl Role {
    /// Converts the role to its database/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Parses a role name, returning `None` for anything outside the
    /// registered set
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Resolves a requested role name to a role
    ///
    /// An absent, unknown, or otherwise invalid request is coerced to
    /// [`Role::User`] rather than rejected. This is the documented
    /// registration policy: only names in the registry grant anything else.
    pub fn coerce(requested: Option<&str>) -> Self {
        requested.and_then(Role::parse).unwrap_or(Role::User)
    }

    /// Seeds the role registry
    ///
    /// Creates the `admin` and `user` rows if absent. Idempotent: calling
    /// this against an already-seeded database is a no-op, so it is safe to
    /// run unconditionally at every process start.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use taskwarden_shared::models::role::Role;
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// Role::ensure_exist(&pool).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn ensure_exist(pool: &PgPool) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO roles (name)
            VALUES ('admin'), ('user')
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(created = result.rows_affected(), "seeded role registry");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::parse(Role::Admin.as_str()), Some(Role::Admin));
        assert_eq!(Role::parse(Role::User.as_str()), Some(Role::User));
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_coerce_valid_role() {
        assert_eq!(Role::coerce(Some("admin")), Role::Admin);
        assert_eq!(Role::coerce(Some("user")), Role::User);
    }

    #[test]
    fn test_coerce_defaults_to_user() {
        assert_eq!(Role::coerce(None), Role::User);
        assert_eq!(Role::coerce(Some("root")), Role::User);
        assert_eq!(Role::coerce(Some("")), Role::User);
    }

    #[test]
    fn test_serde_names_match_registry() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");

        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }
}

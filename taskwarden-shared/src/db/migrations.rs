//! Database migration runner
//!
//! Migrations live in the `migrations/` directory at the workspace root and
//! are embedded into the binary with `sqlx::migrate!`, so deployments never
//! depend on loose SQL files. Running them is idempotent: already-applied
//! migrations are skipped.

use sqlx::PgPool;
use tracing::info;

/// Runs all pending migrations
///
/// # Errors
///
/// Returns an error if a migration fails or the database is unreachable.
///
/// # Example
///
/// ```no_run
/// use taskwarden_shared::db::migrations::run_migrations;
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../migrations").run(pool).await?;
    info!("database migrations up to date");
    Ok(())
}

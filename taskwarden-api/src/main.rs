//! # TaskWarden API Server
//!
//! A small multi-tenant task-list API with role-based access control and
//! token-based authentication.
//!
//! ## Startup sequence
//!
//! 1. Initialize tracing
//! 2. Load configuration from the environment
//! 3. Create the database pool and run migrations
//! 4. Seed the role registry (idempotent)
//! 5. Build the router and serve
//!
//! Role seeding is an explicit startup step, not a side effect of anything
//! else, so a fresh database becomes serviceable without manual setup.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskwarden \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p taskwarden-api
//! ```

use taskwarden_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskwarden_shared::{
    db::{migrations::run_migrations, pool::create_pool},
    models::role::Role,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskwarden_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskWarden API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(config.database.clone()).await?;
    run_migrations(&pool).await?;
    Role::ensure_exist(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

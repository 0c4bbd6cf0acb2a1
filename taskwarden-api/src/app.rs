//! Application state and router builder
//!
//! Defines the shared application state and assembles the Axum router with
//! all routes and middleware. Protected route groups sit behind a single
//! bearer-auth layer; there are no per-handler authentication checks.
//!
//! # Route tree
//!
//! ```text
//! /
//! ├── /health                    # Liveness probe (public)
//! └── /v1/
//!     ├── /auth/                 # Public
//!     │   ├── POST /register
//!     │   ├── POST /login
//!     │   └── POST /refresh
//!     ├── /tasks/                # Shared collection (authenticated)
//!     │   ├── GET  /             # any identity
//!     │   ├── POST /             # admin only
//!     │   └── GET|PUT|DELETE /:id
//!     └── /my/tasks/             # Per-owner collection (authenticated)
//!         ├── GET|POST /
//!         └── GET|PUT|DELETE /:id
//! ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskwarden_shared::auth::middleware::{bearer_auth_middleware, AuthError};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Liveness probe (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Shared task collection (requires bearer token; writes are admin-only,
    // enforced by the authorization engine inside each handler)
    let shared_task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    // Per-owner task collection (requires bearer token; ownership enforced
    // by the authorization engine inside each handler)
    let my_task_routes = Router::new()
        .route(
            "/",
            get(routes::my_tasks::list_my_tasks).post(routes::my_tasks::create_my_task),
        )
        .route(
            "/:id",
            get(routes::my_tasks::get_my_task)
                .put(routes::my_tasks::update_my_task)
                .delete(routes::my_tasks::delete_my_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", shared_task_routes)
        .nest("/my/tasks", my_task_routes);

    // Configure CORS based on environment
    let cors = if state
        .config
        .api
        .cors_origins
        .contains(&"*".to_string())
    {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware layer
///
/// Delegates to the shared middleware, which validates the access token and
/// attaches the resolved `Identity` to the request.
async fn auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    bearer_auth_middleware(state.db.clone(), state.jwt_secret().to_string(), req, next).await
}

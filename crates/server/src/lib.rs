//! Happy Thoughts Server Library
//!
//! REST API for posting short "thoughts", with opaque-token auth and a
//! duplicate-safe like ledger backed by SQLite.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use auth::{middleware::mw_require_auth, AuthManager};
use config::{AppState, Config};
use handlers::{
    create_thought, delete_thought, edit_thought, get_thought, like_thought, liked_thoughts,
    list_thoughts, login, signup,
};
use store::ThoughtStore;

/// Build the full application router over the given state.
///
/// Routes that need an identity sit behind the auth middleware; everything
/// else is public.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/thoughts", post(create_thought))
        .route("/thoughts/liked", get(liked_thoughts))
        .route("/thoughts/{id}", delete(delete_thought))
        .route("/thoughts/{id}/like", patch(like_thought))
        .route("/thoughts/{id}/edit", patch(edit_thought))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw_require_auth,
        ));

    Router::new()
        .route("/", get(root))
        .route("/users/signup", post(signup))
        .route("/users/login", post(login))
        .route("/thoughts", get(list_thoughts))
        .route("/thoughts/{id}", get(get_thought))
        .merge(protected)
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Open the pool and initialize both stores.
pub async fn init_state(database_url: &str) -> anyhow::Result<AppState> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    let auth = Arc::new(AuthManager::new(pool.clone()).await?);
    let thoughts = Arc::new(ThoughtStore::new(pool).await?);

    Ok(AppState { auth, thoughts })
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    let config = Config::from_env();
    info!("=== Happy Thoughts Server ===");
    info!("Database: {}", config.database_url);

    let state = init_state(&config.database_url).await?;
    info!("Auth Manager initialized");
    info!("Thought Store initialized");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// GET / — welcome document listing the mounted endpoints.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the Happy Thoughts API",
        "endpoints": [
            { "methods": ["POST"], "path": "/users/signup" },
            { "methods": ["POST"], "path": "/users/login" },
            { "methods": ["GET", "POST"], "path": "/thoughts" },
            { "methods": ["GET"], "path": "/thoughts/liked" },
            { "methods": ["GET", "DELETE"], "path": "/thoughts/{id}" },
            { "methods": ["PATCH"], "path": "/thoughts/{id}/like" },
            { "methods": ["PATCH"], "path": "/thoughts/{id}/edit" },
        ],
    }))
}

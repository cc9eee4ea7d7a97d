//! Card Access Control Service - Main Application Entry Point
//!
//! This is the central service of a physical access-control deployment. Door readers query it to decide whether a presented card should unlock, fetch per-card keys, and provision new cards; the administrative console authenticates through its session-cookie gate.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: SQLite with sqlx (async queries)
//! - **Reader Authentication**: static per-device API keys
//! - **Admin Authentication**: in-memory session cache with sliding expiry
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Seed the bootstrap admin if configured and the table is empty
//! 5. Start the session cache and its background sweeper
//! 6. Build HTTP router with routes and middleware
//! 7. Serve until ctrl-c, then stop the sweeper and close the pool

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod password;
mod services;
mod session;
mod state;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::session::SessionCache;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // Seed the first admin so a fresh deployment can log in
    if let (Some(username), Some(password)) = (
        &config.bootstrap_admin_username,
        &config.bootstrap_admin_password,
    ) {
        if db::ensure_bootstrap_admin(&pool, username, password).await? {
            tracing::info!(username = %username, "bootstrap admin created");
        }
    }

    // Start the session cache and its background sweeper
    let sessions = Arc::new(SessionCache::new(Duration::from_secs(
        config.session_ttl_secs,
    )));
    let sweeper_cancel = CancellationToken::new();
    let sweeper = tokio::spawn(session::run_sweeper(
        Arc::clone(&sessions),
        Duration::from_secs(config.sweep_interval_secs),
        sweeper_cancel.clone(),
    ));

    let state = AppState {
        pool: pool.clone(),
        sessions,
    };

    let app = build_router(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Serve HTTP requests until a shutdown signal arrives
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Teardown order: stop the sweeper first, then close the store
    sweeper_cancel.cancel();
    let _ = sweeper.await;
    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Assemble the full route table.
fn build_router(state: AppState) -> Router {
    // Session-gated console routes
    let session_routes = Router::new()
        .route("/admin", get(handlers::admin::home))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_session,
        ));

    // Routes that additionally need the adminTab privilege. The layer
    // added last sits outermost, so require_session still runs first.
    let admin_tab_routes = Router::new()
        .route("/admin/admins", get(handlers::admin::admins_home))
        .route_layer(axum_middleware::from_fn(
            middleware::auth::require_admin_tab,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_session,
        ));

    Router::new()
        // Public routes
        .route("/", get(handlers::admin::root))
        .route("/health", get(handlers::health::health_check))
        .route(
            "/admin/login",
            get(handlers::admin::login_page).post(handlers::admin::login),
        )
        .route("/admin/logout", get(handlers::admin::logout))
        // Reader-facing API; authentication is the apiKey in each body
        .route("/api/request/verify", post(handlers::requests::verify))
        .route("/api/request/key", post(handlers::requests::issue_key))
        .route("/api/request/addCard", post(handlers::requests::add_card))
        .merge(session_routes)
        .merge(admin_tab_routes)
        // Request tracing for observability
        .layer(TraceLayer::new_for_http())
        // Share state with all handlers via State extraction
        .with_state(state)
}

/// Resolves when the process receives ctrl-c.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}

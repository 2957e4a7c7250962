//! Helpdesk API - support-request intake and triage service.
//!
//! # Architecture
//!
//! - Axum web framework
//! - `PostgreSQL` for users and applications (sqlx, migrations applied at
//!   startup)
//! - JWT bearer authentication with role-gated routes
//! - Lifecycle notifications over SMTP, or captured to local files in
//!   non-production environments

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use helpdesk_api::config::AppConfig;
use helpdesk_api::db::{self, PgApplicationStore, PgUserStore};
use helpdesk_api::routes;
use helpdesk_api::services::notifier;
use helpdesk_api::services::token::TokenService;
use helpdesk_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "helpdesk_api=info,tower_http=debug".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Initialize database connection pool and apply migrations
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database pool created, migrations applied");

    // Wire the stores, token service, and configured notifier
    let tokens = TokenService::new(&config.auth.token_secret, config.auth.token_ttl_secs);
    let notifier = notifier::from_config(&config.email).expect("Failed to build notifier");
    let state = AppState::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgApplicationStore::new(pool.clone())),
        tokens,
        notifier,
        Some(pool),
    );

    // Build router
    let app = routes::app(&state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    status = tracing::field::Empty,
                    latency_ms = tracing::field::Empty,
                )
            })
            .on_response(
                |response: &axum::http::Response<_>, latency: std::time::Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record("latency_ms", u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
                    DefaultOnResponse::default().on_response(response, latency, span);
                },
            ),
    );

    // Start server
    let addr = config.socket_addr();
    tracing::info!("helpdesk listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

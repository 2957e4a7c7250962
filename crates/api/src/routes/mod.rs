//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check (public)
//! GET    /health/ready         - Readiness check (public)
//!
//! # Auth (public)
//! POST   /api/auth/signup      - Register and sign in
//! POST   /api/auth/signin      - Sign in
//!
//! # Requests
//! POST   /api/requests         - Submit an application (user or admin)
//! GET    /api/requests         - List applications (admin)
//! GET    /api/requests/{id}    - Fetch one application (admin)
//! PATCH  /api/requests/{id}    - Resolve an application (admin)
//! DELETE /api/requests/{id}    - Delete an application (admin)
//! ```
//!
//! Every route group carries its [`AccessPolicy`] record; the guard
//! middleware enforces it before any handler runs.

pub mod auth;
pub mod requests;

use axum::{
    Extension, Router, middleware,
    routing::{get, post},
};

use helpdesk_core::Role;

use crate::middleware::auth::{AccessPolicy, access_guard};
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: &AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/api/auth/signup", post(auth::sign_up))
        .route("/api/auth/signin", post(auth::sign_in))
        .route_layer(middleware::from_fn_with_state(state.clone(), access_guard))
        .route_layer(Extension(AccessPolicy::PUBLIC));

    let submit = Router::new()
        .route("/api/requests", post(requests::submit))
        .route_layer(middleware::from_fn_with_state(state.clone(), access_guard))
        .route_layer(Extension(AccessPolicy::roles(&[Role::Admin, Role::User])));

    let admin = Router::new()
        .route("/api/requests", get(requests::list))
        .route(
            "/api/requests/{id}",
            get(requests::get_by_id)
                .patch(requests::resolve)
                .delete(requests::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), access_guard))
        .route_layer(Extension(AccessPolicy::ADMIN_ONLY));

    public
        .merge(submit)
        .merge(admin)
        .with_state(state.clone())
}

mod health {
    use axum::{extract::State, http::StatusCode};

    use crate::state::AppState;

    /// Liveness health check endpoint.
    pub async fn health() -> &'static str {
        "ok"
    }

    /// Readiness health check endpoint.
    ///
    /// Verifies database connectivity when the process runs against
    /// `PostgreSQL`; memory-backed deployments are always ready.
    pub async fn readiness(State(state): State<AppState>) -> StatusCode {
        match state.pool() {
            Some(pool) => match sqlx::query("SELECT 1").fetch_one(pool).await {
                Ok(_) => StatusCode::OK,
                Err(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            None => StatusCode::OK,
        }
    }
}

//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use helpdesk_core::{Email, Role};

use crate::error::ApiError;
use crate::services::auth::Session;
use crate::state::AppState;

/// Sign-up request body.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Sign-in request body.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Register a new account and return its first session.
///
/// # Errors
///
/// `400` for malformed input, `409` when the email is already registered.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let email = parse_email(&body.email)?;
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".to_owned()));
    }
    if body.password.is_empty() {
        return Err(ApiError::Validation("password must not be empty".to_owned()));
    }

    let session = state
        .auth()
        .sign_up(&body.name, email, &body.password, body.role)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Authenticate an existing account.
///
/// # Errors
///
/// `404` when no account matches the email, `401` for a bad password.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<Session>, ApiError> {
    let email = parse_email(&body.email)?;
    let session = state.auth().sign_in(&email, &body.password).await?;
    Ok(Json(session))
}

fn parse_email(raw: &str) -> Result<Email, ApiError> {
    Email::parse(raw).map_err(|e| ApiError::Validation(e.to_string()))
}

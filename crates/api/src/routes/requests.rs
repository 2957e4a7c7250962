//! Support request route handlers.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use helpdesk_core::ApplicationId;

use crate::error::ApiError;
use crate::middleware::auth::CurrentUser;
use crate::models::{Application, ApplicationFilter};
use crate::state::AppState;

/// Submission request body. The submitter's name and email come from the
/// authenticated principal, not the body.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub message: String,
}

/// Resolution request body.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// List applications, optionally filtered by status and ordered by
/// `updated_at`.
///
/// # Errors
///
/// `400` for a filter value outside its enumerated set.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Application>>, ApiError> {
    let filter = ApplicationFilter::from_query(&params)?;
    let applications = state.applications().list(&filter).await?;
    Ok(Json(applications))
}

/// Fetch a single application.
///
/// # Errors
///
/// `404` when the ID is unknown.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<Application>, ApiError> {
    let application = state.applications().get(id).await?;
    Ok(Json(application))
}

/// Submit a new application on behalf of the authenticated principal.
///
/// # Errors
///
/// `400` for an empty message.
pub async fn submit(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<Application>), ApiError> {
    if body.message.trim().is_empty() {
        return Err(ApiError::Validation("message must not be empty".to_owned()));
    }

    let application = state
        .applications()
        .submit(principal.name, principal.email, body.message)
        .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

/// Resolve an active application.
///
/// # Errors
///
/// `400` when the status value is not exactly `"resolved"`, when the
/// comment is empty, or when the application was already resolved; `404`
/// for an unknown ID.
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
    Json(body): Json<ResolveRequest>,
) -> Result<Json<Application>, ApiError> {
    if body.status != "resolved" {
        return Err(ApiError::Validation(
            "status must be \"resolved\" (case-sensitive)".to_owned(),
        ));
    }

    let comment = body.comment.unwrap_or_default();
    let application = state.applications().resolve(id, &comment).await?;
    Ok(Json(application))
}

/// Delete an application, returning the removed record.
///
/// # Errors
///
/// `404` when the ID is unknown.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<Application>, ApiError> {
    let application = state.applications().delete(id).await?;
    Ok(Json(application))
}

//! Integration test harness for Helpdesk.
//!
//! Assembles the real router over the in-memory stores and the capture
//! notifier, then drives it request-by-request through `tower`. Captured
//! notification artifacts land in a per-context temp directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p helpdesk-integration-tests
//! ```

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use helpdesk_api::db::{MemoryApplicationStore, MemoryUserStore};
use helpdesk_api::routes;
use helpdesk_api::services::notifier::CaptureNotifier;
use helpdesk_api::services::token::TokenService;
use helpdesk_api::state::AppState;

/// Signing secret for test tokens.
const TEST_TOKEN_SECRET: &str = "vN8v1vJ4vQ2pX9aR5tY7uW3eK6mD0sF1";

/// One assembled application under test.
pub struct TestContext {
    app: Router,
    mail_dir: TempDir,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Build a fresh application over empty in-memory stores.
    ///
    /// # Panics
    ///
    /// Panics if the capture directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let mail_dir = tempfile::tempdir().expect("failed to create capture directory");

        let tokens = TokenService::new(&SecretString::from(TEST_TOKEN_SECRET), 3600);
        let state = AppState::new(
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemoryApplicationStore::default()),
            tokens,
            Arc::new(CaptureNotifier::new(mail_dir.path())),
            None,
        );

        Self {
            app: routes::app(&state),
            mail_dir,
        }
    }

    /// Root of the capture notifier's artifact tree.
    #[must_use]
    pub fn mail_dir(&self) -> &Path {
        self.mail_dir.path()
    }

    /// Capture artifact filenames for one template kind, e.g.
    /// `"ApplicationReceived"`.
    ///
    /// # Panics
    ///
    /// Panics on filesystem errors other than a missing directory.
    #[must_use]
    pub fn artifacts(&self, kind: &str) -> Vec<String> {
        let dir = self.mail_dir.path().join(kind);
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        entries
            .map(|entry| {
                entry
                    .expect("failed to read capture directory entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    /// Send one request and return the status plus parsed JSON body
    /// (`Value::Null` for an empty body, `Value::String` for a non-JSON
    /// body such as the health check's).
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the response cannot be
    /// read.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, value)
    }

    /// Register an account, returning the raw response.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
        });
        if let Some(role) = role {
            body["role"] = Value::String(role.to_owned());
        }
        self.request("POST", "/api/auth/signup", None, Some(&body))
            .await
    }

    /// Register an account and return its bearer token.
    ///
    /// # Panics
    ///
    /// Panics if sign-up does not succeed.
    pub async fn token_for(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> String {
        let (status, body) = self.sign_up(name, email, password, role).await;
        assert_eq!(status, StatusCode::CREATED, "sign-up failed: {body}");
        body["access_token"]
            .as_str()
            .expect("sign-up response carries access_token")
            .to_owned()
    }
}

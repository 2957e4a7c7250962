//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{ApplicationStore, UserStore};
use crate::services::applications::ApplicationService;
use crate::services::auth::AuthService;
use crate::services::notifier::Notifier;
use crate::services::token::TokenService;

/// Application state shared across all handlers.
///
/// Holds the injected store and notifier implementations; which variant
/// backs each seam is decided once at bootstrap (or by the test harness).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    users: Arc<dyn UserStore>,
    applications: Arc<dyn ApplicationStore>,
    tokens: TokenService,
    notifier: Arc<dyn Notifier>,
    /// Present only when the process runs against `PostgreSQL`; used by the
    /// readiness probe.
    pool: Option<PgPool>,
}

impl AppState {
    /// Assemble the state from its collaborators.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        applications: Arc<dyn ApplicationStore>,
        tokens: TokenService,
        notifier: Arc<dyn Notifier>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                users,
                applications,
                tokens,
                notifier,
                pool,
            }),
        }
    }

    /// The credential service.
    #[must_use]
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.inner.users.clone(), self.inner.tokens.clone())
    }

    /// The application lifecycle manager.
    #[must_use]
    pub fn applications(&self) -> ApplicationService {
        ApplicationService::new(
            self.inner.applications.clone(),
            self.inner.notifier.clone(),
        )
    }

    /// The token service, consulted by the guard chain.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// The database pool, if this process runs against `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}

//! Persistence interfaces and their implementations.
//!
//! The services consume the [`UserStore`] and [`ApplicationStore`] traits
//! only; which implementation backs them is decided once at bootstrap.
//!
//! # Tables
//!
//! - `users` - Registered accounts (email unique)
//! - `applications` - Support applications and their lifecycle state
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and are applied at startup
//! via `sqlx::migrate!`.

pub mod applications;
pub mod memory;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use applications::{ApplicationStore, PgApplicationStore};
pub use memory::{MemoryApplicationStore, MemoryUserStore};
pub use users::{PgUserStore, UserStore};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

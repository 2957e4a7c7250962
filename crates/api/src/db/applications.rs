//! Application store: trait and `PostgreSQL` implementation.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use helpdesk_core::{ApplicationId, ApplicationStatus, Email};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{Application, ApplicationFilter, NewApplication, SortOrder};

/// CRUD + filtered-query interface for support applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Insert a new application with status `active`.
    async fn insert(&self, application: NewApplication) -> Result<Application, RepositoryError>;

    /// Fetch an application by ID.
    async fn get(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;

    /// List applications matching the filter, in store-natural order unless
    /// the filter requests `updated_at` ordering.
    async fn list(&self, filter: &ApplicationFilter) -> Result<Vec<Application>, RepositoryError>;

    /// Atomically transition an application from `active` to `resolved`.
    ///
    /// The update is conditional on the current status still being
    /// `active`; `None` means no row transitioned (the ID is unknown or the
    /// application was already resolved). This closes the concurrent
    /// double-resolve race: of two racing calls, exactly one observes a row.
    async fn resolve(
        &self,
        id: ApplicationId,
        comment: &str,
    ) -> Result<Option<Application>, RepositoryError>;

    /// Delete an application, returning the removed record.
    async fn delete(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
}

/// Internal row type for `PostgreSQL` application queries.
#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: i32,
    name: String,
    email: String,
    message: String,
    status: String,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = RepositoryError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let status = ApplicationStatus::from_str(&row.status).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        Ok(Self {
            id: ApplicationId::new(row.id),
            name: row.name,
            email,
            message: row.message,
            status,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const APPLICATION_COLUMNS: &str =
    "id, name, email, message, status, comment, created_at, updated_at";

/// `PostgreSQL`-backed application store.
#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, application: NewApplication) -> Result<Application, RepositoryError> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "INSERT INTO applications (name, email, message)
             VALUES ($1, $2, $3)
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(&application.name)
        .bind(application.email.as_str())
        .bind(&application.message)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, filter: &ApplicationFilter) -> Result<Vec<Application>, RepositoryError> {
        let mut sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications");
        if filter.status.is_some() {
            sql.push_str(" WHERE status = $1");
        }
        match filter.order_by_date {
            Some(SortOrder::Asc) => sql.push_str(" ORDER BY updated_at ASC"),
            Some(SortOrder::Desc) => sql.push_str(" ORDER BY updated_at DESC"),
            None => {}
        }

        let mut query = sqlx::query_as::<_, ApplicationRow>(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status.to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn resolve(
        &self,
        id: ApplicationId,
        comment: &str,
    ) -> Result<Option<Application>, RepositoryError> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "UPDATE applications
             SET status = 'resolved', comment = $2, updated_at = now()
             WHERE id = $1 AND status = 'active'
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(comment)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "DELETE FROM applications WHERE id = $1 RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

//! Support application domain types and list filtering.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use helpdesk_core::{ApplicationId, ApplicationStatus, Email};

/// A support application (domain type).
///
/// Created on submission with status `active`; mutated exactly once in its
/// lifetime, when an administrator resolves it with a comment.
#[derive(Debug, Clone, Serialize)]
pub struct Application {
    /// Unique, store-assigned application ID.
    pub id: ApplicationId,
    /// Name of the submitter, snapshotted from the authenticated principal.
    pub name: String,
    /// Email of the submitter; notification destination.
    pub email: Email,
    /// The free-text request.
    pub message: String,
    /// Lifecycle status.
    pub status: ApplicationStatus,
    /// Admin comment, set only on resolution.
    pub comment: Option<String>,
    /// When the application was submitted.
    pub created_at: DateTime<Utc>,
    /// When the application was last updated (resolution timestamp once
    /// resolved).
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for the application store.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub name: String,
    pub email: Email,
    pub message: String,
}

/// Sort direction for `updated_at` ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Errors produced when parsing list query parameters.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("status must be \"active\" or \"resolved\" (case-sensitive)")]
    InvalidStatus,
    #[error("orderByDate must be \"asc\" or \"desc\" (case-sensitive)")]
    InvalidOrder,
}

/// Composable list filters for applications.
///
/// Absent filters impose no constraint and no explicit order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationFilter {
    /// Restrict to a single lifecycle status.
    pub status: Option<ApplicationStatus>,
    /// Order by `updated_at`.
    pub order_by_date: Option<SortOrder>,
}

impl ApplicationFilter {
    /// Parse the filter from raw query parameters.
    ///
    /// Recognized keys are `status` and `orderByDate`; both values are
    /// case-sensitive. Unrecognized keys are ignored, not rejected.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] when a recognized key carries a value
    /// outside its enumerated set.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, FilterError> {
        let mut filter = Self::default();

        for (key, value) in params {
            match key.as_str() {
                "status" => {
                    filter.status =
                        Some(value.parse().map_err(|_| FilterError::InvalidStatus)?);
                }
                "orderByDate" => {
                    filter.order_by_date = Some(match value.as_str() {
                        "asc" => SortOrder::Asc,
                        "desc" => SortOrder::Desc,
                        _ => return Err(FilterError::InvalidOrder),
                    });
                }
                // Unknown parameters are ignored.
                _ => {}
            }
        }

        Ok(filter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_empty_query_is_unconstrained() {
        let filter = ApplicationFilter::from_query(&HashMap::new()).unwrap();
        assert!(filter.status.is_none());
        assert!(filter.order_by_date.is_none());
    }

    #[test]
    fn test_status_values() {
        let filter = ApplicationFilter::from_query(&query(&[("status", "active")])).unwrap();
        assert_eq!(filter.status, Some(ApplicationStatus::Active));

        let filter = ApplicationFilter::from_query(&query(&[("status", "resolved")])).unwrap();
        assert_eq!(filter.status, Some(ApplicationStatus::Resolved));
    }

    #[test]
    fn test_invalid_status_rejected() {
        let result = ApplicationFilter::from_query(&query(&[("status", "bogus")]));
        assert!(matches!(result, Err(FilterError::InvalidStatus)));

        // Case-sensitive, like the enumerated wire values.
        let result = ApplicationFilter::from_query(&query(&[("status", "Active")]));
        assert!(matches!(result, Err(FilterError::InvalidStatus)));
    }

    #[test]
    fn test_order_values() {
        let filter =
            ApplicationFilter::from_query(&query(&[("orderByDate", "asc")])).unwrap();
        assert_eq!(filter.order_by_date, Some(SortOrder::Asc));

        let result = ApplicationFilter::from_query(&query(&[("orderByDate", "ASC")]));
        assert!(matches!(result, Err(FilterError::InvalidOrder)));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let filter =
            ApplicationFilter::from_query(&query(&[("page", "3"), ("status", "active")]))
                .unwrap();
        assert_eq!(filter.status, Some(ApplicationStatus::Active));
    }

    #[test]
    fn test_filters_compose() {
        let filter = ApplicationFilter::from_query(&query(&[
            ("status", "resolved"),
            ("orderByDate", "desc"),
        ]))
        .unwrap();
        assert_eq!(filter.status, Some(ApplicationStatus::Resolved));
        assert_eq!(filter.order_by_date, Some(SortOrder::Desc));
    }
}

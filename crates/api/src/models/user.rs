//! User account domain types.

use chrono::{DateTime, Utc};

use helpdesk_core::{Email, Role, UserId};

/// A registered account (domain type).
///
/// The password hash never crosses the service boundary; only the
/// public-safe [`Principal`](super::Principal) projection is serialized
/// into responses and tokens.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique, store-assigned user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, the unique authentication key.
    pub email: Email,
    /// Salted one-way digest of the account password.
    pub password_hash: String,
    /// Role, fixed at sign-up.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the user store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
}

//! Request identity attached by the guard chain.

use serde::{Deserialize, Serialize};

use helpdesk_core::{Email, Role, UserId};

use super::User;

/// The identity attached to a request after successful authentication.
///
/// This is the public-safe projection of a [`User`]: it carries no
/// password material and doubles as the `user` payload returned by the
/// auth endpoints. It lives in request extensions for the duration of one
/// request and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The user's database ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Role evaluated by the authorization step.
    pub role: Role,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

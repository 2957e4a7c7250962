//! Credential service: sign-up and sign-in orchestration.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use helpdesk_core::{Email, Role};

use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, Principal};
use crate::services::password::{HashError, hash_password, verify_password};
use crate::services::token::{TokenError, TokenService};

/// Errors surfaced by the credential service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// An account with this email already exists.
    #[error("email already exists")]
    EmailTaken,
    /// No account matches the email.
    #[error("invalid user")]
    UnknownUser,
    /// Password verification failed.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Successful authentication result: a bearer token plus the public-safe
/// user payload it was issued for.
#[derive(Debug, Serialize)]
pub struct Session {
    pub access_token: String,
    pub user: Principal,
}

/// Orchestrates sign-up and sign-in over the user store, the password
/// hasher, and the token service.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    /// Create a new credential service.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Register a new account and immediately sign it in.
    ///
    /// Delegating to [`sign_in`](Self::sign_in) with the original plaintext
    /// keeps payload construction and token issuance on one code path and
    /// guarantees the fresh account is immediately usable.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] when an account with this email
    /// already exists (checked up front, and again by the store's unique
    /// constraint for concurrent sign-ups).
    pub async fn sign_up(
        &self,
        name: &str,
        email: Email,
        password: &str,
        role: Option<Role>,
    ) -> Result<Session, AuthError> {
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(password)?;
        self.users
            .insert(NewUser {
                name: name.to_owned(),
                email: email.clone(),
                password_hash,
                role: role.unwrap_or(Role::User),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Store(other),
            })?;

        self.sign_in(&email, password).await
    }

    /// Authenticate an existing account and issue a token.
    ///
    /// The plaintext password is dropped as soon as verification completes;
    /// it is never logged or persisted.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownUser`] when no account matches the email
    /// and [`AuthError::InvalidCredentials`] when the password does not
    /// verify against the stored digest.
    pub async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let principal = Principal::from(&user);
        let access_token = self.tokens.issue(&principal)?;

        Ok(Session {
            access_token,
            user: principal,
        })
    }
}

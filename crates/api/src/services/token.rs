//! Signed, time-limited identity tokens.
//!
//! Tokens are stateless: there is no server-side session and no revocation
//! list. Validity is determined entirely by the HMAC signature and the
//! embedded expiry, so a token stays valid for its full lifetime even if
//! the account changes afterwards.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use helpdesk_core::{Email, Role, UserId};

use crate::models::Principal;

/// Claims embedded in an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's database ID.
    pub sub: i32,
    /// Display name at issuance time.
    pub name: String,
    /// Email at issuance time.
    pub email: String,
    /// Role at issuance time.
    pub role: Role,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

impl Claims {
    fn into_principal(self) -> Option<Principal> {
        Some(Principal {
            id: UserId::new(self.sub),
            name: self.name,
            email: Email::parse(&self.email).ok()?,
            role: self.role,
        })
    }
}

/// Errors from token issuance and verification.
///
/// Verification failures are collapsed into the single [`Invalid`] variant
/// so callers cannot distinguish a bad signature from an expired token.
///
/// [`Invalid`]: TokenError::Invalid
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token is malformed, carries a bad signature, or has expired.
    #[error("invalid or expired token")]
    Invalid,
    /// Signing failed while issuing a token.
    #[error("failed to sign token")]
    Signing,
}

/// Issues and verifies HS256-signed identity tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the shared signing secret and a
    /// time-to-live in seconds.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_secs: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Issue a token for the given principal.
    ///
    /// The claims snapshot the principal's identity at issuance time and
    /// carry an expiry of now + TTL.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.id.as_i32(),
            name: principal.name.clone(),
            email: principal.email.to_string(),
            role: principal.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|_| TokenError::Signing)
    }

    /// Verify a token and return the embedded principal.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for malformed tokens, signature
    /// mismatches, and expired tokens alike.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| TokenError::Invalid)?;

        data.claims.into_principal().ok_or(TokenError::Invalid)
    }
}

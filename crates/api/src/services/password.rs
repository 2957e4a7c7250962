//! Password hashing with Argon2.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Hashing failed. Carries no detail; the input never appears in errors.
#[derive(Debug, Error)]
#[error("failed to hash password")]
pub struct HashError;

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
///
/// Returns [`HashError`] if the hasher rejects its parameters; this does
/// not depend on the input value.
pub fn hash_password(plain: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| HashError)
}

/// Verify a plaintext password against a stored digest.
///
/// Returns `false` on mismatch and on a malformed digest; verification
/// never errors for user-supplied input.
#[must_use]
pub fn verify_password(plain: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let digest = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &digest));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let digest = hash_password("correct horse battery staple").unwrap();
        assert!(!verify_password("Tr0ub4dor&3", &digest));
    }

    #[test]
    fn test_malformed_digest_rejected_without_panic() {
        assert!(!verify_password("anything", "not-a-digest"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same input").unwrap();
        let second = hash_password("same input").unwrap();
        assert_ne!(first, second);
    }
}

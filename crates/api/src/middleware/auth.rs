//! Access-control guard chain.
//!
//! Each route group carries an explicit [`AccessPolicy`] record attached
//! at registration time; the [`access_guard`] middleware consults it per
//! request in a fixed order: public bypass, then bearer authentication,
//! then the role check. A missing or invalid token short-circuits before
//! any role evaluation. On success the decoded [`Principal`] is attached
//! to the request for downstream handlers and discarded with it.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use helpdesk_core::Role;

use crate::error::ApiError;
use crate::models::Principal;
use crate::services::token::TokenService;
use crate::state::AppState;

/// Per-operation access policy, attached to a route group when the router
/// is built.
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    /// Public operations skip authentication entirely.
    pub public: bool,
    /// Roles allowed through the authorization step. An empty set admits
    /// any authenticated principal.
    pub allowed_roles: &'static [Role],
}

impl AccessPolicy {
    /// No authentication required.
    pub const PUBLIC: Self = Self {
        public: true,
        allowed_roles: &[],
    };

    /// Any authenticated principal.
    pub const AUTHENTICATED: Self = Self {
        public: false,
        allowed_roles: &[],
    };

    /// Administrators only.
    pub const ADMIN_ONLY: Self = Self {
        public: false,
        allowed_roles: &[Role::Admin],
    };

    /// Restrict to an explicit role set.
    #[must_use]
    pub const fn roles(allowed: &'static [Role]) -> Self {
        Self {
            public: false,
            allowed_roles: allowed,
        }
    }
}

/// Evaluate the guard chain for one request.
///
/// Returns the authenticated principal, or `None` when the policy is
/// public.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for a missing or invalid bearer
/// token and [`ApiError::Forbidden`] when the principal's role is outside
/// the policy's role set.
pub fn evaluate(
    policy: &AccessPolicy,
    authorization: Option<&str>,
    tokens: &TokenService,
) -> Result<Option<Principal>, ApiError> {
    if policy.public {
        return Ok(None);
    }

    let token = authorization
        .and_then(bearer_token)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_owned()))?;

    let principal = tokens
        .verify(token)
        .map_err(|_| ApiError::Unauthorized("invalid or expired token".to_owned()))?;

    if !policy.allowed_roles.is_empty() && !policy.allowed_roles.contains(&principal.role) {
        return Err(ApiError::Forbidden(
            "insufficient role for this operation".to_owned(),
        ));
    }

    Ok(Some(principal))
}

/// Extract the token from a `Bearer <token>` authorization header value.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware enforcing the [`AccessPolicy`] attached to the matched
/// route group.
///
/// Routes mounted without an explicit policy are treated as requiring
/// authentication.
///
/// # Errors
///
/// Rejects the request with the [`ApiError`] produced by [`evaluate`].
pub async fn access_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let policy = request
        .extensions()
        .get::<AccessPolicy>()
        .copied()
        .unwrap_or(AccessPolicy::AUTHENTICATED);

    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if let Some(principal) = evaluate(&policy, authorization, state.tokens())? {
        request.extensions_mut().insert(principal);
    }

    Ok(next.run(request).await)
}

/// Extractor for the authenticated principal attached by [`access_guard`].
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(principal): CurrentUser) -> String {
///     format!("Hello, {}!", principal.name)
/// }
/// ```
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Self)
            .ok_or_else(|| ApiError::Unauthorized("authentication required".to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use helpdesk_core::{Email, UserId};
    use secrecy::SecretString;

    fn tokens() -> TokenService {
        TokenService::new(
            &SecretString::from("vN8v1vJ4vQ2pX9aR5tY7uW3eK6mD0sF1"),
            3600,
        )
    }

    fn bearer_for(role: Role, tokens: &TokenService) -> String {
        let principal = Principal {
            id: UserId::new(1),
            name: "Ada".to_owned(),
            email: Email::parse("ada@x.com").unwrap(),
            role,
        };
        format!("Bearer {}", tokens.issue(&principal).unwrap())
    }

    #[test]
    fn test_public_bypasses_authentication() {
        let result = evaluate(&AccessPolicy::PUBLIC, None, &tokens()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_missing_header_unauthorized() {
        let result = evaluate(&AccessPolicy::AUTHENTICATED, None, &tokens());
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_wrong_scheme_unauthorized() {
        let result = evaluate(
            &AccessPolicy::AUTHENTICATED,
            Some("Basic dXNlcjpwYXNz"),
            &tokens(),
        );
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_invalid_token_unauthorized() {
        let result = evaluate(
            &AccessPolicy::AUTHENTICATED,
            Some("Bearer garbage"),
            &tokens(),
        );
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_authenticated_principal_attached() {
        let tokens = tokens();
        let header = bearer_for(Role::User, &tokens);

        let principal = evaluate(&AccessPolicy::AUTHENTICATED, Some(&header), &tokens)
            .unwrap()
            .unwrap();
        assert_eq!(principal.role, Role::User);
    }

    #[test]
    fn test_role_outside_policy_forbidden() {
        let tokens = tokens();
        let header = bearer_for(Role::User, &tokens);

        let result = evaluate(&AccessPolicy::ADMIN_ONLY, Some(&header), &tokens);
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_admin_passes_admin_policy() {
        let tokens = tokens();
        let header = bearer_for(Role::Admin, &tokens);

        let principal = evaluate(&AccessPolicy::ADMIN_ONLY, Some(&header), &tokens)
            .unwrap()
            .unwrap();
        assert_eq!(principal.role, Role::Admin);
    }

    #[test]
    fn test_empty_role_set_admits_any_role() {
        let tokens = tokens();
        for role in [Role::User, Role::Admin] {
            let header = bearer_for(role, &tokens);
            let principal = evaluate(&AccessPolicy::AUTHENTICATED, Some(&header), &tokens)
                .unwrap()
                .unwrap();
            assert_eq!(principal.role, role);
        }
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("Token abc"), None);
    }
}

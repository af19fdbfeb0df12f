//! Auth Middleware and Guard Predicates
//!
//! The guard is an explicit pair of steps, composed per route:
//! 1. [`AuthUser::from_bearer`] turns the Authorization header into
//!    validated claims (401 when absent or invalid)
//! 2. `require_*` predicates check the claims against the route's
//!    requirement (403 when insufficient)
//!
//! The predicates are pure functions over already-validated claims; when
//! ownership is not in the claims (creator-scoped resources) the handler
//! resolves the owner first and then calls the predicate.

use axum::http::{HeaderMap, header};
use kernel::id::UserId;

use crate::application::tokens::TokenIssuer;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Validated claims of the calling user
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub role: UserRole,
    /// Unique id of the access token (for audit logging)
    pub token_id: String,
}

impl AuthUser {
    /// Extract and validate the bearer token from request headers
    pub fn from_bearer(headers: &HeaderMap, issuer: &TokenIssuer) -> AuthResult<Self> {
        let token = bearer_token(headers).ok_or(AuthError::Unauthenticated)?;

        let claims = issuer.decode_access_token(token)?;

        Ok(Self {
            user_id: claims.user_id()?,
            role: claims.role,
            token_id: claims.jti,
        })
    }

    /// Fail with `Forbidden` unless the caller holds `role`
    pub fn require_role(&self, role: UserRole) -> AuthResult<()> {
        if self.role == role || self.role.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }

    /// Fail with `Forbidden` unless the caller owns the resource or holds `role`
    pub fn require_owner_or_role(&self, owner_id: &UserId, role: UserRole) -> AuthResult<()> {
        if self.user_id == *owner_id {
            return Ok(());
        }
        self.require_role(role)
    }
}

/// Pull the raw token out of `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{refresh_token::RefreshToken, user::User};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::AuthResult;
use kernel::id::UserId;
use uuid::Uuid;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Find user by user name
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Find the user holding an outstanding verification token
    async fn find_by_verification_token(&self, token: Uuid) -> AuthResult<Option<User>>;

    /// Check if email is taken
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Check if user name is taken
    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;

    /// Update user
    async fn update(&self, user: &User) -> AuthResult<()>;
}

/// Refresh token ledger trait
///
/// The ledger is the only cross-request session state; all operations go
/// through the database so multiple server instances stay consistent.
#[trait_variant::make(RefreshTokenRepository: Send)]
pub trait LocalRefreshTokenRepository {
    /// Persist a freshly issued token row
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Look up a token row by its opaque value
    async fn find_by_value(&self, token_value: &str) -> AuthResult<Option<RefreshToken>>;

    /// Atomically claim a still-active, unexpired token for rotation.
    ///
    /// Returns `true` for exactly one caller when concurrent rotations race
    /// on the same token value; every other caller gets `false` and must
    /// treat the token as revoked. The row-level conditional update is the
    /// serialization point, not an in-process lock.
    async fn claim_for_rotation(&self, token_value: &str) -> AuthResult<bool>;

    /// Revoke a single token (logout, expiry detection)
    async fn revoke(&self, token_value: &str) -> AuthResult<()>;

    /// Revoke every token of a user (logout-everywhere, password change)
    async fn revoke_all_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    /// Delete rows whose expiry has passed (startup housekeeping)
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

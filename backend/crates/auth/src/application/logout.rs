//! Logout Use Case
//!
//! Revokes refresh tokens; access tokens simply age out.

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::repository::RefreshTokenRepository;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<R>
where
    R: RefreshTokenRepository,
{
    token_repo: Arc<R>,
}

impl<R> LogoutUseCase<R>
where
    R: RefreshTokenRepository,
{
    pub fn new(token_repo: Arc<R>) -> Self {
        Self { token_repo }
    }

    /// Revoke the presented refresh token (single device)
    pub async fn execute(&self, token_value: &str) -> AuthResult<()> {
        self.token_repo.revoke(token_value).await
    }

    /// Revoke every refresh token of the user (logout everywhere)
    pub async fn execute_all(&self, user_id: &UserId) -> AuthResult<u64> {
        let revoked = self.token_repo.revoke_all_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "Revoked all sessions");
        Ok(revoked)
    }
}

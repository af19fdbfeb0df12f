//! Refresh Session Use Case
//!
//! Exchanges a refresh token for a new access/refresh pair. Every
//! successful exchange revokes the presented token, so a stolen token
//! that is replayed after the legitimate rotation deterministically hits
//! the revoked branch.

use std::sync::Arc;

use crate::application::tokens::{IssuedAccessToken, TokenIssuer};
use crate::domain::entity::refresh_token::RefreshToken;
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Refresh output
pub struct RefreshOutput {
    pub access: IssuedAccessToken,
    pub refresh: RefreshToken,
}

/// Refresh session use case
pub struct RefreshSessionUseCase<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<R>,
    issuer: Arc<TokenIssuer>,
}

impl<U, R> RefreshSessionUseCase<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<R>, issuer: Arc<TokenIssuer>) -> Self {
        Self {
            user_repo,
            token_repo,
            issuer,
        }
    }

    pub async fn execute(&self, token_value: &str) -> AuthResult<RefreshOutput> {
        if token_value.is_empty() {
            return Err(AuthError::InvalidInput(
                "Refresh token is missing".to_string(),
            ));
        }

        let presented = self
            .token_repo
            .find_by_value(token_value)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)?;

        if presented.is_expired() {
            // Terminal transition; also covers rows that expired while revoked
            self.token_repo.revoke(token_value).await?;
            return Err(AuthError::TokenExpired);
        }

        if presented.revoked {
            return Err(AuthError::TokenRevoked);
        }

        // Exactly one concurrent caller wins this claim; the loser sees the
        // row already revoked and fails like any other replay
        if !self.token_repo.claim_for_rotation(token_value).await? {
            return Err(AuthError::TokenRevoked);
        }

        let user = self
            .user_repo
            .find_by_id(&presented.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let refresh = RefreshToken::issue(user.user_id, TokenIssuer::issue_refresh_value());
        self.token_repo.create(&refresh).await?;

        let access = self.issuer.issue_access_token(&user.user_id, user.role)?;

        tracing::debug!(
            user_id = %user.user_id,
            old_token_id = %presented.id,
            new_token_id = %refresh.id,
            "Refresh token rotated"
        );

        Ok(RefreshOutput { access, refresh })
    }
}

//! Login Use Case
//!
//! Verifies credentials and opens a session: a short-lived access token
//! plus a persisted refresh token.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::tokens::{IssuedAccessToken, TokenIssuer};
use crate::domain::entity::{refresh_token::RefreshToken, user::User};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login output
pub struct LoginOutput {
    pub access: IssuedAccessToken,
    pub refresh: RefreshToken,
    pub user: User,
}

/// Login use case
pub struct LoginUseCase<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<R>,
    issuer: Arc<TokenIssuer>,
}

impl<U, R> LoginUseCase<U, R>
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

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        // A malformed email cannot match an account; report it the same way
        // as a wrong password to avoid an enumeration oracle
        let email = Email::new(input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password = ClearTextPassword::for_verification(input.password)
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        if !user.password_hash.verify(&password) {
            return Err(AuthError::InvalidCredentials);
        }

        // Unverified accounts cannot open sessions
        if !user.is_verified {
            return Err(AuthError::AccountNotVerified);
        }

        let access = self.issuer.issue_access_token(&user.user_id, user.role)?;

        let refresh = RefreshToken::issue(user.user_id, TokenIssuer::issue_refresh_value());
        self.token_repo.create(&refresh).await?;

        tracing::info!(
            user_id = %user.user_id,
            refresh_token_id = %refresh.id,
            "User logged in"
        );

        Ok(LoginOutput {
            access,
            refresh,
            user,
        })
    }
}

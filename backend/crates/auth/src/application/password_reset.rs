//! Password Reset Use Case
//!
//! Forgot-password issues a reset token over mail; reset replaces the
//! credential wholesale and closes every open session.

use std::sync::Arc;

use platform::mailer::Mailer;
use platform::password::ClearTextPassword;
use uuid::Uuid;

use crate::application::verification::{ConsumeOutcome, VerificationUseCase};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{email::Email, verification::VerificationPurpose};
use crate::error::{AuthError, AuthResult};

/// Password reset use case
pub struct PasswordResetUseCase<U, R, M>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    M: Mailer,
{
    user_repo: Arc<U>,
    token_repo: Arc<R>,
    mailer: Arc<M>,
}

impl<U, R, M> PasswordResetUseCase<U, R, M>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    M: Mailer,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<R>, mailer: Arc<M>) -> Self {
        Self {
            user_repo,
            token_repo,
            mailer,
        }
    }

    /// Issue a reset token and mail it
    pub async fn forgot(&self, email: &str) -> AuthResult<bool> {
        let email = Email::new(email).map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        let mut user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let verification = user.issue_verification(VerificationPurpose::ResetPassword);
        self.user_repo.update(&user).await?;

        let mail_sent = match self
            .mailer
            .send(
                user.email.as_str(),
                "Reset your password",
                &reset_mail_body(&user.first_name, &verification.token.to_string()),
            )
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user.user_id, "Reset mail failed");
                false
            }
        };

        Ok(mail_sent)
    }

    /// Consume a reset token and install the new credential
    ///
    /// Revokes every refresh token of the user: a password change must
    /// close sessions opened with the old credential.
    pub async fn reset(&self, token: Uuid, new_password: String) -> AuthResult<()> {
        // Validate the replacement before consuming the single-use token
        let password = ClearTextPassword::new(new_password)?;
        let new_hash = password.hash()?;

        let consume = VerificationUseCase::new(self.user_repo.clone(), self.mailer.clone());
        let (mut user, outcome) = consume
            .consume(token, VerificationPurpose::ResetPassword)
            .await?;

        if outcome == ConsumeOutcome::Expired {
            return Err(AuthError::VerificationExpired);
        }

        user.replace_password(new_hash);
        self.user_repo.update(&user).await?;

        let revoked = self.token_repo.revoke_all_for_user(&user.user_id).await?;

        tracing::info!(
            user_id = %user.user_id,
            sessions_revoked = revoked,
            "Password reset completed"
        );

        Ok(())
    }
}

fn reset_mail_body(first_name: &str, token: &str) -> String {
    format!(
        "<p>Hi {first_name},</p>\
         <p>Use this code to reset your password. It expires in one hour.</p>\
         <p><strong>{token}</strong></p>\
         <p>If you did not request this, you can ignore this mail.</p>"
    )
}

//! Email Verification Use Case
//!
//! Consumes verification tokens for the verify-account flow and re-issues
//! them on resend. Tokens are single use: any consumption, valid or
//! expired, clears the fields so the same value cannot be replayed.

use std::sync::Arc;

use platform::mailer::Mailer;
use uuid::Uuid;

use crate::application::register::verification_mail_body;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, verification::VerificationPurpose};
use crate::error::{AuthError, AuthResult};

/// Result of consuming a verification token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Valid,
    /// The token matched but was past its expiry. The resolved user is
    /// still returned so the caller can offer a resend without asking the
    /// user to re-identify.
    Expired,
}

/// Email verification use case
pub struct VerificationUseCase<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
}

impl<U, M> VerificationUseCase<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    pub fn new(user_repo: Arc<U>, mailer: Arc<M>) -> Self {
        Self { user_repo, mailer }
    }

    /// Consume a token issued for `purpose`
    ///
    /// A token issued for a different purpose behaves as if it did not
    /// exist: a reset link must not verify an account and vice versa.
    /// The token fields are cleared on both outcomes.
    pub async fn consume(
        &self,
        token: Uuid,
        purpose: VerificationPurpose,
    ) -> AuthResult<(User, ConsumeOutcome)> {
        let mut user = self
            .user_repo
            .find_by_verification_token(token)
            .await?
            .ok_or(AuthError::VerificationNotFound)?;

        let outstanding = user
            .verification
            .clone()
            .ok_or(AuthError::VerificationNotFound)?;

        if outstanding.purpose != purpose {
            return Err(AuthError::VerificationNotFound);
        }

        let outcome = if outstanding.is_expired() {
            ConsumeOutcome::Expired
        } else {
            ConsumeOutcome::Valid
        };

        user.clear_verification();
        if outcome == ConsumeOutcome::Valid && purpose == VerificationPurpose::VerifyEmail {
            user.mark_verified();
        }
        self.user_repo.update(&user).await?;

        Ok((user, outcome))
    }

    /// Verify an account from its emailed token
    pub async fn verify_email(&self, token: Uuid) -> AuthResult<User> {
        let (user, outcome) = self
            .consume(token, VerificationPurpose::VerifyEmail)
            .await?;

        match outcome {
            ConsumeOutcome::Valid => {
                tracing::info!(user_id = %user.user_id, "Account verified");
                Ok(user)
            }
            ConsumeOutcome::Expired => Err(AuthError::VerificationExpired),
        }
    }

    /// Re-issue the verification token for an unverified account
    ///
    /// Issuing overwrites the outstanding token, so any previously mailed
    /// link stops working.
    pub async fn resend(&self, email: &str) -> AuthResult<bool> {
        let email = Email::new(email).map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        let mut user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_verified {
            return Err(AuthError::InvalidInput(
                "Account is already verified".to_string(),
            ));
        }

        let verification = user.issue_verification(VerificationPurpose::VerifyEmail);
        self.user_repo.update(&user).await?;

        let mail_sent = match self
            .mailer
            .send(
                user.email.as_str(),
                "Verify your account",
                &verification_mail_body(&user.first_name, &verification.token.to_string()),
            )
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user.user_id, "Verification mail failed");
                false
            }
        };

        Ok(mail_sent)
    }
}

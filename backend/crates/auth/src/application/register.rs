//! Register Use Case
//!
//! Creates a new user account and starts email verification.

use std::sync::Arc;

use platform::mailer::Mailer;
use platform::password::ClearTextPassword;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_name::UserName, verification::VerificationPurpose,
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Register output
pub struct RegisterOutput {
    pub user: User,
    /// False when the verification mail could not be delivered; the account
    /// still exists and the caller is told to use resend
    pub mail_sent: bool,
}

/// Register use case
pub struct RegisterUseCase<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
}

impl<U, M> RegisterUseCase<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    pub fn new(user_repo: Arc<U>, mailer: Arc<M>) -> Self {
        Self { user_repo, mailer }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let email =
            Email::new(input.email).map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        let user_name =
            UserName::new(input.user_name).map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
            return Err(AuthError::InvalidInput(
                "First name and last name are required".to_string(),
            ));
        }

        // Uniqueness checks; the unique indexes remain the backstop for
        // concurrent registrations
        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.user_repo.exists_by_user_name(&user_name).await? {
            return Err(AuthError::UserNameTaken);
        }

        let password = ClearTextPassword::new(input.password)?;
        let password_hash = password.hash()?;

        let mut user = User::new(
            email,
            user_name,
            input.first_name.trim().to_string(),
            input.last_name.trim().to_string(),
            password_hash,
        );
        let verification = user.issue_verification(VerificationPurpose::VerifyEmail);

        self.user_repo.create(&user).await?;

        // Mail failure must not roll back the account; surface it instead
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

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User registered"
        );

        Ok(RegisterOutput { user, mail_sent })
    }
}

pub(crate) fn verification_mail_body(first_name: &str, token: &str) -> String {
    format!(
        "<p>Hi {first_name},</p>\
         <p>Use this code to verify your account. It expires in one hour.</p>\
         <p><strong>{token}</strong></p>"
    )
}

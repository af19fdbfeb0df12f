//! User Entity
//!
//! The user aggregate: profile, credential, and the embedded verification
//! token. The credential is immutable except through the password-reset
//! flow, where it is replaced wholesale.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;

use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_role::UserRole,
    verification::{VerificationPurpose, VerificationToken},
};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Email (unique, login identifier)
    pub email: Email,
    /// User name (unique, public handle)
    pub user_name: UserName,
    pub first_name: String,
    pub last_name: String,
    /// Argon2id PHC string; replaced wholesale on reset
    pub password_hash: HashedPassword,
    /// Role claim minted into access tokens
    pub role: UserRole,
    /// Set once the email verification token is consumed
    pub is_verified: bool,
    /// At most one outstanding verification token
    pub verification: Option<VerificationToken>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new unverified user
    pub fn new(
        email: Email,
        user_name: UserName,
        first_name: String,
        last_name: String,
        password_hash: HashedPassword,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            user_name,
            first_name,
            last_name,
            password_hash,
            role: UserRole::default(),
            is_verified: false,
            verification: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Issue a verification token, overwriting any outstanding one
    pub fn issue_verification(&mut self, purpose: VerificationPurpose) -> VerificationToken {
        let token = VerificationToken::issue(purpose);
        self.verification = Some(token.clone());
        self.updated_at = Utc::now();
        token
    }

    /// Clear the verification token fields (single use: any consumption,
    /// valid or expired, clears them)
    pub fn clear_verification(&mut self) {
        self.verification = None;
        self.updated_at = Utc::now();
    }

    /// Mark the email as verified
    pub fn mark_verified(&mut self) {
        self.is_verified = true;
        self.updated_at = Utc::now();
    }

    /// Replace the credential (password-reset flow only)
    pub fn replace_password(&mut self, new_hash: HashedPassword) {
        self.password_hash = new_hash;
        self.updated_at = Utc::now();
    }

    /// Promote or demote the user
    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::ClearTextPassword;

    fn sample_user() -> User {
        let password = ClearTextPassword::new("CorrectHorseBattery9".to_string()).unwrap();
        User::new(
            Email::new("alice@example.com").unwrap(),
            UserName::new("alice").unwrap(),
            "Alice".to_string(),
            "Artfan".to_string(),
            password.hash().unwrap(),
        )
    }

    #[test]
    fn test_new_user_is_unverified() {
        let user = sample_user();
        assert!(!user.is_verified);
        assert!(user.verification.is_none());
        assert_eq!(user.role, UserRole::User);
    }

    #[test]
    fn test_issue_verification_overwrites() {
        let mut user = sample_user();
        let first = user.issue_verification(VerificationPurpose::VerifyEmail);
        let second = user.issue_verification(VerificationPurpose::ResetPassword);

        assert_ne!(first.token, second.token);
        let outstanding = user.verification.as_ref().unwrap();
        assert_eq!(outstanding.token, second.token);
        assert_eq!(outstanding.purpose, VerificationPurpose::ResetPassword);
    }

    #[test]
    fn test_consume_clears_token() {
        let mut user = sample_user();
        user.issue_verification(VerificationPurpose::VerifyEmail);
        user.mark_verified();
        user.clear_verification();

        assert!(user.is_verified);
        assert!(user.verification.is_none());
    }
}

//! Verification Token Value Object
//!
//! A short-lived random token embedded on the user record, used for email
//! verification and password reset. At most one token is outstanding per
//! user; issuing a new one overwrites the previous one. Tokens are tagged
//! with the purpose they were issued for, and a token issued for one
//! purpose is invisible to the other flow.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Verification token lifetime
pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 1;

/// What a verification token was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum VerificationPurpose {
    VerifyEmail = 0,
    ResetPassword = 1,
}

impl VerificationPurpose {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(VerificationPurpose::VerifyEmail),
            1 => Some(VerificationPurpose::ResetPassword),
            _ => None,
        }
    }
}

/// Outstanding verification token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationToken {
    /// Random 128-bit identifier
    pub token: Uuid,
    /// Hard expiry, 1 hour after issuance
    pub expires_at: DateTime<Utc>,
    /// Flow the token belongs to
    pub purpose: VerificationPurpose,
}

impl VerificationToken {
    /// Issue a fresh token for the given purpose
    pub fn issue(purpose: VerificationPurpose) -> Self {
        Self {
            token: Uuid::new_v4(),
            expires_at: Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS),
            purpose,
        }
    }

    /// Check if the token is past its expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_not_expired() {
        let token = VerificationToken::issue(VerificationPurpose::VerifyEmail);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_stale_token_is_expired() {
        let token = VerificationToken {
            token: Uuid::new_v4(),
            expires_at: Utc::now() - Duration::minutes(1),
            purpose: VerificationPurpose::ResetPassword,
        };
        assert!(token.is_expired());
    }

    #[test]
    fn test_purpose_roundtrip() {
        for purpose in [
            VerificationPurpose::VerifyEmail,
            VerificationPurpose::ResetPassword,
        ] {
            assert_eq!(VerificationPurpose::from_id(purpose.id()), Some(purpose));
        }
        assert_eq!(VerificationPurpose::from_id(7), None);
    }

    #[test]
    fn test_issue_generates_distinct_tokens() {
        let a = VerificationToken::issue(VerificationPurpose::VerifyEmail);
        let b = VerificationToken::issue(VerificationPurpose::VerifyEmail);
        assert_ne!(a.token, b.token);
    }
}

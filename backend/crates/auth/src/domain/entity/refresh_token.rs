//! Refresh Token Entity
//!
//! One row per issuance. Rotation never updates a row's token value in
//! place: the presented row is flipped to revoked and a brand-new row is
//! inserted, preserving an audit trail of the whole issuance chain.
//!
//! State machine per row: Active -> {Rotated, Revoked, Expired}, all
//! terminal. Expiry is derived from `expires_at`; revocation is stored.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{RefreshTokenId, UserId};

/// Refresh token lifetime
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Refresh token ledger row
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: RefreshTokenId,
    /// Opaque random value (256 bits, base64); pure lookup key
    pub token: String,
    pub user_id: UserId,
    /// Hard expiry, 7 days after issuance
    pub expires_at: DateTime<Utc>,
    /// Set on rotation, logout and logout-everywhere
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Issue a new active token row for a user
    pub fn issue(user_id: UserId, token_value: String) -> Self {
        let now = Utc::now();
        Self {
            id: RefreshTokenId::new(),
            token: token_value,
            user_id,
            expires_at: now + Duration::days(REFRESH_TOKEN_TTL_DAYS),
            revoked: false,
            created_at: now,
        }
    }

    /// Check if the token is past its expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// An active token is neither revoked nor expired
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_active() {
        let token = RefreshToken::issue(UserId::new(), "opaque-value".to_string());
        assert!(token.is_active());
        assert!(!token.is_expired());
        assert!(!token.revoked);
    }

    #[test]
    fn test_expired_token_is_not_active() {
        let mut token = RefreshToken::issue(UserId::new(), "opaque-value".to_string());
        token.expires_at = Utc::now() - Duration::seconds(1);
        assert!(token.is_expired());
        assert!(!token.is_active());
    }

    #[test]
    fn test_revoked_token_is_not_active() {
        let mut token = RefreshToken::issue(UserId::new(), "opaque-value".to_string());
        token.revoked = true;
        assert!(!token.is_active());
        // Revocation does not make it expired
        assert!(!token.is_expired());
    }

    #[test]
    fn test_expiry_is_seven_days_out() {
        let token = RefreshToken::issue(UserId::new(), "opaque-value".to_string());
        let delta = token.expires_at - token.created_at;
        assert_eq!(delta.num_days(), REFRESH_TOKEN_TTL_DAYS);
    }
}

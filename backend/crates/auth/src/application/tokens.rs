//! Token Issuer
//!
//! Mints the two credentials of a session:
//! - access tokens: short-lived HS256 JWTs with registered claims, never
//!   stored server-side; validity is purely signature + expiry
//! - refresh tokens: 256 bits of OS randomness, base64-encoded, carrying
//!   no structure; only ever a lookup key into the refresh-token ledger

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Entropy of a refresh token in bytes (256 bits)
const REFRESH_TOKEN_BYTES: usize = 32;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: user id
    pub sub: String,
    /// Unique token id
    pub jti: String,
    /// Role claim
    pub role: UserRole,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

impl AccessClaims {
    /// Parse the subject claim back into a user id
    pub fn user_id(&self) -> AuthResult<UserId> {
        self.sub
            .parse::<UserId>()
            .map_err(|_| AuthError::Unauthenticated)
    }
}

/// A freshly minted access token with its expiry
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and validates access tokens, generates refresh token values
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&config.jwt_secret),
            decoding_key: DecodingKey::from_secret(&config.jwt_secret),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            ttl: Duration::seconds(config.access_token_ttl_secs()),
        }
    }

    /// Mint a signed access token for a user
    ///
    /// A signing failure is fatal for the request, not retryable: it means
    /// the key material is misconfigured.
    pub fn issue_access_token(
        &self,
        user_id: &UserId,
        role: UserRole,
    ) -> AuthResult<IssuedAccessToken> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = AccessClaims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::TokenIssue)?;

        Ok(IssuedAccessToken { token, expires_at })
    }

    /// Validate signature, expiry, issuer and audience of an access token
    pub fn decode_access_token(&self, token: &str) -> AuthResult<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::Unauthenticated)
    }

    /// Generate an opaque refresh token value
    pub fn issue_refresh_value() -> String {
        platform::crypto::random_token_b64(REFRESH_TOKEN_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig::with_random_secret())
    }

    #[test]
    fn test_issue_and_decode_roundtrip() {
        let issuer = issuer();
        let user_id = UserId::new();

        let issued = issuer
            .issue_access_token(&user_id, UserRole::Creator)
            .unwrap();
        let claims = issuer.decode_access_token(&issued.token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.role, UserRole::Creator);
        assert_eq!(claims.iss, "funding-api");
        assert_eq!(claims.aud, "funding-clients");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_jti_is_unique_per_token() {
        let issuer = issuer();
        let user_id = UserId::new();

        let a = issuer.issue_access_token(&user_id, UserRole::User).unwrap();
        let b = issuer.issue_access_token(&user_id, UserRole::User).unwrap();

        let claims_a = issuer.decode_access_token(&a.token).unwrap();
        let claims_b = issuer.decode_access_token(&b.token).unwrap();
        assert_ne!(claims_a.jti, claims_b.jti);
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let issuer_a = issuer();
        let issuer_b = issuer();
        let user_id = UserId::new();

        let issued = issuer_a
            .issue_access_token(&user_id, UserRole::User)
            .unwrap();

        assert!(matches!(
            issuer_b.decode_access_token(&issued.token),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let config = AuthConfig::with_random_secret();
        let minting = TokenIssuer::new(&config);

        let mut other = config.clone();
        other.jwt_audience = "some-other-service".to_string();
        let validating = TokenIssuer::new(&other);

        let issued = minting
            .issue_access_token(&UserId::new(), UserRole::User)
            .unwrap();

        assert!(matches!(
            validating.decode_access_token(&issued.token),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            issuer().decode_access_token("not.a.jwt"),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn test_refresh_values_are_opaque_and_unique() {
        let a = TokenIssuer::issue_refresh_value();
        let b = TokenIssuer::issue_refresh_value();
        assert_ne!(a, b);
        // 32 bytes of entropy -> 44 base64 chars
        assert_eq!(a.len(), 44);
    }
}

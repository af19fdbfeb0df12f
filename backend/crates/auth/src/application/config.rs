//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// Re-export cookie types from platform
pub use platform::cookie::{CookieConfig, SameSite};

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing key for access tokens (32 bytes)
    pub jwt_secret: Vec<u8>,
    /// `iss` claim minted into and required from access tokens
    pub jwt_issuer: String,
    /// `aud` claim minted into and required from access tokens
    pub jwt_audience: String,
    /// Access token TTL. Deliberately short: an access token cannot be
    /// revoked before expiry, session continuity comes from refresh
    /// rotation instead.
    pub access_token_ttl: Duration,
    /// Cookie carrying the refresh token. Cross-site capable because the
    /// frontend runs on a different origin.
    pub refresh_cookie: CookieConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: vec![0u8; 32],
            jwt_issuer: "funding-api".to_string(),
            jwt_audience: "funding-clients".to_string(),
            access_token_ttl: Duration::from_secs(15 * 60), // 15 minutes
            refresh_cookie: CookieConfig {
                name: "refreshToken".to_string(),
                secure: true,
                http_only: true,
                same_site: SameSite::None,
                path: "/".to_string(),
            },
        }
    }
}

impl AuthConfig {
    /// Create config with a random signing key (for development)
    pub fn with_random_secret() -> Self {
        Self {
            jwt_secret: platform::crypto::random_bytes(32),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        let mut config = Self::with_random_secret();
        config.refresh_cookie.secure = false;
        config
    }

    /// Access token TTL in whole seconds
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_ttl.as_secs() as i64
    }
}

//! Application Configuration
//!
//! Configuration for the Funding application layer.

use std::time::Duration;

/// Funding application configuration
#[derive(Debug, Clone)]
pub struct FundingConfig {
    /// Gateway API base URL
    pub gateway_base_url: String,
    /// Merchant secret key sent as `Authorization: Key <secret>`
    pub gateway_secret_key: String,
    /// Deadline for each outbound gateway call
    pub gateway_timeout: Duration,
    /// Where the gateway redirects payers after the payment page
    pub return_url: String,
    /// The merchant site registered with the gateway
    pub website_url: String,
    /// Maximum single donation, in major currency units
    pub max_donation_units: i64,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            gateway_base_url: "https://a.khalti.com/api/v2".to_string(),
            gateway_secret_key: String::new(),
            gateway_timeout: Duration::from_secs(15),
            return_url: "http://localhost:3000/payment/return".to_string(),
            website_url: "http://localhost:3000".to_string(),
            max_donation_units: 100_000,
        }
    }
}

impl FundingConfig {
    /// Create config for development (sandbox gateway)
    pub fn development() -> Self {
        Self {
            gateway_base_url: "https://dev.khalti.com/api/v2".to_string(),
            ..Default::default()
        }
    }
}

//! HTTP Payment Gateway Client
//!
//! reqwest-based implementation of [`PaymentGateway`]. Every call carries
//! the configured deadline; a timeout surfaces as `GatewayError::Timeout`
//! with no local side effects, so callers can retry the whole operation.

use std::time::Duration;

use crate::gateway::model::{ChargeRequest, InitiateResponse, LookupResponse, LookupResponseWire};
use crate::gateway::{GatewayError, PaymentGateway};

/// reqwest-backed gateway client
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl HttpPaymentGateway {
    /// Build a client with a per-call deadline
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Key {}", self.secret_key))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

impl PaymentGateway for HttpPaymentGateway {
    async fn initiate(&self, request: &ChargeRequest) -> Result<InitiateResponse, GatewayError> {
        self.post_json("/epayment/initiate/", request).await
    }

    async fn lookup(&self, pidx: &str) -> Result<LookupResponse, GatewayError> {
        let body = serde_json::json!({ "pidx": pidx });
        let wire: LookupResponseWire = self.post_json("/epayment/lookup/", &body).await?;
        Ok(wire.into())
    }
}

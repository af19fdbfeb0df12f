//! Payment Gateway Client
//!
//! The gateway runs a two-phase flow: `initiate` registers a charge and
//! returns a redirect handle, `lookup` reports the authoritative status of
//! a charge. This backend never infers completion from local state; the
//! lookup response is the single source of truth.

pub mod http;
pub mod model;

use thiserror::Error;

use model::{ChargeRequest, InitiateResponse, LookupResponse};

/// Gateway call failure
///
/// Neither variant implies any local write happened; callers may retry
/// the whole operation safely.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The call exceeded the configured deadline
    #[error("Payment gateway timed out")]
    Timeout,

    /// Transport-level failure (connect, TLS, abort)
    #[error("Payment gateway unreachable: {0}")]
    Transport(String),

    /// The gateway answered with a non-success status
    #[error("Payment gateway rejected the request (status {status})")]
    Status { status: u16 },

    /// The gateway answered with a body this client cannot parse
    #[error("Payment gateway response could not be decoded: {0}")]
    Decode(String),
}

/// Payment gateway operations
#[trait_variant::make(PaymentGateway: Send)]
pub trait LocalPaymentGateway {
    /// Register a charge; returns the gateway's reference and redirect URL
    async fn initiate(&self, request: &ChargeRequest) -> Result<InitiateResponse, GatewayError>;

    /// Query the authoritative state of a charge
    async fn lookup(&self, pidx: &str) -> Result<LookupResponse, GatewayError>;
}

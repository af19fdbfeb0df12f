//! Order Reference
//!
//! The provider-opaque order identifier embedded in every gateway charge.
//! It carries the full intent of the payment (payer, payee, purpose), so
//! verification can reconstruct what to do without a local
//! pending-transaction table. The gateway echoes it back to the caller's
//! return URL; the verify endpoint receives it together with the payment
//! reference, while amount and status always come from the gateway lookup.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// What the payment pays for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPurpose {
    Donation,
    Membership,
}

/// Decoding error for order references
#[derive(Debug, Error)]
#[error("Malformed order reference")]
pub struct OrderRefError;

/// Decoded order reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRef {
    pub purpose: OrderPurpose,
    /// Payer user id; None for anonymous donations
    pub payer: Option<Uuid>,
    /// Payee creator id
    pub creator: Uuid,
    /// Target membership tier (membership payments only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub membership: Option<Uuid>,
    /// True for a tier change, false for a fresh enroll
    #[serde(default)]
    pub change: bool,
    /// Donation message (donation payments only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    /// Random value making every order id unique
    pub nonce: String,
}

impl OrderRef {
    /// Build a donation order
    pub fn donation(payer: Option<Uuid>, creator: Uuid, message: Option<String>) -> Self {
        Self {
            purpose: OrderPurpose::Donation,
            payer,
            creator,
            membership: None,
            change: false,
            message,
            nonce: fresh_nonce(),
        }
    }

    /// Build a membership order
    pub fn membership(payer: Uuid, creator: Uuid, membership: Uuid, change: bool) -> Self {
        Self {
            purpose: OrderPurpose::Membership,
            payer: Some(payer),
            creator,
            membership: Some(membership),
            change,
            message: None,
            nonce: fresh_nonce(),
        }
    }

    /// Encode for use as a gateway `purchase_order_id`
    pub fn encode(&self) -> String {
        // Serialization of this struct cannot fail
        let json = serde_json::to_vec(self).expect("order ref serializes");
        platform::crypto::to_base64_url(&json)
    }

    /// Decode an order id echoed back by the gateway flow
    pub fn decode(encoded: &str) -> Result<Self, OrderRefError> {
        let bytes = platform::crypto::from_base64_url(encoded).map_err(|_| OrderRefError)?;
        serde_json::from_slice(&bytes).map_err(|_| OrderRefError)
    }
}

fn fresh_nonce() -> String {
    platform::crypto::to_base64_url(&platform::crypto::random_bytes(12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donation_roundtrip() {
        let order = OrderRef::donation(Some(Uuid::new_v4()), Uuid::new_v4(), Some("gg".into()));
        let decoded = OrderRef::decode(&order.encode()).unwrap();
        assert_eq!(order, decoded);
        assert_eq!(decoded.purpose, OrderPurpose::Donation);
    }

    #[test]
    fn test_membership_roundtrip() {
        let order = OrderRef::membership(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), true);
        let decoded = OrderRef::decode(&order.encode()).unwrap();
        assert_eq!(order, decoded);
        assert!(decoded.change);
    }

    #[test]
    fn test_anonymous_donation() {
        let order = OrderRef::donation(None, Uuid::new_v4(), None);
        let decoded = OrderRef::decode(&order.encode()).unwrap();
        assert!(decoded.payer.is_none());
        assert!(decoded.message.is_none());
    }

    #[test]
    fn test_nonce_makes_orders_unique() {
        let creator = Uuid::new_v4();
        let a = OrderRef::donation(None, creator, None);
        let b = OrderRef::donation(None, creator, None);
        assert_ne!(a.encode(), b.encode());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(OrderRef::decode("not base64!").is_err());
        assert!(OrderRef::decode(&platform::crypto::to_base64_url(b"{}")).is_err());
    }
}

//! Gateway Wire Types
//!
//! JSON shapes of the provider's e-payment API. Amounts are always in the
//! gateway's minor unit.

use serde::{Deserialize, Serialize};

/// Charge registration payload
#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
    /// Amount in minor units
    pub amount: i64,
    /// Provider-opaque order identifier (encoded [`OrderRef`])
    ///
    /// [`OrderRef`]: crate::domain::value_object::order_ref::OrderRef
    pub purchase_order_id: String,
    /// Human-readable order label shown on the payment page
    pub purchase_order_name: String,
    /// Where the provider redirects the payer afterwards
    pub return_url: String,
    /// The merchant site
    pub website_url: String,
}

/// Charge registration response
#[derive(Debug, Clone, Deserialize)]
pub struct InitiateResponse {
    /// The gateway's reference for this charge
    pub pidx: String,
    /// Redirect URL for the payer
    pub payment_url: String,
}

/// Charge status as reported by lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayStatus {
    Completed,
    Pending,
    Initiated,
    Refunded,
    Expired,
    UserCanceled,
    Other(String),
}

impl GatewayStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "Completed" => GatewayStatus::Completed,
            "Pending" => GatewayStatus::Pending,
            "Initiated" => GatewayStatus::Initiated,
            "Refunded" => GatewayStatus::Refunded,
            "Expired" => GatewayStatus::Expired,
            "User canceled" => GatewayStatus::UserCanceled,
            other => GatewayStatus::Other(other.to_string()),
        }
    }
}

/// Raw lookup response body
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponseWire {
    pub pidx: String,
    pub total_amount: i64,
    pub status: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub fee: i64,
    #[serde(default)]
    pub refunded: bool,
}

/// Parsed lookup response
#[derive(Debug, Clone)]
pub struct LookupResponse {
    pub pidx: String,
    /// Captured amount in minor units (authoritative)
    pub total_amount: i64,
    pub status: GatewayStatus,
    /// The gateway transaction id; present once the charge completed
    pub transaction_id: Option<String>,
    pub fee: i64,
    pub refunded: bool,
}

impl From<LookupResponseWire> for LookupResponse {
    fn from(wire: LookupResponseWire) -> Self {
        Self {
            pidx: wire.pidx,
            total_amount: wire.total_amount,
            status: GatewayStatus::from_wire(&wire.status),
            transaction_id: wire.transaction_id,
            fee: wire.fee,
            refunded: wire.refunded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_wire_parsing() {
        let json = r#"{
            "pidx": "HT6o6PEZRWFJ5ygavzHWd5",
            "total_amount": 100000,
            "status": "Completed",
            "transaction_id": "GFq9PFS7b2iYvL8Lir9oXe",
            "fee": 3000,
            "refunded": false
        }"#;

        let wire: LookupResponseWire = serde_json::from_str(json).unwrap();
        let lookup = LookupResponse::from(wire);

        assert_eq!(lookup.status, GatewayStatus::Completed);
        assert_eq!(lookup.total_amount, 100000);
        assert_eq!(lookup.transaction_id.as_deref(), Some("GFq9PFS7b2iYvL8Lir9oXe"));
    }

    #[test]
    fn test_lookup_without_transaction_id() {
        let json = r#"{"pidx": "abc", "total_amount": 5000, "status": "Pending"}"#;

        let wire: LookupResponseWire = serde_json::from_str(json).unwrap();
        let lookup = LookupResponse::from(wire);

        assert_eq!(lookup.status, GatewayStatus::Pending);
        assert!(lookup.transaction_id.is_none());
        assert!(!lookup.refunded);
    }

    #[test]
    fn test_status_from_wire() {
        assert_eq!(
            GatewayStatus::from_wire("User canceled"),
            GatewayStatus::UserCanceled
        );
        assert_eq!(
            GatewayStatus::from_wire("Partially Refunded"),
            GatewayStatus::Other("Partially Refunded".to_string())
        );
    }

    #[test]
    fn test_charge_request_serialization() {
        let request = ChargeRequest {
            amount: 130000,
            purchase_order_id: "order-1".to_string(),
            purchase_order_name: "Donation".to_string(),
            return_url: "https://example.com/return".to_string(),
            website_url: "https://example.com".to_string(),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""amount":130000"#));
        assert!(json.contains(r#""purchase_order_id":"order-1""#));
    }
}

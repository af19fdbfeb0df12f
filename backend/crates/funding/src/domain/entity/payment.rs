//! Payment Entity
//!
//! One row per confirmed gateway charge, written exactly once and
//! immutable afterwards. The gateway transaction id is unique and serves
//! as the idempotency key for the whole reconciliation engine; everything
//! a payment funds holds a restrict-on-delete reference back to it.

use chrono::{DateTime, Utc};
use kernel::amount::Amount;
use kernel::id::PaymentId;

/// Confirmed payment record
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: PaymentId,
    /// The gateway's transaction id; unique, the idempotency key
    pub gateway_ref: String,
    /// Amount the gateway reported as captured (authoritative)
    pub amount: Amount,
    /// Status string as reported by the gateway at confirmation time
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Record a charge the gateway reported as completed
    pub fn confirmed(gateway_ref: String, amount: Amount) -> Self {
        Self {
            id: PaymentId::new(),
            gateway_ref,
            amount,
            status: "Completed".to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_payment() {
        let payment = Payment::confirmed("txn-123".to_string(), Amount::from_units(500).unwrap());
        assert_eq!(payment.gateway_ref, "txn-123");
        assert_eq!(payment.amount.minor(), 50_000);
        assert_eq!(payment.status, "Completed");
    }
}

//! Donation Entity

use chrono::{DateTime, Utc};
use kernel::amount::Amount;
use kernel::id::{CreatorId, DonationId, PaymentId, UserId};

/// A confirmed donation to a creator
///
/// Only ever created by payment verification; the payment reference is the
/// proof of funding. The donor is optional, anonymous donations are
/// allowed.
#[derive(Debug, Clone)]
pub struct Donation {
    pub id: DonationId,
    pub creator_id: CreatorId,
    /// None for anonymous donations
    pub donor_user_id: Option<UserId>,
    pub amount: Amount,
    pub message: Option<String>,
    /// The payment that funded this donation
    pub payment_id: Option<PaymentId>,
    pub created_at: DateTime<Utc>,
}

impl Donation {
    /// Build a donation funded by a confirmed payment
    pub fn funded(
        creator_id: CreatorId,
        donor_user_id: Option<UserId>,
        amount: Amount,
        message: Option<String>,
        payment_id: PaymentId,
    ) -> Self {
        Self {
            id: DonationId::new(),
            creator_id,
            donor_user_id,
            amount,
            message,
            payment_id: Some(payment_id),
            created_at: Utc::now(),
        }
    }
}

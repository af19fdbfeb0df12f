//! Donation Use Cases
//!
//! Initiate builds the gateway charge and performs no local writes;
//! verify confirms with the gateway and applies {payment, donation, goal
//! progress} as one atomic unit.

use std::sync::Arc;

use kernel::amount::Amount;
use kernel::id::{CreatorId, UserId};

use crate::application::config::FundingConfig;
use crate::domain::entity::{donation::Donation, goal::DonationGoal, payment::Payment};
use crate::domain::repository::{CreatorRepository, DonationRepository, ReconciliationStore};
use crate::domain::value_object::order_ref::{OrderPurpose, OrderRef};
use crate::error::{FundingError, FundingResult};
use crate::gateway::PaymentGateway;
use crate::gateway::model::{ChargeRequest, GatewayStatus};

/// Initiate donation input
pub struct InitiateDonationInput {
    pub creator_id: CreatorId,
    /// None for anonymous donations
    pub donor_user_id: Option<UserId>,
    /// Amount in major currency units
    pub amount_units: i64,
    pub message: Option<String>,
}

/// An initiated gateway charge
pub struct InitiatedCharge {
    pub pidx: String,
    pub payment_url: String,
    /// Echoed back to the verify endpoint
    pub order_ref: String,
}

/// Verify donation input
pub struct VerifyDonationInput {
    pub pidx: String,
    pub order_ref: String,
}

/// The effect of a verified donation
pub struct DonationReceipt {
    pub donation: Donation,
    /// Present when the creator had an open goal at commit time
    pub goal: Option<DonationGoal>,
}

/// Donation use case
pub struct DonationUseCase<G, S>
where
    G: PaymentGateway,
    S: CreatorRepository + DonationRepository + ReconciliationStore,
{
    gateway: Arc<G>,
    store: Arc<S>,
    config: Arc<FundingConfig>,
}

impl<G, S> DonationUseCase<G, S>
where
    G: PaymentGateway,
    S: CreatorRepository + DonationRepository + ReconciliationStore,
{
    pub fn new(gateway: Arc<G>, store: Arc<S>, config: Arc<FundingConfig>) -> Self {
        Self {
            gateway,
            store,
            config,
        }
    }

    /// Build and register a gateway charge for a donation
    ///
    /// Over-limit and malformed amounts are rejected before any network
    /// call; a gateway timeout leaves no local state behind.
    pub async fn initiate(&self, input: InitiateDonationInput) -> FundingResult<InitiatedCharge> {
        let amount = Amount::from_units_capped(input.amount_units, self.config.max_donation_units)?;

        let creator = self
            .store
            .find_by_id(&input.creator_id)
            .await?
            .ok_or(FundingError::CreatorNotFound)?;

        let order = OrderRef::donation(
            input.donor_user_id.map(Into::into),
            creator.id.into_uuid(),
            input.message,
        );
        let order_ref = order.encode();

        let charge = ChargeRequest {
            amount: amount.minor(),
            purchase_order_id: order_ref.clone(),
            purchase_order_name: "Creator donation".to_string(),
            return_url: self.config.return_url.clone(),
            website_url: self.config.website_url.clone(),
        };

        let initiated = self.gateway.initiate(&charge).await?;

        tracing::info!(
            creator_id = %creator.id,
            pidx = %initiated.pidx,
            amount_minor = amount.minor(),
            "Donation charge initiated"
        );

        Ok(InitiatedCharge {
            pidx: initiated.pidx,
            payment_url: initiated.payment_url,
            order_ref,
        })
    }

    /// Confirm a donation charge exactly once and apply its effect
    pub async fn verify(&self, input: VerifyDonationInput) -> FundingResult<DonationReceipt> {
        let order = OrderRef::decode(&input.order_ref)
            .map_err(|e| FundingError::InvalidInput(e.to_string()))?;

        if order.purpose != OrderPurpose::Donation {
            return Err(FundingError::InvalidInput(
                "Order reference is not a donation".to_string(),
            ));
        }

        // The gateway is authoritative: status, amount and transaction id
        // all come from the lookup, never from the caller
        let lookup = self.gateway.lookup(&input.pidx).await?;

        if lookup.status != GatewayStatus::Completed {
            return Err(FundingError::PaymentNotCompleted);
        }
        let Some(transaction_id) = lookup.transaction_id else {
            return Err(FundingError::PaymentNotCompleted);
        };

        // Fast-path duplicate check; the unique index in record_donation
        // remains the guarantee under concurrent retries
        if self
            .store
            .find_payment_by_gateway_ref(&transaction_id)
            .await?
            .is_some()
        {
            return Err(FundingError::AlreadyProcessed);
        }

        let amount = Amount::from_minor(lookup.total_amount)
            .map_err(|e| FundingError::InvalidInput(e.to_string()))?;

        let payment = Payment::confirmed(transaction_id, amount);
        let donation = Donation::funded(
            CreatorId::from_uuid(order.creator),
            order.payer.map(UserId::from_uuid),
            amount,
            order.message,
            payment.id,
        );

        let goal = self.store.record_donation(&payment, &donation).await?;

        tracing::info!(
            donation_id = %donation.id,
            payment_id = %payment.id,
            goal_updated = goal.is_some(),
            "Donation reconciled"
        );

        Ok(DonationReceipt { donation, goal })
    }

    /// Donations received by a creator
    pub async fn list_for_creator(&self, creator_id: &CreatorId) -> FundingResult<Vec<Donation>> {
        self.store
            .find_by_id(creator_id)
            .await?
            .ok_or(FundingError::CreatorNotFound)?;

        self.store.list_by_creator(creator_id).await
    }
}

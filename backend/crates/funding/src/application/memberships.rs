//! Membership Use Cases
//!
//! Tier management plus the paid enrollment flow. Enrollment state only
//! ever changes inside a verified payment: fresh enrolls require no
//! active enrollment with the creator, tier changes refuse downgrades
//! while the current term is active and otherwise end-date the old row
//! before the new one starts.

use std::sync::Arc;

use kernel::amount::Amount;
use kernel::id::{CreatorId, MembershipId, UserId};

use crate::application::config::FundingConfig;
use crate::domain::entity::{
    enrollment::Enrollment, membership::Membership, payment::Payment,
};
use crate::domain::repository::{CreatorRepository, MembershipRepository, ReconciliationStore};
use crate::domain::value_object::order_ref::{OrderPurpose, OrderRef};
use crate::error::{FundingError, FundingResult};
use crate::gateway::PaymentGateway;
use crate::gateway::model::{ChargeRequest, GatewayStatus};

/// Create membership tier input
pub struct CreateMembershipInput {
    pub creator_id: CreatorId,
    pub name: String,
    pub tier: i16,
    /// Monthly price in major currency units
    pub amount_units: i64,
    pub benefits: String,
}

/// Initiate enrollment input
pub struct InitiateEnrollmentInput {
    /// The payer (from the caller's token claims)
    pub user_id: UserId,
    pub membership_id: MembershipId,
    /// True when replacing an existing active enrollment
    pub change: bool,
}

/// Verify enrollment input
pub struct VerifyEnrollmentInput {
    pub pidx: String,
    pub order_ref: String,
}

/// The effect of a verified enrollment payment
pub struct EnrollmentReceipt {
    pub enrollment: Enrollment,
    /// The enrollment that was end-dated, for tier changes
    pub ended: Option<Enrollment>,
}

/// Membership use case
pub struct MembershipUseCase<G, S>
where
    G: PaymentGateway,
    S: CreatorRepository + MembershipRepository + ReconciliationStore,
{
    gateway: Arc<G>,
    store: Arc<S>,
    config: Arc<FundingConfig>,
}

impl<G, S> MembershipUseCase<G, S>
where
    G: PaymentGateway,
    S: CreatorRepository + MembershipRepository + ReconciliationStore,
{
    pub fn new(gateway: Arc<G>, store: Arc<S>, config: Arc<FundingConfig>) -> Self {
        Self {
            gateway,
            store,
            config,
        }
    }

    /// Create a membership tier for a creator
    pub async fn create_tier(&self, input: CreateMembershipInput) -> FundingResult<Membership> {
        CreatorRepository::find_by_id(&*self.store, &input.creator_id)
            .await?
            .ok_or(FundingError::CreatorNotFound)?;

        let amount = Amount::from_units(input.amount_units)
            .map_err(|e| FundingError::InvalidInput(e.to_string()))?;

        let membership = Membership::new(
            input.creator_id,
            input.name,
            input.tier,
            amount,
            input.benefits,
        )
        .map_err(|e| FundingError::InvalidInput(e.to_string()))?;

        MembershipRepository::create(&*self.store, &membership).await?;

        Ok(membership)
    }

    /// Live tiers of a creator
    pub async fn list_tiers(&self, creator_id: &CreatorId) -> FundingResult<Vec<Membership>> {
        self.store.list_by_creator(creator_id).await
    }

    /// Enrollments of a user, newest first
    pub async fn list_enrollments(&self, user_id: &UserId) -> FundingResult<Vec<Enrollment>> {
        self.store.list_enrollments_by_user(user_id).await
    }

    /// Build and register a gateway charge for an enrollment or tier change
    ///
    /// The enrollment preconditions are checked here to fail fast, and
    /// checked again at verification time against then-current state.
    pub async fn initiate(&self, input: InitiateEnrollmentInput) -> FundingResult<super::InitiatedCharge> {
        let membership = self.live_membership(&input.membership_id).await?;

        self.check_enrollment_state(&input.user_id, &membership, input.change)
            .await?;

        let order = OrderRef::membership(
            input.user_id.into_uuid(),
            membership.creator_id.into_uuid(),
            membership.id.into_uuid(),
            input.change,
        );
        let order_ref = order.encode();

        let charge = ChargeRequest {
            amount: membership.amount.minor(),
            purchase_order_id: order_ref.clone(),
            purchase_order_name: format!("Membership: {}", membership.name),
            return_url: self.config.return_url.clone(),
            website_url: self.config.website_url.clone(),
        };

        let initiated = self.gateway.initiate(&charge).await?;

        tracing::info!(
            user_id = %input.user_id,
            membership_id = %membership.id,
            pidx = %initiated.pidx,
            change = input.change,
            "Enrollment charge initiated"
        );

        Ok(super::InitiatedCharge {
            pidx: initiated.pidx,
            payment_url: initiated.payment_url,
            order_ref,
        })
    }

    /// Confirm an enrollment charge exactly once and apply its effect
    pub async fn verify(&self, input: VerifyEnrollmentInput) -> FundingResult<EnrollmentReceipt> {
        let order = OrderRef::decode(&input.order_ref)
            .map_err(|e| FundingError::InvalidInput(e.to_string()))?;

        if order.purpose != OrderPurpose::Membership {
            return Err(FundingError::InvalidInput(
                "Order reference is not a membership payment".to_string(),
            ));
        }
        let (Some(payer), Some(membership_id)) = (order.payer, order.membership) else {
            return Err(FundingError::InvalidInput(
                "Order reference is missing payer or membership".to_string(),
            ));
        };
        let payer = UserId::from_uuid(payer);

        let lookup = self.gateway.lookup(&input.pidx).await?;

        if lookup.status != GatewayStatus::Completed {
            return Err(FundingError::PaymentNotCompleted);
        }
        let Some(transaction_id) = lookup.transaction_id else {
            return Err(FundingError::PaymentNotCompleted);
        };

        if self
            .store
            .find_payment_by_gateway_ref(&transaction_id)
            .await?
            .is_some()
        {
            return Err(FundingError::AlreadyProcessed);
        }

        let membership = self
            .live_membership(&MembershipId::from_uuid(membership_id))
            .await?;

        // Re-check against current state; the initiate-time check only
        // failed fast
        let current = self
            .check_enrollment_state(&payer, &membership, order.change)
            .await?;

        let amount = Amount::from_minor(lookup.total_amount)
            .map_err(|e| FundingError::InvalidInput(e.to_string()))?;
        let payment = Payment::confirmed(transaction_id, amount);

        let enrollment = Enrollment::start(payer, membership.id, payment.id);

        let ended = current.map(|(mut previous, _)| {
            previous.end_now();
            previous
        });

        self.store
            .record_enrollment(&payment, &enrollment, ended.as_ref())
            .await?;

        tracing::info!(
            enrollment_id = %enrollment.id,
            payment_id = %payment.id,
            ended_previous = ended.is_some(),
            "Enrollment reconciled"
        );

        Ok(EnrollmentReceipt { enrollment, ended })
    }

    /// Fetch a tier and filter out deleted ones
    async fn live_membership(&self, membership_id: &MembershipId) -> FundingResult<Membership> {
        let membership = MembershipRepository::find_by_id(&*self.store, membership_id)
            .await?
            .ok_or(FundingError::MembershipNotFound)?;

        if membership.is_deleted {
            return Err(FundingError::MembershipNotFound);
        }

        Ok(membership)
    }

    /// Validate the payer's enrollment state against the requested action
    ///
    /// Returns the current active enrollment (with its tier) for a change,
    /// None for a fresh enroll.
    async fn check_enrollment_state(
        &self,
        user_id: &UserId,
        requested: &Membership,
        change: bool,
    ) -> FundingResult<Option<(Enrollment, Membership)>> {
        let current = self
            .store
            .find_active_enrollment(user_id, &requested.creator_id)
            .await?;

        if !change {
            return match current {
                Some(_) => Err(FundingError::AlreadyEnrolled),
                None => Ok(None),
            };
        }

        let (enrollment, current_tier) = current.ok_or(FundingError::NotEnrolled)?;

        // A lower tier cannot replace a still-active term
        if requested.tier < current_tier.tier && enrollment.is_active {
            return Err(FundingError::DowngradeWhileActive);
        }

        Ok(Some((enrollment, current_tier)))
    }
}

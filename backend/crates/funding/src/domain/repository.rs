//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//!
//! The reconciliation store is the heart of the engine: its `record_*`
//! operations apply the payment row and the funded domain effect as one
//! atomic unit, and turn a duplicate gateway transaction id into
//! `AlreadyProcessed` instead of a raw constraint error.

use kernel::id::{CreatorId, MembershipId, UserId};

use crate::domain::entity::{
    creator::Creator, donation::Donation, enrollment::Enrollment, goal::DonationGoal,
    membership::Membership, payment::Payment,
};
use crate::error::FundingResult;

/// Creator profile repository trait
#[trait_variant::make(CreatorRepository: Send)]
pub trait LocalCreatorRepository {
    /// Create a creator profile
    async fn create(&self, creator: &Creator) -> FundingResult<()>;

    /// Find creator by ID
    async fn find_by_id(&self, creator_id: &CreatorId) -> FundingResult<Option<Creator>>;

    /// Find the creator profile owned by a user
    async fn find_by_user_id(&self, user_id: &UserId) -> FundingResult<Option<Creator>>;
}

/// Donation read-side repository trait
#[trait_variant::make(DonationRepository: Send)]
pub trait LocalDonationRepository {
    /// All donations received by a creator, newest first
    async fn list_by_creator(&self, creator_id: &CreatorId) -> FundingResult<Vec<Donation>>;
}

/// Donation goal repository trait
#[trait_variant::make(GoalRepository: Send)]
pub trait LocalGoalRepository {
    /// Create a goal.
    ///
    /// Fails with `ActiveGoalExists` when the creator already has an
    /// active-and-not-reached goal; the partial unique index is the
    /// enforcement, this call maps the violation.
    async fn create(&self, goal: &DonationGoal) -> FundingResult<()>;

    /// The creator's single active-and-not-reached goal, if any
    async fn find_active_by_creator(
        &self,
        creator_id: &CreatorId,
    ) -> FundingResult<Option<DonationGoal>>;
}

/// Membership tier and enrollment repository trait
#[trait_variant::make(MembershipRepository: Send)]
pub trait LocalMembershipRepository {
    /// Create a membership tier
    async fn create(&self, membership: &Membership) -> FundingResult<()>;

    /// Find tier by ID (deleted tiers included; callers filter)
    async fn find_by_id(&self, membership_id: &MembershipId)
    -> FundingResult<Option<Membership>>;

    /// All live tiers of a creator
    async fn list_by_creator(&self, creator_id: &CreatorId) -> FundingResult<Vec<Membership>>;

    /// The payer's active enrollment with any tier of the creator, joined
    /// with that tier
    async fn find_active_enrollment(
        &self,
        user_id: &UserId,
        creator_id: &CreatorId,
    ) -> FundingResult<Option<(Enrollment, Membership)>>;

    /// All enrollments of a user, newest first
    async fn list_enrollments_by_user(&self, user_id: &UserId) -> FundingResult<Vec<Enrollment>>;
}

/// Atomic payment reconciliation operations
#[trait_variant::make(ReconciliationStore: Send)]
pub trait LocalReconciliationStore {
    /// Fast-path idempotency lookup by gateway transaction id
    async fn find_payment_by_gateway_ref(
        &self,
        gateway_ref: &str,
    ) -> FundingResult<Option<Payment>>;

    /// Persist {payment, donation, goal progress} as one unit.
    ///
    /// The goal update targets the creator's active-and-not-reached goal
    /// if one exists at commit time. A duplicate gateway transaction id
    /// fails the whole unit with `AlreadyProcessed`.
    async fn record_donation(
        &self,
        payment: &Payment,
        donation: &Donation,
    ) -> FundingResult<Option<DonationGoal>>;

    /// Persist {payment, optional end-dating of the previous enrollment,
    /// new enrollment} as one unit.
    ///
    /// A duplicate gateway transaction id fails the whole unit with
    /// `AlreadyProcessed`.
    async fn record_enrollment(
        &self,
        payment: &Payment,
        enrollment: &Enrollment,
        end_previous: Option<&Enrollment>,
    ) -> FundingResult<()>;
}

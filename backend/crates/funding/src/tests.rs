//! Use-case tests for the funding crate against an in-memory store and a
//! scripted gateway

#[cfg(test)]
mod support {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use kernel::id::{CreatorId, MembershipId, UserId};

    use crate::domain::entity::{
        creator::Creator, donation::Donation, enrollment::Enrollment, goal::DonationGoal,
        membership::Membership, payment::Payment,
    };
    use crate::domain::repository::{
        CreatorRepository, DonationRepository, GoalRepository, MembershipRepository,
        ReconciliationStore,
    };
    use crate::error::{FundingError, FundingResult};
    use crate::gateway::model::{
        ChargeRequest, GatewayStatus, InitiateResponse, LookupResponse,
    };
    use crate::gateway::{GatewayError, PaymentGateway};

    // ========================================================================
    // In-memory store
    // ========================================================================

    #[derive(Default)]
    struct Inner {
        creators: HashMap<uuid::Uuid, Creator>,
        goals: Vec<DonationGoal>,
        memberships: HashMap<uuid::Uuid, Membership>,
        enrollments: Vec<Enrollment>,
        payments: HashMap<String, Payment>,
        donations: Vec<Donation>,
    }

    /// In-memory stand-in for the Postgres store
    #[derive(Clone, Default)]
    pub struct InMemoryFundingStore {
        inner: Arc<Mutex<Inner>>,
    }

    impl InMemoryFundingStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_creator(&self, creator: &Creator) {
            let mut inner = self.inner.lock().unwrap();
            inner.creators.insert(*creator.id.as_uuid(), creator.clone());
        }

        pub fn add_goal(&self, goal: &DonationGoal) {
            self.inner.lock().unwrap().goals.push(goal.clone());
        }

        pub fn add_membership(&self, membership: &Membership) {
            let mut inner = self.inner.lock().unwrap();
            inner
                .memberships
                .insert(*membership.id.as_uuid(), membership.clone());
        }

        pub fn payment_count(&self) -> usize {
            self.inner.lock().unwrap().payments.len()
        }

        pub fn donation_count(&self) -> usize {
            self.inner.lock().unwrap().donations.len()
        }

        pub fn enrollment_count(&self) -> usize {
            self.inner.lock().unwrap().enrollments.len()
        }

        pub fn goal_snapshot(&self, creator_id: &CreatorId) -> Option<DonationGoal> {
            let inner = self.inner.lock().unwrap();
            inner
                .goals
                .iter()
                .find(|g| g.creator_id == *creator_id)
                .cloned()
        }

        pub fn enrollments(&self) -> Vec<Enrollment> {
            self.inner.lock().unwrap().enrollments.clone()
        }
    }

    impl CreatorRepository for InMemoryFundingStore {
        async fn create(&self, creator: &Creator) -> FundingResult<()> {
            self.add_creator(creator);
            Ok(())
        }

        async fn find_by_id(&self, creator_id: &CreatorId) -> FundingResult<Option<Creator>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner.creators.get(creator_id.as_uuid()).cloned())
        }

        async fn find_by_user_id(&self, user_id: &UserId) -> FundingResult<Option<Creator>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .creators
                .values()
                .find(|c| c.user_id == *user_id)
                .cloned())
        }
    }

    impl DonationRepository for InMemoryFundingStore {
        async fn list_by_creator(&self, creator_id: &CreatorId) -> FundingResult<Vec<Donation>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .donations
                .iter()
                .filter(|d| d.creator_id == *creator_id)
                .cloned()
                .collect())
        }
    }

    impl GoalRepository for InMemoryFundingStore {
        async fn create(&self, goal: &DonationGoal) -> FundingResult<()> {
            let mut inner = self.inner.lock().unwrap();
            let open_exists = inner
                .goals
                .iter()
                .any(|g| g.creator_id == goal.creator_id && g.is_active && !g.is_reached);
            if open_exists {
                return Err(FundingError::ActiveGoalExists);
            }
            inner.goals.push(goal.clone());
            Ok(())
        }

        async fn find_active_by_creator(
            &self,
            creator_id: &CreatorId,
        ) -> FundingResult<Option<DonationGoal>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .goals
                .iter()
                .find(|g| g.creator_id == *creator_id && g.is_active && !g.is_reached)
                .cloned())
        }
    }

    impl MembershipRepository for InMemoryFundingStore {
        async fn create(&self, membership: &Membership) -> FundingResult<()> {
            self.add_membership(membership);
            Ok(())
        }

        async fn find_by_id(
            &self,
            membership_id: &MembershipId,
        ) -> FundingResult<Option<Membership>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner.memberships.get(membership_id.as_uuid()).cloned())
        }

        async fn list_by_creator(&self, creator_id: &CreatorId) -> FundingResult<Vec<Membership>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .memberships
                .values()
                .filter(|m| m.creator_id == *creator_id && !m.is_deleted)
                .cloned()
                .collect())
        }

        async fn find_active_enrollment(
            &self,
            user_id: &UserId,
            creator_id: &CreatorId,
        ) -> FundingResult<Option<(Enrollment, Membership)>> {
            let inner = self.inner.lock().unwrap();
            for enrollment in inner.enrollments.iter().filter(|e| e.is_active) {
                if enrollment.user_id != *user_id {
                    continue;
                }
                if let Some(membership) =
                    inner.memberships.get(enrollment.membership_id.as_uuid())
                {
                    if membership.creator_id == *creator_id {
                        return Ok(Some((enrollment.clone(), membership.clone())));
                    }
                }
            }
            Ok(None)
        }

        async fn list_enrollments_by_user(
            &self,
            user_id: &UserId,
        ) -> FundingResult<Vec<Enrollment>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .enrollments
                .iter()
                .filter(|e| e.user_id == *user_id)
                .cloned()
                .collect())
        }
    }

    impl ReconciliationStore for InMemoryFundingStore {
        async fn find_payment_by_gateway_ref(
            &self,
            gateway_ref: &str,
        ) -> FundingResult<Option<Payment>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner.payments.get(gateway_ref).cloned())
        }

        async fn record_donation(
            &self,
            payment: &Payment,
            donation: &Donation,
        ) -> FundingResult<Option<DonationGoal>> {
            let mut inner = self.inner.lock().unwrap();
            if inner.payments.contains_key(&payment.gateway_ref) {
                return Err(FundingError::AlreadyProcessed);
            }
            inner
                .payments
                .insert(payment.gateway_ref.clone(), payment.clone());
            inner.donations.push(donation.clone());

            let updated = inner
                .goals
                .iter_mut()
                .find(|g| g.creator_id == donation.creator_id && g.is_active && !g.is_reached)
                .map(|goal| {
                    goal.apply_donation(donation.amount);
                    goal.clone()
                });

            Ok(updated)
        }

        async fn record_enrollment(
            &self,
            payment: &Payment,
            enrollment: &Enrollment,
            end_previous: Option<&Enrollment>,
        ) -> FundingResult<()> {
            let mut inner = self.inner.lock().unwrap();
            if inner.payments.contains_key(&payment.gateway_ref) {
                return Err(FundingError::AlreadyProcessed);
            }
            inner
                .payments
                .insert(payment.gateway_ref.clone(), payment.clone());

            if let Some(previous) = end_previous {
                if let Some(stored) = inner
                    .enrollments
                    .iter_mut()
                    .find(|e| e.id == previous.id)
                {
                    stored.is_active = false;
                    stored.expires_at = previous.expires_at;
                }
            }

            inner.enrollments.push(enrollment.clone());
            Ok(())
        }
    }

    // ========================================================================
    // Scripted gateway
    // ========================================================================

    #[derive(Default)]
    struct GatewayScript {
        lookups: HashMap<String, LookupResponse>,
        time_out_initiate: bool,
        time_out_lookup: bool,
        initiated: Vec<ChargeRequest>,
        next_pidx: u32,
    }

    /// Gateway double with scripted lookup responses
    #[derive(Clone, Default)]
    pub struct FakeGateway {
        inner: Arc<Mutex<GatewayScript>>,
    }

    impl FakeGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn time_out_initiate(&self) {
            self.inner.lock().unwrap().time_out_initiate = true;
        }

        pub fn time_out_lookup(&self) {
            self.inner.lock().unwrap().time_out_lookup = true;
        }

        /// Script a completed charge for a pidx
        pub fn complete(&self, pidx: &str, transaction_id: &str, total_amount: i64) {
            self.inner.lock().unwrap().lookups.insert(
                pidx.to_string(),
                LookupResponse {
                    pidx: pidx.to_string(),
                    total_amount,
                    status: GatewayStatus::Completed,
                    transaction_id: Some(transaction_id.to_string()),
                    fee: 0,
                    refunded: false,
                },
            );
        }

        /// Script a still-pending charge for a pidx
        pub fn pending(&self, pidx: &str) {
            self.inner.lock().unwrap().lookups.insert(
                pidx.to_string(),
                LookupResponse {
                    pidx: pidx.to_string(),
                    total_amount: 0,
                    status: GatewayStatus::Pending,
                    transaction_id: None,
                    fee: 0,
                    refunded: false,
                },
            );
        }

        pub fn initiated_count(&self) -> usize {
            self.inner.lock().unwrap().initiated.len()
        }

        pub fn last_initiated(&self) -> Option<ChargeRequest> {
            self.inner.lock().unwrap().initiated.last().cloned()
        }
    }

    impl PaymentGateway for FakeGateway {
        async fn initiate(
            &self,
            request: &ChargeRequest,
        ) -> Result<InitiateResponse, GatewayError> {
            let mut inner = self.inner.lock().unwrap();
            if inner.time_out_initiate {
                return Err(GatewayError::Timeout);
            }
            inner.initiated.push(request.clone());
            inner.next_pidx += 1;
            Ok(InitiateResponse {
                pidx: format!("pidx-{}", inner.next_pidx),
                payment_url: format!("https://gateway.test/pay/pidx-{}", inner.next_pidx),
            })
        }

        async fn lookup(&self, pidx: &str) -> Result<LookupResponse, GatewayError> {
            let inner = self.inner.lock().unwrap();
            if inner.time_out_lookup {
                return Err(GatewayError::Timeout);
            }
            inner
                .lookups
                .get(pidx)
                .cloned()
                .ok_or_else(|| GatewayError::Status { status: 404 })
        }
    }
}

#[cfg(test)]
mod donation_tests {
    use std::sync::Arc;

    use super::support::{FakeGateway, InMemoryFundingStore};
    use crate::application::config::FundingConfig;
    use crate::application::{DonationUseCase, InitiateDonationInput, VerifyDonationInput};
    use crate::domain::entity::{creator::Creator, goal::DonationGoal};
    use crate::error::FundingError;
    use crate::gateway::GatewayError;
    use kernel::amount::Amount;
    use kernel::id::UserId;

    fn use_case(
        gateway: &FakeGateway,
        store: &InMemoryFundingStore,
    ) -> DonationUseCase<FakeGateway, InMemoryFundingStore> {
        DonationUseCase::new(
            Arc::new(gateway.clone()),
            Arc::new(store.clone()),
            Arc::new(FundingConfig::default()),
        )
    }

    fn seeded_creator(store: &InMemoryFundingStore) -> Creator {
        let creator = Creator::new(UserId::new(), None, None);
        store.add_creator(&creator);
        creator
    }

    #[tokio::test]
    async fn test_initiate_converts_to_minor_units_and_embeds_order() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let creator = seeded_creator(&store);

        let charge = use_case(&gateway, &store)
            .initiate(InitiateDonationInput {
                creator_id: creator.id,
                donor_user_id: None,
                amount_units: 250,
                message: Some("keep going".to_string()),
            })
            .await
            .unwrap();

        let sent = gateway.last_initiated().unwrap();
        assert_eq!(sent.amount, 25_000);
        assert_eq!(sent.purchase_order_id, charge.order_ref);
        assert!(!charge.pidx.is_empty());
        // Initiation performs no local writes
        assert_eq!(store.payment_count(), 0);
        assert_eq!(store.donation_count(), 0);
    }

    #[tokio::test]
    async fn test_over_ceiling_rejected_before_gateway_call() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let creator = seeded_creator(&store);

        let result = use_case(&gateway, &store)
            .initiate(InitiateDonationInput {
                creator_id: creator.id,
                donor_user_id: None,
                amount_units: 100_001,
                message: None,
            })
            .await;

        assert!(matches!(result, Err(FundingError::InvalidInput(_))));
        assert_eq!(gateway.initiated_count(), 0);
    }

    #[tokio::test]
    async fn test_initiate_timeout_leaves_no_state() {
        let gateway = FakeGateway::new();
        gateway.time_out_initiate();
        let store = InMemoryFundingStore::new();
        let creator = seeded_creator(&store);

        let result = use_case(&gateway, &store)
            .initiate(InitiateDonationInput {
                creator_id: creator.id,
                donor_user_id: None,
                amount_units: 10,
                message: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(FundingError::Gateway(GatewayError::Timeout))
        ));
        assert_eq!(store.payment_count(), 0);
    }

    #[tokio::test]
    async fn test_verify_timeout_leaves_no_state() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let creator = seeded_creator(&store);
        let donations = use_case(&gateway, &store);

        let charge = donations
            .initiate(InitiateDonationInput {
                creator_id: creator.id,
                donor_user_id: None,
                amount_units: 10,
                message: None,
            })
            .await
            .unwrap();

        gateway.time_out_lookup();

        let result = donations
            .verify(VerifyDonationInput {
                pidx: charge.pidx,
                order_ref: charge.order_ref,
            })
            .await;

        assert!(matches!(
            result,
            Err(FundingError::Gateway(GatewayError::Timeout))
        ));
        assert_eq!(store.payment_count(), 0);
        assert_eq!(store.donation_count(), 0);
    }

    #[tokio::test]
    async fn test_verify_twice_is_exactly_once() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let creator = seeded_creator(&store);
        let donations = use_case(&gateway, &store);

        let charge = donations
            .initiate(InitiateDonationInput {
                creator_id: creator.id,
                donor_user_id: Some(UserId::new()),
                amount_units: 50,
                message: None,
            })
            .await
            .unwrap();

        gateway.complete(&charge.pidx, "txn-once", 5_000);

        let receipt = donations
            .verify(VerifyDonationInput {
                pidx: charge.pidx.clone(),
                order_ref: charge.order_ref.clone(),
            })
            .await
            .unwrap();

        assert_eq!(receipt.donation.amount.minor(), 5_000);
        assert_eq!(store.payment_count(), 1);
        assert_eq!(store.donation_count(), 1);

        // A retried confirmation creates nothing further
        let replay = donations
            .verify(VerifyDonationInput {
                pidx: charge.pidx,
                order_ref: charge.order_ref,
            })
            .await;

        assert!(matches!(replay, Err(FundingError::AlreadyProcessed)));
        assert_eq!(store.payment_count(), 1);
        assert_eq!(store.donation_count(), 1);
    }

    #[tokio::test]
    async fn test_verify_pending_writes_nothing() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let creator = seeded_creator(&store);
        let donations = use_case(&gateway, &store);

        let charge = donations
            .initiate(InitiateDonationInput {
                creator_id: creator.id,
                donor_user_id: None,
                amount_units: 50,
                message: None,
            })
            .await
            .unwrap();

        gateway.pending(&charge.pidx);

        let result = donations
            .verify(VerifyDonationInput {
                pidx: charge.pidx,
                order_ref: charge.order_ref,
            })
            .await;

        assert!(matches!(result, Err(FundingError::PaymentNotCompleted)));
        assert_eq!(store.payment_count(), 0);
        assert_eq!(store.donation_count(), 0);
    }

    #[tokio::test]
    async fn test_goal_progress_crosses_target() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let creator = seeded_creator(&store);

        // Target 1000 units with 800 units of progress
        let mut goal = DonationGoal::open(
            creator.id,
            "New camera".to_string(),
            None,
            Amount::from_units(1000).unwrap(),
        );
        goal.progress_minor = 800 * 100;
        store.add_goal(&goal);

        let donations = use_case(&gateway, &store);
        let charge = donations
            .initiate(InitiateDonationInput {
                creator_id: creator.id,
                donor_user_id: None,
                amount_units: 300,
                message: None,
            })
            .await
            .unwrap();
        gateway.complete(&charge.pidx, "txn-goal", 300 * 100);

        let receipt = donations
            .verify(VerifyDonationInput {
                pidx: charge.pidx,
                order_ref: charge.order_ref,
            })
            .await
            .unwrap();

        let updated = receipt.goal.unwrap();
        assert_eq!(updated.progress_minor, 1100 * 100);
        assert!(updated.is_reached);

        let stored = store.goal_snapshot(&creator.id).unwrap();
        assert_eq!(stored.progress_minor, 1100 * 100);
        assert!(stored.is_reached);
    }

    #[tokio::test]
    async fn test_donation_after_goal_reached_leaves_goal_untouched() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let creator = seeded_creator(&store);

        let mut goal = DonationGoal::open(
            creator.id,
            "Funded already".to_string(),
            None,
            Amount::from_units(1000).unwrap(),
        );
        goal.progress_minor = 1000 * 100;
        goal.is_reached = true;
        store.add_goal(&goal);

        let donations = use_case(&gateway, &store);
        let charge = donations
            .initiate(InitiateDonationInput {
                creator_id: creator.id,
                donor_user_id: None,
                amount_units: 100,
                message: None,
            })
            .await
            .unwrap();
        gateway.complete(&charge.pidx, "txn-after", 100 * 100);

        let receipt = donations
            .verify(VerifyDonationInput {
                pidx: charge.pidx,
                order_ref: charge.order_ref,
            })
            .await
            .unwrap();

        // No open goal to advance; the donation itself still lands
        assert!(receipt.goal.is_none());
        assert_eq!(store.donation_count(), 1);

        let stored = store.goal_snapshot(&creator.id).unwrap();
        assert_eq!(stored.progress_minor, 1000 * 100);
        assert!(stored.is_reached);
    }
}

#[cfg(test)]
mod membership_tests {
    use std::sync::Arc;

    use super::support::{FakeGateway, InMemoryFundingStore};
    use crate::application::config::FundingConfig;
    use crate::application::{
        InitiateEnrollmentInput, MembershipUseCase, VerifyEnrollmentInput,
    };
    use crate::domain::entity::{creator::Creator, membership::Membership};
    use crate::error::FundingError;
    use chrono::Utc;
    use kernel::amount::Amount;
    use kernel::id::UserId;

    fn use_case(
        gateway: &FakeGateway,
        store: &InMemoryFundingStore,
    ) -> MembershipUseCase<FakeGateway, InMemoryFundingStore> {
        MembershipUseCase::new(
            Arc::new(gateway.clone()),
            Arc::new(store.clone()),
            Arc::new(FundingConfig::default()),
        )
    }

    struct Fixture {
        tier1: Membership,
        tier2: Membership,
        tier3: Membership,
    }

    fn seed(store: &InMemoryFundingStore) -> Fixture {
        let creator = Creator::new(UserId::new(), None, None);
        store.add_creator(&creator);

        let tier = |n: i16, price: i64| {
            Membership::new(
                creator.id,
                format!("Tier {n}"),
                n,
                Amount::from_units(price).unwrap(),
                "benefits".to_string(),
            )
            .unwrap()
        };

        let tier1 = tier(1, 5);
        let tier2 = tier(2, 10);
        let tier3 = tier(3, 20);
        store.add_membership(&tier1);
        store.add_membership(&tier2);
        store.add_membership(&tier3);

        Fixture {
            tier1,
            tier2,
            tier3,
        }
    }

    /// Initiate + verify a fresh enroll or change in one go
    async fn paid_enrollment(
        memberships: &MembershipUseCase<FakeGateway, InMemoryFundingStore>,
        gateway: &FakeGateway,
        user: UserId,
        membership: &Membership,
        change: bool,
        txn: &str,
    ) -> Result<crate::application::EnrollmentReceipt, FundingError> {
        let charge = memberships
            .initiate(InitiateEnrollmentInput {
                user_id: user,
                membership_id: membership.id,
                change,
            })
            .await?;

        gateway.complete(&charge.pidx, txn, membership.amount.minor());

        memberships
            .verify(VerifyEnrollmentInput {
                pidx: charge.pidx,
                order_ref: charge.order_ref,
            })
            .await
    }

    #[tokio::test]
    async fn test_fresh_enroll_creates_active_enrollment() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let fixture = seed(&store);
        let memberships = use_case(&gateway, &store);
        let user = UserId::new();

        let receipt = paid_enrollment(&memberships, &gateway, user, &fixture.tier2, false, "t-1")
            .await
            .unwrap();

        assert!(receipt.enrollment.is_active);
        assert!(receipt.ended.is_none());
        assert_eq!(store.enrollment_count(), 1);
        assert_eq!(store.payment_count(), 1);
    }

    #[tokio::test]
    async fn test_double_enroll_with_same_creator_conflicts() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let fixture = seed(&store);
        let memberships = use_case(&gateway, &store);
        let user = UserId::new();

        paid_enrollment(&memberships, &gateway, user, &fixture.tier2, false, "t-1")
            .await
            .unwrap();

        let again = memberships
            .initiate(InitiateEnrollmentInput {
                user_id: user,
                membership_id: fixture.tier1.id,
                change: false,
            })
            .await;

        assert!(matches!(again, Err(FundingError::AlreadyEnrolled)));
    }

    #[tokio::test]
    async fn test_downgrade_while_active_is_refused() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let fixture = seed(&store);
        let memberships = use_case(&gateway, &store);
        let user = UserId::new();

        paid_enrollment(&memberships, &gateway, user, &fixture.tier2, false, "t-1")
            .await
            .unwrap();

        let downgrade = memberships
            .initiate(InitiateEnrollmentInput {
                user_id: user,
                membership_id: fixture.tier1.id,
                change: true,
            })
            .await;

        assert!(matches!(
            downgrade,
            Err(FundingError::DowngradeWhileActive)
        ));

        // The existing enrollment is untouched
        let enrollments = store.enrollments();
        assert_eq!(enrollments.len(), 1);
        assert!(enrollments[0].is_active);
        assert_eq!(enrollments[0].membership_id, fixture.tier2.id);
    }

    #[tokio::test]
    async fn test_upgrade_ends_old_term_and_starts_new() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let fixture = seed(&store);
        let memberships = use_case(&gateway, &store);
        let user = UserId::new();

        paid_enrollment(&memberships, &gateway, user, &fixture.tier2, false, "t-1")
            .await
            .unwrap();

        let receipt = paid_enrollment(&memberships, &gateway, user, &fixture.tier3, true, "t-2")
            .await
            .unwrap();

        let ended = receipt.ended.unwrap();
        assert!(!ended.is_active);
        assert!(ended.expires_at <= Utc::now());
        assert_eq!(ended.membership_id, fixture.tier2.id);

        assert!(receipt.enrollment.is_active);
        assert_eq!(receipt.enrollment.membership_id, fixture.tier3.id);

        // History: two rows, one active
        let enrollments = store.enrollments();
        assert_eq!(enrollments.len(), 2);
        assert_eq!(enrollments.iter().filter(|e| e.is_active).count(), 1);
    }

    #[tokio::test]
    async fn test_change_without_enrollment_is_not_found() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let fixture = seed(&store);
        let memberships = use_case(&gateway, &store);

        let result = memberships
            .initiate(InitiateEnrollmentInput {
                user_id: UserId::new(),
                membership_id: fixture.tier2.id,
                change: true,
            })
            .await;

        assert!(matches!(result, Err(FundingError::NotEnrolled)));
    }

    #[tokio::test]
    async fn test_enrollment_verify_is_exactly_once() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        let fixture = seed(&store);
        let memberships = use_case(&gateway, &store);
        let user = UserId::new();

        let charge = memberships
            .initiate(InitiateEnrollmentInput {
                user_id: user,
                membership_id: fixture.tier1.id,
                change: false,
            })
            .await
            .unwrap();
        gateway.complete(&charge.pidx, "t-dup", fixture.tier1.amount.minor());

        memberships
            .verify(VerifyEnrollmentInput {
                pidx: charge.pidx.clone(),
                order_ref: charge.order_ref.clone(),
            })
            .await
            .unwrap();

        let replay = memberships
            .verify(VerifyEnrollmentInput {
                pidx: charge.pidx,
                order_ref: charge.order_ref,
            })
            .await;

        assert!(matches!(replay, Err(FundingError::AlreadyProcessed)));
        assert_eq!(store.enrollment_count(), 1);
        assert_eq!(store.payment_count(), 1);
    }

    #[tokio::test]
    async fn test_donation_order_rejected_by_membership_verify() {
        let gateway = FakeGateway::new();
        let store = InMemoryFundingStore::new();
        seed(&store);
        let memberships = use_case(&gateway, &store);

        let donation_order = crate::domain::value_object::order_ref::OrderRef::donation(
            None,
            uuid::Uuid::new_v4(),
            None,
        );

        let result = memberships
            .verify(VerifyEnrollmentInput {
                pidx: "pidx-x".to_string(),
                order_ref: donation_order.encode(),
            })
            .await;

        assert!(matches!(result, Err(FundingError::InvalidInput(_))));
    }
}

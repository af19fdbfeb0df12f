//! HTTP Handlers
//!
//! Mutating endpoints run the authorization guard first: bearer claims,
//! then a role or ownership predicate. Donation initiation and
//! verification stay open because anonymous donations are allowed; the
//! payer identity, when present, is taken from the claims rather than the
//! request body.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use std::sync::Arc;

use auth::application::tokens::TokenIssuer;
use auth::middleware::AuthUser;
use auth::models::UserRole;
use kernel::id::{CreatorId, UserId};

use crate::application::config::FundingConfig;
use crate::application::{
    CreateGoalInput, CreateMembershipInput, DonationUseCase, GoalUseCase,
    InitiateDonationInput, InitiateEnrollmentInput, MembershipUseCase, VerifyDonationInput,
    VerifyEnrollmentInput,
};
use crate::domain::repository::{
    CreatorRepository, DonationRepository, GoalRepository, MembershipRepository,
    ReconciliationStore,
};
use crate::error::{FundingError, FundingResult};
use crate::gateway::PaymentGateway;
use crate::presentation::dto::{
    CreateGoalRequest, CreateMembershipRequest, DonationView, EnrollmentView, GoalView,
    InitiateChargeResponse, InitiateDonationRequest, InitiateEnrollmentRequest, MembershipView,
    VerifyDonationResponse, VerifyEnrollmentResponse, VerifyPaymentRequest,
};

/// Bound expected from the shared funding store
pub trait FundingStore:
    CreatorRepository
    + DonationRepository
    + GoalRepository
    + MembershipRepository
    + ReconciliationStore
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> FundingStore for T where
    T: CreatorRepository
        + DonationRepository
        + GoalRepository
        + MembershipRepository
        + ReconciliationStore
        + Clone
        + Send
        + Sync
        + 'static
{
}

/// Shared state for funding handlers
#[derive(Clone)]
pub struct FundingAppState<G, S>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    pub gateway: Arc<G>,
    pub store: Arc<S>,
    pub config: Arc<FundingConfig>,
    pub issuer: Arc<TokenIssuer>,
}

// ============================================================================
// Donations
// ============================================================================

/// POST /api/donations/initiate
pub async fn initiate_donation<G, S>(
    State(state): State<FundingAppState<G, S>>,
    headers: HeaderMap,
    Json(req): Json<InitiateDonationRequest>,
) -> FundingResult<Json<InitiateChargeResponse>>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    // Anonymous donations are allowed; a valid bearer makes the donation
    // attributable
    let donor = AuthUser::from_bearer(&headers, &state.issuer)
        .ok()
        .map(|caller| caller.user_id);

    let use_case = DonationUseCase::new(
        state.gateway.clone(),
        state.store.clone(),
        state.config.clone(),
    );

    let charge = use_case
        .initiate(InitiateDonationInput {
            creator_id: parse_id(&req.creator_id)?,
            donor_user_id: donor,
            amount_units: req.amount,
            message: req.message,
        })
        .await?;

    Ok(Json(InitiateChargeResponse {
        pidx: charge.pidx,
        payment_url: charge.payment_url,
        order_ref: charge.order_ref,
    }))
}

/// POST /api/donations/verify
pub async fn verify_donation<G, S>(
    State(state): State<FundingAppState<G, S>>,
    Json(req): Json<VerifyPaymentRequest>,
) -> FundingResult<Json<VerifyDonationResponse>>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let use_case = DonationUseCase::new(
        state.gateway.clone(),
        state.store.clone(),
        state.config.clone(),
    );

    let receipt = use_case
        .verify(VerifyDonationInput {
            pidx: req.pidx,
            order_ref: req.order_ref,
        })
        .await?;

    Ok(Json(VerifyDonationResponse {
        donation: DonationView::from(&receipt.donation),
        goal: receipt.goal.as_ref().map(GoalView::from),
    }))
}

/// GET /api/donations/creator/{creator_id}
pub async fn donations_by_creator<G, S>(
    State(state): State<FundingAppState<G, S>>,
    Path(creator_id): Path<String>,
) -> FundingResult<Json<Vec<DonationView>>>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let creator_id: CreatorId = parse_id(&creator_id)?;

    let use_case = DonationUseCase::new(
        state.gateway.clone(),
        state.store.clone(),
        state.config.clone(),
    );

    let donations = use_case.list_for_creator(&creator_id).await?;

    Ok(Json(donations.iter().map(DonationView::from).collect()))
}

// ============================================================================
// Goals
// ============================================================================

/// POST /api/goals
///
/// Only the owner of the creator profile (or an admin) may open a goal.
pub async fn create_goal<G, S>(
    State(state): State<FundingAppState<G, S>>,
    headers: HeaderMap,
    Json(req): Json<CreateGoalRequest>,
) -> FundingResult<Json<GoalView>>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let caller = AuthUser::from_bearer(&headers, &state.issuer).map_err(FundingError::Auth)?;

    let creator_id: CreatorId = parse_id(&req.creator_id)?;
    require_creator_owner(&state, &caller, &creator_id).await?;

    let use_case = GoalUseCase::new(state.store.clone());

    let goal = use_case
        .create(CreateGoalInput {
            creator_id,
            title: req.title,
            description: req.description,
            target_units: req.target,
        })
        .await?;

    Ok(Json(GoalView::from(&goal)))
}

/// GET /api/goals/creator/{creator_id}/active
pub async fn active_goal<G, S>(
    State(state): State<FundingAppState<G, S>>,
    Path(creator_id): Path<String>,
) -> FundingResult<Json<GoalView>>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let creator_id: CreatorId = parse_id(&creator_id)?;

    let use_case = GoalUseCase::new(state.store.clone());
    let goal = use_case.active_for_creator(&creator_id).await?;

    Ok(Json(GoalView::from(&goal)))
}

// ============================================================================
// Memberships
// ============================================================================

/// POST /api/memberships
pub async fn create_membership<G, S>(
    State(state): State<FundingAppState<G, S>>,
    headers: HeaderMap,
    Json(req): Json<CreateMembershipRequest>,
) -> FundingResult<Json<MembershipView>>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let caller = AuthUser::from_bearer(&headers, &state.issuer).map_err(FundingError::Auth)?;

    let creator_id: CreatorId = parse_id(&req.creator_id)?;
    require_creator_owner(&state, &caller, &creator_id).await?;

    let use_case = MembershipUseCase::new(
        state.gateway.clone(),
        state.store.clone(),
        state.config.clone(),
    );

    let membership = use_case
        .create_tier(CreateMembershipInput {
            creator_id,
            name: req.name,
            tier: req.tier,
            amount_units: req.amount,
            benefits: req.benefits,
        })
        .await?;

    Ok(Json(MembershipView::from(&membership)))
}

/// GET /api/memberships/creator/{creator_id}
pub async fn memberships_by_creator<G, S>(
    State(state): State<FundingAppState<G, S>>,
    Path(creator_id): Path<String>,
) -> FundingResult<Json<Vec<MembershipView>>>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let creator_id: CreatorId = parse_id(&creator_id)?;

    let use_case = MembershipUseCase::new(
        state.gateway.clone(),
        state.store.clone(),
        state.config.clone(),
    );

    let memberships = use_case.list_tiers(&creator_id).await?;

    Ok(Json(memberships.iter().map(MembershipView::from).collect()))
}

/// POST /api/memberships/initiate
///
/// The payer is always the caller; enrolling someone else is not a thing.
pub async fn initiate_enrollment<G, S>(
    State(state): State<FundingAppState<G, S>>,
    headers: HeaderMap,
    Json(req): Json<InitiateEnrollmentRequest>,
) -> FundingResult<Json<InitiateChargeResponse>>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let caller = AuthUser::from_bearer(&headers, &state.issuer).map_err(FundingError::Auth)?;

    let use_case = MembershipUseCase::new(
        state.gateway.clone(),
        state.store.clone(),
        state.config.clone(),
    );

    let charge = use_case
        .initiate(InitiateEnrollmentInput {
            user_id: caller.user_id,
            membership_id: parse_id(&req.membership_id)?,
            change: req.change,
        })
        .await?;

    Ok(Json(InitiateChargeResponse {
        pidx: charge.pidx,
        payment_url: charge.payment_url,
        order_ref: charge.order_ref,
    }))
}

/// POST /api/memberships/verify
pub async fn verify_enrollment<G, S>(
    State(state): State<FundingAppState<G, S>>,
    headers: HeaderMap,
    Json(req): Json<VerifyPaymentRequest>,
) -> FundingResult<Json<VerifyEnrollmentResponse>>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let caller = AuthUser::from_bearer(&headers, &state.issuer).map_err(FundingError::Auth)?;

    let use_case = MembershipUseCase::new(
        state.gateway.clone(),
        state.store.clone(),
        state.config.clone(),
    );

    let receipt = use_case
        .verify(VerifyEnrollmentInput {
            pidx: req.pidx,
            order_ref: req.order_ref,
        })
        .await?;

    // The charge's payer must be the caller (or an admin resolving on
    // their behalf)
    caller
        .require_owner_or_role(&receipt.enrollment.user_id, UserRole::Admin)
        .map_err(FundingError::Auth)?;

    Ok(Json(VerifyEnrollmentResponse {
        enrollment: EnrollmentView::from(&receipt.enrollment),
        ended_previous: receipt.ended.is_some(),
    }))
}

/// GET /api/memberships/enrolled/user/{user_id}
pub async fn enrollments_by_user<G, S>(
    State(state): State<FundingAppState<G, S>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> FundingResult<Json<Vec<EnrollmentView>>>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let caller = AuthUser::from_bearer(&headers, &state.issuer).map_err(FundingError::Auth)?;

    let user_id: UserId = parse_id(&user_id)?;
    caller
        .require_owner_or_role(&user_id, UserRole::Admin)
        .map_err(FundingError::Auth)?;

    let use_case = MembershipUseCase::new(
        state.gateway.clone(),
        state.store.clone(),
        state.config.clone(),
    );

    let enrollments = use_case.list_enrollments(&user_id).await?;

    Ok(Json(enrollments.iter().map(EnrollmentView::from).collect()))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolve the creator row and check the caller owns it (or is admin)
async fn require_creator_owner<G, S>(
    state: &FundingAppState<G, S>,
    caller: &AuthUser,
    creator_id: &CreatorId,
) -> FundingResult<()>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let creator = CreatorRepository::find_by_id(&*state.store, creator_id)
        .await?
        .ok_or(FundingError::CreatorNotFound)?;

    caller
        .require_owner_or_role(&creator.user_id, UserRole::Admin)
        .map_err(FundingError::Auth)?;

    Ok(())
}

fn parse_id<T>(raw: &str) -> FundingResult<kernel::id::Id<T>> {
    raw.parse()
        .map_err(|_| FundingError::InvalidInput("Malformed identifier".to_string()))
}

//! Funding Routers

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use auth::application::tokens::TokenIssuer;

use crate::application::config::FundingConfig;
use crate::gateway::PaymentGateway;
use crate::gateway::http::HttpPaymentGateway;
use crate::infra::postgres::PgFundingRepository;
use crate::presentation::handlers::{self, FundingAppState, FundingStore};

/// Create the donation router with PostgreSQL repository
pub fn donation_router(
    gateway: HttpPaymentGateway,
    store: PgFundingRepository,
    config: FundingConfig,
    issuer: Arc<TokenIssuer>,
) -> Router {
    donation_router_generic(gateway, store, config, issuer)
}

/// Create a generic donation router
pub fn donation_router_generic<G, S>(
    gateway: G,
    store: S,
    config: FundingConfig,
    issuer: Arc<TokenIssuer>,
) -> Router
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let state = app_state(gateway, store, config, issuer);

    Router::new()
        .route("/initiate", post(handlers::initiate_donation::<G, S>))
        .route("/verify", post(handlers::verify_donation::<G, S>))
        .route(
            "/creator/{creator_id}",
            get(handlers::donations_by_creator::<G, S>),
        )
        .with_state(state)
}

/// Create the membership router with PostgreSQL repository
pub fn membership_router(
    gateway: HttpPaymentGateway,
    store: PgFundingRepository,
    config: FundingConfig,
    issuer: Arc<TokenIssuer>,
) -> Router {
    membership_router_generic(gateway, store, config, issuer)
}

/// Create a generic membership router
pub fn membership_router_generic<G, S>(
    gateway: G,
    store: S,
    config: FundingConfig,
    issuer: Arc<TokenIssuer>,
) -> Router
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let state = app_state(gateway, store, config, issuer);

    Router::new()
        .route("/", post(handlers::create_membership::<G, S>))
        .route(
            "/creator/{creator_id}",
            get(handlers::memberships_by_creator::<G, S>),
        )
        .route("/initiate", post(handlers::initiate_enrollment::<G, S>))
        .route("/verify", post(handlers::verify_enrollment::<G, S>))
        .route(
            "/enrolled/user/{user_id}",
            get(handlers::enrollments_by_user::<G, S>),
        )
        .with_state(state)
}

/// Create the goal router with PostgreSQL repository
pub fn goal_router(
    gateway: HttpPaymentGateway,
    store: PgFundingRepository,
    config: FundingConfig,
    issuer: Arc<TokenIssuer>,
) -> Router {
    goal_router_generic(gateway, store, config, issuer)
}

/// Create a generic goal router
pub fn goal_router_generic<G, S>(
    gateway: G,
    store: S,
    config: FundingConfig,
    issuer: Arc<TokenIssuer>,
) -> Router
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    let state = app_state(gateway, store, config, issuer);

    Router::new()
        .route("/", post(handlers::create_goal::<G, S>))
        .route(
            "/creator/{creator_id}/active",
            get(handlers::active_goal::<G, S>),
        )
        .with_state(state)
}

fn app_state<G, S>(
    gateway: G,
    store: S,
    config: FundingConfig,
    issuer: Arc<TokenIssuer>,
) -> FundingAppState<G, S>
where
    G: PaymentGateway + Clone + Send + Sync + 'static,
    S: FundingStore,
{
    FundingAppState {
        gateway: Arc::new(gateway),
        store: Arc::new(store),
        config: Arc::new(config),
        issuer,
    }
}

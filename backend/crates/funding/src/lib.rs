//! Funding Backend Module
//!
//! Donations, membership enrollment and the payment reconciliation engine
//! that feeds them.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `gateway/` - Third-party payment gateway client
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Reconciliation Model
//! Payments follow a two-phase, caller-driven flow: an initiate call
//! builds a gateway charge whose order id carries the full intent, and a
//! verify call confirms the charge with the gateway and applies the domain
//! effect. The gateway is authoritative for payment status; nothing here
//! ever creates a donation or enrollment without a confirmed payment row,
//! and the unique index on the gateway transaction id makes verification
//! exactly-once under concurrent retries.

pub mod application;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod infra;
pub mod presentation;

mod tests;

// Re-exports for convenience
pub use application::config::FundingConfig;
pub use error::{FundingError, FundingResult};
pub use gateway::http::HttpPaymentGateway;
pub use infra::postgres::PgFundingRepository;
pub use presentation::router::{donation_router, goal_router, membership_router};

pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::infra::postgres::PgFundingRepository as FundingStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

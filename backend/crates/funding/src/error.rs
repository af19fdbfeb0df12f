//! Funding Error Types
//!
//! This module provides funding-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::gateway::GatewayError;

/// Funding-specific result type alias
pub type FundingResult<T> = Result<T, FundingError>;

/// Funding-specific error variants
#[derive(Debug, Error)]
pub enum FundingError {
    /// Creator profile not found
    #[error("Creator not found")]
    CreatorNotFound,

    /// Membership tier not found (or deleted)
    #[error("Membership not found")]
    MembershipNotFound,

    /// The payer holds no active enrollment with this creator
    #[error("User is not enrolled in a membership of this creator")]
    NotEnrolled,

    /// Fresh enroll while an enrollment with this creator is still active
    #[error("User is already enrolled in a membership of this creator")]
    AlreadyEnrolled,

    /// Tier change to a lower tier while the current enrollment is active
    #[error("Cannot downgrade while the current enrollment is active")]
    DowngradeWhileActive,

    /// Donation not found
    #[error("Donation not found")]
    DonationNotFound,

    /// This gateway transaction was already reconciled
    #[error("Payment has already been processed")]
    AlreadyProcessed,

    /// The gateway does not report the charge as completed
    #[error("Payment is not completed")]
    PaymentNotCompleted,

    /// A creator can only have one open goal at a time
    #[error("Creator already has an active goal")]
    ActiveGoalExists,

    /// No open goal for this creator
    #[error("No active goal for this creator")]
    GoalNotFound,

    /// Malformed or missing request data
    #[error("{0}")]
    InvalidInput(String),

    /// Third-party gateway failure
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Guard failures from the auth layer
    #[error(transparent)]
    Auth(#[from] auth::AuthError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FundingError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            FundingError::CreatorNotFound
            | FundingError::MembershipNotFound
            | FundingError::NotEnrolled
            | FundingError::DonationNotFound
            | FundingError::GoalNotFound => StatusCode::NOT_FOUND,
            FundingError::AlreadyEnrolled
            | FundingError::AlreadyProcessed
            | FundingError::ActiveGoalExists => StatusCode::CONFLICT,
            FundingError::DowngradeWhileActive | FundingError::PaymentNotCompleted => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            FundingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            FundingError::Gateway(GatewayError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            FundingError::Gateway(_) => StatusCode::BAD_GATEWAY,
            FundingError::Auth(e) => e.status_code(),
            FundingError::Database(_) | FundingError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FundingError::CreatorNotFound
            | FundingError::MembershipNotFound
            | FundingError::NotEnrolled
            | FundingError::DonationNotFound
            | FundingError::GoalNotFound => ErrorKind::NotFound,
            FundingError::AlreadyEnrolled
            | FundingError::AlreadyProcessed
            | FundingError::ActiveGoalExists => ErrorKind::Conflict,
            FundingError::DowngradeWhileActive | FundingError::PaymentNotCompleted => {
                ErrorKind::UnprocessableEntity
            }
            FundingError::InvalidInput(_) => ErrorKind::BadRequest,
            FundingError::Gateway(GatewayError::Timeout) => ErrorKind::GatewayTimeout,
            FundingError::Gateway(_) => ErrorKind::BadGateway,
            FundingError::Auth(e) => e.kind(),
            FundingError::Database(_) | FundingError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            FundingError::Gateway(_) => err.with_action("Please retry in a moment"),
            FundingError::PaymentNotCompleted => {
                err.with_action("Complete the payment with the provider first")
            }
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            FundingError::Database(e) => {
                tracing::error!(error = %e, "Funding database error");
            }
            FundingError::Internal(msg) => {
                tracing::error!(message = %msg, "Funding internal error");
            }
            FundingError::Gateway(e) => {
                tracing::warn!(error = %e, "Payment gateway failure");
            }
            FundingError::AlreadyProcessed => {
                tracing::debug!("Duplicate payment verification rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Funding error");
            }
        }
    }
}

impl IntoResponse for FundingError {
    fn into_response(self) -> Response {
        match self {
            // Let the auth layer keep its own logging and response shape
            FundingError::Auth(e) => e.into_response(),
            other => {
                other.log();
                other.to_app_error().into_response()
            }
        }
    }
}

impl From<kernel::amount::AmountError> for FundingError {
    fn from(err: kernel::amount::AmountError) -> Self {
        FundingError::InvalidInput(err.to_string())
    }
}

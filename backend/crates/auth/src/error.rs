//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Email already registered
    #[error("A user with this email already exists")]
    EmailTaken,

    /// User name already exists
    #[error("A user with this username already exists")]
    UserNameTaken,

    /// Invalid credentials (unknown email or wrong password)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account has not completed email verification
    #[error("Account is not verified")]
    AccountNotVerified,

    /// No valid bearer token on the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Valid token, insufficient privilege
    #[error("You do not have the required role")]
    Forbidden,

    /// Refresh token unknown to the ledger
    #[error("Invalid refresh token")]
    RefreshTokenNotFound,

    /// Refresh token past its expiry
    #[error("Refresh token has expired")]
    TokenExpired,

    /// Refresh token already rotated or revoked - possible replay
    #[error("Refresh token has been revoked")]
    TokenRevoked,

    /// Access token signing failed (key misconfiguration)
    #[error("Failed to issue access token")]
    TokenIssue(#[source] jsonwebtoken::errors::Error),

    /// Verification token unknown (or issued for a different purpose)
    #[error("Verification token not found")]
    VerificationNotFound,

    /// Verification token expired; the user can request a resend
    #[error("Verification token has expired")]
    VerificationExpired,

    /// Malformed or missing request data
    #[error("{0}")]
    InvalidInput(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UserNotFound | AuthError::VerificationNotFound => StatusCode::NOT_FOUND,
            AuthError::EmailTaken | AuthError::UserNameTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::RefreshTokenNotFound
            | AuthError::TokenExpired
            | AuthError::TokenRevoked => StatusCode::UNAUTHORIZED,
            AuthError::AccountNotVerified | AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::VerificationExpired => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::TokenIssue(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound | AuthError::VerificationNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken | AuthError::UserNameTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::RefreshTokenNotFound
            | AuthError::TokenExpired
            | AuthError::TokenRevoked => ErrorKind::Unauthorized,
            AuthError::AccountNotVerified | AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::VerificationExpired => ErrorKind::UnprocessableEntity,
            AuthError::InvalidInput(_) => ErrorKind::BadRequest,
            AuthError::TokenIssue(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            AuthError::VerificationExpired => {
                err.with_action("Request a new verification link")
            }
            AuthError::TokenExpired | AuthError::TokenRevoked => {
                err.with_action("Please sign in again")
            }
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::TokenIssue(e) => {
                tracing::error!(error = %e, "Access token signing failed");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::TokenRevoked => {
                // A revoked token being presented again is the replay signal
                tracing::warn!("Revoked refresh token presented, possible replay");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::InvalidInput(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::InvalidInput(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        match err {
            platform::password::PasswordHashError::InvalidHashFormat => {
                AuthError::InvalidInput("Malformed password hash".to_string())
            }
            other => AuthError::Internal(other.to_string()),
        }
    }
}

//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;
use uuid::Uuid;

use platform::mailer::Mailer;

use crate::application::config::AuthConfig;
use crate::application::tokens::TokenIssuer;
use crate::application::{
    LoginInput, LoginUseCase, LogoutUseCase, PasswordResetUseCase, RefreshSessionUseCase,
    RegisterInput, RegisterUseCase, VerificationUseCase,
};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RefreshRequest,
    RefreshResponse, RegisterRequest, RegisterResponse, ResendVerificationRequest,
    ResetPasswordRequest, UserView, VerifyEmailRequest,
};
use crate::presentation::middleware::AuthUser;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R, M>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<AuthConfig>,
    pub issuer: Arc<TokenIssuer>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<Json<RegisterResponse>>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.mailer.clone());

    let input = RegisterInput {
        email: req.email,
        user_name: req.user_name,
        first_name: req.first_name,
        last_name: req.last_name,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(RegisterResponse {
        user: UserView::from(&output.user),
        mail_sent: output.mail_sent,
    }))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.repo.clone(), state.issuer.clone());

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    // Refresh token travels in the cookie; the access token only in the body
    let cookie = state
        .config
        .refresh_cookie
        .build_set_cookie(&output.refresh.token, output.refresh.expires_at);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            access_token: output.access.token,
            access_token_expires_at: output.access.expires_at,
            refresh_token: output.refresh.token,
            refresh_token_expires_at: output.refresh.expires_at,
            user: UserView::from(&output.user),
        }),
    ))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
///
/// The refresh token is read from the cookie when present, else from the
/// request body (non-browser clients).
pub async fn refresh<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let token_value = extract_refresh_token(&state.config, &headers)
        .or_else(|| body.and_then(|Json(req)| req.refresh_token))
        .ok_or_else(|| AuthError::InvalidInput("Refresh token is missing".to_string()))?;

    let use_case =
        RefreshSessionUseCase::new(state.repo.clone(), state.repo.clone(), state.issuer.clone());

    let output = use_case.execute(&token_value).await?;

    let cookie = state
        .config
        .refresh_cookie
        .build_set_cookie(&output.refresh.token, output.refresh.expires_at);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(RefreshResponse {
            access_token: output.access.token,
            access_token_expires_at: output.access.expires_at,
            refresh_token: output.refresh.token,
            refresh_token_expires_at: output.refresh.expires_at,
        }),
    ))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
pub async fn logout<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    if let Some(token) = extract_refresh_token(&state.config, &headers) {
        let use_case = LogoutUseCase::new(state.repo.clone());
        // Ignore errors - just clear the cookie
        let _ = use_case.execute(&token).await;
    }

    let cookie = state.config.refresh_cookie.build_delete_cookie();

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

/// POST /api/auth/logout-all
///
/// Requires a valid access token; revokes every refresh token of the caller.
pub async fn logout_all<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let caller = AuthUser::from_bearer(&headers, &state.issuer)?;

    let use_case = LogoutUseCase::new(state.repo.clone());
    use_case.execute_all(&caller.user_id).await?;

    let cookie = state.config.refresh_cookie.build_delete_cookie();

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Email verification
// ============================================================================

/// POST /api/auth/verify-email
pub async fn verify_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<VerifyEmailRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let token = parse_token(&req.token)?;

    let use_case = VerificationUseCase::new(state.repo.clone(), state.mailer.clone());
    use_case.verify_email(token).await?;

    Ok(Json(MessageResponse {
        message: "Account verified".to_string(),
        mail_sent: None,
    }))
}

/// POST /api/auth/resend-verification
pub async fn resend_verification<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<ResendVerificationRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case = VerificationUseCase::new(state.repo.clone(), state.mailer.clone());
    let mail_sent = use_case.resend(&req.email).await?;

    Ok(Json(MessageResponse {
        message: "Verification mail issued".to_string(),
        mail_sent: Some(mail_sent),
    }))
}

// ============================================================================
// Password reset
// ============================================================================

/// POST /api/auth/forgot-password
pub async fn forgot_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case =
        PasswordResetUseCase::new(state.repo.clone(), state.repo.clone(), state.mailer.clone());
    let mail_sent = use_case.forgot(&req.email).await?;

    Ok(Json(MessageResponse {
        message: "Password reset mail issued".to_string(),
        mail_sent: Some(mail_sent),
    }))
}

/// POST /api/auth/reset-password
pub async fn reset_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let token = parse_token(&req.token)?;

    let use_case =
        PasswordResetUseCase::new(state.repo.clone(), state.repo.clone(), state.mailer.clone());
    use_case.reset(token, req.new_password).await?;

    Ok(Json(MessageResponse {
        message: "Password updated, please sign in again".to_string(),
        mail_sent: None,
    }))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn extract_refresh_token(config: &AuthConfig, headers: &HeaderMap) -> Option<String> {
    platform::cookie::extract_cookie(headers, &config.refresh_cookie.name)
}

fn parse_token(raw: &str) -> AuthResult<Uuid> {
    raw.parse()
        .map_err(|_| AuthError::InvalidInput("Malformed verification token".to_string()))
}

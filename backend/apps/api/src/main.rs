//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use auth::application::tokens::TokenIssuer;
use auth::{AuthConfig, PgAuthRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use funding::{
    FundingConfig, HttpPaymentGateway, PgFundingRepository, donation_router, goal_router,
    membership_router,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,funding=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: drop expired refresh tokens
    // Errors here should not prevent server startup
    let auth_store_for_cleanup = PgAuthRepository::new(pool.clone());
    match auth_store_for_cleanup.cleanup_expired().await {
        Ok(tokens) => {
            tracing::info!(tokens_deleted = tokens, "Refresh token cleanup completed");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Refresh token cleanup failed, continuing anyway"
            );
        }
    }

    // Auth configuration
    let auth_config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        // In production, load the signing key from environment
        let secret_b64 = env::var("JWT_SECRET").expect("JWT_SECRET must be set in production");
        let jwt_secret = Engine::decode(&general_purpose::STANDARD, &secret_b64)?;
        anyhow::ensure!(jwt_secret.len() >= 32, "JWT_SECRET must be at least 32 bytes");
        AuthConfig {
            jwt_secret,
            ..AuthConfig::default()
        }
    };

    // Funding configuration
    let funding_config = FundingConfig {
        gateway_base_url: env::var("GATEWAY_BASE_URL")
            .unwrap_or_else(|_| FundingConfig::development().gateway_base_url),
        gateway_secret_key: env::var("GATEWAY_SECRET_KEY").unwrap_or_default(),
        return_url: env::var("PAYMENT_RETURN_URL")
            .unwrap_or_else(|_| FundingConfig::default().return_url),
        website_url: env::var("WEBSITE_URL")
            .unwrap_or_else(|_| FundingConfig::default().website_url),
        ..FundingConfig::default()
    };

    let payment_gateway = HttpPaymentGateway::new(
        funding_config.gateway_base_url.clone(),
        funding_config.gateway_secret_key.clone(),
        funding_config.gateway_timeout,
    )
    .map_err(|e| anyhow::anyhow!("Failed to build gateway client: {e}"))?;

    let auth_store = PgAuthRepository::new(pool.clone());
    let funding_store = PgFundingRepository::new(pool.clone());
    let issuer = Arc::new(TokenIssuer::new(&auth_config));

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/auth", auth_router(auth_store, auth_config))
        .nest(
            "/api/donations",
            donation_router(
                payment_gateway.clone(),
                funding_store.clone(),
                funding_config.clone(),
                issuer.clone(),
            ),
        )
        .nest(
            "/api/memberships",
            membership_router(
                payment_gateway.clone(),
                funding_store.clone(),
                funding_config.clone(),
                issuer.clone(),
            ),
        )
        .nest(
            "/api/goals",
            goal_router(payment_gateway, funding_store, funding_config, issuer),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

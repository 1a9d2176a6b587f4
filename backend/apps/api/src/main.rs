//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are
//! `identity::AuthError` rendered as problem bodies.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use axum::{
    http,
    http::{Method, header},
};
use identity::{
    AuthConfig, EmailTransport, GoogleIdentityProvider, GoogleOAuthConfig, IdentityAppState,
    PgIdentityRepository, SendGridConfig, identity_router,
};
use platform::clock::SystemClock;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_CLIENT_URL: &str = "http://localhost:40922";

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_access_ttl(minutes: &str) -> anyhow::Result<Duration> {
    let minutes: u64 = minutes
        .trim()
        .parse()
        .context("ACCESS_TOKEN_EXPIRE_MINUTES must be a whole number of minutes")?;
    let secs = minutes
        .checked_mul(60)
        .context("ACCESS_TOKEN_EXPIRE_MINUTES is too large")?;
    Ok(Duration::from_secs(secs))
}

/// Token, pepper and cookie settings from the environment
///
/// Debug builds fall back to random secrets; release builds require both.
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    };

    match (
        non_empty_var("JWT_SECRET_KEY"),
        non_empty_var("JWT_REFRESH_SECRET_KEY"),
    ) {
        (Some(access), Some(refresh)) => {
            config.access_token_secret = access;
            config.refresh_token_secret = refresh;
        }
        _ if cfg!(debug_assertions) => {
            tracing::warn!("JWT secrets not set, using random development secrets");
        }
        _ => bail!("JWT_SECRET_KEY and JWT_REFRESH_SECRET_KEY must be set in production"),
    }

    if let Some(minutes) = non_empty_var("ACCESS_TOKEN_EXPIRE_MINUTES") {
        config.access_token_ttl = parse_access_ttl(&minutes)?;
    }

    config.password_pepper = non_empty_var("PASSWORD_PEPPER").map(String::into_bytes);

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid auth configuration: {e}"))?;

    Ok(config)
}

fn load_google_config() -> GoogleOAuthConfig {
    let client_url = non_empty_var("CLIENT_URL").unwrap_or_else(|| DEFAULT_CLIENT_URL.to_string());
    let client_id = non_empty_var("GOOGLE_CLIENT_ID");
    let client_secret = non_empty_var("GOOGLE_CLIENT_SECRET");

    if client_id.is_none() || client_secret.is_none() {
        tracing::warn!("Google OAuth is not configured, /auth/google will fail upstream");
    }

    GoogleOAuthConfig::new(
        client_id.unwrap_or_default(),
        client_secret.unwrap_or_default(),
        &client_url,
    )
}

fn load_sendgrid_config() -> Option<SendGridConfig> {
    match (non_empty_var("SENDGRID_API_KEY"), non_empty_var("SENDGRID_EMAIL")) {
        (Some(api_key), Some(sender)) => Some(SendGridConfig::new(api_key, sender)),
        _ => {
            tracing::warn!("SendGrid is not configured, verification codes will not be mailed");
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,identity=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url =
        env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

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

    // Identity wiring
    let auth_config = load_auth_config()?;
    tracing::info!(config = ?auth_config, "Auth configuration loaded");

    let state = IdentityAppState::new(
        PgIdentityRepository::new(pool.clone()),
        EmailTransport::from_config(load_sendgrid_config()),
        GoogleIdentityProvider::new(load_google_config()),
        auth_config,
        Arc::new(SystemClock),
    );

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

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
    let app = identity_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = non_empty_var("BIND_ADDR")
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("BIND_ADDR must be a socket address such as 0.0.0.0:31113")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

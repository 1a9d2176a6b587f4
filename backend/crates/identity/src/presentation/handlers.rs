//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use platform::clock::Clock;

use crate::application::config::AuthConfig;
use crate::application::{
    CredentialHasher, FederatedLoginInput, FederatedLoginUseCase, LoginInput, LoginUseCase, RegisterInput,
    RegisterUseCase, RequestVerificationUseCase, TokenIssuer, VerifyEmailInput,
    VerifyEmailUseCase,
};
use crate::domain::entity::user::UserProfile;
use crate::domain::gateway::{EmailSender, IdentityProvider};
use crate::domain::repository::{UserRepository, VerificationTokenRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{CredentialsRequest, GoogleCallbackQuery, OkResponse, TokenResponse};
use crate::presentation::middleware::CurrentUser;

/// Shared state for identity handlers
pub struct IdentityAppState<R, E, P> {
    pub repo: Arc<R>,
    pub email_sender: Arc<E>,
    pub provider: Arc<P>,
    pub config: Arc<AuthConfig>,
    pub issuer: Arc<TokenIssuer>,
    pub hasher: Arc<CredentialHasher>,
    pub clock: Arc<dyn Clock>,
}

impl<R, E, P> IdentityAppState<R, E, P> {
    pub fn new(
        repo: R,
        email_sender: E,
        provider: P,
        config: AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let config = Arc::new(config);
        let issuer = Arc::new(TokenIssuer::new(config.clone(), clock.clone()));
        let hasher = Arc::new(CredentialHasher::new(config.clone()));
        Self {
            repo: Arc::new(repo),
            email_sender: Arc::new(email_sender),
            provider: Arc::new(provider),
            config,
            issuer,
            hasher,
            clock,
        }
    }
}

impl<R, E, P> Clone for IdentityAppState<R, E, P> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            email_sender: self.email_sender.clone(),
            provider: self.provider.clone(),
            config: self.config.clone(),
            issuer: self.issuer.clone(),
            hasher: self.hasher.clone(),
            clock: self.clock.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /auth/register
pub async fn register<R, E, P>(
    State(state): State<IdentityAppState<R, E, P>>,
    Json(req): Json<CredentialsRequest>,
) -> AuthResult<Json<UserProfile>>
where
    R: UserRepository + VerificationTokenRepository + Clone + Send + Sync + 'static,
    E: EmailSender + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.email_sender.clone(),
        state.hasher.clone(),
        state.clock.clone(),
    );

    let output = use_case
        .execute(RegisterInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(output.user))
}

// ============================================================================
// Login
// ============================================================================

/// POST /auth/login
///
/// Returns the token pair and sets the access cookie.
pub async fn login<R, E, P>(
    State(state): State<IdentityAppState<R, E, P>>,
    Json(req): Json<CredentialsRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + VerificationTokenRepository + Clone + Send + Sync + 'static,
    E: EmailSender + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.issuer.clone(),
        state.hasher.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    let cookie_value = format!("Bearer {}", output.tokens.access_token);
    let cookie = platform::cookie::set_cookie_header(&state.config.access_cookie(), &cookie_value)
        .ok_or_else(|| AuthError::Internal("access cookie is not a valid header".to_string()))?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(TokenResponse::from(output.tokens)),
    ))
}

// ============================================================================
// Google
// ============================================================================

/// POST /auth/google?code=...
pub async fn google_login<R, E, P>(
    State(state): State<IdentityAppState<R, E, P>>,
    Query(query): Query<GoogleCallbackQuery>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + VerificationTokenRepository + Clone + Send + Sync + 'static,
    E: EmailSender + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let use_case = FederatedLoginUseCase::new(
        state.repo.clone(),
        state.provider.clone(),
        state.issuer.clone(),
        state.clock.clone(),
    );

    let output = use_case
        .execute(FederatedLoginInput { code: query.code })
        .await?;

    Ok(Json(TokenResponse::from(output.tokens)))
}

// ============================================================================
// Verification
// ============================================================================

/// POST /auth/verify/new
pub async fn request_verification<R, E, P>(
    State(state): State<IdentityAppState<R, E, P>>,
    CurrentUser(user): CurrentUser,
) -> AuthResult<Json<OkResponse>>
where
    R: UserRepository + VerificationTokenRepository + Clone + Send + Sync + 'static,
    E: EmailSender + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let use_case = RequestVerificationUseCase::new(
        state.repo.clone(),
        state.email_sender.clone(),
        state.clock.clone(),
    );

    use_case.execute(&user).await?;

    Ok(Json(OkResponse::ok()))
}

/// POST /auth/verify/{token}
pub async fn verify_email<R, E, P>(
    State(state): State<IdentityAppState<R, E, P>>,
    CurrentUser(user): CurrentUser,
    Path(token): Path<String>,
) -> AuthResult<Json<OkResponse>>
where
    R: UserRepository + VerificationTokenRepository + Clone + Send + Sync + 'static,
    E: EmailSender + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let use_case = VerifyEmailUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.clock.clone(),
    );

    use_case
        .execute(VerifyEmailInput {
            user_id: user.user_id.to_string(),
            token,
        })
        .await?;

    Ok(Json(OkResponse::ok()))
}

// ============================================================================
// Users
// ============================================================================

/// GET /users/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(user.profile())
}

/// GET /health
pub async fn health() -> Json<OkResponse> {
    Json(OkResponse::ok())
}

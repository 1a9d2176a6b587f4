//! Identity Router

use axum::{
    Router,
    routing::{get, post},
};

use crate::domain::gateway::{EmailSender, IdentityProvider};
use crate::domain::repository::{UserRepository, VerificationTokenRepository};
use crate::presentation::handlers::{self, IdentityAppState};

/// Create the identity router for any store / sender / provider combination
pub fn identity_router<R, E, P>(state: IdentityAppState<R, E, P>) -> Router
where
    R: UserRepository + VerificationTokenRepository + Clone + Send + Sync + 'static,
    E: EmailSender + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/auth/register", post(handlers::register::<R, E, P>))
        .route("/auth/login", post(handlers::login::<R, E, P>))
        .route("/auth/google", post(handlers::google_login::<R, E, P>))
        .route(
            "/auth/verify/new",
            post(handlers::request_verification::<R, E, P>),
        )
        .route(
            "/auth/verify/{token}",
            post(handlers::verify_email::<R, E, P>),
        )
        .route("/users/me", get(handlers::me))
        .route("/health", get(handlers::health))
        .with_state(state)
}

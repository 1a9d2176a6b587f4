//! Bearer Extraction
//!
//! Resolves the caller from `Authorization: Bearer <token>` or, failing
//! that, from the access cookie set at login (`Bearer <token>`).

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::application::CurrentUserUseCase;
use crate::domain::entity::user::User;
use crate::domain::gateway::{EmailSender, IdentityProvider};
use crate::domain::repository::{UserRepository, VerificationTokenRepository};
use crate::error::AuthError;
use crate::presentation::handlers::IdentityAppState;

const BEARER_PREFIX: &str = "Bearer ";

fn strip_bearer(value: &str) -> Option<&str> {
    let value = value.trim();
    let prefix = value.get(..BEARER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    let token = value[BEARER_PREFIX.len()..].trim();
    (!token.is_empty()).then_some(token)
}

/// Access token from the Authorization header, else from the cookie
pub fn bearer_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(strip_bearer)
        .map(str::to_string);

    from_header.or_else(|| {
        platform::cookie::extract_cookie(headers, cookie_name)
            .as_deref()
            .and_then(strip_bearer)
            .map(str::to_string)
    })
}

/// Authenticated, enabled caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<R, E, P> FromRequestParts<IdentityAppState<R, E, P>> for CurrentUser
where
    R: UserRepository + VerificationTokenRepository + Clone + Send + Sync + 'static,
    E: EmailSender + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &IdentityAppState<R, E, P>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers, &state.config.access_cookie_name)
            .ok_or(AuthError::InvalidBearerToken)?;

        let use_case = CurrentUserUseCase::new(state.repo.clone(), state.issuer.clone());
        let user = use_case.execute(&token).await?;

        Ok(CurrentUser(user))
    }
}

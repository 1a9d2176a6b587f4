//! Outbound collaborator traits
//!
//! Email delivery and external identity providers. Implementations are in
//! `infra::email` and `infra::google`.

use crate::domain::entity::user::ExternalProfile;
use crate::domain::value_object::{
    auth_provider::AuthProvider, email::Email, verification_code::VerificationCode,
};
use crate::error::AuthResult;

/// Delivers verification codes. Failures are `AuthError::Dispatch`.
#[trait_variant::make(EmailSender: Send)]
pub trait LocalEmailSender {
    async fn send_verification_code(
        &self,
        recipient: &Email,
        code: &VerificationCode,
    ) -> AuthResult<()>;
}

/// OAuth2 authorization-code bridge. Failures are `AuthError::ExternalAuth`.
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Which provider accounts created through this bridge belong to
    fn provider(&self) -> AuthProvider;

    /// Exchange an authorization code for a provider access token
    async fn exchange_code(&self, code: &str) -> AuthResult<String>;

    /// Fetch the verified profile behind a provider access token
    async fn fetch_profile(&self, access_token: &str) -> AuthResult<ExternalProfile>;
}

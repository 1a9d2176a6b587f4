//! Federated Login Use Case
//!
//! Exchanges an OAuth2 authorization code for a verified profile, then
//! creates or refreshes the matching account and issues tokens keyed by
//! email.
//!
//! An existing account with the same email absorbs the external profile
//! whatever its existing provider. Email and external subject are not
//! re-bound.

use std::sync::Arc;

use platform::clock::Clock;

use crate::application::token_issuer::{TokenIssuer, TokenPair};
use crate::domain::entity::user::User;
use crate::domain::gateway::IdentityProvider;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct FederatedLoginInput {
    /// Authorization code from the provider callback
    pub code: String,
}

pub struct FederatedLoginOutput {
    pub tokens: TokenPair,
    /// True when this login created the account
    pub created: bool,
}

pub struct FederatedLoginUseCase<U, P>
where
    U: UserRepository,
    P: IdentityProvider,
{
    user_repo: Arc<U>,
    provider: Arc<P>,
    issuer: Arc<TokenIssuer>,
    clock: Arc<dyn Clock>,
}

impl<U, P> FederatedLoginUseCase<U, P>
where
    U: UserRepository,
    P: IdentityProvider,
{
    pub fn new(
        user_repo: Arc<U>,
        provider: Arc<P>,
        issuer: Arc<TokenIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            provider,
            issuer,
            clock,
        }
    }

    pub async fn execute(&self, input: FederatedLoginInput) -> AuthResult<FederatedLoginOutput> {
        let code = input.code.trim();
        if code.is_empty() {
            return Err(AuthError::MissingParameter("code"));
        }

        let provider_token = self.provider.exchange_code(code).await?;
        let profile = self.provider.fetch_profile(&provider_token).await?;

        let created = match self.user_repo.find_by_email(&profile.email).await? {
            None => {
                let user = User::new_federated(self.provider.provider(), &profile, self.clock.now());
                self.user_repo.create_federated(&user).await?;
                tracing::info!(
                    user_id = %user.user_id,
                    provider = %user.provider,
                    "Federated user created"
                );
                true
            }
            Some(existing) => {
                if !existing.provider.is_federated() {
                    tracing::warn!(
                        user_id = %existing.user_id,
                        provider = %self.provider.provider(),
                        "Merging federated profile into local account"
                    );
                }
                self.user_repo
                    .update_federated_profile(
                        &profile.email,
                        profile.given_name.as_deref(),
                        profile.family_name.as_deref(),
                        profile.email_verified,
                    )
                    .await?;
                tracing::info!(user_id = %existing.user_id, "Federated profile refreshed");
                false
            }
        };

        let tokens = self.issuer.issue_pair(profile.email.as_str())?;

        Ok(FederatedLoginOutput { tokens, created })
    }
}

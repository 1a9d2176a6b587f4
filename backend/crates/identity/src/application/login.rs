//! Login Use Case
//!
//! Local email + password authentication. An unknown email, a federated
//! account without a password, and a wrong password all produce the same
//! `InvalidCredentials` error.

use std::sync::Arc;

use crate::application::credential::CredentialHasher;
use crate::application::token_issuer::{TokenIssuer, TokenPair};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login output
pub struct LoginOutput {
    pub tokens: TokenPair,
}

/// Login use case
pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    issuer: Arc<TokenIssuer>,
    hasher: Arc<CredentialHasher>,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, issuer: Arc<TokenIssuer>, hasher: Arc<CredentialHasher>) -> Self {
        Self {
            user_repo,
            issuer,
            hasher,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let raw_password = RawPassword::for_login(input.password);

        let user = match Email::new(input.email) {
            Ok(email) => self.user_repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let digest = user.as_ref().and_then(|u| u.password_hash.clone());
        let password_valid = self.hasher.verify(raw_password, digest).await?;

        let user = match user {
            Some(user) if password_valid => user,
            _ => return Err(AuthError::InvalidCredentials),
        };

        // Disabled state is only disclosed after a correct password
        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        let tokens = self.issuer.issue_pair(user.email.as_str())?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(LoginOutput { tokens })
    }
}

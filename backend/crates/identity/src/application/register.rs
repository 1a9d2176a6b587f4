//! Register Use Case
//!
//! Creates a local account and sends its first verification code.
//!
//! Registration and dispatch are coupled: if the email cannot be delivered
//! the error propagates, while the user and token rows already written stay
//! in place (unverified; a new code can be requested once this one expires).

use std::sync::Arc;

use platform::clock::Clock;

use crate::application::credential::CredentialHasher;
use crate::domain::entity::{
    user::{User, UserProfile},
    verification_token::VerificationToken,
};
use crate::domain::gateway::EmailSender;
use crate::domain::repository::{UserRepository, VerificationTokenRepository};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
}

/// Register output
pub struct RegisterOutput {
    /// Created user, without password digest or disabled flag
    pub user: UserProfile,
}

/// Register use case
pub struct RegisterUseCase<U, T, E>
where
    U: UserRepository,
    T: VerificationTokenRepository,
    E: EmailSender,
{
    user_repo: Arc<U>,
    token_repo: Arc<T>,
    email_sender: Arc<E>,
    hasher: Arc<CredentialHasher>,
    clock: Arc<dyn Clock>,
}

impl<U, T, E> RegisterUseCase<U, T, E>
where
    U: UserRepository,
    T: VerificationTokenRepository,
    E: EmailSender,
{
    pub fn new(
        user_repo: Arc<U>,
        token_repo: Arc<T>,
        email_sender: Arc<E>,
        hasher: Arc<CredentialHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            email_sender,
            hasher,
            clock,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        // Presence first, then format, then policy
        if input.email.trim().is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }
        if input.password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }
        let email = Email::new(input.email)?;
        let raw_password = RawPassword::new(input.password)?;

        let password_hash = self.hasher.hash(raw_password).await?;

        let now = self.clock.now();
        let user = User::new_local(email, password_hash, now);

        // Uniqueness is decided by the store; no pre-check
        self.user_repo.create_local(&user).await?;

        tracing::info!(user_id = %user.user_id, email = %user.email, "User registered");

        let token = VerificationToken::issue(user.user_id, now);
        self.token_repo.create(&token).await?;

        self.email_sender
            .send_verification_code(&user.email, &token.token)
            .await?;

        tracing::info!(user_id = %user.user_id, "Verification code sent");

        Ok(RegisterOutput {
            user: user.profile(),
        })
    }
}

//! Request Verification Use Case
//!
//! Issues a replacement verification code. At most one live code per user:
//! while the latest code is still live the request is refused.

use std::sync::Arc;

use platform::clock::Clock;

use crate::domain::entity::{user::User, verification_token::VerificationToken};
use crate::domain::gateway::EmailSender;
use crate::domain::repository::VerificationTokenRepository;
use crate::error::{AuthError, AuthResult};

pub struct RequestVerificationUseCase<T, E>
where
    T: VerificationTokenRepository,
    E: EmailSender,
{
    token_repo: Arc<T>,
    email_sender: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<T, E> RequestVerificationUseCase<T, E>
where
    T: VerificationTokenRepository,
    E: EmailSender,
{
    pub fn new(token_repo: Arc<T>, email_sender: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            token_repo,
            email_sender,
            clock,
        }
    }

    pub async fn execute(&self, user: &User) -> AuthResult<()> {
        if user.is_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let now = self.clock.now();

        if let Some(latest) = self.token_repo.get_latest(&user.user_id).await? {
            if latest.is_live(now) {
                return Err(AuthError::VerificationTokenNotExpired);
            }
        }

        // Two concurrent requests may both pass the check above; the later
        // token then wins since only the latest is ever accepted.
        self.token_repo.delete_all_for_user(&user.user_id).await?;

        let token = VerificationToken::issue(user.user_id, now);
        self.token_repo.create(&token).await?;

        self.email_sender
            .send_verification_code(&user.email, &token.token)
            .await?;

        tracing::info!(user_id = %user.user_id, "Verification code re-sent");

        Ok(())
    }
}

//! Verify Email Use Case
//!
//! Consumes a verification code. Only the user's latest code is compared;
//! an older code fails even if it is still within its window. On success
//! the user is marked verified and all of their codes are deleted.

use std::sync::Arc;

use platform::clock::Clock;

use crate::domain::repository::{UserRepository, VerificationTokenRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

pub struct VerifyEmailInput {
    pub user_id: String,
    /// Submitted 6-digit code
    pub token: String,
}

pub struct VerifyEmailUseCase<U, T>
where
    U: UserRepository,
    T: VerificationTokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, T> VerifyEmailUseCase<U, T>
where
    U: UserRepository,
    T: VerificationTokenRepository,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            token_repo,
            clock,
        }
    }

    pub async fn execute(&self, input: VerifyEmailInput) -> AuthResult<()> {
        if input.user_id.trim().is_empty() {
            return Err(AuthError::MissingParameter("user_id"));
        }
        if input.token.is_empty() {
            return Err(AuthError::MissingParameter("token"));
        }

        // An id that does not parse cannot own a token
        let user_id =
            UserId::parse_str(&input.user_id).map_err(|_| AuthError::NoVerificationToken)?;

        let latest = self
            .token_repo
            .get_latest(&user_id)
            .await?
            .ok_or(AuthError::NoVerificationToken)?;

        if !latest.token.matches(&input.token) {
            return Err(AuthError::InvalidVerificationToken);
        }

        if latest.is_expired(self.clock.now()) {
            return Err(AuthError::VerificationTokenExpired);
        }

        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_verified {
            return Err(AuthError::AlreadyVerified);
        }

        self.user_repo.mark_verified(&user_id).await?;
        let deleted = self.token_repo.delete_all_for_user(&user_id).await?;

        tracing::info!(user_id = %user_id, tokens_deleted = deleted, "Email verified");

        Ok(())
    }
}

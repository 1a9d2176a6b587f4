//! Account Status Use Case
//!
//! Enables or disables an account. Disabled accounts are refused at login
//! and when resolving a bearer token.

use std::sync::Arc;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

pub struct SetAccountStatusUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> SetAccountStatusUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, user_id: &UserId, disabled: bool) -> AuthResult<()> {
        self.user_repo.set_disabled(user_id, disabled).await?;
        tracing::info!(user_id = %user_id, disabled, "Account status changed");
        Ok(())
    }
}

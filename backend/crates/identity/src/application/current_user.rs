//! Current User Use Case
//!
//! Resolves an access token to an enabled user. The token subject is the
//! user's email.

use std::sync::Arc;

use crate::application::token_issuer::{TokenIssuer, TokenKind};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct CurrentUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    issuer: Arc<TokenIssuer>,
}

impl<U> CurrentUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, issuer: Arc<TokenIssuer>) -> Self {
        Self { user_repo, issuer }
    }

    pub async fn execute(&self, access_token: &str) -> AuthResult<User> {
        let subject = self.issuer.validate(access_token, TokenKind::Access)?;

        let user = self
            .user_repo
            .find_by_email(&Email::from_trusted(subject))
            .await?
            .ok_or(AuthError::InvalidBearerToken)?;

        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }
}

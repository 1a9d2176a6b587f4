//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the
//! infrastructure layer. Uniqueness of `email` and `external_subject` is
//! enforced here, at the point of insertion, and reported as
//! `AuthError::EmailTaken` / `AuthError::ExternalSubjectTaken`.

use crate::domain::entity::{user::User, verification_token::VerificationToken};
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a local account (must carry a password digest)
    async fn create_local(&self, user: &User) -> AuthResult<()>;

    /// Insert a federated account (must carry an external subject)
    async fn create_federated(&self, user: &User) -> AuthResult<()>;

    /// Refresh profile fields of the account owning `email`
    ///
    /// Email and external subject are not re-bound.
    async fn update_federated_profile(
        &self,
        email: &Email,
        given_name: Option<&str>,
        family_name: Option<&str>,
        is_verified: bool,
    ) -> AuthResult<()>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Fails with `UserNotFound` if no such user
    async fn mark_verified(&self, user_id: &UserId) -> AuthResult<()>;

    /// Fails with `UserNotFound` if no such user
    async fn set_disabled(&self, user_id: &UserId, disabled: bool) -> AuthResult<()>;
}

/// Verification token repository trait
#[trait_variant::make(VerificationTokenRepository: Send)]
pub trait LocalVerificationTokenRepository {
    /// Persist a new token; earlier tokens for the same user are kept
    async fn create(&self, token: &VerificationToken) -> AuthResult<()>;

    /// Most recently created token for the user
    async fn get_latest(&self, user_id: &UserId) -> AuthResult<Option<VerificationToken>>;

    /// Delete every token of the user; idempotent
    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64>;
}

//! In-memory Repository Implementation
//!
//! Process-local store with the same uniqueness and ordering contracts as
//! the PostgreSQL store. For tests and for embedding the identity router
//! without a database; the api binary always runs on PostgreSQL.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::entity::{user::User, verification_token::VerificationToken};
use crate::domain::repository::{UserRepository, VerificationTokenRepository};
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    users: Vec<User>,
    /// (insertion sequence, token)
    tokens: Vec<(u64, VerificationToken)>,
    next_seq: u64,
}

impl State {
    fn user_mut(&mut self, user_id: &UserId) -> AuthResult<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.user_id == *user_id)
            .ok_or(AuthError::UserNotFound)
    }

    fn insert_user(&mut self, user: &User) -> AuthResult<()> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        if let Some(subject) = &user.external_subject {
            if self
                .users
                .iter()
                .any(|u| u.external_subject.as_ref() == Some(subject))
            {
                return Err(AuthError::ExternalSubjectTaken);
            }
        }
        self.users.push(user.clone());
        Ok(())
    }
}

/// Shared in-memory identity store; clones see the same data
#[derive(Clone, Default)]
pub struct InMemoryIdentityRepository {
    state: Arc<Mutex<State>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All tokens currently stored for a user, oldest first
    pub async fn tokens_for(&self, user_id: &UserId) -> Vec<VerificationToken> {
        let state = self.state.lock().await;
        state
            .tokens
            .iter()
            .filter(|(_, t)| t.user_id == *user_id)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub async fn user_count(&self) -> usize {
        self.state.lock().await.users.len()
    }
}

impl UserRepository for InMemoryIdentityRepository {
    async fn create_local(&self, user: &User) -> AuthResult<()> {
        if user.password_hash.is_none() {
            return Err(AuthError::Internal(
                "local account without password digest".to_string(),
            ));
        }
        self.state.lock().await.insert_user(user)
    }

    async fn create_federated(&self, user: &User) -> AuthResult<()> {
        if user.external_subject.is_none() {
            return Err(AuthError::Internal(
                "federated account without external subject".to_string(),
            ));
        }
        self.state.lock().await.insert_user(user)
    }

    async fn update_federated_profile(
        &self,
        email: &Email,
        given_name: Option<&str>,
        family_name: Option<&str>,
        is_verified: bool,
    ) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.email == *email)
            .ok_or(AuthError::UserNotFound)?;

        user.given_name = given_name.map(str::to_string);
        user.family_name = family_name.map(str::to_string);
        user.is_verified = is_verified;
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.email == *email).cloned())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.user_id == *user_id).cloned())
    }

    async fn mark_verified(&self, user_id: &UserId) -> AuthResult<()> {
        self.state.lock().await.user_mut(user_id)?.is_verified = true;
        Ok(())
    }

    async fn set_disabled(&self, user_id: &UserId, disabled: bool) -> AuthResult<()> {
        self.state.lock().await.user_mut(user_id)?.disabled = disabled;
        Ok(())
    }
}

impl VerificationTokenRepository for InMemoryIdentityRepository {
    async fn create(&self, token: &VerificationToken) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.tokens.push((seq, token.clone()));
        Ok(())
    }

    async fn get_latest(&self, user_id: &UserId) -> AuthResult<Option<VerificationToken>> {
        let state = self.state.lock().await;
        // Ties on created_at go to the later insertion
        Ok(state
            .tokens
            .iter()
            .filter(|(_, t)| t.user_id == *user_id)
            .max_by_key(|(seq, t)| (t.created_at, *seq))
            .map(|(_, t)| t.clone()))
    }

    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.tokens.len();
        state.tokens.retain(|(_, t)| t.user_id != *user_id);
        Ok((before - state.tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::ExternalProfile;
    use crate::domain::value_object::{
        auth_provider::AuthProvider,
        user_password::{RawPassword, UserPassword},
    };
    use chrono::{Duration, TimeZone, Utc};

    fn local_user(email: &str) -> User {
        let raw = RawPassword::for_login("Passw0rd!".into());
        let hash = UserPassword::from_raw(&raw, None).unwrap();
        User::new_local(Email::new(email).unwrap(), hash, Utc::now())
    }

    fn federated_user(email: &str, subject: &str) -> User {
        let profile = ExternalProfile {
            subject: subject.into(),
            given_name: None,
            family_name: None,
            email: Email::new(email).unwrap(),
            email_verified: true,
        };
        User::new_federated(AuthProvider::Google, &profile, Utc::now())
    }

    #[tokio::test]
    async fn test_email_uniqueness() {
        let repo = InMemoryIdentityRepository::new();
        repo.create_local(&local_user("a@b.com")).await.unwrap();

        let err = repo.create_local(&local_user("a@b.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        let err = repo
            .create_federated(&federated_user("a@b.com", "sub-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_external_subject_uniqueness() {
        let repo = InMemoryIdentityRepository::new();
        repo.create_federated(&federated_user("a@b.com", "sub-1"))
            .await
            .unwrap();

        let err = repo
            .create_federated(&federated_user("c@d.com", "sub-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ExternalSubjectTaken));
    }

    #[tokio::test]
    async fn test_missing_user_updates_fail() {
        let repo = InMemoryIdentityRepository::new();
        let id = UserId::new();
        assert!(matches!(
            repo.mark_verified(&id).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            repo.set_disabled(&id, true).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_latest_token_wins_ties_by_insertion() {
        let repo = InMemoryIdentityRepository::new();
        let user_id = UserId::new();
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let first = VerificationToken::issue(user_id, t0);
        let second = VerificationToken::issue(user_id, t0);
        let older = VerificationToken::issue(user_id, t0 - Duration::seconds(10));
        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();
        repo.create(&older).await.unwrap();

        let latest = repo.get_latest(&user_id).await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[tokio::test]
    async fn test_delete_all_is_idempotent() {
        let repo = InMemoryIdentityRepository::new();
        let user_id = UserId::new();
        let other = UserId::new();
        let now = Utc::now();
        repo.create(&VerificationToken::issue(user_id, now)).await.unwrap();
        repo.create(&VerificationToken::issue(user_id, now)).await.unwrap();
        repo.create(&VerificationToken::issue(other, now)).await.unwrap();

        assert_eq!(repo.delete_all_for_user(&user_id).await.unwrap(), 2);
        assert_eq!(repo.delete_all_for_user(&user_id).await.unwrap(), 0);
        assert!(repo.get_latest(&user_id).await.unwrap().is_none());
        assert_eq!(repo.tokens_for(&other).await.len(), 1);
    }
}

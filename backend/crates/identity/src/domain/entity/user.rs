//! User Entity
//!
//! Identity record for both local and federated accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_object::{
    auth_provider::AuthProvider, email::Email, user_id::UserId, user_password::UserPassword,
};

/// User entity
///
/// Holds the password digest; never serialize this type directly.
/// Use [`UserProfile`] for anything leaving the service.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Subject assigned by an external identity provider (unique when present)
    pub external_subject: Option<String>,
    /// Email (unique, lowercase)
    pub email: Email,
    /// Present for local accounts only
    pub password_hash: Option<UserPassword>,
    pub provider: AuthProvider,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub is_verified: bool,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new local account (unverified, enabled)
    pub fn new_local(email: Email, password_hash: UserPassword, now: DateTime<Utc>) -> Self {
        Self {
            user_id: UserId::new(),
            external_subject: None,
            email,
            password_hash: Some(password_hash),
            provider: AuthProvider::Local,
            given_name: None,
            family_name: None,
            is_verified: false,
            disabled: false,
            created_at: now,
        }
    }

    /// Create a new account from an external identity provider profile
    pub fn new_federated(
        provider: AuthProvider,
        profile: &ExternalProfile,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: UserId::new(),
            external_subject: Some(profile.subject.clone()),
            email: profile.email.clone(),
            password_hash: None,
            provider,
            given_name: profile.given_name.clone(),
            family_name: profile.family_name.clone(),
            is_verified: profile.email_verified,
            disabled: false,
            created_at: now,
        }
    }

    /// Check if user can sign in
    pub fn can_login(&self) -> bool {
        !self.disabled
    }

    /// Public projection (no digest, no disabled flag)
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.user_id.to_string(),
            email: self.email.as_str().to_string(),
            provider: self.provider,
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
            is_verified: self.is_verified,
            created_at: self.created_at.timestamp(),
        }
    }
}

/// Externally visible user projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub provider: AuthProvider,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub is_verified: bool,
    /// Seconds since the Unix epoch
    pub created_at: i64,
}

/// Verified profile returned by an identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub subject: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub email: Email,
    pub email_verified: bool,
}

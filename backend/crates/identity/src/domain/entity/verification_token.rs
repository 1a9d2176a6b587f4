//! Verification Token Entity
//!
//! One-time email confirmation code bound to a user. A token is live while
//! `now < expires_at`; several may coexist for one user, but only the most
//! recently created one is ever checked.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{
    user_id::{UserId, VerificationTokenId},
    verification_code::VerificationCode,
};

/// Fixed validity window in seconds
pub const VERIFICATION_TOKEN_TTL_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct VerificationToken {
    pub id: VerificationTokenId,
    pub token: VerificationCode,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerificationToken {
    /// Issue a fresh code for `user_id`, valid for [`VERIFICATION_TOKEN_TTL_SECS`]
    pub fn issue(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: VerificationTokenId::new(),
            token: VerificationCode::generate(),
            user_id,
            created_at: now,
            expires_at: now + Duration::seconds(VERIFICATION_TOKEN_TTL_SECS),
        }
    }

    #[inline]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.is_live(now)
    }
}

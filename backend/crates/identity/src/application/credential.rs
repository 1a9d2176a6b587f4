//! Credential Hasher
//!
//! Argon2id hashing and verification run on the blocking pool so a login
//! burst cannot stall the async workers.

use std::sync::{Arc, OnceLock};

use crate::application::config::AuthConfig;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

const DUMMY_PASSWORD: &str = "Dummy-Passw0rd";

/// Password hashing bound to one [`AuthConfig`]
///
/// Owns the digest checked when an account does not exist, so both login
/// outcomes cost one verification under this config's pepper and params.
pub struct CredentialHasher {
    config: Arc<AuthConfig>,
    dummy: Arc<OnceLock<Option<UserPassword>>>,
}

impl CredentialHasher {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self {
            config,
            dummy: Arc::new(OnceLock::new()),
        }
    }

    /// Hash a policy-checked password
    pub async fn hash(&self, raw: RawPassword) -> AuthResult<UserPassword> {
        let config = Arc::clone(&self.config);
        tokio::task::spawn_blocking(move || UserPassword::from_raw(&raw, config.pepper()))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
    }

    /// Verify `raw` against `digest`; a missing digest still burns one verification
    pub async fn verify(&self, raw: RawPassword, digest: Option<UserPassword>) -> AuthResult<bool> {
        let config = Arc::clone(&self.config);
        let dummy = Arc::clone(&self.dummy);
        tokio::task::spawn_blocking(move || match digest {
            Some(digest) => digest.verify(&raw, config.pepper()),
            None => {
                let dummy = dummy.get_or_init(|| {
                    let raw = RawPassword::for_login(DUMMY_PASSWORD.to_string());
                    UserPassword::from_raw(&raw, config.pepper()).ok()
                });
                if let Some(dummy) = dummy {
                    let _ = dummy.verify(&raw, config.pepper());
                }
                false
            }
        })
        .await
        .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))
    }

    #[cfg(test)]
    fn dummy_digest(&self) -> Option<&UserPassword> {
        self.dummy.get().and_then(Option::as_ref)
    }
}

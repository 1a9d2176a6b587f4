//! User Password Value Object
//!
//! Domain wrapper over `platform::password`. Policy violations surface as
//! `AuthError::Validation` with a single user-facing message; the precise
//! violation is only logged at debug level.

use platform::password::{ClearTextPassword, HashedPassword};
use std::fmt;

use crate::error::{AuthError, AuthResult};

/// Message returned for any complexity policy violation
pub const PASSWORD_POLICY_MESSAGE: &str = "Password must have a minimum eight characters, \
     at least one uppercase letter, one lowercase letter and one number.";

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input, zeroized on drop
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a new raw password, enforcing the complexity policy
    pub fn new(raw: String) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| {
            tracing::debug!(violation = %e, "Password policy rejected");
            AuthError::Validation(PASSWORD_POLICY_MESSAGE.to_string())
        })?;
        Ok(Self(clear_text))
    }

    /// Wrap a login attempt without checking the policy
    pub fn for_login(raw: String) -> Self {
        Self(ClearTextPassword::unvalidated(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Hashed user password for database storage (Argon2id PHC string)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a raw password
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AuthResult<Self> {
        let hashed = raw
            .inner()
            .hash(pepper)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(Self(hashed))
    }

    /// Restore from a database value; a corrupt digest never verifies
    pub fn from_db(phc_string: impl Into<String>) -> Self {
        Self(HashedPassword::from_stored(phc_string))
    }

    /// Get PHC string for database storage
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw password against this hash
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

//! Verification Code Value Object
//!
//! Six decimal digits, uniformly drawn from `100000..=999999` so the
//! string form is always fixed width. Collisions with other outstanding
//! codes are not checked.

use std::fmt;

use platform::crypto::constant_time_eq;
use rand::Rng;

/// Number of digits in a code
pub const CODE_LENGTH: usize = 6;

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Draw a fresh random code
    pub fn generate() -> Self {
        let n: u32 = rand::rng().random_range(CODE_MIN..=CODE_MAX);
        Self(n.to_string())
    }

    /// Restore a stored code
    pub fn from_db(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact, constant-time comparison against a submitted code
    ///
    /// No normalization is applied; surrounding whitespace is a mismatch.
    pub fn matches(&self, submitted: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), submitted.as_bytes())
    }
}

// Codes are secrets while live; keep them out of logs.
impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VerificationCode")
            .field(&"[REDACTED]")
            .finish()
    }
}

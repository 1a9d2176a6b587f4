//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a random secret of `len` bytes, encoded as URL-safe base64 without padding
///
/// Suitable as an HMAC signing key for development builds.
pub fn random_secret(len: usize) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(random_bytes(len))
}

/// Constant-time comparison to prevent timing attacks
///
/// Length mismatch returns early; only equal-length inputs are compared
/// without short-circuiting.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

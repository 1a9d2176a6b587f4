//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::TokenPair;

// ============================================================================
// Credentials
// ============================================================================

/// Register / login request
///
/// Missing fields deserialize as empty so the use case reports which one
/// is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "bearer",
        }
    }
}

/// `POST /auth/google?code=...`
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleCallbackQuery {
    #[serde(default)]
    pub code: String,
}

// ============================================================================
// Misc
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub const fn ok() -> Self {
        Self { ok: true }
    }
}

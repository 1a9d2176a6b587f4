//! Token Issuer
//!
//! Signs and validates HS256 bearer tokens carrying `{sub, iat, exp}`.
//! Access and refresh tokens are signed with distinct secrets, so neither
//! secret can forge the other kind.
//!
//! Expiry is decided against the injected [`Clock`], not by the JWT
//! library: a token is expired iff `now >= exp`, with no leeway.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use platform::clock::Clock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// Which secret a token is signed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Token validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Bad signature, malformed payload, or missing subject
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AuthError::InvalidBearerToken,
            TokenError::Expired => AuthError::BearerTokenExpired,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    /// Seconds since the Unix epoch
    exp: i64,
    iat: i64,
}

/// Access / refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct TokenIssuer {
    config: Arc<AuthConfig>,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(config: Arc<AuthConfig>, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    fn secret(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => self.config.access_token_secret.as_bytes(),
            TokenKind::Refresh => self.config.refresh_token_secret.as_bytes(),
        }
    }

    fn ttl(&self, kind: TokenKind) -> AuthResult<Duration> {
        let std_ttl = match kind {
            TokenKind::Access => self.config.access_token_ttl,
            TokenKind::Refresh => self.config.refresh_token_ttl,
        };
        Duration::from_std(std_ttl)
            .map_err(|e| AuthError::Internal(format!("token lifetime out of range: {e}")))
    }

    fn issue(&self, subject: &str, kind: TokenKind) -> AuthResult<String> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl(kind)?)
            .ok_or_else(|| AuthError::Internal("token expiry overflows".to_string()))?;

        let claims = Claims {
            sub: Some(subject.to_string()),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret(kind)),
        )
        .map_err(|e| AuthError::Internal(format!("token signing failed: {e}")))
    }

    pub fn issue_access(&self, subject: &str) -> AuthResult<String> {
        self.issue(subject, TokenKind::Access)
    }

    pub fn issue_refresh(&self, subject: &str) -> AuthResult<String> {
        self.issue(subject, TokenKind::Refresh)
    }

    /// Issue both tokens for `subject`
    pub fn issue_pair(&self, subject: &str) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(subject)?,
            refresh_token: self.issue_refresh(subject)?,
        })
    }

    /// Validate a token of the given kind and return its subject
    pub fn validate(&self, token: &str, kind: TokenKind) -> Result<String, TokenError> {
        self.validate_with_secret(token, self.secret(kind))
    }

    /// Validate against an explicit secret and return the subject
    pub fn validate_with_secret(&self, token: &str, secret: &[u8]) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
            .map_err(|_| TokenError::Invalid)?;

        let subject = data
            .claims
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::Invalid)?;

        if self.clock.now().timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(subject)
    }
}

//! Application Configuration
//!
//! Built once at process start and shared via `Arc`. Nothing in this crate
//! reads secrets from globals or the environment.

use std::fmt;
use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::crypto::random_secret;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Default access token lifetime (30 minutes)
pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

// ============================================================================
// AuthConfig
// ============================================================================

/// Token, password and cookie settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    pub access_token_secret: String,
    /// HMAC secret for refresh tokens (must differ from the access secret)
    pub refresh_token_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Cookie carrying `Bearer <access token>` after local login
    pub access_cookie_name: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            refresh_token_ttl: DEFAULT_REFRESH_TOKEN_TTL,
            password_pepper: None,
            access_cookie_name: "access_token".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl AuthConfig {
    /// Create config with random, distinct token secrets (for development)
    pub fn with_random_secrets() -> Self {
        Self {
            access_token_secret: random_secret(32),
            refresh_token_secret: random_secret(32),
            ..Default::default()
        }
    }

    /// Create config for development (random secrets, insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secrets()
        }
    }

    /// Check the invariants that must hold before serving traffic
    pub fn validate(&self) -> Result<(), String> {
        if self.access_token_secret.is_empty() || self.refresh_token_secret.is_empty() {
            return Err("token secrets must not be empty".to_string());
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err("access and refresh token secrets must differ".to_string());
        }
        if self.access_token_ttl.is_zero() || self.refresh_token_ttl.is_zero() {
            return Err("token lifetimes must be positive".to_string());
        }
        for ttl in [self.access_token_ttl, self.refresh_token_ttl] {
            if chrono::Duration::from_std(ttl).is_err() {
                return Err(format!("token lifetime {ttl:?} is out of range"));
            }
        }
        Ok(())
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Cookie settings for the access token cookie
    pub fn access_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.access_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(i64::try_from(self.access_token_ttl.as_secs()).unwrap_or(i64::MAX)),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_secret", &"[REDACTED]")
            .field("refresh_token_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("access_cookie_name", &self.access_cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .finish()
    }
}

// ============================================================================
// GoogleOAuthConfig
// ============================================================================

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Google OAuth2 client settings
#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Must match the redirect URI registered with Google
    pub redirect_uri: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub token_timeout: Duration,
    pub userinfo_timeout: Duration,
}

impl GoogleOAuthConfig {
    /// Build from client credentials and the frontend base URL
    ///
    /// The redirect URI is `{client_url}/auth/google/callback`.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        client_url: &str,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: format!("{}/auth/google/callback", client_url.trim_end_matches('/')),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            token_timeout: Duration::from_secs(20),
            userinfo_timeout: Duration::from_secs(5),
        }
    }
}

impl fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .finish()
    }
}

// ============================================================================
// SendGridConfig
// ============================================================================

pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com";

/// SendGrid delivery settings
#[derive(Clone)]
pub struct SendGridConfig {
    pub api_key: String,
    /// Verified sender address
    pub sender: String,
    pub api_base_url: String,
    /// Shown in the subject and body of verification emails
    pub site_name: String,
    pub timeout: Duration,
}

impl SendGridConfig {
    pub fn new(api_key: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            sender: sender.into(),
            api_base_url: SENDGRID_API_URL.to_string(),
            site_name: "cashr".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for SendGridConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendGridConfig")
            .field("api_key", &"[REDACTED]")
            .field("sender", &self.sender)
            .field("api_base_url", &self.api_base_url)
            .field("site_name", &self.site_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_ttl, Duration::from_secs(1800));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(604_800));
        assert!(config.cookie_secure);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_random_secrets_are_distinct() {
        let config = AuthConfig::development();
        assert_ne!(config.access_token_secret, config.refresh_token_secret);
        assert!(!config.cookie_secure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_same_secret_rejected() {
        let config = AuthConfig {
            access_token_secret: "s".into(),
            refresh_token_secret: "s".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unrepresentable_lifetime_rejected() {
        let config = AuthConfig {
            access_token_ttl: Duration::from_secs(u64::MAX),
            ..AuthConfig::development()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_access_cookie_max_age_saturates() {
        let config = AuthConfig {
            access_token_ttl: Duration::from_secs(u64::MAX),
            ..AuthConfig::development()
        };
        assert_eq!(config.access_cookie().max_age_secs, Some(i64::MAX));
        assert_eq!(
            AuthConfig::default().access_cookie().max_age_secs,
            Some(1800)
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig {
            access_token_secret: "top-secret-access".into(),
            refresh_token_secret: "top-secret-refresh".into(),
            password_pepper: Some(b"pepper".to_vec()),
            ..Default::default()
        };
        let out = format!("{config:?}");
        assert!(!out.contains("top-secret"));
    }

    #[test]
    fn test_access_cookie() {
        let cookie = AuthConfig::development().access_cookie();
        assert_eq!(cookie.name, "access_token");
        assert_eq!(cookie.max_age_secs, Some(1800));
        assert!(cookie.http_only);
    }

    #[test]
    fn test_google_redirect_uri() {
        let config = GoogleOAuthConfig::new("id", "secret", "https://app.example.com/");
        assert_eq!(
            config.redirect_uri,
            "https://app.example.com/auth/google/callback"
        );
        assert_eq!(config.token_timeout, Duration::from_secs(20));
        assert_eq!(config.userinfo_timeout, Duration::from_secs(5));
    }
}

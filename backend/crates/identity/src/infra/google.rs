//! Google OAuth2 Identity Provider
//!
//! Authorization-code exchange against Google's token endpoint, then a
//! userinfo lookup with the resulting provider access token.

use reqwest::Client;
use serde::Deserialize;

use crate::application::config::GoogleOAuthConfig;
use crate::domain::entity::user::ExternalProfile;
use crate::domain::gateway::IdentityProvider;
use crate::domain::value_object::{auth_provider::AuthProvider, email::Email};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    sub: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    email: Option<String>,
    email_verified: Option<bool>,
}

/// Google identity provider over HTTPS
#[derive(Clone)]
pub struct GoogleIdentityProvider {
    client: Client,
    config: GoogleOAuthConfig,
}

impl GoogleIdentityProvider {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

fn upstream(context: &str, err: reqwest::Error) -> AuthError {
    AuthError::ExternalAuth(format!("{context}: {err}"))
}

impl IdentityProvider for GoogleIdentityProvider {
    fn provider(&self) -> AuthProvider {
        AuthProvider::Google
    }

    async fn exchange_code(&self, code: &str) -> AuthResult<String> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .timeout(self.config.token_timeout)
            .send()
            .await
            .map_err(|e| upstream("token request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::ExternalAuth(format!(
                "token endpoint returned {status}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| upstream("token response unreadable", e))?;

        body.access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::ExternalAuth("token response without access_token".into()))
    }

    async fn fetch_profile(&self, access_token: &str) -> AuthResult<ExternalProfile> {
        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .timeout(self.config.userinfo_timeout)
            .send()
            .await
            .map_err(|e| upstream("userinfo request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::ExternalAuth(format!(
                "userinfo endpoint returned {status}"
            )));
        }

        let info: UserInfoResponse = response
            .json()
            .await
            .map_err(|e| upstream("userinfo response unreadable", e))?;

        let subject = info
            .sub
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::ExternalAuth("userinfo without sub".into()))?;
        let email = info
            .email
            .ok_or_else(|| AuthError::ExternalAuth("userinfo without email".into()))?;
        let email = Email::new(email)
            .map_err(|_| AuthError::ExternalAuth("userinfo email is not a valid address".into()))?;
        let email_verified = info
            .email_verified
            .ok_or_else(|| AuthError::ExternalAuth("userinfo without email_verified".into()))?;

        Ok(ExternalProfile {
            subject,
            given_name: info.given_name,
            family_name: info.family_name,
            email,
            email_verified,
        })
    }
}

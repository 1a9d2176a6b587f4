//! Email Senders

use reqwest::Client;
use serde_json::json;

use crate::application::config::SendGridConfig;
use crate::domain::gateway::EmailSender;
use crate::domain::value_object::{email::Email, verification_code::VerificationCode};
use crate::error::{AuthError, AuthResult};

/// Development sender: logs the recipient, never the code
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    async fn send_verification_code(
        &self,
        recipient: &Email,
        _code: &VerificationCode,
    ) -> AuthResult<()> {
        tracing::info!(recipient = %recipient, "Verification email suppressed (log sender)");
        Ok(())
    }
}

/// SendGrid v3 mail sender
#[derive(Clone)]
pub struct SendGridEmailSender {
    client: Client,
    config: SendGridConfig,
}

impl SendGridEmailSender {
    pub fn new(config: SendGridConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn html_body(&self, code: &VerificationCode) -> String {
        format!(
            "<p>Your {site} verification code is:</p>\
             <h2 style=\"letter-spacing:4px\">{code}</h2>\
             <p>The code expires in 5 minutes.</p>",
            site = self.config.site_name,
            code = code.as_str(),
        )
    }
}

impl EmailSender for SendGridEmailSender {
    async fn send_verification_code(
        &self,
        recipient: &Email,
        code: &VerificationCode,
    ) -> AuthResult<()> {
        let url = format!(
            "{}/v3/mail/send",
            self.config.api_base_url.trim_end_matches('/')
        );
        let payload = json!({
            "personalizations": [{ "to": [{ "email": recipient.as_str() }] }],
            "from": { "email": self.config.sender },
            "subject": format!("{} email verification", self.config.site_name),
            "content": [{ "type": "text/html", "value": self.html_body(code) }],
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| AuthError::Dispatch(format!("send request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Dispatch(format!("mail API returned {status}")));
        }

        tracing::info!(recipient = %recipient, "Verification email sent");
        Ok(())
    }
}

/// Sender chosen at startup
#[derive(Clone)]
pub enum EmailTransport {
    Log(LogEmailSender),
    SendGrid(SendGridEmailSender),
}

impl EmailTransport {
    /// SendGrid when configured, otherwise the log sender
    pub fn from_config(config: Option<SendGridConfig>) -> Self {
        match config {
            Some(config) => Self::SendGrid(SendGridEmailSender::new(config)),
            None => Self::Log(LogEmailSender),
        }
    }
}

impl EmailSender for EmailTransport {
    async fn send_verification_code(
        &self,
        recipient: &Email,
        code: &VerificationCode,
    ) -> AuthResult<()> {
        match self {
            Self::Log(sender) => sender.send_verification_code(recipient, code).await,
            Self::SendGrid(sender) => sender.send_verification_code(recipient, code).await,
        }
    }
}

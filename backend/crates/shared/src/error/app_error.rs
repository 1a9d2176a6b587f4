//! The error value every HTTP-facing crate funnels into.

use std::borrow::Cow;
use std::fmt;

use super::kind::ErrorKind;

/// Client-facing error: a status class, a stable code, and text safe to show.
///
/// Nothing in here is meant for operators. Callers log their own detail
/// before building one of these, then hand it to the response layer.
///
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::TooManyRequests, "Code already sent")
///     .with_code("TOKEN_NOT_EXPIRED")
///     .with_action("Wait until it expires");
/// assert_eq!(err.status_code(), 429);
/// ```
#[derive(Debug, Clone)]
pub struct AppError {
    kind: ErrorKind,
    code: Option<&'static str>,
    message: Cow<'static, str>,
    action: Option<Cow<'static, str>>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
            action: None,
        }
    }

    /// Stable machine-readable code; clients branch on this, not the message.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Hint telling the caller what to do next.
    pub fn with_action(mut self, action: impl Into<Cow<'static, str>>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> Option<&'static str> {
        self.code
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_code_or_action() {
        let err = AppError::new(ErrorKind::NotFound, "User not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "User not found");
        assert!(err.code().is_none());
        assert!(err.action().is_none());
    }

    #[test]
    fn test_code_and_action_stay_out_of_display() {
        let err = AppError::new(ErrorKind::BadRequest, "Verification code expired")
            .with_code("TOKEN_EXPIRED")
            .with_action("Request a new code");
        assert_eq!(err.code(), Some("TOKEN_EXPIRED"));
        assert_eq!(err.action(), Some("Request a new code"));
        assert_eq!(err.to_string(), "[Bad Request] Verification code expired");
    }
}

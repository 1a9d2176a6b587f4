//! Identity Error Types
//!
//! Identity-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Every variant carries a stable
//! machine-readable code; clients branch on the code, never on the text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Identity result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Identity error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input (bad email, password policy, empty field)
    #[error("{0}")]
    Validation(String),

    /// A required argument was empty
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Unique constraint on email
    #[error("Email already exists.")]
    EmailTaken,

    /// Unique constraint on the external provider subject
    #[error("External account is already linked to another user")]
    ExternalSubjectTaken,

    /// Unknown email or wrong password; the two are deliberately indistinguishable
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Inactive user")]
    AccountDisabled,

    #[error("User not found")]
    UserNotFound,

    #[error("User already verified")]
    AlreadyVerified,

    #[error("User has no verification token")]
    NoVerificationToken,

    #[error("Invalid token")]
    InvalidVerificationToken,

    #[error("Token expired")]
    VerificationTokenExpired,

    /// A live code already exists for this user
    #[error("Token not expired")]
    VerificationTokenNotExpired,

    /// Bearer token missing, malformed, badly signed, or naming an unknown user
    #[error("Could not validate credentials")]
    InvalidBearerToken,

    #[error("Token has expired")]
    BearerTokenExpired,

    /// Identity provider exchange failed
    #[error("External authentication failed: {0}")]
    ExternalAuth(String),

    /// Email transport failed
    #[error("Failed to deliver email: {0}")]
    Dispatch(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::MissingParameter(_) => "MISSING_PARAMETER",
            AuthError::EmailTaken | AuthError::ExternalSubjectTaken => "CONFLICT",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountDisabled => "ACCOUNT_DISABLED",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::AlreadyVerified => "ALREADY_VERIFIED",
            AuthError::NoVerificationToken => "NO_TOKEN",
            AuthError::InvalidVerificationToken => "INVALID_TOKEN",
            AuthError::VerificationTokenExpired => "TOKEN_EXPIRED",
            AuthError::VerificationTokenNotExpired => "TOKEN_NOT_EXPIRED",
            AuthError::InvalidBearerToken => "INVALID_BEARER_TOKEN",
            AuthError::BearerTokenExpired => "BEARER_TOKEN_EXPIRED",
            AuthError::ExternalAuth(_) => "EXTERNAL_AUTH_FAILED",
            AuthError::Dispatch(_) => "DISPATCH_FAILED",
            AuthError::Database(_) | AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_)
            | AuthError::MissingParameter(_)
            | AuthError::AlreadyVerified
            | AuthError::NoVerificationToken
            | AuthError::InvalidVerificationToken
            | AuthError::VerificationTokenExpired => ErrorKind::BadRequest,
            AuthError::EmailTaken | AuthError::ExternalSubjectTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::InvalidBearerToken
            | AuthError::BearerTokenExpired => ErrorKind::Unauthorized,
            AuthError::AccountDisabled => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::VerificationTokenNotExpired => ErrorKind::TooManyRequests,
            AuthError::ExternalAuth(_) => ErrorKind::BadGateway,
            AuthError::Dispatch(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// User-visible message
    ///
    /// Infrastructure and upstream failures never expose their inner text.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::Internal(_) => "Something went wrong".to_string(),
            AuthError::ExternalAuth(_) => "External authentication failed".to_string(),
            AuthError::Dispatch(_) => "Failed to deliver verification email".to_string(),
            other => other.to_string(),
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.public_message()).with_code(self.code());
        match self {
            AuthError::VerificationTokenNotExpired => {
                err.with_action("Use the code already sent, or wait until it expires")
            }
            AuthError::VerificationTokenExpired => err.with_action("Request a new code"),
            AuthError::BearerTokenExpired => err.with_action("Sign in again"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Identity database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            AuthError::ExternalAuth(msg) => {
                tracing::error!(message = %msg, "Identity provider exchange failed");
            }
            AuthError::Dispatch(msg) => {
                tracing::error!(message = %msg, "Verification email dispatch failed");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountDisabled => {
                tracing::warn!("Access attempt on disabled account");
            }
            AuthError::VerificationTokenNotExpired => {
                tracing::warn!("Verification resend throttled");
            }
            _ => {
                tracing::debug!(code = self.code(), error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

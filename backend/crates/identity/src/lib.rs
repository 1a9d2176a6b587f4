//! Identity Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and collaborator traits
//! - `application/` - Configuration, token issuer, use cases
//! - `infra/` - PostgreSQL / in-memory stores, Google identity provider, email senders
//! - `presentation/` - HTTP handlers, DTOs, router, bearer extraction
//!
//! ## Features
//! - Local registration with email + password
//! - Email verification with 6-digit one-time codes (5 minute window)
//! - Local and Google (OAuth2 authorization code) login
//! - Signed access / refresh bearer tokens (HS256, distinct secrets)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Uniform error for unknown email and wrong password
//! - Uniqueness of email / external subject enforced by the store
//! - Only the latest verification code for a user is ever accepted

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{AuthConfig, GoogleOAuthConfig, SendGridConfig};
pub use error::{AuthError, AuthResult};
pub use infra::email::{EmailTransport, LogEmailSender, SendGridEmailSender};
pub use infra::google::GoogleIdentityProvider;
pub use infra::memory::InMemoryIdentityRepository;
pub use infra::postgres::PgIdentityRepository;
pub use presentation::{CurrentUser, IdentityAppState, identity_router};

//! Application Layer
//!
//! Configuration, token issuance and one use case per flow.

pub mod account_status;
pub mod config;
pub mod credential;
pub mod current_user;
pub mod federated_login;
pub mod login;
pub mod register;
pub mod request_verification;
pub mod token_issuer;
pub mod verify_email;

// Re-exports
pub use account_status::SetAccountStatusUseCase;
pub use config::{AuthConfig, GoogleOAuthConfig, SendGridConfig};
pub use credential::CredentialHasher;
pub use current_user::CurrentUserUseCase;
pub use federated_login::{FederatedLoginInput, FederatedLoginOutput, FederatedLoginUseCase};
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use request_verification::RequestVerificationUseCase;
pub use token_issuer::{TokenError, TokenIssuer, TokenKind, TokenPair};
pub use verify_email::{VerifyEmailInput, VerifyEmailUseCase};

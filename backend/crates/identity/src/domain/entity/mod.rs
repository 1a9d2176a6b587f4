//! Entity Module

pub mod user;
pub mod verification_token;

pub use user::{User, UserProfile};
pub use verification_token::VerificationToken;

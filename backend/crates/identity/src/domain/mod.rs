//! Domain Layer
//!
//! Contains entities, value objects, repository traits and outbound
//! collaborator traits.

pub mod entity;
pub mod gateway;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{user::ExternalProfile, User, UserProfile, VerificationToken};
pub use gateway::{EmailSender, IdentityProvider};
pub use repository::{UserRepository, VerificationTokenRepository};

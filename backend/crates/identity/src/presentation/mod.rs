//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and bearer extraction.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::IdentityAppState;
pub use middleware::{CurrentUser, bearer_token};
pub use router::identity_router;

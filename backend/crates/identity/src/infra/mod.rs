//! Infrastructure Layer
//!
//! Store implementations and outbound integrations.

pub mod email;
pub mod google;
pub mod memory;
pub mod postgres;

pub use email::{EmailTransport, LogEmailSender, SendGridEmailSender};
pub use google::GoogleIdentityProvider;
pub use memory::InMemoryIdentityRepository;
pub use postgres::PgIdentityRepository;

//! User identifier
//!
//! The typed identifier lives in the shared kernel so other crates can
//! refer to users without depending on this one.

pub use kernel::id::{UserId, VerificationTokenId};

//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password policy and hashing (Argon2id with pepper)
//! - Cryptographic helpers (random secrets, constant-time comparison)
//! - Clock abstraction
//! - Cookie management

pub mod clock;
pub mod cookie;
pub mod crypto;
pub mod password;

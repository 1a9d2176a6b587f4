//! Value Object Module

pub mod auth_provider;
pub mod email;
pub mod user_id;
pub mod user_password;
pub mod verification_code;

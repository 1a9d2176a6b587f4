use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Where an account's identity originates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Email + password registered with this service
    #[default]
    #[display("local")]
    Local,
    /// Google OAuth2
    #[display("google")]
    Google,
}

impl AuthProvider {
    /// Get string code for database storage
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Google => "google",
        }
    }

    /// Parse a stored code; unknown codes yield `None`
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "local" => Some(Self::Local),
            "google" => Some(Self::Google),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_federated(&self) -> bool {
        !matches!(self, Self::Local)
    }
}

//! Identifier types for Custodia ledger entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque account identity.
///
/// Addresses are externally supplied and never created or destroyed by the
/// ledger; an account exists implicitly the moment its address appears as a
/// key. The empty string is the null identity, which no operation accepts
/// as a deposit target, withdrawal target, agent, or owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create a new address.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this is the null identity.
    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }

    /// Shape check used at the transport boundary.
    ///
    /// The core only ever rejects the null identity; charset and length
    /// validation of inbound address strings belongs to the facade.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= 128
            && self
                .0
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

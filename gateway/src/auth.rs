//! API caller authentication.
//!
//! The gateway authenticates the transport caller with an `x-api-key`
//! header and maps it to the ledger address passed into the core as
//! `caller`. Role decisions (owner vs agent vs neither) stay in the core;
//! an unknown key is rejected here at the transport level.

use std::collections::HashMap;

use custodia_common::Address;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Immutable directory of API keys and the addresses they act as.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyDirectory {
    keys: HashMap<String, Address>,
}

impl ApiKeyDirectory {
    /// Build a directory from key/address pairs.
    pub fn new(keys: HashMap<String, Address>) -> Self {
        Self { keys }
    }

    /// Resolve an API key to the caller address it acts as.
    pub fn resolve(&self, key: &str) -> Option<&Address> {
        self.keys.get(key)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the directory has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

//! Role record
//!
//! A role is a key, a display name and a set of granted capabilities.
//! Capabilities are either present (granted) or absent; there is no
//! third "listed but denied" state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Granted capability identifiers
pub type CapabilitySet = BTreeSet<String>;

/// Role record as persisted by a `RoleStore`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    key: String,
    display_name: String,
    #[serde(default)]
    capabilities: CapabilitySet,
}

impl Role {
    /// Create a role with no capabilities
    ///
    /// The key is taken verbatim; callers are expected to have derived or
    /// validated it already.
    pub fn new(key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Role {
            key: key.into(),
            display_name: display_name.into(),
            capabilities: CapabilitySet::new(),
        }
    }

    /// Builder-style helper used by imports and tests
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    pub(crate) fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    /// Add one capability, returning false if it was already granted
    pub(crate) fn add_capability(&mut self, capability: impl Into<String>) -> bool {
        self.capabilities.insert(capability.into())
    }

    /// Remove one capability, returning false if it was not granted
    pub(crate) fn remove_capability(&mut self, capability: &str) -> bool {
        self.capabilities.remove(capability)
    }

    /// Revoke everything currently granted
    pub(crate) fn revoke_all(&mut self) {
        self.capabilities.clear();
    }
}

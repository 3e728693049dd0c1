//! Administrative boundary
//!
//! The registry trusts its caller. `RoleAdmin` is the caller a host puts in
//! front of it: every operation first checks that the current session holds
//! the role-management capability, and imports are bounded before the
//! document ever reaches the registry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::catalog::CapabilityCatalog;
use crate::errors::{Result, RoleError};
use crate::registry::{CapabilityUpdate, ImportMode, ImportReport, RoleRegistry};
use crate::role::Role;
use crate::storage::RoleStore;

/// Capability required for every role-management operation
pub const MANAGE_ROLES_CAPABILITY: &str = "manage_options";

/// Host-provided view of the current user
pub trait Session {
    fn current_user_can(&self, capability: &str) -> bool;
}

/// Session for a trusted local operator (the CLI)
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOperator;

impl Session for LocalOperator {
    fn current_user_can(&self, _capability: &str) -> bool {
        true
    }
}

/// Session backed by a fixed list of capabilities
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    capabilities: Vec<String>,
}

impl StaticSession {
    pub fn new<I, S>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticSession {
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }
}

impl Session for StaticSession {
    fn current_user_can(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// Bounds applied to import documents before parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportLimits {
    pub max_entries: usize,
    pub max_document_bytes: usize,
}

impl Default for ImportLimits {
    fn default() -> Self {
        ImportLimits {
            max_entries: 1000,
            max_document_bytes: 1024 * 1024,
        }
    }
}

/// Authorized front for a `RoleRegistry`
pub struct RoleAdmin<'a, S: RoleStore, A: Session> {
    registry: &'a RoleRegistry<S>,
    session: A,
    limits: ImportLimits,
}

impl<'a, S: RoleStore, A: Session> RoleAdmin<'a, S, A> {
    pub fn new(registry: &'a RoleRegistry<S>, session: A) -> Self {
        RoleAdmin {
            registry,
            session,
            limits: ImportLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ImportLimits) -> Self {
        self.limits = limits;
        self
    }

    fn authorize(&self) -> Result<()> {
        if self.session.current_user_can(MANAGE_ROLES_CAPABILITY) {
            Ok(())
        } else {
            warn!(capability = MANAGE_ROLES_CAPABILITY, "rejected unauthorized role operation");
            Err(RoleError::Unauthorized(MANAGE_ROLES_CAPABILITY.to_string()))
        }
    }

    pub fn create(&self, name: &str, description: &str) -> Result<Role> {
        self.authorize()?;
        self.registry.create(name, description)
    }

    pub fn rename(&self, key: &str, new_name: &str) -> Result<()> {
        self.authorize()?;
        self.registry.rename(key, new_name)
    }

    pub fn set_capabilities<I, C>(&self, key: &str, requested: I) -> Result<CapabilityUpdate>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        self.authorize()?;
        self.registry.set_capabilities(key, requested)
    }

    pub fn grant(&self, key: &str, capability: &str) -> Result<bool> {
        self.authorize()?;
        self.registry.grant(key, capability)
    }

    pub fn revoke(&self, key: &str, capability: &str) -> Result<bool> {
        self.authorize()?;
        self.registry.revoke(key, capability)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.authorize()?;
        self.registry.delete(key)
    }

    pub fn get(&self, key: &str) -> Result<Role> {
        self.authorize()?;
        self.registry.get(key)
    }

    pub fn list(&self) -> Result<Vec<Role>> {
        self.authorize()?;
        self.registry.list()
    }

    pub fn catalog(&self) -> Result<&CapabilityCatalog> {
        self.authorize()?;
        Ok(self.registry.catalog())
    }

    pub fn export_json(&self) -> Result<String> {
        self.authorize()?;
        self.registry.export_json()
    }

    /// Import uploaded JSON text, enforcing size and entry-count limits
    pub fn import_json(&self, json: &str, mode: ImportMode) -> Result<ImportReport> {
        self.authorize()?;

        if json.len() > self.limits.max_document_bytes {
            return Err(RoleError::DocumentTooLarge {
                unit: "bytes",
                actual: json.len(),
                limit: self.limits.max_document_bytes,
            });
        }

        let document: Value = serde_json::from_str(json)
            .map_err(|e| RoleError::malformed(format!("invalid JSON: {}", e)))?;

        if let Some(entries) = document.as_object() {
            if entries.len() > self.limits.max_entries {
                return Err(RoleError::DocumentTooLarge {
                    unit: "entries",
                    actual: entries.len(),
                    limit: self.limits.max_entries,
                });
            }
        }

        self.registry.import(&document, mode)
    }
}

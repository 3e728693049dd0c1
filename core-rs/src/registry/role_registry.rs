/**
 * role_registry.rs
 * Role registry: CRUD, capability mutation, import/export
 *
 * Keys:
 * - derived once from the name at creation (see role::key)
 * - never re-derived on rename
 * - taken verbatim from import documents; top-level keys that are not
 *   valid role keys are skipped, never normalized
 *
 * Capabilities:
 * - `set_capabilities` is a full replace: revoke everything, then grant
 *   the requested set filtered against the catalog
 * - unknown identifiers are dropped with a warning, never stored
 *
 * The registry trusts its caller; authorization lives in `admin`.
 */

use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::catalog::CapabilityCatalog;
use crate::errors::{Result, RoleError};
use crate::registry::transfer::{
    document_entries, parse_entry, EntryError, ExportedRole, ImportMode, ImportReport,
    ImportWarning,
};
use crate::role::{derive_key, is_valid_key, CapabilitySet, Role};
use crate::storage::RoleStore;

/// Result of a full capability replace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityUpdate {
    /// Role as stored after the update
    pub role: Role,

    /// Requested identifiers that are not in the catalog
    pub dropped: Vec<String>,
}

/// Role registry over an injected storage handle
pub struct RoleRegistry<S: RoleStore> {
    store: S,
    catalog: CapabilityCatalog,
}

impl<S: RoleStore> RoleRegistry<S> {
    /// Create a registry using the built-in capability catalog
    pub fn new(store: S) -> Self {
        Self::with_catalog(store, CapabilityCatalog::default())
    }

    pub fn with_catalog(store: S, catalog: CapabilityCatalog) -> Self {
        RoleRegistry { store, catalog }
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    /// Create a new role with no capabilities
    ///
    /// # Arguments
    /// * `name` - Human-readable name; the key is derived from it
    /// * `description` - Becomes the display name (first letter upper-cased);
    ///   falls back to `name` when blank
    ///
    /// # Errors
    /// - `InvalidName` if the name normalizes to an empty key
    /// - `DuplicateKey` if the derived key already exists
    pub fn create(&self, name: &str, description: &str) -> Result<Role> {
        let key = derive_key(name);
        if key.is_empty() {
            return Err(RoleError::InvalidName {
                name: name.to_string(),
                reason: "no characters usable in a key",
            });
        }

        let display_name = if description.trim().is_empty() {
            name.trim().to_string()
        } else {
            upper_first(description.trim())
        };

        let role = Role::new(key.clone(), display_name);
        if !self.store.insert(role.clone())? {
            return Err(RoleError::DuplicateKey(key));
        }

        info!(role = %key, "created role");
        Ok(role)
    }

    /// Change a role's display name; the key is untouched
    pub fn rename(&self, key: &str, new_name: &str) -> Result<()> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(RoleError::InvalidName {
                name: new_name.to_string(),
                reason: "display name must not be blank",
            });
        }
        let new_name = trimmed;

        self.store
            .update(key, &mut |role: &mut Role| role.set_display_name(new_name))?
            .ok_or_else(|| RoleError::NotFound(key.to_string()))?;

        info!(role = %key, name = %new_name, "renamed role");
        Ok(())
    }

    /// Replace a role's capability set
    ///
    /// The resulting set is exactly `requested ∩ catalog`. Everything the
    /// role held before is revoked first, so capabilities missing from the
    /// request are always removed.
    pub fn set_capabilities<I, C>(&self, key: &str, requested: I) -> Result<CapabilityUpdate>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let (accepted, dropped) = self.filter_known(requested);
        if !dropped.is_empty() {
            warn!(role = %key, dropped = ?dropped, "ignoring capabilities not in catalog");
        }

        let role = self
            .store
            .update(key, &mut |role: &mut Role| {
                role.revoke_all();
                for cap in &accepted {
                    role.add_capability(cap.clone());
                }
            })?
            .ok_or_else(|| RoleError::NotFound(key.to_string()))?;

        info!(role = %key, capabilities = role.capabilities().len(), "replaced role capabilities");
        Ok(CapabilityUpdate { role, dropped })
    }

    /// Grant a single capability
    ///
    /// # Returns
    /// true if the capability was newly granted; false if it was already
    /// held or is not in the catalog (unknown identifiers are dropped)
    pub fn grant(&self, key: &str, capability: &str) -> Result<bool> {
        if !self.catalog.contains(capability) {
            warn!(role = %key, capability = %capability, "ignoring capability not in catalog");
            self.get(key)?;
            return Ok(false);
        }

        let mut added = false;
        self.store
            .update(key, &mut |role: &mut Role| added = role.add_capability(capability))?
            .ok_or_else(|| RoleError::NotFound(key.to_string()))?;

        if added {
            info!(role = %key, capability = %capability, "granted capability");
        }
        Ok(added)
    }

    /// Revoke a single capability
    ///
    /// # Returns
    /// true if the role held the capability
    pub fn revoke(&self, key: &str, capability: &str) -> Result<bool> {
        let mut removed = false;
        self.store
            .update(key, &mut |role: &mut Role| removed = role.remove_capability(capability))?
            .ok_or_else(|| RoleError::NotFound(key.to_string()))?;

        if removed {
            info!(role = %key, capability = %capability, "revoked capability");
        }
        Ok(removed)
    }

    /// Remove a role unconditionally
    pub fn delete(&self, key: &str) -> Result<()> {
        if !self.store.delete(key)? {
            return Err(RoleError::NotFound(key.to_string()));
        }

        info!(role = %key, "deleted role");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Role> {
        self.store
            .get(key)?
            .ok_or_else(|| RoleError::NotFound(key.to_string()))
    }

    /// All roles in storage order
    pub fn list(&self) -> Result<Vec<Role>> {
        self.store.list()
    }

    /// Export every role as a JSON document, in `list()` order
    pub fn export(&self) -> Result<Value> {
        let mut doc = Map::new();
        for role in self.store.list()? {
            doc.insert(
                role.key().to_string(),
                serde_json::to_value(ExportedRole::from(&role))?,
            );
        }
        Ok(Value::Object(doc))
    }

    /// Export as pretty-printed JSON text
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export()?)?)
    }

    /// Import a document
    ///
    /// Existing keys are overwritten (name and full capability replace),
    /// new keys are created verbatim. Top-level keys that are not valid
    /// role keys (`$schema`, `Version`, ...) are skipped and listed in
    /// `ImportReport::ignored`. Every entry is validated before anything is
    /// written, and all writes go through one `commit`.
    ///
    /// # Errors
    /// `MalformedDocument` (without an entry) when the top level is not an
    /// object. Per-entry failures are reported in `ImportReport::errors`;
    /// under `ImportMode::Atomic` any such failure leaves the store untouched.
    pub fn import(&self, document: &Value, mode: ImportMode) -> Result<ImportReport> {
        let entries = document_entries(document)?;
        let existing: HashSet<String> = self
            .store
            .list()?
            .iter()
            .map(|r| r.key().to_string())
            .collect();

        let mut report = ImportReport::default();
        let mut batch = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            if !is_valid_key(key) {
                warn!(key = %key, "ignoring top-level key that is not a role key");
                report.ignored.push(key.clone());
                continue;
            }

            let parsed = match parse_entry(value, &self.catalog) {
                Ok(parsed) => parsed,
                Err(reason) => {
                    warn!(role = %key, reason = %reason, "rejected import entry");
                    report.errors.push(EntryError {
                        key: key.clone(),
                        reason,
                    });
                    continue;
                }
            };

            for capability in parsed.dropped {
                warn!(role = %key, capability = %capability, "ignoring capability not in catalog");
                report.warnings.push(ImportWarning {
                    key: key.clone(),
                    capability,
                });
            }

            if existing.contains(key) {
                report.overwritten.push(key.clone());
            } else {
                report.created.push(key.clone());
            }
            batch.push(Role::new(key.clone(), parsed.name).with_capabilities(parsed.capabilities));
        }

        if mode == ImportMode::Atomic && report.has_errors() {
            warn!(failed = report.errors.len(), "import aborted, no roles written");
            report.created.clear();
            report.overwritten.clear();
            return Ok(report);
        }

        if batch.is_empty() {
            info!(failed = report.errors.len(), "import had no roles to write");
            return Ok(report);
        }

        self.store.commit(batch)?;
        report.committed = true;

        info!(
            created = report.created.len(),
            overwritten = report.overwritten.len(),
            failed = report.errors.len(),
            "imported roles"
        );
        Ok(report)
    }

    /// Parse JSON text and import it
    pub fn import_json(&self, json: &str, mode: ImportMode) -> Result<ImportReport> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| RoleError::malformed(format!("invalid JSON: {}", e)))?;
        self.import(&document, mode)
    }

    fn filter_known<I, C>(&self, requested: I) -> (CapabilitySet, Vec<String>)
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let mut accepted = CapabilitySet::new();
        let mut dropped = Vec::new();
        for cap in requested {
            let cap = cap.as_ref();
            if self.catalog.contains(cap) {
                accepted.insert(cap.to_string());
            } else if !dropped.iter().any(|d: &String| d == cap) {
                dropped.push(cap.to_string());
            }
        }
        (accepted, dropped)
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Import/export document model
//!
//! Wire format (JSON object, one entry per role key):
//!
//! ```text
//! { "<role_key>": { "name": "<display name>", "capabilities": { "<cap>": true, ... } }, ... }
//! ```
//!
//! Only granted capabilities are exported. On import a capability mapped
//! to `false` is treated as absent, fields other than `name` and
//! `capabilities` are ignored, and top-level keys that are not valid role
//! keys are skipped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::catalog::CapabilityCatalog;
use crate::errors::RoleError;
use crate::role::{CapabilitySet, Role};

/// One role as it appears in an exported document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportedRole {
    pub name: String,
    pub capabilities: BTreeMap<String, bool>,
}

impl From<&Role> for ExportedRole {
    fn from(role: &Role) -> Self {
        ExportedRole {
            name: role.display_name().to_string(),
            capabilities: role
                .capabilities()
                .iter()
                .map(|cap| (cap.clone(), true))
                .collect(),
        }
    }
}

/// How an import treats entries that fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    /// Any failed entry aborts the whole import; nothing is written
    #[default]
    Atomic,

    /// Valid entries are written, failed entries are reported
    BestEffort,
}

/// An entry that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryError {
    pub key: String,
    pub reason: String,
}

impl EntryError {
    pub fn to_error(&self) -> RoleError {
        RoleError::malformed_entry(self.key.clone(), self.reason.clone())
    }
}

/// A capability dropped because it is not in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportWarning {
    pub key: String,
    pub capability: String,
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Keys of roles that did not exist before
    pub created: Vec<String>,

    /// Keys of existing roles whose name and capabilities were replaced
    pub overwritten: Vec<String>,

    pub errors: Vec<EntryError>,

    pub warnings: Vec<ImportWarning>,

    /// Top-level keys skipped because they are not role keys
    pub ignored: Vec<String>,

    /// Whether any role was written
    pub committed: bool,
}

impl ImportReport {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    pub fn overwritten_count(&self) -> usize {
        self.overwritten.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Error recorded for a given entry key, if any
    pub fn error_for(&self, key: &str) -> Option<&EntryError> {
        self.errors.iter().find(|e| e.key == key)
    }
}

/// A validated import entry, capabilities already filtered
#[derive(Debug)]
pub(crate) struct ParsedEntry {
    pub name: String,
    pub capabilities: CapabilitySet,
    pub dropped: Vec<String>,
}

/// Top-level shape check
pub(crate) fn document_entries(document: &Value) -> Result<&Map<String, Value>, RoleError> {
    document
        .as_object()
        .ok_or_else(|| RoleError::malformed("expected a JSON object mapping role keys to roles"))
}

/// Validate the value of one import entry
///
/// # Returns
/// The parsed entry, or a human-readable reason for the caller to
/// attribute to the entry's key
pub(crate) fn parse_entry(value: &Value, catalog: &CapabilityCatalog) -> Result<ParsedEntry, String> {
    let entry = value
        .as_object()
        .ok_or_else(|| "entry must be an object".to_string())?;

    let name = match entry.get("name") {
        None => return Err("missing field `name`".to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err("field `name` must not be empty".to_string())
        }
        Some(Value::String(s)) => s.trim().to_string(),
        Some(_) => return Err("field `name` must be a string".to_string()),
    };

    let raw_caps = match entry.get("capabilities") {
        None => return Err("missing field `capabilities`".to_string()),
        Some(Value::Object(map)) => map,
        Some(_) => return Err("field `capabilities` must be an object of booleans".to_string()),
    };

    let mut capabilities = CapabilitySet::new();
    let mut dropped = Vec::new();
    for (cap, granted) in raw_caps {
        let granted = granted
            .as_bool()
            .ok_or_else(|| format!("capability `{}` must map to a boolean", cap))?;
        if !granted {
            continue;
        }
        if catalog.contains(cap) {
            capabilities.insert(cap.clone());
        } else {
            dropped.push(cap.clone());
        }
    }

    Ok(ParsedEntry {
        name,
        capabilities,
        dropped,
    })
}

/**
 * config.rs
 * Parser for rolectl.yaml
 *
 * Format:
 * ```yaml
 * apiVersion: rolemanager/v1
 * kind: RoleRegistry
 * spec:
 *   store: ./roles.json
 *   import:
 *     mode: atomic
 *     maxEntries: 1000
 *     maxDocumentBytes: 1048576
 *   catalog:
 *     - category: Post Management
 *       capabilities: [read, edit_posts, delete_posts, publish_posts]
 * ```
 *
 * Every field under `spec` is optional; a missing file means defaults.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::admin::ImportLimits;
use crate::catalog::{CapabilityCatalog, CapabilityCategory};
use crate::errors::{Result, RoleError};
use crate::registry::ImportMode;

pub const API_VERSION: &str = "rolemanager/v1";
pub const KIND: &str = "RoleRegistry";
pub const DEFAULT_CONFIG_FILE: &str = "rolectl.yaml";
pub const DEFAULT_STORE_FILE: &str = "roles.json";

/// rolectl.yaml file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub spec: Spec,
}

/// Import settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportConfig {
    #[serde(default)]
    pub mode: ImportMode,
    #[serde(flatten)]
    pub limits: ImportLimits,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            mode: ImportMode::default(),
            limits: ImportLimits::default(),
        }
    }
}

/// Settings under the `spec` key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    #[serde(default = "default_store")]
    pub store: PathBuf,
    #[serde(default)]
    pub import: ImportConfig,
    /// Replaces the built-in catalog when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Vec<CapabilityCategory>>,
}

impl Default for Spec {
    fn default() -> Self {
        Spec {
            store: default_store(),
            import: ImportConfig::default(),
            catalog: None,
        }
    }
}

fn default_store() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_FILE)
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            spec: Spec::default(),
        }
    }
}

impl RegistryConfig {
    /// Load rolectl.yaml from the specified path
    ///
    /// # Errors
    /// `Config` if the file is missing, unparsable or invalid
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RoleError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let config: RegistryConfig = serde_yaml::from_str(&content).map_err(|e| {
            RoleError::Config(format!("Invalid {} YAML: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate rolectl.yaml structure
    pub fn validate(&self) -> Result<()> {
        if self.api_version != API_VERSION {
            return Err(RoleError::Config(format!(
                "Invalid apiVersion: expected '{}', got '{}'",
                API_VERSION, self.api_version
            )));
        }

        if self.kind != KIND {
            return Err(RoleError::Config(format!(
                "Invalid kind: expected '{}', got '{}'",
                KIND, self.kind
            )));
        }

        if self.spec.store.as_os_str().is_empty() {
            return Err(RoleError::Config("spec.store cannot be empty".to_string()));
        }

        let limits = &self.spec.import.limits;
        if limits.max_entries == 0 || limits.max_document_bytes == 0 {
            return Err(RoleError::Config(
                "spec.import limits must be greater than zero".to_string(),
            ));
        }

        if let Some(categories) = &self.spec.catalog {
            for category in categories {
                if category.name.trim().is_empty() {
                    return Err(RoleError::Config(
                        "spec.catalog category names cannot be empty".to_string(),
                    ));
                }
                if category.capabilities.iter().any(|c| c.trim().is_empty()) {
                    return Err(RoleError::Config(format!(
                        "spec.catalog category '{}' lists an empty capability",
                        category.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Capability catalog to use (configured or built-in)
    pub fn catalog(&self) -> CapabilityCatalog {
        match &self.spec.catalog {
            Some(categories) => CapabilityCatalog::from_categories(categories.clone()),
            None => CapabilityCatalog::default(),
        }
    }

    /// Save rolectl.yaml to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path.as_ref(), yaml)?;
        Ok(())
    }
}

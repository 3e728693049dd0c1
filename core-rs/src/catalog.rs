//! Capability catalog
//!
//! Static, read-only grouping of known capability identifiers into named
//! categories. The catalog is the vocabulary that `set_capabilities`,
//! `grant` and `import` filter against; the grouping itself only matters
//! for presentation.

use serde::{Deserialize, Serialize};

/// One named group of capabilities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapabilityCategory {
    #[serde(rename = "category")]
    pub name: String,
    pub capabilities: Vec<String>,
}

/// Ordered categories of known capability identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityCatalog {
    categories: Vec<CapabilityCategory>,
}

impl CapabilityCatalog {
    /// Build a catalog from `(category, capabilities)` pairs, keeping order
    ///
    /// # Example
    /// ```
    /// use role_manager::CapabilityCatalog;
    ///
    /// let catalog = CapabilityCatalog::new(vec![
    ///     ("Media".to_string(), vec!["upload_files".to_string()]),
    /// ]);
    /// assert!(catalog.contains("upload_files"));
    /// ```
    pub fn new(categories: Vec<(String, Vec<String>)>) -> Self {
        CapabilityCatalog {
            categories: categories
                .into_iter()
                .map(|(name, capabilities)| CapabilityCategory { name, capabilities })
                .collect(),
        }
    }

    pub fn from_categories(categories: Vec<CapabilityCategory>) -> Self {
        CapabilityCatalog { categories }
    }

    /// Categories in presentation order
    pub fn categories(&self) -> &[CapabilityCategory] {
        &self.categories
    }

    /// Check whether a capability identifier is part of the vocabulary
    pub fn contains(&self, capability: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.capabilities.iter().any(|cap| cap == capability))
    }

    /// Every known capability, in catalog order, without duplicates
    pub fn all(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for category in &self.categories {
            for cap in &category.capabilities {
                if !seen.contains(&cap.as_str()) {
                    seen.push(cap.as_str());
                }
            }
        }
        seen
    }

    /// Category a capability is listed under, if any
    pub fn category_of(&self, capability: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.capabilities.iter().any(|cap| cap == capability))
            .map(|c| c.name.as_str())
    }
}

impl Default for CapabilityCatalog {
    fn default() -> Self {
        let group = |caps: &[&str]| caps.iter().map(|c| c.to_string()).collect::<Vec<_>>();

        CapabilityCatalog::new(vec![
            (
                "Post Management".to_string(),
                group(&["read", "edit_posts", "delete_posts", "publish_posts"]),
            ),
            (
                "User Management".to_string(),
                group(&["list_users", "create_users", "delete_users"]),
            ),
        ])
    }
}

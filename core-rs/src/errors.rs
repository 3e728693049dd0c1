//! Error types for the role registry

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoleError {
    #[error("Role not found: {0}")]
    NotFound(String),

    #[error("Role already exists: {0}")]
    DuplicateKey(String),

    #[error("Invalid role name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Malformed document{}: {reason}", entry_suffix(.entry))]
    MalformedDocument {
        entry: Option<String>,
        reason: String,
    },

    #[error("Unauthorized: missing capability {0}")]
    Unauthorized(String),

    #[error("Document too large: {actual} {unit} exceeds limit of {limit}")]
    DocumentTooLarge {
        unit: &'static str,
        actual: usize,
        limit: usize,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RoleError {
    /// Document-level shape failure, not tied to a single entry
    pub fn malformed(reason: impl Into<String>) -> Self {
        RoleError::MalformedDocument {
            entry: None,
            reason: reason.into(),
        }
    }

    /// Shape failure attributed to one entry of an import document
    pub fn malformed_entry(key: impl Into<String>, reason: impl Into<String>) -> Self {
        RoleError::MalformedDocument {
            entry: Some(key.into()),
            reason: reason.into(),
        }
    }
}

fn entry_suffix(entry: &Option<String>) -> String {
    match entry {
        Some(key) => format!(" (entry \"{}\")", key),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, RoleError>;

//! # Role Manager
//!
//! Role and capability registry for a content platform. Administrators
//! create, rename, inspect and delete named roles, set the capabilities
//! each role grants, and move whole role sets between installations as a
//! JSON document.
//!
//! ## Core Principle
//!
//! **Keys are forever**: a role's key is derived once from the name it was
//! created with and never changes, so anything that references a role by
//! key keeps working across renames.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   manage_options   ┌──────────────┐       ┌──────────────┐
//! │  RoleAdmin   │ ─────────────────▶ │ RoleRegistry │ ────▶ │  RoleStore   │
//! │ (host guard) │                    │  (protocol)  │       │ memory/file  │
//! └──────────────┘                    └──────────────┘       └──────────────┘
//!                                            │
//!                                   CapabilityCatalog
//! ```

pub mod admin;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod registry;
pub mod role;
pub mod storage;

pub use admin::{ImportLimits, LocalOperator, RoleAdmin, Session, StaticSession, MANAGE_ROLES_CAPABILITY};
pub use catalog::{CapabilityCatalog, CapabilityCategory};
pub use config::RegistryConfig;
pub use errors::{Result, RoleError};
pub use registry::{CapabilityUpdate, EntryError, ExportedRole, ImportMode, ImportReport, ImportWarning, RoleRegistry};
pub use role::{derive_key, is_valid_key, CapabilitySet, Role};
pub use storage::{FileStore, MemoryStore, RoleStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

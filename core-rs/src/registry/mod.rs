/**
 * registry module
 * Role registry and its import/export document model
 */

pub mod role_registry;
pub mod transfer;

pub use role_registry::{CapabilityUpdate, RoleRegistry};
pub use transfer::{EntryError, ExportedRole, ImportMode, ImportReport, ImportWarning};

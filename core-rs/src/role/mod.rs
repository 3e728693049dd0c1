//! Role module
//!
//! The role record and the rules for deriving its stable key.

pub mod key;
pub mod model;

pub use key::{derive_key, is_valid_key};
pub use model::{CapabilitySet, Role};

//! Storage trait for role records
//!
//! Defines the interface every role backend implements. Implementations:
//! - MemoryStore (process-local, used as a test double)
//! - FileStore (single JSON document on disk)

use crate::errors::Result;
use crate::role::Role;

/// Role storage backend
///
/// # Protocol Semantics
///
/// Backends must:
/// - Serialize writes (a single write lock or per-key compare-and-swap)
/// - Keep `list()` in a stable order across calls absent mutation
/// - Never expose a partially written role: each call either lands fully
///   or not at all
///
/// The registry holds no locks of its own. Read-modify-write sequences it
/// needs are expressed as `insert` and `update` so the backend can run
/// them under its write lock.
pub trait RoleStore: Send + Sync {
    /// Fetch a role by key
    fn get(&self, key: &str) -> Result<Option<Role>>;

    /// All roles in storage order
    fn list(&self) -> Result<Vec<Role>>;

    /// Insert a role whose key must not exist yet
    ///
    /// # Returns
    /// false (and no write) if a role with the same key already exists
    fn insert(&self, role: Role) -> Result<bool>;

    /// Apply `apply` to the stored role under the write lock
    ///
    /// # Returns
    /// The updated role, or None if the key is absent
    fn update(&self, key: &str, apply: &mut dyn FnMut(&mut Role)) -> Result<Option<Role>>;

    /// Remove a role
    ///
    /// # Returns
    /// true if a role was removed, false if the key was absent
    fn delete(&self, key: &str) -> Result<bool>;

    /// Insert or replace a batch of roles atomically
    ///
    /// Either every role in `batch` is visible afterwards or none is.
    fn commit(&self, batch: Vec<Role>) -> Result<()>;

    /// Insert or replace a single role
    fn put(&self, role: Role) -> Result<()> {
        self.commit(vec![role])
    }
}

/// Upsert a batch into an in-memory role list, preserving positions of
/// replaced records and appending new ones
pub(crate) fn upsert_all(roles: &mut Vec<Role>, batch: Vec<Role>) {
    for role in batch {
        match roles.iter_mut().find(|r| r.key() == role.key()) {
            Some(existing) => *existing = role,
            None => roles.push(role),
        }
    }
}

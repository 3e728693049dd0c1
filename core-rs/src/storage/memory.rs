//! In-memory role store
//!
//! A `Mutex<Vec<Role>>` behind the `RoleStore` trait. Insertion order is
//! the storage order.

use std::sync::{Mutex, MutexGuard};

use crate::errors::{Result, RoleError};
use crate::role::Role;
use crate::storage::traits::{upsert_all, RoleStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    roles: Mutex<Vec<Role>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Role>>> {
        self.roles
            .lock()
            .map_err(|_| RoleError::Storage("memory store lock poisoned".to_string()))
    }
}

impl RoleStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Role>> {
        Ok(self.lock()?.iter().find(|r| r.key() == key).cloned())
    }

    fn list(&self) -> Result<Vec<Role>> {
        Ok(self.lock()?.clone())
    }

    fn insert(&self, role: Role) -> Result<bool> {
        let mut roles = self.lock()?;
        if roles.iter().any(|r| r.key() == role.key()) {
            return Ok(false);
        }
        roles.push(role);
        Ok(true)
    }

    fn update(&self, key: &str, apply: &mut dyn FnMut(&mut Role)) -> Result<Option<Role>> {
        let mut roles = self.lock()?;
        match roles.iter_mut().find(|r| r.key() == key) {
            Some(role) => {
                apply(role);
                Ok(Some(role.clone()))
            }
            None => Ok(None),
        }
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut roles = self.lock()?;
        let before = roles.len();
        roles.retain(|r| r.key() != key);
        Ok(roles.len() != before)
    }

    fn commit(&self, batch: Vec<Role>) -> Result<()> {
        let mut roles = self.lock()?;
        upsert_all(&mut roles, batch);
        Ok(())
    }
}

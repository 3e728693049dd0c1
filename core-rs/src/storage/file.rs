/**
 * file.rs
 * Durable role store backed by a single JSON document
 *
 * Layout:
 * ```json
 * {
 *   "version": 1,
 *   "updatedAt": "2025-01-25T10:00:00+00:00",
 *   "roles": [ { "key": "editor", "displayName": "Editor", "capabilities": ["read"] } ]
 * }
 * ```
 *
 * Writes:
 * - exclusive flock on `<path>.lock` for the whole read-modify-write
 * - new document written to `<path>.tmp`, fsynced, renamed over `<path>`
 *
 * Readers never take the lock; rename is atomic so they see either the
 * old or the new document.
 *
 * Every failure touching the store files surfaces as `RoleError::Storage`.
 */

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::errors::{Result, RoleError};
use crate::role::Role;
use crate::storage::traits::{upsert_all, RoleStore};

const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
    #[serde(default)]
    roles: Vec<Role>,
}

/// Exclusive advisory lock held for the lifetime of the guard
struct LockGuard {
    #[cfg_attr(not(unix), allow(dead_code))]
    file: File,
}

impl LockGuard {
    fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| storage_io("open lock file", path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;

            // Blocks until the lock is available
            let fd = file.as_raw_fd();
            unsafe {
                if libc::flock(fd, libc::LOCK_EX) != 0 {
                    return Err(storage_io("lock", path, std::io::Error::last_os_error()));
                }
            }
        }

        Ok(LockGuard { file })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            unsafe {
                libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
            }
        }
    }
}

/// File-backed role store
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
    // flock alone does not serialize threads on platforms without it
    local: Mutex<()>,
}

impl FileStore {
    /// Create a store for the given document path
    ///
    /// The file is created lazily on the first write; a missing file reads
    /// as an empty registry.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = sibling(&path, "lock");
        FileStore {
            path,
            lock_path,
            local: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Role>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "role store missing, reading as empty");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| storage_io("read role store", &self.path, e))?;
        let doc: StoreDocument = serde_json::from_str(&content).map_err(|e| {
            RoleError::Storage(format!(
                "Corrupt role store {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if doc.version != STORE_VERSION {
            return Err(RoleError::Storage(format!(
                "Unsupported role store version {} in {}",
                doc.version,
                self.path.display()
            )));
        }

        let mut seen = HashSet::new();
        for role in &doc.roles {
            if !seen.insert(role.key()) {
                return Err(RoleError::Storage(format!(
                    "Duplicate role key \"{}\" in {}",
                    role.key(),
                    self.path.display()
                )));
            }
        }

        debug!(path = %self.path.display(), roles = doc.roles.len(), "loaded role store");
        Ok(doc.roles)
    }

    fn save(&self, roles: Vec<Role>) -> Result<()> {

        let count = roles.len();
        let doc = StoreDocument {
            version: STORE_VERSION,
            updated_at: Some(Utc::now().to_rfc3339()),
            roles,
        };
        let json = serde_json::to_string_pretty(&doc).map_err(|e| {
            RoleError::Storage(format!("Failed to encode role store {}: {}", self.path.display(), e))
        })?;

        let tmp_path = sibling(&self.path, "tmp");
        File::create(&tmp_path)
            .and_then(|mut tmp| {
                tmp.write_all(json.as_bytes())?;
                tmp.sync_all()
            })
            .map_err(|e| storage_io("write", &tmp_path, e))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| storage_io("replace role store", &self.path, e))?;

        debug!(path = %self.path.display(), roles = count, "saved role store");
        Ok(())
    }

    /// Run a read-modify-write cycle under the write lock
    ///
    /// `mutate` returns the value to hand back and whether anything changed;
    /// unchanged documents are not rewritten.
    fn write_locked<T>(&self, mutate: impl FnOnce(&mut Vec<Role>) -> (T, bool)) -> Result<T> {
        let _local = self
            .local
            .lock()
            .map_err(|_| RoleError::Storage("file store lock poisoned".to_string()))?;
        if let Some(parent) = self.lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| storage_io("create directory", parent, e))?;
            }
        }
        let _guard = LockGuard::acquire(&self.lock_path)?;

        let mut roles = self.load()?;
        let (value, changed) = mutate(&mut roles);
        if changed {
            self.save(roles)?;
        }
        Ok(value)
    }
}

impl RoleStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Role>> {
        Ok(self.load()?.into_iter().find(|r| r.key() == key))
    }

    fn list(&self) -> Result<Vec<Role>> {
        self.load()
    }

    fn insert(&self, role: Role) -> Result<bool> {
        self.write_locked(|roles| {
            if roles.iter().any(|r| r.key() == role.key()) {
                (false, false)
            } else {
                roles.push(role);
                (true, true)
            }
        })
    }

    fn update(&self, key: &str, apply: &mut dyn FnMut(&mut Role)) -> Result<Option<Role>> {
        self.write_locked(|roles| match roles.iter_mut().find(|r| r.key() == key) {
            Some(role) => {
                apply(role);
                (Some(role.clone()), true)
            }
            None => (None, false),
        })
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.write_locked(|roles| {
            let before = roles.len();
            roles.retain(|r| r.key() != key);
            let removed = roles.len() != before;
            (removed, removed)
        })
    }

    fn commit(&self, batch: Vec<Role>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.write_locked(|roles| {
            upsert_all(roles, batch);
            ((), true)
        })
    }
}

fn storage_io(action: &str, path: &Path, e: std::io::Error) -> RoleError {
    RoleError::Storage(format!("Failed to {} {}: {}", action, path.display(), e))
}

/// `roles.json` -> `roles.json.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

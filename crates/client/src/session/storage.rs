//! Persistence for session credentials.
//!
//! Entries carry an expiry, like the cookies the browser build of the
//! storefront used. Expired entries read as absent and are evicted on read.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifetime of persisted session entries.
pub const SESSION_TTL: Duration = Duration::days(7);

/// Storage keys for session data.
pub mod keys {
    /// Key for the bearer token.
    pub const TOKEN: &str = "token";

    /// Key for the serialized user record.
    pub const USER: &str = "user";
}

/// Errors from credential storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a valid entry map.
    #[error("corrupt storage: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Key/value storage with per-entry expiry.
pub trait CredentialStorage: Send + Sync {
    /// Read an entry. Missing and expired entries are `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write an entry that expires after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError>;

    /// Remove an entry. Removing a missing entry succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Utc::now() + ttl,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

type Entries = HashMap<String, Entry>;

/// Look up `key`, evicting it if expired. Returns the value and whether the
/// map changed.
fn read_entry(entries: &mut Entries, key: &str) -> (Option<String>, bool) {
    match entries.get(key) {
        Some(entry) if entry.is_expired(Utc::now()) => {
            entries.remove(key);
            (None, true)
        }
        Some(entry) => (Some(entry.value.clone()), false),
        None => (None, false),
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<Entries>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(read_entry(&mut self.lock(), key).0)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), Entry::new(value, ttl));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// Storage backed by a JSON file.
///
/// The whole map is read and rewritten on each access. A missing file is an
/// empty map. Parent directories are created on first write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStorage {
    /// Storage persisted at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Entries, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Entries::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock();
        let mut entries = self.load()?;
        let (value, evicted) = read_entry(&mut entries, key);
        if evicted {
            self.save(&entries)?;
        }
        Ok(value)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError> {
        let _guard = self.lock();
        let mut entries = self.load()?;
        entries.insert(key.to_string(), Entry::new(value, ttl));
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock();
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Resetting corrupt session file");
                return self.save(&Entries::new());
            }
            Err(e) => return Err(e),
        };
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

//! Key-Value store wrapper with automatic serialization.

use crate::{CacheError, FileStore, MemoryStore, Store};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Type-safe cache over a [`Store`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Handles are cheap to clone and all
/// clones see the same underlying store.
#[derive(Debug, Clone)]
pub struct Cache {
    store: Arc<dyn Store>,
}

impl Cache {
    /// Wrap an existing store.
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Open a fresh in-memory cache.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Open a file-backed cache rooted at `dir`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open("/var/lib/aims")?;
    /// ```
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        Ok(Self::with_store(Arc::new(FileStore::open(dir)?)))
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist and an error if the stored
    /// bytes don't parse as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get a value, treating any failure as absence.
    ///
    /// Read or parse failures are logged and reported as `None`; a corrupt
    /// entry is equivalent to a cold start.
    pub fn get_or_discard<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get(key) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(key, %error, "discarding unreadable cache entry");
                None
            }
        }
    }

    /// Set a value in the cache, overwriting any previous value.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store.exists(key)
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.store.keys()
    }

    /// Write raw bytes under `key`, bypassing serialization.
    pub fn set_raw(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.store.set(key, bytes)
    }
}

//! Typed storage wrapper with automatic JSON serialization.

use crate::{StorageBackend, StorageError};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Typed key-value storage over a [`StorageBackend`].
///
/// Cloning is cheap; clones share the backend.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Wrap a backend.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Wrap an already shared backend.
    pub fn from_arc(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Get a value, distinguishing a missing key from a failure.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.backend.read(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value.
    pub fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.write(key, &bytes)
    }

    /// Delete a value.
    pub fn try_remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.delete(key)
    }

    /// All stored keys.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.backend.keys()
    }

    /// Get a value. Missing keys, unreadable stores and corrupt values all
    /// read as `None`; failures are logged.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(error) => {
                warn!(key, %error, "Error reading from storage");
                None
            }
        }
    }

    /// Get a value or `default` when [`get`](Self::get) would return `None`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Set a value. Returns whether the write succeeded.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match self.try_set(key, value) {
            Ok(()) => true,
            Err(error) => {
                warn!(key, %error, "Error writing to storage");
                false
            }
        }
    }

    /// Delete a value. Returns whether the delete succeeded.
    pub fn remove(&self, key: &str) -> bool {
        match self.try_remove(key) {
            Ok(()) => true,
            Err(error) => {
                warn!(key, %error, "Error removing from storage");
                false
            }
        }
    }
}

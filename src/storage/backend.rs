//! Key-value storage abstraction.
//!
//! This module defines the [`KeyValueStore`] trait the cache and favorites layers
//! persist through. Values are opaque strings (JSON in practice); callers own the
//! encoding and pick distinct keys.

use crate::domain::error::{CatalogError, Result};
use std::sync::{Arc, Mutex};

/// Abstraction over persistent string key-value backends.
///
/// # Implementations
///
/// - [`JsonFileStore`](super::JsonFileStore): single JSON file with atomic writes (default)
/// - [`MemoryStore`](super::MemoryStore): process-local map
///
/// # Examples
///
/// ```no_run
/// use shopfront::storage::{JsonFileStore, KeyValueStore};
/// use std::path::PathBuf;
///
/// let mut store = JsonFileStore::new(PathBuf::from("/tmp/shopfront.json"))?;
/// store.set("greeting", "hello".to_string())?;
/// assert_eq!(store.get("greeting")?, Some("hello".to_string()));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait KeyValueStore: Send {
    /// Returns the value stored under `key`, or `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// A key-value store shared between the cache and favorites layers.
///
/// Both layers live on the worker thread, but the handle is `Sync` so a consumer can
/// keep a clone for inspection or shutdown.
pub type SharedStore = Arc<Mutex<Box<dyn KeyValueStore>>>;

/// Wraps a store so it can be shared.
pub fn shared(store: impl KeyValueStore + 'static) -> SharedStore {
    Arc::new(Mutex::new(Box::new(store)))
}

/// Runs `f` with exclusive access to the shared store.
///
/// # Errors
///
/// Returns a storage error if the lock is poisoned, or whatever `f` returns.
pub fn with_store<T>(
    store: &SharedStore,
    f: impl FnOnce(&mut dyn KeyValueStore) -> Result<T>,
) -> Result<T> {
    let mut guard = store
        .lock()
        .map_err(|e| CatalogError::Storage(format!("store lock poisoned: {e}")))?;
    f(guard.as_mut())
}

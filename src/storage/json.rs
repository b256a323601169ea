//! JSON file-based key-value store.
//!
//! All entries live in one human-readable JSON document. Writes go to a temporary
//! file first and are renamed into place, so a crash never leaves a half-written
//! store behind.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(1) - the whole file is loaded into memory once
//! - **Write**: O(n) - the whole document is serialized on every change
//! - **Best for**: a handful of keys holding small-to-medium JSON values

use crate::domain::error::{CatalogError, Result};
use crate::storage::backend::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// On-disk container format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    /// Version of the storage format for future migrations.
    version: u32,

    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: 1,
            entries: BTreeMap::new(),
        }
    }
}

/// JSON file store.
///
/// The dataset is kept in memory and persisted on every modification.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "entries": {
///     "favorites": "[1,5,9]",
///     "products_cache": "{\"data\":{...},\"timestamp\":1700000000000}"
///   }
/// }
/// ```
pub struct JsonFileStore {
    file_path: PathBuf,
    data: StoreData,
    dirty: bool,
}

impl JsonFileStore {
    /// Creates or opens a JSON store at `file_path`.
    ///
    /// Parent directories are created automatically. A missing file starts an empty
    /// store.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - File exists but contains invalid JSON
    /// - File permissions prevent reading
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty store");
            StoreData::default()
        };

        tracing::debug!(entry_count = data.entries.len(), "store initialized");

        Ok(Self {
            file_path,
            data,
            dirty: false,
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<StoreData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StoreData = serde_json::from_str(&contents)
            .map_err(|e| CatalogError::Storage(format!("failed to parse JSON: {e}")))?;

        tracing::debug!(
            version = data.version,
            entries = data.entries.len(),
            "loaded store data"
        );

        Ok(data)
    }

    /// Writes the document to a sibling temp file and renames it over the target.
    fn save_to_file(&mut self) -> Result<()> {
        if !self.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| CatalogError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        self.dirty = false;
        tracing::debug!(path = ?self.file_path, "store saved");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.data.entries.get(key).cloned();
        tracing::trace!(key = key, found = value.is_some(), "json store get");
        Ok(value)
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let _span = tracing::debug_span!("json_store_set", key = key, bytes = value.len()).entered();

        if self.data.entries.get(key) == Some(&value) {
            return Ok(());
        }
        self.data.entries.insert(key.to_string(), value);
        self.dirty = true;
        self.save_to_file()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_store_remove", key = key).entered();

        if self.data.entries.remove(key).is_some() {
            self.dirty = true;
            self.save_to_file()?;
        }
        Ok(())
    }
}

impl Drop for JsonFileStore {
    fn drop(&mut self) {
        if self.dirty {
            tracing::debug!("saving dirty data on drop");
            if let Err(e) = self.save_to_file() {
                tracing::error!(error = %e, "failed to save on drop");
            }
        }
    }
}

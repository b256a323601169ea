//! Persistence of the favorites set.

use crate::domain::CatalogError;
use crate::storage::backend::{with_store, SharedStore};
use crate::storage::models::{FavoritesRecord, FAVORITES_KEY};

/// Reads and writes the favorites record. Failures are logged and swallowed: a
/// missing or unreadable record loads as an empty set.
#[derive(Clone)]
pub struct FavoritesRepository {
    store: SharedStore,
}

impl FavoritesRepository {
    /// Creates a repository over the shared key-value store.
    #[must_use]
    pub const fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Loads the persisted ids, in ascending order.
    #[must_use]
    pub fn load(&self) -> Vec<u64> {
        let raw = match with_store(&self.store, |store| store.get(FAVORITES_KEY)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read favorites");
                return Vec::new();
            }
        };

        match serde_json::from_str::<FavoritesRecord>(&raw) {
            Ok(record) => {
                tracing::debug!(count = record.favorite_ids.len(), "favorites loaded");
                record.favorite_ids
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable favorites record");
                Vec::new()
            }
        }
    }

    /// Overwrites the persisted set. Returns whether the write succeeded.
    pub fn save(&self, favorite_ids: &[u64]) -> bool {
        let record = FavoritesRecord {
            favorite_ids: favorite_ids.to_vec(),
        };

        let result = serde_json::to_string(&record)
            .map_err(CatalogError::from)
            .and_then(|json| with_store(&self.store, |store| store.set(FAVORITES_KEY, json)));

        match result {
            Ok(()) => {
                tracing::debug!(count = favorite_ids.len(), "favorites saved");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to save favorites");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::shared;
    use crate::storage::MemoryStore;

    #[test]
    fn save_and_load() {
        let repo = FavoritesRepository::new(shared(MemoryStore::new()));
        assert!(repo.load().is_empty());

        assert!(repo.save(&[3, 8, 21]));
        assert_eq!(repo.load(), vec![3, 8, 21]);
    }

    #[test]
    fn persisted_shape_is_an_id_array() {
        let store = shared(MemoryStore::new());
        FavoritesRepository::new(store.clone()).save(&[4]);

        let raw = with_store(&store, |s| s.get(FAVORITES_KEY)).unwrap().unwrap();
        assert_eq!(raw, r#"{"favoriteIds":[4]}"#);
    }
}

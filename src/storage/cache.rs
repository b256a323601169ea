//! Best-effort cache of the unscoped first catalog page.
//!
//! The cache exists so the catalog can still show something without connectivity.
//! It must never get in the way of live browsing: every failure is logged and
//! swallowed, and `load` reports absence instead of erroring.

use crate::domain::{CatalogError, ProductPage};
use crate::storage::backend::{with_store, SharedStore};
use crate::storage::models::{CachedSnapshot, PRODUCTS_CACHE_KEY, PRODUCTS_CACHE_TIMESTAMP_KEY};

/// Cache store for the most recent successful unscoped first page.
#[derive(Clone)]
pub struct CacheStore {
    store: SharedStore,
}

impl CacheStore {
    /// Creates a cache over the shared key-value store.
    #[must_use]
    pub const fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Serializes `{data, timestamp = now}` and overwrites the previous snapshot.
    pub fn save(&self, page: &ProductPage) {
        self.save_snapshot(&CachedSnapshot::now(page.clone()));
    }

    fn save_snapshot(&self, snapshot: &CachedSnapshot) {
        let _span = tracing::debug_span!(
            "cache_save",
            products = snapshot.data.products.len(),
            total = snapshot.data.total
        )
        .entered();

        let result = serde_json::to_string(snapshot)
            .map_err(CatalogError::from)
            .and_then(|json| {
                with_store(&self.store, |store| {
                    store.set(PRODUCTS_CACHE_KEY, json)?;
                    store.set(PRODUCTS_CACHE_TIMESTAMP_KEY, snapshot.timestamp.to_string())
                })
            });

        match result {
            Ok(()) => tracing::debug!("products cached"),
            Err(e) => tracing::warn!(error = %e, "failed to save products to cache"),
        }
    }

    /// Returns the most recent snapshot, or `None` if there is none or it cannot be
    /// read.
    #[must_use]
    pub fn load(&self) -> Option<CachedSnapshot> {
        let _span = tracing::debug_span!("cache_load").entered();

        let raw = match with_store(&self.store, |store| store.get(PRODUCTS_CACHE_KEY)) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load products from cache");
                return None;
            }
        };

        match serde_json::from_str::<CachedSnapshot>(&raw) {
            Ok(snapshot) => {
                tracing::debug!(
                    products = snapshot.data.products.len(),
                    timestamp = snapshot.timestamp,
                    "cache hit"
                );
                Some(snapshot)
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable products cache");
                None
            }
        }
    }

    /// Removes the snapshot and its timestamp.
    pub fn clear(&self) {
        let result = with_store(&self.store, |store| {
            store.remove(PRODUCTS_CACHE_KEY)?;
            store.remove(PRODUCTS_CACHE_TIMESTAMP_KEY)
        });

        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to clear products cache");
        }
    }
}

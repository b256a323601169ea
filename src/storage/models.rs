//! Persisted record shapes.
//!
//! These are the exact structures written to the key-value store. They are kept
//! separate from the in-memory state types so the on-disk format can stay stable
//! while the state machine evolves.

use crate::domain::ProductPage;
use serde::{Deserialize, Serialize};

/// Key of the cached unscoped first page.
pub const PRODUCTS_CACHE_KEY: &str = "products_cache";

/// Key of the cache timestamp, written alongside the snapshot.
pub const PRODUCTS_CACHE_TIMESTAMP_KEY: &str = "products_cache_timestamp";

/// Key of the persisted favorites set.
pub const FAVORITES_KEY: &str = "favorites";

/// The last successful unscoped first-page fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSnapshot {
    /// The page exactly as the API returned it.
    pub data: ProductPage,

    /// Unix timestamp in milliseconds at which the page was saved.
    pub timestamp: i64,
}

impl CachedSnapshot {
    /// Creates a snapshot stamped with the current time.
    #[must_use]
    pub fn now(data: ProductPage) -> Self {
        Self {
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Persisted favorites: product ids in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FavoritesRecord {
    #[serde(rename = "favoriteIds")]
    pub favorite_ids: Vec<u64>,
}

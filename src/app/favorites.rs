//! In-memory favorites set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of favorite product ids.
///
/// Mutations are synchronous and independent of catalog fetch status; the state
/// machine persists the set after every change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FavoritesState {
    pub favorite_ids: BTreeSet<u64>,
}

impl FavoritesState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`. Returns whether `id` is a favorite afterwards.
    pub fn toggle(&mut self, id: u64) -> bool {
        if self.favorite_ids.remove(&id) {
            false
        } else {
            self.favorite_ids.insert(id)
        }
    }

    /// Returns whether the set changed.
    pub fn add(&mut self, id: u64) -> bool {
        self.favorite_ids.insert(id)
    }

    /// Returns whether the set changed.
    pub fn remove(&mut self, id: u64) -> bool {
        self.favorite_ids.remove(&id)
    }

    /// Returns whether the set changed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.favorite_ids.is_empty();
        self.favorite_ids.clear();
        changed
    }

    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.favorite_ids.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.favorite_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.favorite_ids.is_empty()
    }

    /// Ids in ascending order, as persisted.
    #[must_use]
    pub fn ids(&self) -> Vec<u64> {
        self.favorite_ids.iter().copied().collect()
    }

    /// Merges a persisted set into this one. Returns whether the set changed.
    pub fn hydrate(&mut self, ids: impl IntoIterator<Item = u64>) -> bool {
        let before = self.favorite_ids.len();
        self.favorite_ids.extend(ids);
        self.favorite_ids.len() != before
    }
}

/// A favorites mutation requested by a consumer.
///
/// Mutations issued while the persisted set is still loading are queued as ops and
/// replayed over the loaded set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOp {
    Toggle(u64),
    Add(u64),
    Remove(u64),
    Clear,
}

impl FavoriteOp {
    /// Applies the mutation. Returns whether the set changed.
    pub fn apply(self, favorites: &mut FavoritesState) -> bool {
        match self {
            Self::Toggle(id) => {
                favorites.toggle(id);
                true
            }
            Self::Add(id) => favorites.add(id),
            Self::Remove(id) => favorites.remove(id),
            Self::Clear => favorites.clear(),
        }
    }
}

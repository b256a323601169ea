//! Storage layer: key-value persistence for the catalog cache and favorites.
//!
//! # Modules
//!
//! - `backend`: [`KeyValueStore`] trait and the shared-store handle
//! - `json`: JSON file implementation with atomic writes
//! - `memory`: in-process implementation
//! - `cache`: best-effort snapshot of the unscoped first page
//! - `favorites`: favorites set persistence
//! - `models`: persisted record shapes and their keys

pub mod backend;
pub mod cache;
pub mod favorites;
pub mod json;
pub mod memory;
pub mod models;

pub use backend::{shared, with_store, KeyValueStore, SharedStore};
pub use cache::CacheStore;
pub use favorites::FavoritesRepository;
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use models::{CachedSnapshot, FavoritesRecord};

//! Domain layer for the catalog engine.
//!
//! Core value types, independent of the HTTP client, the storage backend and the
//! state machine.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`product`]: Product, category and page values
//! - [`query`]: Query scope and sort order

pub mod error;
pub mod product;
pub mod query;

pub use error::{CatalogError, Result};
pub use product::{Category, Product, ProductPage};
pub use query::{Scope, SortOption};

//! Remote catalog collaborator.
//!
//! The engine talks to the catalog only through the [`ProductsApi`] trait. The HTTP
//! implementation lives in `http`; `normalize` is the single place where the
//! varying response shapes of the remote service are folded into domain types.

pub mod auth;
pub mod client;
pub mod http;
pub mod normalize;

pub use auth::{AuthTokens, MemoryTokenSource, TokenSource};
pub use client::ProductsApi;
pub use http::HttpProductsApi;

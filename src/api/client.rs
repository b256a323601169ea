//! Catalog API abstraction.

use crate::domain::error::Result;
use crate::domain::{Category, Product, ProductPage};

/// Read-only access to the remote product catalog.
///
/// Every method either returns a page or a [`CatalogError`](crate::CatalogError)
/// whose display text is suitable for showing to a user. Implementations may block;
/// the engine only calls them from the worker.
pub trait ProductsApi: Send {
    /// Lists the unscoped catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    fn list(&self, limit: u32, skip: u32) -> Result<ProductPage>;

    /// Lists products in the category identified by `slug`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    fn by_category(&self, slug: &str, limit: u32, skip: u32) -> Result<ProductPage>;

    /// Full-text search over the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    fn search(&self, query: &str, limit: u32, skip: u32) -> Result<ProductPage>;

    /// Lists the available categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    fn categories(&self) -> Result<Vec<Category>>;

    /// Fetches a single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the product does not exist, or the
    /// response cannot be decoded.
    fn product(&self, id: u64) -> Result<Product>;
}

impl<T: ProductsApi + ?Sized> ProductsApi for Box<T> {
    fn list(&self, limit: u32, skip: u32) -> Result<ProductPage> {
        (**self).list(limit, skip)
    }

    fn by_category(&self, slug: &str, limit: u32, skip: u32) -> Result<ProductPage> {
        (**self).by_category(slug, limit, skip)
    }

    fn search(&self, query: &str, limit: u32, skip: u32) -> Result<ProductPage> {
        (**self).search(query, limit, skip)
    }

    fn categories(&self) -> Result<Vec<Category>> {
        (**self).categories()
    }

    fn product(&self, id: u64) -> Result<Product> {
        (**self).product(id)
    }
}

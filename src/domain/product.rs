//! Catalog domain model.
//!
//! This module defines the immutable values the catalog deals in: [`Product`],
//! [`Category`] and the paginated [`ProductPage`] returned by every list query.
//! Field names follow the catalog API's camelCase wire format so pages can be
//! persisted and restored without an intermediate representation.

use serde::{Deserialize, Serialize};

/// A single catalog item.
///
/// Products are immutable values keyed by `id`. `brand` and `images` are optional
/// on the wire and default to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Price after applying `discount_percentage`, clamped to the 0–100 range.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shopfront::Product;
    /// let mut product = Product::new(1, "Phone", "smartphones", 100.0);
    /// product.discount_percentage = 15.0;
    /// assert!((product.discounted_price() - 85.0).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    pub fn discounted_price(&self) -> f64 {
        let pct = self.discount_percentage.clamp(0.0, 100.0);
        self.price * (100.0 - pct) / 100.0
    }

    /// Returns true when the product has stock left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Creates a product with the given identity and price and empty descriptive
    /// fields. Mostly useful for fixtures.
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            price,
            discount_percentage: 0.0,
            rating: 0.0,
            stock: 0,
            brand: String::new(),
            category: category.into(),
            thumbnail: String::new(),
            images: Vec::new(),
        }
    }
}

/// A product category.
///
/// `slug` is the filter key used in queries, `name` is the display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
}

impl Category {
    /// Creates a category from a slug and a display name.
    #[must_use]
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
        }
    }

    /// Builds a category from a bare slug, deriving a title-cased display name
    /// (`"home-decoration"` becomes `"Home Decoration"`).
    #[must_use]
    pub fn from_slug(slug: impl Into<String>) -> Self {
        let slug = slug.into();
        let name = slug
            .split(['-', '_'])
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" ");
        Self { slug, name }
    }
}

/// One page of a list query.
///
/// `skip` is the offset the page was fetched at, `limit` the requested page size,
/// and `total` the size of the whole result set for the query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wire_format_with_missing_optional_fields() {
        let json = r#"{
            "id": 7,
            "title": "Lipstick",
            "price": 12.99,
            "discountPercentage": 5.5,
            "rating": 4.2,
            "stock": 3,
            "category": "beauty",
            "thumbnail": "https://cdn.example/7.png"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 7);
        assert!(product.brand.is_empty());
        assert!(product.images.is_empty());
        assert!((product.discount_percentage - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_camel_case() {
        let product = Product::new(1, "A", "beauty", 1.0);
        let json = serde_json::to_string(&product).unwrap();
        assert!(json.contains("\"discountPercentage\""));
    }

    #[test]
    fn category_name_from_slug() {
        assert_eq!(Category::from_slug("home-decoration").name, "Home Decoration");
        assert_eq!(Category::from_slug("laptops").name, "Laptops");
    }
}

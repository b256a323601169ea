//! Local filter/sort engine.
//!
//! `filtered_products` is always `apply(products, selected_category, sort_option)`.
//! The function is pure: same input, same output, and applying it to its own
//! output changes nothing.

use crate::domain::{Product, SortOption};

/// Keeps the products of `category` (all of them when `None`) and sorts them.
///
/// Sorting is stable: products that compare equal keep their input order.
///
/// ```
/// use shopfront::app::filter;
/// use shopfront::{Product, SortOption};
///
/// let products = vec![
///     Product::new(1, "a", "x", 5.0),
///     Product::new(2, "b", "x", 1.0),
///     Product::new(3, "c", "x", 5.0),
/// ];
/// let sorted = filter::apply(&products, None, SortOption::PriceDesc);
/// let ids: Vec<u64> = sorted.iter().map(|p| p.id).collect();
/// assert_eq!(ids, [1, 3, 2]);
/// ```
#[must_use]
pub fn apply(products: &[Product], category: Option<&str>, sort: SortOption) -> Vec<Product> {
    let mut filtered: Vec<Product> = products
        .iter()
        .filter(|product| category.map_or(true, |slug| product.category == slug))
        .cloned()
        .collect();

    match sort {
        SortOption::None => {}
        SortOption::PriceAsc => filtered.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOption::PriceDesc => filtered.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortOption::RatingDesc => filtered.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u64, category: &str, price: f64, rating: f64) -> Product {
        Product {
            rating,
            ..Product::new(id, format!("p{id}"), category, price)
        }
    }

    fn ids(products: &[Product]) -> Vec<u64> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn price_desc_keeps_tie_order() {
        let products = vec![
            product(1, "a", 5.0, 0.0),
            product(2, "a", 1.0, 0.0),
            product(3, "a", 5.0, 0.0),
        ];

        assert_eq!(ids(&apply(&products, None, SortOption::PriceDesc)), [1, 3, 2]);
    }

    #[test]
    fn category_filter_then_sort() {
        let products = vec![
            product(1, "beauty", 9.0, 4.1),
            product(2, "laptops", 900.0, 4.9),
            product(3, "beauty", 3.0, 4.7),
        ];

        assert_eq!(ids(&apply(&products, Some("beauty"), SortOption::None)), [1, 3]);
        assert_eq!(ids(&apply(&products, Some("beauty"), SortOption::PriceAsc)), [3, 1]);
        assert_eq!(ids(&apply(&products, None, SortOption::RatingDesc)), [2, 3, 1]);
        assert!(apply(&products, Some("groceries"), SortOption::None).is_empty());
    }

    #[test]
    fn idempotent() {
        let products = vec![
            product(1, "a", 2.0, 3.0),
            product(2, "b", 2.0, 1.0),
            product(3, "a", 1.0, 3.0),
        ];
        for sort in SortOption::ALL {
            let once = apply(&products, Some("a"), sort);
            assert_eq!(apply(&once, Some("a"), sort), once);
        }
    }
}

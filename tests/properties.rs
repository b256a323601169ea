//! Property tests for the filter engine, favorites and pagination.

mod common;

use common::{FakeCatalog, WAIT};
use proptest::prelude::*;
use shopfront::app::{filter, FavoritesState};
use shopfront::storage::{shared, MemoryStore};
use shopfront::{initialize_inline, Product, SortOption};

fn product_strategy() -> impl Strategy<Value = Product> {
    (
        1u64..1000,
        0u32..20,
        0u32..6,
        prop::sample::select(vec!["a", "b", "c"]),
    )
        .prop_map(|(id, price, rating, category)| {
            let mut product = Product::new(id, format!("p{id}"), category, f64::from(price));
            product.rating = f64::from(rating);
            product
        })
}

fn sort_strategy() -> impl Strategy<Value = SortOption> {
    prop::sample::select(SortOption::ALL.to_vec())
}

fn sort_key(product: &Product, sort: SortOption) -> f64 {
    match sort {
        SortOption::None => 0.0,
        SortOption::PriceAsc => product.price,
        SortOption::PriceDesc => -product.price,
        SortOption::RatingDesc => -product.rating,
    }
}

proptest! {
    #[test]
    fn apply_is_deterministic_and_idempotent(
        products in prop::collection::vec(product_strategy(), 0..40),
        category in prop::option::of(prop::sample::select(vec!["a", "b", "z"])),
        sort in sort_strategy(),
    ) {
        let once = filter::apply(&products, category, sort);
        prop_assert_eq!(&once, &filter::apply(&products, category, sort));
        prop_assert_eq!(&once, &filter::apply(&once, category, sort));
        if let Some(slug) = category {
            prop_assert!(once.iter().all(|p| p.category == slug));
        }
    }

    #[test]
    fn apply_is_stable(
        products in prop::collection::vec(product_strategy(), 0..40),
        sort in sort_strategy(),
    ) {
        // Tag every product with its input position so equal keys can be checked.
        let tagged: Vec<Product> = products
            .into_iter()
            .enumerate()
            .map(|(i, mut p)| { p.id = i as u64; p })
            .collect();
        let sorted = filter::apply(&tagged, None, sort);
        prop_assert_eq!(sorted.len(), tagged.len());
        for pair in sorted.windows(2) {
            let (a, b) = (sort_key(&pair[0], sort), sort_key(&pair[1], sort));
            prop_assert!(a <= b);
            if a == b {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn toggle_twice_restores_membership(
        initial in prop::collection::btree_set(0u64..50, 0..10),
        id in 0u64..50,
    ) {
        let mut favorites = FavoritesState::new();
        favorites.hydrate(initial.iter().copied());
        let before = favorites.clone();

        let added = favorites.toggle(id);
        prop_assert_eq!(added, !initial.contains(&id));
        favorites.toggle(id);
        prop_assert_eq!(favorites, before);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn pagination_appends_in_order_and_tracks_has_more(
        total in 0u64..45,
        page_size in 1u32..12,
    ) {
        let api = FakeCatalog::new(total);
        let mut store = initialize_inline(Box::new(api), shared(MemoryStore::new()), page_size).unwrap();
        store.request_initial_load().unwrap();
        store.wait_idle(WAIT).unwrap();

        let mut previous: Vec<u64> = Vec::new();
        loop {
            let catalog = &store.state().catalog;
            let loaded: Vec<u64> = catalog.products.iter().map(|p| p.id).collect();
            prop_assert!(loaded.starts_with(&previous));
            prop_assert_eq!(catalog.has_more, (loaded.len() as u32) < catalog.total);
            if !catalog.can_load_more() {
                break;
            }
            previous = loaded;
            store.request_next_page().unwrap();
            store.wait_idle(WAIT).unwrap();
        }

        let catalog = &store.state().catalog;
        prop_assert_eq!(catalog.products.len() as u64, total);
        prop_assert!(!catalog.has_more);
    }
}

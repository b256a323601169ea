//! Catalog state: the single source of truth for every consumer.
//!
//! [`AppState`] aggregates the catalog list state, the favorites set and the
//! product detail. It is mutated only by [`handle_event`](super::handle_event);
//! consumers read it through [`CatalogStore::state`](super::CatalogStore::state).
//!
//! # Invariants
//!
//! - `loading_more` is true only while `status == Success`
//! - after a successful fetch, `has_more == (products.len() < total)`, except in
//!   search scope where it is always false
//! - `filtered_products == filter::apply(products, selected_category, sort_option)`
//! - `is_offline` is true iff `products` came from the cache

use super::favorites::{FavoriteOp, FavoritesState};
use super::filter;
use super::status::LoadStatus;
use crate::domain::{Category, Product, Scope, SortOption};
use crate::worker::FetchRequest;

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Paginated catalog list state.
///
/// Fields are public for reading; every mutation goes through
/// [`handle_event`](super::handle_event) so the invariants in the module docs hold.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    /// Lifecycle of the first-page fetch of the active scope.
    pub status: LoadStatus,

    /// A next-page request is in flight. Only ever true while `status` is
    /// `Success`.
    pub loading_more: bool,

    /// More pages exist on the server for the active scope. Always false for
    /// search results.
    pub has_more: bool,

    /// Products in server order, pages appended gap-free.
    pub products: Vec<Product>,

    /// Derived view of `products`; recomputed, never edited.
    pub filtered_products: Vec<Product>,

    /// Server-reported size of the active scope's result set.
    pub total: u32,

    /// Offset of the most recently fetched page.
    pub skip: u32,

    /// Requested page size.
    pub limit: u32,

    /// Message of the last fetch failure, cleared when the next fetch starts.
    pub error: Option<String>,

    /// Active search text, trimmed. Empty when not searching.
    pub search_query: String,

    /// Category narrowing the list. During a search it only filters locally.
    pub selected_category: Option<Category>,

    /// Local sort order of `filtered_products`.
    pub sort_option: SortOption,

    /// Categories offered for selection, in server order.
    pub categories: Vec<Category>,

    /// A category list request is in flight.
    pub categories_loading: bool,

    /// Message of the last category list failure. The previous list is kept.
    pub categories_error: Option<String>,

    /// `products` is the cached snapshot rather than a live page.
    pub is_offline: bool,

    /// Timestamp (Unix ms) of the snapshot being shown while offline.
    pub cached_at: Option<i64>,

    /// Bumped by every replace-type fetch. Responses to older generations are
    /// discarded.
    pub generation: u64,

    /// Whether a failed unscoped first page may still be answered from the cache.
    /// True until the first successful page of the session, live or cached; after
    /// that a failed reload keeps what is already shown.
    pub cache_eligible: bool,
}

impl CatalogState {
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            status: LoadStatus::Idle,
            loading_more: false,
            has_more: true,
            products: Vec::new(),
            filtered_products: Vec::new(),
            total: 0,
            skip: 0,
            limit: page_size,
            error: None,
            search_query: String::new(),
            selected_category: None,
            sort_option: SortOption::None,
            categories: Vec::new(),
            categories_loading: false,
            categories_error: None,
            is_offline: false,
            cached_at: None,
            generation: 0,
            cache_eligible: true,
        }
    }

    /// The query dimension the list is currently showing: search wins over
    /// category, category over the unscoped listing.
    #[must_use]
    pub fn scope(&self) -> Scope {
        let query = self.search_query.trim();
        if !query.is_empty() {
            return Scope::Search(query.to_string());
        }
        self.selected_category
            .as_ref()
            .map_or(Scope::All, |category| Scope::Category(category.slug.clone()))
    }

    /// Recomputes `filtered_products` from `products`.
    pub fn recompute(&mut self) {
        self.filtered_products = filter::apply(
            &self.products,
            self.selected_category.as_ref().map(|c| c.slug.as_str()),
            self.sort_option,
        );
    }

    /// A category is selected or the list is sorted.
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        self.selected_category.is_some() || self.sort_option != SortOption::None
    }

    /// Milliseconds since the snapshot being shown was saved, or `None` when the
    /// list is live. Never negative.
    ///
    /// Snapshots do not expire; this is for callers with a staleness policy of
    /// their own.
    ///
    /// ```
    /// use shopfront::app::CatalogState;
    ///
    /// let mut catalog = CatalogState::default();
    /// assert_eq!(catalog.cache_age_millis(5_000), None);
    ///
    /// catalog.is_offline = true;
    /// catalog.cached_at = Some(2_000);
    /// assert_eq!(catalog.cache_age_millis(5_000), Some(3_000));
    /// assert_eq!(catalog.cache_age_millis(1_000), Some(0));
    /// ```
    #[must_use]
    pub fn cache_age_millis(&self, now_millis: i64) -> Option<i64> {
        if !self.is_offline {
            return None;
        }
        self.cached_at.map(|saved| (now_millis - saved).max(0))
    }

    /// Whether a next-page request would be issued right now.
    #[must_use]
    pub fn can_load_more(&self) -> bool {
        self.status == LoadStatus::Success
            && self.has_more
            && !self.loading_more
            && !self.is_offline
            && self.scope().supports_pagination()
    }

    /// Enters `Loading` for a first-page fetch of the active scope and returns the
    /// request to issue. Starts a new generation.
    pub(crate) fn begin_replace(&mut self) -> FetchRequest {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        self.loading_more = false;
        self.error = None;
        FetchRequest::first_page(self.scope(), self.limit, self.generation)
            .with_cache_fallback(self.cache_eligible)
    }

    /// Marks an append in flight and returns its request. Callers check
    /// [`can_load_more`](Self::can_load_more) first.
    pub(crate) fn begin_append(&mut self) -> FetchRequest {
        self.loading_more = true;
        FetchRequest {
            scope: self.scope(),
            limit: self.limit,
            skip: u32::try_from(self.products.len()).unwrap_or(u32::MAX),
            append: true,
            generation: self.generation,
            allow_cache_fallback: false,
        }
    }

    fn recompute_has_more(&mut self, scope: &Scope) {
        self.has_more = scope.supports_pagination()
            && u32::try_from(self.products.len()).map_or(false, |len| len < self.total);
    }

    /// Replaces the list with a fetched first page.
    pub(crate) fn apply_replace(
        &mut self,
        scope: &Scope,
        products: Vec<Product>,
        total: u32,
        skip: u32,
    ) {
        self.products = products;
        self.total = total;
        self.skip = skip;
        self.status = LoadStatus::Success;
        self.loading_more = false;
        self.cache_eligible = false;
        self.recompute_has_more(scope);
        self.recompute();
    }

    /// Appends a fetched page. An empty page means the server has nothing more,
    /// whatever `total` says.
    pub(crate) fn apply_append(&mut self, scope: &Scope, products: Vec<Product>, total: u32, skip: u32) {
        self.loading_more = false;
        self.skip = skip;
        if products.is_empty() {
            self.total = u32::try_from(self.products.len()).unwrap_or(u32::MAX);
        } else {
            self.products.extend(products);
            self.total = total;
        }
        self.recompute_has_more(scope);
        self.recompute();
    }
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// The product opened in the detail view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductDetailState {
    pub status: LoadStatus,

    /// Id of the product requested; responses for other ids are ignored.
    pub product_id: Option<u64>,

    pub product: Option<Product>,
    pub error: Option<String>,
}

/// Everything the engine owns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub catalog: CatalogState,
    pub favorites: FavoritesState,

    /// `Idle` until hydration is requested, `Loading` while the persisted set is
    /// being read, `Success` once it has been merged.
    pub favorites_status: LoadStatus,

    /// Favorites mutations waiting for hydration, in issue order.
    pub(crate) pending_favorites: Vec<FavoriteOp>,

    pub detail: ProductDetailState,
}

impl AppState {
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            catalog: CatalogState::new(page_size),
            favorites: FavoritesState::new(),
            favorites_status: LoadStatus::Idle,
            pending_favorites: Vec::new(),
            detail: ProductDetailState::default(),
        }
    }

    /// The list to render.
    #[must_use]
    pub fn display_products(&self) -> &[Product] {
        &self.catalog.filtered_products
    }

    #[must_use]
    pub fn is_favorite(&self, id: u64) -> bool {
        self.favorites.contains(id)
    }

    /// Loaded products that are favorites, in list order. Favorites not currently
    /// loaded are not included.
    #[must_use]
    pub fn favorite_products(&self) -> Vec<&Product> {
        self.catalog
            .products
            .iter()
            .filter(|product| self.favorites.contains(product.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_precedence() {
        let mut catalog = CatalogState::default();
        assert_eq!(catalog.scope(), Scope::All);

        catalog.selected_category = Some(Category::from_slug("beauty"));
        assert_eq!(catalog.scope(), Scope::Category("beauty".into()));

        catalog.search_query = "  phone ".into();
        assert_eq!(catalog.scope(), Scope::Search("phone".into()));
    }

    #[test]
    fn begin_replace_bumps_generation_and_clears_error() {
        let mut catalog = CatalogState::default();
        catalog.error = Some("boom".into());

        let request = catalog.begin_replace();
        assert_eq!(request.generation, 1);
        assert_eq!(request.skip, 0);
        assert!(!request.append);
        assert_eq!(catalog.status, LoadStatus::Loading);
        assert_eq!(catalog.error, None);
        assert_eq!(catalog.begin_replace().generation, 2);
    }

    #[test]
    fn cache_fallback_only_until_first_success() {
        let mut catalog = CatalogState::default();
        assert!(catalog.begin_replace().allow_cache_fallback);
        assert!(catalog.begin_replace().allow_cache_fallback);

        catalog.apply_replace(&Scope::All, vec![Product::new(1, "a", "x", 1.0)], 20, 0);
        assert!(!catalog.begin_replace().allow_cache_fallback);
        assert!(!catalog.begin_append().allow_cache_fallback);
    }

    #[test]
    fn empty_append_ends_pagination() {
        let mut catalog = CatalogState::default();
        let products = vec![Product::new(1, "a", "x", 1.0)];
        catalog.apply_replace(&Scope::All, products, 50, 0);
        assert!(catalog.has_more);

        catalog.loading_more = true;
        catalog.apply_append(&Scope::All, vec![], 50, 1);
        assert!(!catalog.has_more);
        assert!(!catalog.loading_more);
        assert_eq!(catalog.total, 1);
    }

    #[test]
    fn search_scope_never_has_more() {
        let mut catalog = CatalogState::default();
        let products = vec![Product::new(1, "phone", "smartphones", 1.0)];
        catalog.apply_replace(&Scope::Search("phone".into()), products, 99, 0);
        assert!(!catalog.has_more);
    }

    #[test]
    fn favorite_products_join_loaded_list() {
        let mut state = AppState::default();
        state.catalog.products = vec![
            Product::new(1, "a", "x", 1.0),
            Product::new(2, "b", "x", 1.0),
        ];
        state.favorites.add(2);
        state.favorites.add(40);

        let ids: Vec<u64> = state.favorite_products().iter().map(|p| p.id).collect();
        assert_eq!(ids, [2]);
    }
}

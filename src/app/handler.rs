//! Event handling and state transition logic.
//!
//! Every intent and every worker response is an [`Event`]. [`handle_event`]
//! applies it to [`AppState`] and returns whether the state changed together with
//! the actions to execute.
//!
//! # Event Types
//!
//! - **Loading**: `InitialLoad`, `NextPage`, `Refresh`
//! - **Query**: `SetCategory`, `SetSort`, `Search`, `ClearFilters`
//! - **Favorites**: `ToggleFavorite`, `AddFavorite`, `RemoveFavorite`,
//!   `ClearFavorites`, `HydrateFavorites`
//! - **Detail**: `OpenProduct`, `CloseProduct`
//! - **Maintenance**: `LoadCategories`, `ClearCache`
//! - **Worker**: `WorkerResponse` with typed message variants
//!
//! # Example
//!
//! ```rust
//! use shopfront::app::{handle_event, Action, AppState, Event, LoadStatus};
//!
//! let mut state = AppState::new(10);
//! let (changed, actions) = handle_event(&mut state, &Event::InitialLoad)?;
//! assert!(changed);
//! assert_eq!(state.catalog.status, LoadStatus::Loading);
//! assert!(matches!(actions.as_slice(), [Action::PostToWorker(_)]));
//! # Ok::<(), shopfront::CatalogError>(())
//! ```

use crate::app::{Action, AppState, FavoriteOp, LoadStatus};
use crate::domain::error::Result;
use crate::domain::{Category, SortOption};
use crate::worker::{FetchRequest, PageOutcome, WorkerMessage, WorkerResponse};
use std::collections::BTreeSet;

/// Intents issued by consumers, and responses coming back from the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Loads the first page. Only valid from `Idle`.
    InitialLoad,
    /// Appends the next page of the active scope, if there is one.
    NextPage,
    /// Reloads the first page of the active scope. Only from `Success` or `Failed`.
    Refresh,
    /// Selects a category (clearing any search) or returns to the unscoped list.
    SetCategory(Option<Category>),
    /// Re-sorts the loaded list locally.
    SetSort(SortOption),
    /// Searches the catalog; an empty query returns to the previous scope.
    Search(String),
    /// Resets category, sort and search and reloads the unscoped list.
    ClearFilters,

    LoadCategories,

    ToggleFavorite(u64),
    AddFavorite(u64),
    RemoveFavorite(u64),
    ClearFavorites,
    /// Merges the persisted favorites into memory.
    HydrateFavorites,

    OpenProduct(u64),
    CloseProduct,

    /// Drops the persisted catalog snapshot.
    ClearCache,

    /// Wraps a response from the worker.
    WorkerResponse(WorkerResponse),
}

/// Processes an event, mutates state, and returns `(changed, actions)`.
///
/// `changed` tells the caller whether observers need to hear about it.
///
/// # Errors
///
/// Reserved for events the state cannot accept; current events never fail.
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::InitialLoad => {
            if state.catalog.status != LoadStatus::Idle {
                tracing::debug!(status = %state.catalog.status, "initial load ignored");
                return Ok((false, vec![]));
            }
            Ok((true, vec![replace(state)]))
        }
        Event::NextPage => {
            if !state.catalog.can_load_more() {
                tracing::debug!(
                    status = %state.catalog.status,
                    has_more = state.catalog.has_more,
                    loading_more = state.catalog.loading_more,
                    "next page guarded"
                );
                return Ok((false, vec![]));
            }
            let request = state.catalog.begin_append();
            tracing::debug!(skip = request.skip, "requesting next page");
            Ok((true, vec![fetch(request)]))
        }
        Event::Refresh => {
            if !matches!(state.catalog.status, LoadStatus::Success | LoadStatus::Failed) {
                tracing::debug!(status = %state.catalog.status, "refresh ignored");
                return Ok((false, vec![]));
            }
            Ok((true, vec![replace(state)]))
        }
        Event::SetCategory(category) => {
            state.catalog.selected_category.clone_from(category);
            state.catalog.search_query.clear();
            state.catalog.recompute();
            Ok((true, vec![replace(state)]))
        }
        Event::SetSort(sort) => {
            if state.catalog.sort_option == *sort {
                return Ok((false, vec![]));
            }
            state.catalog.sort_option = *sort;
            state.catalog.recompute();
            Ok((true, vec![]))
        }
        Event::Search(query) => {
            let query = query.trim();
            if query.is_empty() && state.catalog.search_query.is_empty() {
                return Ok((false, vec![]));
            }
            if query == state.catalog.search_query && state.catalog.status.is_loading() {
                return Ok((false, vec![]));
            }
            tracing::debug!(query = %query, "search");
            state.catalog.search_query = query.to_string();
            Ok((true, vec![replace(state)]))
        }
        Event::ClearFilters => {
            state.catalog.selected_category = None;
            state.catalog.sort_option = SortOption::None;
            state.catalog.search_query.clear();
            state.catalog.recompute();
            Ok((true, vec![replace(state)]))
        }
        Event::LoadCategories => {
            if state.catalog.categories_loading {
                return Ok((false, vec![]));
            }
            state.catalog.categories_loading = true;
            state.catalog.categories_error = None;
            Ok((true, vec![Action::PostToWorker(WorkerMessage::fetch_categories())]))
        }
        Event::ToggleFavorite(id) => favorites_op(state, FavoriteOp::Toggle(*id)),
        Event::AddFavorite(id) => favorites_op(state, FavoriteOp::Add(*id)),
        Event::RemoveFavorite(id) => favorites_op(state, FavoriteOp::Remove(*id)),
        Event::ClearFavorites => favorites_op(state, FavoriteOp::Clear),
        Event::HydrateFavorites => {
            if state.favorites_status.is_loading() {
                return Ok((false, vec![]));
            }
            state.favorites_status = LoadStatus::Loading;
            Ok((true, vec![Action::PostToWorker(WorkerMessage::load_favorites())]))
        }
        Event::OpenProduct(id) => {
            let detail = &mut state.detail;
            detail.status = LoadStatus::Loading;
            detail.product_id = Some(*id);
            detail.product = state.catalog.products.iter().find(|p| p.id == *id).cloned();
            detail.error = None;
            Ok((true, vec![Action::PostToWorker(WorkerMessage::fetch_product(*id))]))
        }
        Event::CloseProduct => {
            state.detail = Default::default();
            Ok((true, vec![]))
        }
        Event::ClearCache => Ok((false, vec![Action::PostToWorker(WorkerMessage::clear_cache())])),
        Event::WorkerResponse(response) => handle_response(state, response),
    }
}

fn fetch(request: FetchRequest) -> Action {
    Action::PostToWorker(WorkerMessage::fetch_page(request))
}

fn replace(state: &mut AppState) -> Action {
    let request = state.catalog.begin_replace();
    tracing::debug!(
        scope = %request.scope,
        generation = request.generation,
        "requesting first page"
    );
    fetch(request)
}

fn save_favorites(state: &AppState) -> Action {
    Action::PostToWorker(WorkerMessage::save_favorites(state.favorites.ids()))
}

fn favorites_op(state: &mut AppState, op: FavoriteOp) -> Result<(bool, Vec<Action>)> {
    if state.favorites_status.is_loading() {
        tracing::debug!(op = ?op, "favorites still loading, change queued");
        state.pending_favorites.push(op);
        return Ok((false, vec![]));
    }

    if op.apply(&mut state.favorites) {
        tracing::debug!(op = ?op, total = state.favorites.len(), "favorites changed");
        Ok((true, vec![save_favorites(state)]))
    } else {
        Ok((false, vec![]))
    }
}

fn handle_response(state: &mut AppState, response: &WorkerResponse) -> Result<(bool, Vec<Action>)> {
    match response {
        WorkerResponse::PageFetched { outcome } => Ok((apply_page(state, outcome), vec![])),
        WorkerResponse::PageFailed { request, message } => {
            let catalog = &mut state.catalog;
            if request.generation != catalog.generation {
                tracing::debug!(generation = request.generation, "discarding stale failure");
                return Ok((false, vec![]));
            }

            tracing::debug!(append = request.append, error = %message, "fetch failed");
            catalog.error = Some(message.clone());
            if request.append {
                catalog.loading_more = false;
            } else {
                catalog.status = LoadStatus::Failed;
            }
            Ok((true, vec![]))
        }
        WorkerResponse::CategoriesLoaded { categories } => {
            state.catalog.categories.clone_from(categories);
            state.catalog.categories_loading = false;
            Ok((true, vec![]))
        }
        WorkerResponse::CategoriesFailed { message } => {
            state.catalog.categories_loading = false;
            state.catalog.categories_error = Some(message.clone());
            Ok((true, vec![]))
        }
        WorkerResponse::ProductLoaded { product } => {
            let detail = &mut state.detail;
            if detail.product_id != Some(product.id) {
                return Ok((false, vec![]));
            }
            detail.status = LoadStatus::Success;
            detail.product = Some(product.clone());
            Ok((true, vec![]))
        }
        WorkerResponse::ProductFailed { id, message } => {
            let detail = &mut state.detail;
            if detail.product_id != Some(*id) {
                return Ok((false, vec![]));
            }
            detail.status = LoadStatus::Failed;
            detail.error = Some(message.clone());
            Ok((true, vec![]))
        }
        WorkerResponse::FavoritesLoaded { ids } => {
            let persisted: BTreeSet<u64> = ids.iter().copied().collect();
            let was_loading = state.favorites_status.is_loading();
            let mut changed = state.favorites.hydrate(persisted.iter().copied());

            let pending = std::mem::take(&mut state.pending_favorites);
            for op in pending {
                changed |= op.apply(&mut state.favorites);
            }
            state.favorites_status = LoadStatus::Success;
            tracing::debug!(persisted = persisted.len(), total = state.favorites.len(), "favorites hydrated");

            // Replayed changes, and ids added before hydration was requested, exist
            // only in memory.
            if state.favorites.favorite_ids == persisted {
                Ok((changed || was_loading, vec![]))
            } else {
                Ok((true, vec![save_favorites(state)]))
            }
        }
        WorkerResponse::FavoritesSaved { count } => {
            tracing::debug!(count = count, "favorites persisted");
            Ok((false, vec![]))
        }
        WorkerResponse::CacheCleared => Ok((false, vec![])),
    }
}

/// Applies a fetched page. Returns false when the outcome is stale.
fn apply_page(state: &mut AppState, outcome: &PageOutcome) -> bool {
    let catalog = &mut state.catalog;
    let request = &outcome.request;

    if request.generation != catalog.generation {
        tracing::debug!(
            generation = request.generation,
            current = catalog.generation,
            "discarding stale page"
        );
        return false;
    }

    let page = outcome.page.clone();
    if request.append {
        if !catalog.loading_more {
            return false;
        }
        catalog.apply_append(&request.scope, page.products, page.total, page.skip);
        catalog.error = None;
    } else {
        catalog.apply_replace(&request.scope, page.products, page.total, page.skip);
        catalog.error.clone_from(&outcome.error);
        catalog.is_offline = outcome.offline;
        catalog.cached_at = outcome.cached_at;
    }

    tracing::debug!(
        loaded = catalog.products.len(),
        total = catalog.total,
        has_more = catalog.has_more,
        offline = catalog.is_offline,
        "page applied"
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Product, ProductPage, Scope};

    fn page(ids: std::ops::Range<u64>, total: u32) -> ProductPage {
        ProductPage {
            products: ids.map(|id| Product::new(id, "p", "misc", 1.0)).collect(),
            total,
            skip: 0,
            limit: 10,
        }
    }

    fn posted_request(actions: &[Action]) -> FetchRequest {
        match actions {
            [Action::PostToWorker(WorkerMessage::FetchPage { request, .. })] => request.clone(),
            other => panic!("expected one fetch, got {other:?}"),
        }
    }

    fn fetched(request: FetchRequest, page: ProductPage) -> Event {
        Event::WorkerResponse(WorkerResponse::PageFetched {
            outcome: PageOutcome {
                request,
                page,
                offline: false,
                error: None,
                cached_at: None,
            },
        })
    }

    #[test]
    fn initial_load_only_from_idle() {
        let mut state = AppState::new(10);
        let (_, actions) = handle_event(&mut state, &Event::InitialLoad).unwrap();
        let request = posted_request(&actions);
        assert_eq!(request.scope, Scope::All);

        let (changed, actions) = handle_event(&mut state, &Event::InitialLoad).unwrap();
        assert!(!changed);
        assert!(actions.is_empty());
    }

    #[test]
    fn stale_page_is_discarded() {
        let mut state = AppState::new(10);
        let (_, actions) = handle_event(&mut state, &Event::InitialLoad).unwrap();
        let first = posted_request(&actions);

        handle_event(&mut state, &Event::SetCategory(Some(Category::from_slug("beauty")))).unwrap();

        let (changed, _) = handle_event(&mut state, &fetched(first, page(1..11, 100))).unwrap();
        assert!(!changed);
        assert!(state.catalog.products.is_empty());
        assert_eq!(state.catalog.status, LoadStatus::Loading);
    }

    #[test]
    fn failed_append_keeps_success() {
        let mut state = AppState::new(10);
        let (_, actions) = handle_event(&mut state, &Event::InitialLoad).unwrap();
        handle_event(&mut state, &fetched(posted_request(&actions), page(1..11, 30))).unwrap();

        let (_, actions) = handle_event(&mut state, &Event::NextPage).unwrap();
        let request = posted_request(&actions);
        assert_eq!(request.skip, 10);
        assert!(state.catalog.loading_more);

        handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::PageFailed {
                request,
                message: "Network Error".into(),
            }),
        )
        .unwrap();

        assert_eq!(state.catalog.status, LoadStatus::Success);
        assert!(!state.catalog.loading_more);
        assert!(state.catalog.has_more);
        assert_eq!(state.catalog.products.len(), 10);
    }

    #[test]
    fn sort_is_local() {
        let mut state = AppState::new(10);
        let (changed, actions) =
            handle_event(&mut state, &Event::SetSort(SortOption::PriceAsc)).unwrap();
        assert!(changed);
        assert!(actions.is_empty());
        assert!(state.catalog.has_active_filters());
    }

    #[test]
    fn empty_search_returns_to_category_scope() {
        let mut state = AppState::new(10);
        handle_event(&mut state, &Event::SetCategory(Some(Category::from_slug("beauty")))).unwrap();
        handle_event(&mut state, &Event::Search("lipstick".into())).unwrap();
        assert_eq!(state.catalog.scope(), Scope::Search("lipstick".into()));

        let (_, actions) = handle_event(&mut state, &Event::Search("  ".into())).unwrap();
        assert_eq!(posted_request(&actions).scope, Scope::Category("beauty".into()));
    }

    #[test]
    fn favorites_changes_are_persisted() {
        let mut state = AppState::new(10);
        let (_, actions) = handle_event(&mut state, &Event::ToggleFavorite(4)).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::SaveFavorites { ids, .. })] if ids == &[4]
        ));

        let (changed, actions) = handle_event(&mut state, &Event::AddFavorite(4)).unwrap();
        assert!(!changed);
        assert!(actions.is_empty());
    }

    #[test]
    fn hydration_saves_union_when_memory_had_extra_ids() {
        let mut state = AppState::new(10);
        state.favorites.add(1);

        let (changed, actions) = handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::FavoritesLoaded { ids: vec![2] }),
        )
        .unwrap();

        assert!(changed);
        assert_eq!(state.favorites.ids(), [1, 2]);
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::SaveFavorites { ids, .. })] if ids == &[1, 2]
        ));
    }

    #[test]
    fn changes_before_hydration_replay_over_persisted_set() {
        let mut state = AppState::new(10);
        let (_, actions) = handle_event(&mut state, &Event::HydrateFavorites).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::LoadFavorites { .. })]
        ));

        let (changed, actions) = handle_event(&mut state, &Event::ToggleFavorite(5)).unwrap();
        assert!(!changed);
        assert!(actions.is_empty());
        handle_event(&mut state, &Event::AddFavorite(8)).unwrap();

        let (changed, actions) = handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::FavoritesLoaded { ids: vec![5, 6] }),
        )
        .unwrap();

        assert!(changed);
        assert_eq!(state.favorites.ids(), [6, 8]);
        assert_eq!(state.favorites_status, LoadStatus::Success);
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::SaveFavorites { ids, .. })] if ids == &[6, 8]
        ));
    }

    #[test]
    fn clear_before_hydration_empties_persisted_set() {
        let mut state = AppState::new(10);
        handle_event(&mut state, &Event::HydrateFavorites).unwrap();
        handle_event(&mut state, &Event::ClearFavorites).unwrap();

        let (_, actions) = handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::FavoritesLoaded { ids: vec![5] }),
        )
        .unwrap();

        assert!(state.favorites.is_empty());
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::SaveFavorites { ids, .. })] if ids.is_empty()
        ));
    }

    #[test]
    fn refresh_needs_a_settled_load() {
        let mut state = AppState::new(10);
        let (changed, actions) = handle_event(&mut state, &Event::Refresh).unwrap();
        assert!(!changed);
        assert!(actions.is_empty());

        let (_, actions) = handle_event(&mut state, &Event::InitialLoad).unwrap();
        let request = posted_request(&actions);
        let (changed, _) = handle_event(&mut state, &Event::Refresh).unwrap();
        assert!(!changed);

        handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::PageFailed {
                request,
                message: "Network Error".into(),
            }),
        )
        .unwrap();
        let (_, actions) = handle_event(&mut state, &Event::Refresh).unwrap();
        assert_eq!(posted_request(&actions).generation, 2);
    }

    #[test]
    fn failed_reload_after_live_page_keeps_products() {
        let mut state = AppState::new(10);
        let (_, actions) = handle_event(&mut state, &Event::InitialLoad).unwrap();
        let first = posted_request(&actions);
        assert!(first.allow_cache_fallback);
        handle_event(&mut state, &fetched(first, page(1..11, 30))).unwrap();

        let (_, actions) = handle_event(&mut state, &Event::Refresh).unwrap();
        let reload = posted_request(&actions);
        assert!(!reload.allow_cache_fallback);

        handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::PageFailed {
                request: reload,
                message: "Network Error".into(),
            }),
        )
        .unwrap();
        assert_eq!(state.catalog.status, LoadStatus::Failed);
        assert_eq!(state.catalog.products.len(), 10);
        assert!(!state.catalog.is_offline);
    }

    #[test]
    fn detail_ignores_other_products() {
        let mut state = AppState::new(10);
        handle_event(&mut state, &Event::OpenProduct(3)).unwrap();

        let (changed, _) = handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::ProductLoaded {
                product: Product::new(9, "other", "x", 1.0),
            }),
        )
        .unwrap();
        assert!(!changed);
        assert_eq!(state.detail.status, LoadStatus::Loading);
    }
}

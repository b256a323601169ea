//! Catalog fetch orchestration.
//!
//! Turns a [`FetchRequest`] into exactly one API call, writes unscoped first pages
//! through to the cache, and answers a failed unscoped first page from the cache
//! when one exists. Holds no per-request state: deduplication and staleness are
//! the state machine's job.

use crate::api::ProductsApi;
use crate::domain::error::{CatalogError, Result};
use crate::domain::{ProductPage, Scope};
use crate::storage::CacheStore;
use crate::worker::{FetchRequest, PageOutcome};

/// Runs page fetches for the worker.
///
/// Owns the API client and the cache. Every call to [`fetch_page`](Self::fetch_page)
/// is independent, so one orchestrator serves the whole worker lifetime.
pub struct FetchOrchestrator {
    api: Box<dyn ProductsApi>,
    cache: CacheStore,
}

impl FetchOrchestrator {
    /// Creates an orchestrator over `api` that writes unscoped first pages to
    /// `cache` and reads them back when the API fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use shopfront::api::HttpProductsApi;
    /// use shopfront::storage::{shared, CacheStore, MemoryStore};
    /// use shopfront::worker::{FetchOrchestrator, FetchRequest};
    /// use shopfront::Scope;
    /// use std::time::Duration;
    ///
    /// let api = HttpProductsApi::new("https://dummyjson.com", Duration::from_secs(10))?;
    /// let cache = CacheStore::new(shared(MemoryStore::new()));
    /// let orchestrator = FetchOrchestrator::new(Box::new(api), cache);
    ///
    /// let request = FetchRequest::first_page(Scope::All, 20, 1).with_cache_fallback(true);
    /// let outcome = orchestrator.fetch_page(request)?;
    /// println!("{} of {} products", outcome.page.products.len(), outcome.page.total);
    /// # Ok::<(), shopfront::CatalogError>(())
    /// ```
    #[must_use]
    pub fn new(api: Box<dyn ProductsApi>, cache: CacheStore) -> Self {
        Self { api, cache }
    }

    /// The API collaborator, for requests that bypass pagination.
    #[must_use]
    pub fn api(&self) -> &dyn ProductsApi {
        self.api.as_ref()
    }

    /// The cache collaborator.
    #[must_use]
    pub const fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Fetches one page.
    ///
    /// A successful outcome is either live (`offline == false`) or, for a failed
    /// unscoped first page whose request allows it, the cached snapshot with
    /// `offline == true` and the live failure message in `error`.
    ///
    /// A live unscoped first page overwrites the cache whether or not the request
    /// allows fallback. Category and search pages never touch it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidRequest`] for a zero page size or a blank search
    /// query (no I/O is performed), or the API failure when no fallback applies.
    pub fn fetch_page(&self, request: FetchRequest) -> Result<PageOutcome> {
        let _span = tracing::debug_span!(
            "fetch_page",
            scope = %request.scope,
            limit = request.limit,
            skip = request.skip,
            append = request.append,
            generation = request.generation
        )
        .entered();

        validate(&request)?;

        let fallback_eligible =
            request.scope.is_cacheable() && !request.append && request.skip == 0;

        match self.call_api(&request) {
            Ok(page) => {
                tracing::debug!(
                    received = page.products.len(),
                    total = page.total,
                    "page fetched"
                );
                if fallback_eligible {
                    self.cache.save(&page);
                }
                Ok(PageOutcome {
                    request,
                    page,
                    offline: false,
                    error: None,
                    cached_at: None,
                })
            }
            Err(e) if fallback_eligible && request.allow_cache_fallback => {
                let Some(snapshot) = self.cache.load() else {
                    tracing::debug!(error = %e, "fetch failed and no cache to fall back to");
                    return Err(e);
                };

                tracing::info!(
                    error = %e,
                    cached_products = snapshot.data.products.len(),
                    cached_at = snapshot.timestamp,
                    "serving cached catalog"
                );
                Ok(PageOutcome {
                    request,
                    page: snapshot.data,
                    offline: true,
                    error: Some(e.to_string()),
                    cached_at: Some(snapshot.timestamp),
                })
            }
            Err(e) => {
                tracing::debug!(error = %e, "fetch failed");
                Err(e)
            }
        }
    }

    fn call_api(&self, request: &FetchRequest) -> Result<ProductPage> {
        match &request.scope {
            Scope::All => self.api.list(request.limit, request.skip),
            Scope::Category(slug) => self.api.by_category(slug, request.limit, request.skip),
            Scope::Search(query) => self.api.search(query.trim(), request.limit, request.skip),
        }
    }
}

fn validate(request: &FetchRequest) -> Result<()> {
    if request.limit == 0 {
        return Err(CatalogError::InvalidRequest(
            "page size must be positive".to_string(),
        ));
    }
    match &request.scope {
        Scope::Search(query) if query.trim().is_empty() => Err(CatalogError::InvalidRequest(
            "search query must not be empty".to_string(),
        )),
        Scope::Category(slug) if slug.is_empty() => Err(CatalogError::InvalidRequest(
            "category slug must not be empty".to_string(),
        )),
        _ => Ok(()),
    }
}

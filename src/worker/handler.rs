//! Worker implementation.
//!
//! [`CatalogWorker`] owns every blocking collaborator (the HTTP API, the cache and
//! the favorites repository) and turns each [`WorkerMessage`] into exactly one
//! [`WorkerResponse`]. It can run on a dedicated thread ([`spawn`]) or on the
//! caller's thread ([`InlineWorker`](super::InlineWorker)).

use crate::api::ProductsApi;
use crate::app::WorkerPort;
use crate::domain::error::{CatalogError, Result};
use crate::storage::{CacheStore, FavoritesRepository, SharedStore};
use crate::worker::{FetchOrchestrator, FetchRequest, WorkerMessage, WorkerResponse};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const CHANNEL_BOUND: usize = 256;

/// Processes worker messages against the catalog collaborators.
pub struct CatalogWorker {
    orchestrator: FetchOrchestrator,
    favorites: FavoritesRepository,
}

impl CatalogWorker {
    /// Creates a worker whose cache and favorites share `store` under distinct keys.
    #[must_use]
    pub fn new(api: Box<dyn ProductsApi>, store: SharedStore) -> Self {
        Self {
            orchestrator: FetchOrchestrator::new(api, CacheStore::new(store.clone())),
            favorites: FavoritesRepository::new(store),
        }
    }

    /// Maps a collaborator result to a response with consistent logging.
    fn handle_api_result<T>(
        operation: &str,
        result: Result<T>,
        on_success: impl FnOnce(T) -> WorkerResponse,
        on_failure: impl FnOnce(String) -> WorkerResponse,
    ) -> WorkerResponse {
        match result {
            Ok(value) => {
                tracing::debug!(operation = operation, "operation successful");
                on_success(value)
            }
            Err(e) => {
                tracing::debug!(operation = operation, error = %e, "operation failed");
                on_failure(e.to_string())
            }
        }
    }

    fn handle_fetch_page(&self, request: FetchRequest) -> WorkerResponse {
        let echo = request.clone();
        Self::handle_api_result(
            "fetch page",
            self.orchestrator.fetch_page(request),
            |outcome| WorkerResponse::PageFetched { outcome },
            |message| WorkerResponse::PageFailed {
                request: echo,
                message,
            },
        )
    }

    fn handle_fetch_categories(&self) -> WorkerResponse {
        Self::handle_api_result(
            "fetch categories",
            self.orchestrator.api().categories(),
            |categories| {
                tracing::debug!(count = categories.len(), "categories fetched");
                WorkerResponse::CategoriesLoaded { categories }
            },
            |message| WorkerResponse::CategoriesFailed { message },
        )
    }

    fn handle_fetch_product(&self, id: u64) -> WorkerResponse {
        Self::handle_api_result(
            "fetch product",
            self.orchestrator.api().product(id),
            |product| WorkerResponse::ProductLoaded { product },
            |message| WorkerResponse::ProductFailed { id, message },
        )
    }

    /// Processes one message. Never panics on collaborator failures; they come back
    /// as failure responses.
    pub fn handle_message(&mut self, message: WorkerMessage) -> WorkerResponse {
        let _context_guard = message.trace_context().and_then(|ctx| ctx.attach());

        let span = tracing::debug_span!("worker_handle_message", message_type = ?message);
        let _guard = span.entered();

        match message {
            WorkerMessage::FetchPage { request, .. } => self.handle_fetch_page(request),
            WorkerMessage::FetchCategories { .. } => self.handle_fetch_categories(),
            WorkerMessage::FetchProduct { id, .. } => self.handle_fetch_product(id),
            WorkerMessage::SaveFavorites { ids, .. } => {
                self.favorites.save(&ids);
                WorkerResponse::FavoritesSaved { count: ids.len() }
            }
            WorkerMessage::LoadFavorites { .. } => WorkerResponse::FavoritesLoaded {
                ids: self.favorites.load(),
            },
            WorkerMessage::ClearCache { .. } => {
                self.orchestrator.cache().clear();
                tracing::info!("products cache cleared");
                WorkerResponse::CacheCleared
            }
        }
    }
}

/// A [`CatalogWorker`] running on its own thread.
///
/// Dropping the handle disconnects the request channel, which ends the thread once
/// the message in progress is done. [`WorkerHandle::shutdown`] additionally waits
/// for it.
pub struct WorkerHandle {
    requests: Option<Sender<WorkerMessage>>,
    responses: Receiver<WorkerResponse>,
    thread: Option<JoinHandle<()>>,
}

/// Starts `worker` on a dedicated thread.
///
/// # Errors
///
/// Returns a worker error if the OS refuses to spawn the thread.
pub fn spawn(worker: CatalogWorker) -> Result<WorkerHandle> {
    let (request_tx, request_rx) = bounded(CHANNEL_BOUND);
    let (response_tx, response_rx) = unbounded();

    let thread = thread::Builder::new()
        .name("shopfront-worker".to_string())
        .spawn(move || worker_loop(worker, &request_rx, &response_tx))
        .map_err(|e| CatalogError::Worker(format!("failed to spawn worker thread: {e}")))?;

    Ok(WorkerHandle {
        requests: Some(request_tx),
        responses: response_rx,
        thread: Some(thread),
    })
}

fn worker_loop(
    mut worker: CatalogWorker,
    requests: &Receiver<WorkerMessage>,
    responses: &Sender<WorkerResponse>,
) {
    tracing::debug!("worker started");
    for message in requests {
        let response = worker.handle_message(message);
        if responses.send(response).is_err() {
            break;
        }
    }
    tracing::debug!("worker stopped");
}

impl WorkerHandle {
    /// Stops accepting messages and waits for the worker thread to finish.
    ///
    /// # Errors
    ///
    /// Returns a worker error if the thread panicked.
    pub fn shutdown(mut self) -> Result<()> {
        self.requests.take();
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| CatalogError::Worker("worker thread panicked".to_string())),
            None => Ok(()),
        }
    }
}

impl WorkerPort for WorkerHandle {
    fn post(&mut self, message: WorkerMessage) -> Result<()> {
        let sender = self
            .requests
            .as_ref()
            .ok_or_else(|| CatalogError::Worker("worker is shut down".to_string()))?;
        sender
            .send(message)
            .map_err(|_| CatalogError::Worker("worker channel disconnected".to_string()))
    }

    fn next_response(&mut self, timeout: Option<Duration>) -> Option<WorkerResponse> {
        match timeout {
            None => match self.responses.try_recv() {
                Ok(response) => Some(response),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
            },
            Some(timeout) => match self.responses.recv_timeout(timeout) {
                Ok(response) => Some(response),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Product, ProductPage, Scope};
    use crate::storage::{shared, MemoryStore};

    struct EchoApi;

    impl ProductsApi for EchoApi {
        fn list(&self, limit: u32, skip: u32) -> Result<ProductPage> {
            Ok(ProductPage {
                products: vec![Product::new(u64::from(skip) + 1, "one", "misc", 2.0)],
                total: 1,
                skip,
                limit,
            })
        }
        fn by_category(&self, _slug: &str, _limit: u32, _skip: u32) -> Result<ProductPage> {
            Err(CatalogError::from_status(404, None))
        }
        fn search(&self, _query: &str, _limit: u32, _skip: u32) -> Result<ProductPage> {
            Ok(ProductPage::default())
        }
        fn categories(&self) -> Result<Vec<Category>> {
            Ok(vec![Category::from_slug("beauty")])
        }
        fn product(&self, id: u64) -> Result<Product> {
            Ok(Product::new(id, "detail", "misc", 3.0))
        }
    }

    fn worker() -> CatalogWorker {
        CatalogWorker::new(Box::new(EchoApi), shared(MemoryStore::new()))
    }

    #[test]
    fn failures_come_back_as_responses() {
        let mut worker = worker();
        let request = FetchRequest::first_page(Scope::Category("nope".into()), 10, 1);

        let response = worker.handle_message(WorkerMessage::fetch_page(request.clone()));
        assert_eq!(
            response,
            WorkerResponse::PageFailed {
                request,
                message: "Resource not found.".to_string()
            }
        );
    }

    #[test]
    fn favorites_round_trip_through_the_store() {
        let mut worker = worker();
        assert_eq!(
            worker.handle_message(WorkerMessage::save_favorites(vec![2, 5])),
            WorkerResponse::FavoritesSaved { count: 2 }
        );
        assert_eq!(
            worker.handle_message(WorkerMessage::load_favorites()),
            WorkerResponse::FavoritesLoaded { ids: vec![2, 5] }
        );
    }

    #[test]
    fn threaded_worker_answers_in_order() {
        let mut handle = spawn(worker()).unwrap();
        handle.post(WorkerMessage::fetch_categories()).unwrap();
        handle.post(WorkerMessage::fetch_product(7)).unwrap();

        let timeout = Some(Duration::from_secs(5));
        assert!(matches!(
            handle.next_response(timeout),
            Some(WorkerResponse::CategoriesLoaded { .. })
        ));
        assert!(matches!(
            handle.next_response(timeout),
            Some(WorkerResponse::ProductLoaded { product }) if product.id == 7
        ));
        handle.shutdown().unwrap();
    }
}

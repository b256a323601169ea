//! The catalog store: state, worker port and observers in one aggregate.
//!
//! [`CatalogStore`] is what consumers hold. Intents go in through its methods,
//! worker responses are pulled in with [`pump`](CatalogStore::pump) or
//! [`wait_idle`](CatalogStore::wait_idle), and observers are told about every
//! state change. All mutation happens on the thread that owns the store.

use crate::app::{handle_event, Action, AppState, Event};
use crate::domain::error::{CatalogError, Result};
use crate::domain::{Category, SortOption};
use crate::worker::{WorkerMessage, WorkerResponse};
use std::time::{Duration, Instant};

/// Longest a favorites change waits for the persisted set to load.
const HYDRATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the store sends worker messages and gets responses from.
pub trait WorkerPort {
    /// Queues a message for the worker.
    ///
    /// # Errors
    ///
    /// Returns a worker error if the worker is gone.
    fn post(&mut self, message: WorkerMessage) -> Result<()>;

    /// Takes the next response. `None` timeout means do not wait.
    fn next_response(&mut self, timeout: Option<Duration>) -> Option<WorkerResponse>;
}

/// Receives the state after every change.
pub trait CatalogObserver {
    fn on_change(&mut self, state: &AppState);
}

impl<F: FnMut(&AppState)> CatalogObserver for F {
    fn on_change(&mut self, state: &AppState) {
        self(state);
    }
}

/// Handle returned by [`CatalogStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// The catalog engine as seen by consumers.
///
/// ```no_run
/// use shopfront::{initialize, Config};
/// use std::time::Duration;
///
/// let mut store = initialize(&Config::default())?;
/// store.subscribe(|state: &shopfront::AppState| {
///     println!("{} products", state.display_products().len());
/// });
/// store.request_initial_load()?;
/// store.wait_idle(Duration::from_secs(30))?;
/// # Ok::<(), shopfront::CatalogError>(())
/// ```
pub struct CatalogStore<P: WorkerPort> {
    state: AppState,
    port: P,
    observers: Vec<(ObserverId, Box<dyn CatalogObserver>)>,
    next_observer_id: u64,
    in_flight: usize,
}

impl<P: WorkerPort> CatalogStore<P> {
    #[must_use]
    pub fn new(port: P, page_size: u32) -> Self {
        Self {
            state: AppState::new(page_size),
            port,
            observers: Vec::new(),
            next_observer_id: 0,
            in_flight: 0,
        }
    }

    /// Read-only snapshot of the current state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Messages posted whose responses have not been processed yet.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Consumes the store, returning the worker port (for shutdown).
    pub fn into_port(self) -> P {
        self.port
    }

    pub fn subscribe(&mut self, observer: impl CatalogObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns whether the observer was subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Applies one event, executes its actions, and notifies observers if the
    /// state changed. Returns whether it did.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is rejected or the worker is gone.
    pub fn dispatch(&mut self, event: Event) -> Result<bool> {
        let (changed, actions) = handle_event(&mut self.state, &event)?;

        for action in actions {
            match action {
                Action::PostToWorker(message) => {
                    if let Err(e) = self.port.post(message.clone()) {
                        self.undelivered(message, &e);
                        return Err(e);
                    }
                    self.in_flight += 1;
                }
            }
        }

        if changed {
            self.notify();
        }
        Ok(changed)
    }

    /// Settles the state a message put in flight when the worker never got it, so
    /// the next intent is not refused as "already loading". Follow-up actions are
    /// dropped; the worker is gone.
    fn undelivered(&mut self, message: WorkerMessage, error: &CatalogError) {
        tracing::warn!(error = %error, "worker message undelivered");
        if let Some(response) = WorkerResponse::undelivered(message, &error.to_string()) {
            if let Err(e) = handle_event(&mut self.state, &Event::WorkerResponse(response)) {
                tracing::warn!(error = %e, "failed to settle undelivered message");
            }
        }
        self.notify();
    }

    fn notify(&mut self) {
        for (_, observer) in &mut self.observers {
            observer.on_change(&self.state);
        }
    }

    fn apply_response(&mut self, response: WorkerResponse) -> Result<()> {
        tracing::trace!(kind = response.kind(), "worker response");
        self.in_flight = self.in_flight.saturating_sub(1);
        self.dispatch(Event::WorkerResponse(response))?;
        Ok(())
    }

    /// Processes every response already available, without waiting. Returns how
    /// many were processed.
    ///
    /// # Errors
    ///
    /// Returns an error if a follow-up message cannot be posted.
    pub fn pump(&mut self) -> Result<usize> {
        let mut processed = 0;
        while let Some(response) = self.port.next_response(None) {
            self.apply_response(response)?;
            processed += 1;
        }
        Ok(processed)
    }

    /// Processes responses until nothing is in flight.
    ///
    /// # Errors
    ///
    /// Returns a worker error if `timeout` elapses first.
    pub fn wait_idle(&mut self, timeout: Duration) -> Result<()> {
        self.wait_until(timeout, |store| store.in_flight == 0)
    }

    /// Processes responses, blocking up to `timeout` for each, until `done` holds.
    fn wait_until(&mut self, timeout: Duration, done: impl Fn(&Self) -> bool) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while !done(self) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.port.next_response(Some(remaining)) {
                Some(response) => self.apply_response(response)?,
                None if Instant::now() >= deadline => {
                    return Err(CatalogError::Worker(format!(
                        "timed out with {} request(s) in flight",
                        self.in_flight
                    )));
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Waits for a pending favorites hydration so a change applies to the
    /// persisted set rather than being queued behind it.
    fn settle_favorites(&mut self) -> Result<()> {
        if self.state.favorites_status.is_loading() {
            self.wait_until(HYDRATION_TIMEOUT, |store| {
                !store.state.favorites_status.is_loading()
            })?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the worker is gone.
    pub fn request_initial_load(&mut self) -> Result<()> {
        self.dispatch(Event::InitialLoad).map(drop)
    }

    /// # Errors
    ///
    /// Returns an error if the worker is gone.
    pub fn request_next_page(&mut self) -> Result<()> {
        self.dispatch(Event::NextPage).map(drop)
    }

    /// # Errors
    ///
    /// Returns an error if the worker is gone.
    pub fn request_refresh(&mut self) -> Result<()> {
        self.dispatch(Event::Refresh).map(drop)
    }

    /// # Errors
    ///
    /// Returns an error if the worker is gone.
    pub fn set_category(&mut self, category: Option<Category>) -> Result<()> {
        self.dispatch(Event::SetCategory(category)).map(drop)
    }

    /// # Errors
    ///
    /// Never fails in practice; sorting is local.
    pub fn set_sort(&mut self, sort: SortOption) -> Result<()> {
        self.dispatch(Event::SetSort(sort)).map(drop)
    }

    /// Runs a search immediately. Debounce raw input with
    /// [`SearchDebouncer`](super::SearchDebouncer) first.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker is gone.
    pub fn search(&mut self, query: impl Into<String>) -> Result<()> {
        self.dispatch(Event::Search(query.into())).map(drop)
    }

    /// # Errors
    ///
    /// Returns an error if the worker is gone.
    pub fn clear_filters(&mut self) -> Result<()> {
        self.dispatch(Event::ClearFilters).map(drop)
    }

    /// # Errors
    ///
    /// Returns an error if the worker is gone.
    pub fn load_categories(&mut self) -> Result<()> {
        self.dispatch(Event::LoadCategories).map(drop)
    }

    /// Flips membership of `id`. Returns whether `id` is a favorite afterwards.
    ///
    /// Waits for a pending hydration first, so the flip applies to the persisted
    /// set.
    ///
    /// # Errors
    ///
    /// Returns an error if hydration does not finish within five seconds or the
    /// worker is gone.
    pub fn toggle_favorite(&mut self, id: u64) -> Result<bool> {
        self.settle_favorites()?;
        self.dispatch(Event::ToggleFavorite(id))?;
        Ok(self.state.is_favorite(id))
    }

    /// Returns whether the set changed.
    ///
    /// # Errors
    ///
    /// Returns an error if hydration times out or the worker is gone.
    pub fn add_favorite(&mut self, id: u64) -> Result<bool> {
        self.settle_favorites()?;
        self.dispatch(Event::AddFavorite(id))
    }

    /// Returns whether the set changed.
    ///
    /// # Errors
    ///
    /// Returns an error if hydration times out or the worker is gone.
    pub fn remove_favorite(&mut self, id: u64) -> Result<bool> {
        self.settle_favorites()?;
        self.dispatch(Event::RemoveFavorite(id))
    }

    /// Returns whether the set changed.
    ///
    /// # Errors
    ///
    /// Returns an error if hydration times out or the worker is gone.
    pub fn clear_favorites(&mut self) -> Result<bool> {
        self.settle_favorites()?;
        self.dispatch(Event::ClearFavorites)
    }

    /// Loads the persisted favorites and merges them into memory, blocking until
    /// the worker has answered.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker is gone or does not answer within five
    /// seconds.
    pub fn hydrate_favorites(&mut self) -> Result<()> {
        self.dispatch(Event::HydrateFavorites)?;
        self.settle_favorites()
    }

    /// # Errors
    ///
    /// Returns an error if the worker is gone.
    pub fn open_product(&mut self, id: u64) -> Result<()> {
        self.dispatch(Event::OpenProduct(id)).map(drop)
    }

    /// # Errors
    ///
    /// Never fails in practice.
    pub fn close_product(&mut self) -> Result<()> {
        self.dispatch(Event::CloseProduct).map(drop)
    }

    /// # Errors
    ///
    /// Returns an error if the worker is gone.
    pub fn clear_cache(&mut self) -> Result<()> {
        self.dispatch(Event::ClearCache).map(drop)
    }
}

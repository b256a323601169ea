//! Same-thread worker.

use crate::app::WorkerPort;
use crate::domain::error::Result;
use crate::worker::{CatalogWorker, WorkerMessage, WorkerResponse};
use std::collections::VecDeque;
use std::time::Duration;

/// Runs a [`CatalogWorker`] on the caller's thread.
///
/// `post` does the work immediately but the response is only handed out by
/// `next_response`, so the state machine observes the same request/response
/// interleaving as with a threaded worker. Useful for tests and for hosts that
/// already run the engine off their UI thread.
pub struct InlineWorker {
    worker: CatalogWorker,
    responses: VecDeque<WorkerResponse>,
}

impl InlineWorker {
    #[must_use]
    pub fn new(worker: CatalogWorker) -> Self {
        Self {
            worker,
            responses: VecDeque::new(),
        }
    }
}

impl WorkerPort for InlineWorker {
    fn post(&mut self, message: WorkerMessage) -> Result<()> {
        let response = self.worker.handle_message(message);
        self.responses.push_back(response);
        Ok(())
    }

    fn next_response(&mut self, _timeout: Option<Duration>) -> Option<WorkerResponse> {
        self.responses.pop_front()
    }
}

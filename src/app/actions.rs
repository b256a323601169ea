//! Side effects produced by the event handler.
//!
//! The handler never performs I/O itself. Whatever it needs done off the consumer
//! thread comes back as an [`Action`], which [`CatalogStore`](super::CatalogStore)
//! executes in order.
//!
//! ```rust
//! use shopfront::app::Action;
//! use shopfront::worker::WorkerMessage;
//!
//! let actions = vec![Action::PostToWorker(WorkerMessage::load_favorites())];
//! assert_eq!(actions.len(), 1);
//! ```

use crate::worker::WorkerMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Posts a message to the background worker.
    PostToWorker(WorkerMessage),
}

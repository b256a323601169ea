//! Background worker for blocking catalog I/O.
//!
//! Everything that touches the network or the disk runs here, so the consumer
//! thread that owns the state machine never blocks on it.
//!
//! # Architecture
//!
//! - `messages`: Request/response protocol with trace context propagation
//! - `orchestrator`: Page fetching with cache write-through and offline fallback
//! - `handler`: Message processing and the threaded worker
//! - `inline`: Same-thread worker

pub mod handler;
pub mod inline;
pub mod messages;
pub mod orchestrator;

pub use handler::{spawn, CatalogWorker, WorkerHandle};
pub use inline::InlineWorker;
pub use messages::{FetchRequest, PageOutcome, TraceContext, WorkerMessage, WorkerResponse};
pub use orchestrator::FetchOrchestrator;

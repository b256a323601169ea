//! Application layer: the catalog state machine.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! Intent → Event → handle_event → State Mutations → Actions → Worker
//!                       ↑                                       ↓
//!                       └──────────── Worker Responses ─────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effects emitted by the event handler
//! - [`handler`]: Event processing and state transitions
//! - [`state`]: Catalog, favorites and detail state
//! - [`store`]: The consumer-facing aggregate with observers
//! - [`filter`]: Pure filter/sort engine
//! - [`favorites`]: Favorites set
//! - [`status`]: Load status
//! - [`debounce`]: Search input debouncing

pub mod actions;
pub mod debounce;
pub mod favorites;
pub mod filter;
pub mod handler;
pub mod state;
pub mod status;
pub mod store;

pub use actions::Action;
pub use debounce::SearchDebouncer;
pub use favorites::{FavoriteOp, FavoritesState};
pub use handler::{handle_event, Event};
pub use state::{AppState, CatalogState, ProductDetailState};
pub use status::LoadStatus;
pub use store::{CatalogObserver, CatalogStore, ObserverId, WorkerPort};

//! Worker message protocol.
//!
//! Requests travel from the consumer thread to the worker as [`WorkerMessage`]s and
//! come back as [`WorkerResponse`]s. Each request carries an optional
//! [`TraceContext`] so that spans recorded on the worker are linked to the span
//! that issued the request.

use crate::domain::{Category, Product, ProductPage, Scope};
use serde::{Deserialize, Serialize};

/// Trace and span ids of the span that issued a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace id, 32 hex digits.
    pub trace_id: String,

    /// Issuing span id, 16 hex digits.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the OpenTelemetry context of the current `tracing` span.
    ///
    /// Returns `None` when no OpenTelemetry layer is installed or the span is not
    /// sampled, which is the normal case in tests.
    ///
    /// ```no_run
    /// use shopfront::worker::TraceContext;
    ///
    /// if let Some(ctx) = TraceContext::from_current() {
    ///     println!("trace {}", ctx.trace_id);
    /// }
    /// ```
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let otel_context = tracing::Span::current().context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }

    /// Makes this context the parent of spans created on the current thread until
    /// the returned guard is dropped. Malformed ids yield `None`.
    #[must_use]
    pub fn attach(&self) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{
            SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
        };

        let trace_id = TraceId::from_hex(&self.trace_id).ok()?;
        let span_id = SpanId::from_hex(&self.parent_span_id).ok()?;
        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        Some(
            opentelemetry::Context::current()
                .with_remote_span_context(span_context)
                .attach(),
        )
    }
}

/// Generates `WorkerMessage` constructors that attach the current trace context.
macro_rules! worker_message_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl WorkerMessage {
            $(
                #[doc = concat!("Create a ", stringify!($variant), " message with current trace context")]
                #[must_use]
                pub fn $builder_name($($field: $ty),*) -> Self {
                    Self::$variant {
                        $($field,)*
                        trace_context: TraceContext::from_current(),
                    }
                }
            )*
        }
    };
}

worker_message_builders! {
    fetch_page(FetchPage { request: FetchRequest }),
    fetch_categories(FetchCategories {}),
    fetch_product(FetchProduct { id: u64 }),
    save_favorites(SaveFavorites { ids: Vec<u64> }),
    load_favorites(LoadFavorites {}),
    clear_cache(ClearCache {}),
}

/// One catalog page request, as issued by the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Query dimension of the request.
    pub scope: Scope,

    /// Page size. Must be positive.
    pub limit: u32,

    /// Offset into the scope's result set.
    pub skip: u32,

    /// Whether the result is appended to the loaded list or replaces it.
    pub append: bool,

    /// State-machine generation the request was issued under. Responses from an
    /// older generation are discarded.
    pub generation: u64,

    /// Whether a failed unscoped first page may be answered from the cache. Only
    /// set until the first successful page of a session.
    pub allow_cache_fallback: bool,
}

impl FetchRequest {
    /// A first-page request for `scope`, without cache fallback.
    #[must_use]
    pub const fn first_page(scope: Scope, limit: u32, generation: u64) -> Self {
        Self {
            scope,
            limit,
            skip: 0,
            append: false,
            generation,
            allow_cache_fallback: false,
        }
    }

    /// Sets whether a failure may be answered from the cache.
    ///
    /// ```
    /// use shopfront::worker::FetchRequest;
    /// use shopfront::Scope;
    ///
    /// let request = FetchRequest::first_page(Scope::All, 10, 1).with_cache_fallback(true);
    /// assert!(request.allow_cache_fallback);
    /// ```
    #[must_use]
    pub const fn with_cache_fallback(mut self, allow: bool) -> Self {
        self.allow_cache_fallback = allow;
        self
    }
}

/// A successfully answered page request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageOutcome {
    /// The request this outcome answers.
    pub request: FetchRequest,

    /// The page, live or from the cache.
    pub page: ProductPage,

    /// True iff `page` came from the cache.
    pub offline: bool,

    /// The live failure that caused a cache fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Timestamp (Unix ms) of the cached snapshot, when `offline`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<i64>,
}

/// Messages sent from the consumer thread to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerMessage {
    /// Fetch one page of products.
    FetchPage {
        request: FetchRequest,

        /// Trace context for linking spans across threads.
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Fetch the category list.
    FetchCategories {
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Fetch a single product for the detail view.
    FetchProduct {
        id: u64,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Persist the favorites set, replacing what was stored.
    SaveFavorites {
        /// Favorite product ids, ascending.
        ids: Vec<u64>,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Read the persisted favorites set.
    LoadFavorites {
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Drop the cached catalog snapshot.
    ClearCache {
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
}

impl WorkerMessage {
    /// The trace context the message was issued under.
    #[must_use]
    pub const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::FetchPage { trace_context, .. }
            | Self::FetchCategories { trace_context }
            | Self::FetchProduct { trace_context, .. }
            | Self::SaveFavorites { trace_context, .. }
            | Self::LoadFavorites { trace_context }
            | Self::ClearCache { trace_context } => trace_context.as_ref(),
        }
    }
}

/// Responses sent from the worker back to the consumer thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerResponse {
    /// A page request succeeded, live or from the cache.
    PageFetched { outcome: PageOutcome },

    /// A page request failed and no cache could stand in for it.
    PageFailed {
        request: FetchRequest,

        /// Human-readable error message.
        message: String,
    },

    CategoriesLoaded { categories: Vec<Category> },

    CategoriesFailed { message: String },

    ProductLoaded { product: Product },

    ProductFailed { id: u64, message: String },

    /// The persisted favorites set, possibly empty.
    FavoritesLoaded { ids: Vec<u64> },

    FavoritesSaved { count: usize },

    CacheCleared,
}

impl WorkerResponse {
    /// The response that stands in for `message` when it could not be handed to
    /// the worker, so the state machine leaves the in-flight state it entered when
    /// issuing it. `None` for messages whose responses nothing waits on.
    #[must_use]
    pub fn undelivered(message: WorkerMessage, error: &str) -> Option<Self> {
        let message_text = error.to_string();
        match message {
            WorkerMessage::FetchPage { request, .. } => Some(Self::PageFailed {
                request,
                message: message_text,
            }),
            WorkerMessage::FetchCategories { .. } => Some(Self::CategoriesFailed {
                message: message_text,
            }),
            WorkerMessage::FetchProduct { id, .. } => Some(Self::ProductFailed {
                id,
                message: message_text,
            }),
            WorkerMessage::LoadFavorites { .. } => Some(Self::FavoritesLoaded { ids: Vec::new() }),
            WorkerMessage::SaveFavorites { .. } | WorkerMessage::ClearCache { .. } => None,
        }
    }

    /// Short name of the variant, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PageFetched { .. } => "page_fetched",
            Self::PageFailed { .. } => "page_failed",
            Self::CategoriesLoaded { .. } => "categories_loaded",
            Self::CategoriesFailed { .. } => "categories_failed",
            Self::ProductLoaded { .. } => "product_loaded",
            Self::ProductFailed { .. } => "product_failed",
            Self::FavoritesLoaded { .. } => "favorites_loaded",
            Self::FavoritesSaved { .. } => "favorites_saved",
            Self::CacheCleared => "cache_cleared",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_fill_fields() {
        let request = FetchRequest::first_page(Scope::All, 10, 3);
        match WorkerMessage::fetch_page(request.clone()) {
            WorkerMessage::FetchPage { request: got, .. } => assert_eq!(got, request),
            other => panic!("unexpected message {other:?}"),
        }

        assert!(matches!(
            WorkerMessage::save_favorites(vec![1, 2]),
            WorkerMessage::SaveFavorites { ref ids, .. } if ids == &[1, 2]
        ));
    }

    #[test]
    fn trace_context_is_omitted_when_absent() {
        let json = serde_json::to_string(&WorkerMessage::ClearCache { trace_context: None }).unwrap();
        assert_eq!(json, r#"{"ClearCache":{}}"#);
    }

    #[test]
    fn undelivered_requests_turn_into_failures() {
        let request = FetchRequest::first_page(Scope::All, 10, 2);
        assert_eq!(
            WorkerResponse::undelivered(WorkerMessage::fetch_page(request.clone()), "gone"),
            Some(WorkerResponse::PageFailed {
                request,
                message: "gone".to_string()
            })
        );
        assert_eq!(
            WorkerResponse::undelivered(WorkerMessage::load_favorites(), "gone"),
            Some(WorkerResponse::FavoritesLoaded { ids: vec![] })
        );
        assert_eq!(
            WorkerResponse::undelivered(WorkerMessage::save_favorites(vec![1]), "gone"),
            None
        );
    }
}

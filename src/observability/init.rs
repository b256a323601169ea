//! Subscriber setup.

use super::exporter;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Name of the span file inside the data directory.
pub const TRACE_FILE_NAME: &str = "shopfront-otlp.json";

const SERVICE_NAME: &str = "shopfront";

/// Installs the global tracing subscriber.
///
/// Spans are exported as OTLP JSON lines to [`TRACE_FILE_NAME`] inside the
/// configured data directory. The filter comes from `RUST_LOG` when set, then
/// `trace_level`, then `"info"`.
///
/// Observability is optional: if the data directory cannot be created, or a
/// subscriber is already installed, this does nothing and returns `None`.
///
/// # Parameters
///
/// * `config` - Supplies `data_dir` and `trace_level`
///
/// # Returns
///
/// The tracer provider, so the caller can shut it down on exit and flush the
/// last spans.
///
/// # Examples
///
/// ```no_run
/// use shopfront::observability::init_tracing;
/// use shopfront::Config;
///
/// let provider = init_tracing(&Config::default());
/// tracing::info!("catalog starting");
///
/// if let Some(provider) = provider {
///     let _ = provider.shutdown();
/// }
/// ```
pub fn init_tracing(config: &Config) -> Option<TracerProvider> {
    let data_dir = config.resolved_data_dir();
    if std::fs::create_dir_all(&data_dir).is_err() {
        return None;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.trace_level.as_deref().unwrap_or("info")));

    let resource = Resource::new(vec![
        opentelemetry::KeyValue::new("service.name", SERVICE_NAME),
        opentelemetry::KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let provider = exporter::tracer_provider(data_dir.join(TRACE_FILE_NAME), resource);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .try_init()
        .ok()?;

    tracing::debug!(data_dir = %data_dir.display(), "tracing initialized");
    Some(provider)
}

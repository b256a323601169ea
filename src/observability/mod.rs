//! Tracing setup with file-based OpenTelemetry export.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → SDK tracer provider → FileSpanExporter → JSON lines
//! ```
//!
//! Spans are written as OTLP JSON, one batch per line, to `shopfront-otlp.json` in
//! the data directory. The file rotates at 10 MB and keeps 3 backups.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from `Config::trace_level`
//! (default `"info"`).
//!
//! # Modules
//!
//! - `init`: subscriber setup
//! - `exporter`: span exporter and rotating file
//! - `otlp`: OTLP JSON encoding of spans

mod exporter;
mod init;
mod otlp;

pub use init::{init_tracing, TRACE_FILE_NAME};

//! Error types for the catalog engine.
//!
//! This module defines the centralized error type [`CatalogError`] and a type alias
//! [`Result`] used throughout the crate. Every variant renders a human-readable
//! message through `Display`; that message is what ends up in the catalog state's
//! `error` field when a fetch fails.

use thiserror::Error;

/// The main error type for catalog operations.
///
/// Network and API failures are transient and retryable. Storage failures are
/// logged and swallowed by the cache and favorites layers, so they never reach the
/// catalog-loading path.
///
/// # Examples
///
/// ```
/// use shopfront::CatalogError;
///
/// let err = CatalogError::from_status(404, None);
/// assert_eq!(err.to_string(), "Resource not found.");
/// ```
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    #[error("{0}")]
    Network(String),

    /// The catalog API answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code reported by the server.
        status: u16,
        /// Human-readable message for display.
        message: String,
    },

    /// The API rejected the credentials and no refresh was possible.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller violated a request precondition (zero page size, empty query).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reading or writing the key-value store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted or received payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Communication with the background worker failed.
    #[error("Worker communication error: {0}")]
    Worker(String),
}

impl CatalogError {
    /// Maps an HTTP status code (and the optional `message` field of the response
    /// body) to an error with a display-ready message.
    #[must_use]
    pub fn from_status(status: u16, body_message: Option<String>) -> Self {
        match status {
            401 => Self::Unauthorized("Unauthorized. Please login again.".to_string()),
            403 => Self::Api {
                status,
                message: "Forbidden. You do not have permission.".to_string(),
            },
            404 => Self::Api {
                status,
                message: "Resource not found.".to_string(),
            },
            422 => Self::Api {
                status,
                message: "Validation error.".to_string(),
            },
            500 => Self::Api {
                status,
                message: "Server error. Please try again later.".to_string(),
            },
            _ => Self::Api {
                status,
                message: body_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "An error occurred".to_string()),
            },
        }
    }
}

/// A specialized `Result` type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_get_fixed_messages() {
        assert_eq!(
            CatalogError::from_status(500, Some("boom".into())).to_string(),
            "Server error. Please try again later."
        );
        assert!(matches!(
            CatalogError::from_status(401, None),
            CatalogError::Unauthorized(_)
        ));
    }

    #[test]
    fn other_statuses_use_body_message() {
        let err = CatalogError::from_status(418, Some("teapot".into()));
        assert_eq!(err.to_string(), "teapot");

        let err = CatalogError::from_status(418, Some("   ".into()));
        assert_eq!(err.to_string(), "An error occurred");
    }
}

//! Shopfront: a product catalog state engine.
//!
//! Shopfront owns the in-memory representation of a remote product catalog and
//! drives paginated, searchable and sortable access to it:
//! - Gap-free pagination with guarded next-page requests
//! - Category and search scopes, with local sorting and filtering
//! - Offline fallback to the last successful unscoped first page
//! - Persisted favorites
//! - Background worker thread for all network and disk I/O
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Line shell (main.rs)                               │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Intents and event handling                       │
//! │  - Filter/sort engine, favorites                    │
//! │  - CatalogStore with observers                      │
//! └─────────────────────────────────────────────────────┘
//!                        │ WorkerMessage / WorkerResponse
//! ┌─────────────────────────────────────────────────────┐
//! │  Worker Layer (worker/)                             │  ← Blocking I/O
//! │  - Fetch orchestration with cache fallback          │
//! └─────────────────────────────────────────────────────┘
//!         │                                      │
//! ┌───────────────────────┐       ┌───────────────────────┐
//! │ API Layer (api/)      │       │ Storage Layer         │
//! │ - HTTP client         │       │ (storage/)            │
//! │ - Token refresh       │       │ - Key-value backends  │
//! │ - Shape normalization │       │ - Cache, favorites    │
//! └───────────────────────┘       └───────────────────────┘
//!         │                                      │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/), Infrastructure (infrastructure/) │
//! │  Observability (observability/)                     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Catalog state machine with event/action model
//! - [`api`]: Remote catalog collaborator
//! - [`domain`]: Core value types and errors
//! - [`infrastructure`]: Platform paths
//! - [`storage`]: Key-value persistence, cache and favorites
//! - [`worker`]: Background worker and fetch orchestration
//! - [`observability`]: Tracing with file-based OTLP export
//!
//! # Configuration
//!
//! ```toml
//! # ~/.config/shopfront/config.toml
//! api_base_url = "https://dummyjson.com"
//! page_size = 10
//! request_timeout_secs = 30
//! trace_level = "debug"
//! ```
//!
//! Every key can be overridden with a `SHOPFRONT_<KEY>` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use shopfront::{initialize, Config};
//! use std::time::Duration;
//!
//! let mut store = initialize(&Config::default())?;
//! store.request_initial_load()?;
//! store.wait_idle(Duration::from_secs(30))?;
//!
//! for product in store.state().display_products() {
//!     println!("{:>4} {}", product.id, product.title);
//! }
//! # Ok::<(), shopfront::CatalogError>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod storage;
pub mod worker;

pub use app::{
    handle_event, Action, AppState, CatalogObserver, CatalogStore, Event, LoadStatus,
    SearchDebouncer, WorkerPort,
};
pub use domain::{CatalogError, Category, Product, ProductPage, Result, Scope, SortOption};

use crate::api::{HttpProductsApi, MemoryTokenSource, ProductsApi};
use crate::infrastructure::paths;
use crate::storage::{shared, JsonFileStore, SharedStore};
use crate::worker::{CatalogWorker, InlineWorker, WorkerHandle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// File name of the persisted key-value store inside the data directory.
pub const STORE_FILE_NAME: &str = "shopfront.json";

/// Prefix of environment variables read by [`Config::env_overrides`].
pub const ENV_PREFIX: &str = "SHOPFRONT_";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the catalog API. Default: `https://dummyjson.com`
    pub api_base_url: String,

    /// Products per page. Must be positive. Default: 10
    pub page_size: u32,

    /// Per-request HTTP timeout in seconds. Default: 30
    pub request_timeout_secs: u64,

    /// Data directory (store and trace file). `~` is expanded. Default: platform
    /// data directory, see [`infrastructure::paths::data_dir`].
    pub data_dir: Option<String>,

    /// Tracing filter directive. Options: `trace`, `debug`, `info`, `warn`,
    /// `error`, or any `EnvFilter` directive. Default: `"info"`
    pub trace_level: Option<String>,

    /// Bearer token sent with every request.
    pub auth_token: Option<String>,

    /// Token exchanged for a new access token when the API answers 401.
    pub refresh_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://dummyjson.com".to_string(),
            page_size: app::state::DEFAULT_PAGE_SIZE,
            request_timeout_secs: 30,
            data_dir: None,
            trace_level: None,
            auth_token: None,
            refresh_token: None,
        }
    }
}

impl Config {
    /// Parses a TOML configuration file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a configuration error
    /// if it is not valid TOML for this structure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| CatalogError::Config(format!("{}: {e}", path.display())))
    }

    /// Loads the configuration file if present, then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing configuration file cannot be parsed.
    pub fn load() -> Result<Self> {
        let mut config = match paths::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(&Self::env_overrides());
        Ok(config)
    }

    /// Collects `SHOPFRONT_*` environment variables as lowercase keys without the
    /// prefix (`SHOPFRONT_PAGE_SIZE` becomes `page_size`).
    #[must_use]
    pub fn env_overrides() -> BTreeMap<String, String> {
        std::env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PREFIX)
                    .map(|k| (k.to_ascii_lowercase(), value))
            })
            .collect()
    }

    /// Applies string overrides on top of the current values.
    ///
    /// # Parsing Rules
    ///
    /// - `page_size`, `request_timeout_secs`: parsed as integers; unparsable or
    ///   zero values are ignored with a warning
    /// - empty strings clear optional values
    /// - unknown keys are ignored
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use shopfront::Config;
    ///
    /// let mut overrides = BTreeMap::new();
    /// overrides.insert("page_size".to_string(), "25".to_string());
    /// overrides.insert("request_timeout_secs".to_string(), "soon".to_string());
    ///
    /// let mut config = Config::default();
    /// config.apply_overrides(&overrides);
    /// assert_eq!(config.page_size, 25);
    /// assert_eq!(config.request_timeout_secs, 30);
    /// ```
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) {
        fn positive<T: std::str::FromStr + PartialEq + Default>(key: &str, raw: &str) -> Option<T> {
            match raw.trim().parse::<T>() {
                Ok(value) if value != T::default() => Some(value),
                _ => {
                    tracing::warn!(key = key, value = raw, "ignoring invalid config override");
                    None
                }
            }
        }
        fn optional(raw: &str) -> Option<String> {
            Some(raw.trim().to_string()).filter(|v| !v.is_empty())
        }

        for (key, raw) in overrides {
            match key.as_str() {
                "api_base_url" if !raw.trim().is_empty() => {
                    self.api_base_url = raw.trim().to_string();
                }
                "page_size" => {
                    if let Some(value) = positive(key, raw) {
                        self.page_size = value;
                    }
                }
                "request_timeout_secs" => {
                    if let Some(value) = positive(key, raw) {
                        self.request_timeout_secs = value;
                    }
                }
                "data_dir" => self.data_dir = optional(raw),
                "trace_level" => self.trace_level = optional(raw),
                "auth_token" => self.auth_token = optional(raw),
                "refresh_token" => self.refresh_token = optional(raw),
                _ => {}
            }
        }
    }

    /// Checks the values the engine cannot work without.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero page size or an empty base URL.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(CatalogError::Config("page_size must be positive".to_string()));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(CatalogError::Config("api_base_url must not be empty".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .map_or_else(paths::data_dir, paths::expand_tilde)
    }

    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.resolved_data_dir().join(STORE_FILE_NAME)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Builds the engine against the configured HTTP catalog, with a threaded worker
/// and a JSON file store, and hydrates favorites before returning.
///
/// Does not install tracing; call [`observability::init_tracing`] first if wanted.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the store file cannot be
/// opened, the HTTP client cannot be built, the worker cannot be spawned, or the
/// persisted favorites cannot be read in time.
pub fn initialize(config: &Config) -> Result<CatalogStore<WorkerHandle>> {
    config.validate()?;
    tracing::debug!(
        api_base_url = %config.api_base_url,
        page_size = config.page_size,
        "initializing shopfront"
    );

    let kv = JsonFileStore::new(config.store_path())?;

    let mut api = HttpProductsApi::new(&config.api_base_url, config.request_timeout())?;
    if let Some(token) = &config.auth_token {
        api = api.with_token_source(Arc::new(MemoryTokenSource::new(
            token.clone(),
            config.refresh_token.clone(),
        )));
    }

    let handle = worker::spawn(CatalogWorker::new(Box::new(api), shared(kv)))?;
    let mut store = CatalogStore::new(handle, config.page_size);
    store.hydrate_favorites()?;
    Ok(store)
}

/// Builds the engine over any API and store, processing worker messages on the
/// calling thread, and hydrates favorites.
///
/// # Errors
///
/// Returns a configuration error for a zero page size.
pub fn initialize_inline(
    api: Box<dyn ProductsApi>,
    store: SharedStore,
    page_size: u32,
) -> Result<CatalogStore<InlineWorker>> {
    if page_size == 0 {
        return Err(CatalogError::Config("page_size must be positive".to_string()));
    }
    let mut catalog = CatalogStore::new(InlineWorker::new(CatalogWorker::new(api, store)), page_size);
    catalog.hydrate_favorites()?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_with_partial_keys_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = 20\ntrace_level = \"debug\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
        assert_eq!(config.api_base_url, "https://dummyjson.com");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = \"many\"").unwrap();

        assert!(matches!(Config::from_file(&path), Err(CatalogError::Config(_))));
    }

    #[test]
    fn overrides_ignore_zero_and_clear_empty() {
        let mut config = Config {
            auth_token: Some("abc".into()),
            ..Config::default()
        };
        let overrides: BTreeMap<String, String> = [
            ("page_size", "0"),
            ("auth_token", ""),
            ("api_base_url", "http://localhost:8080"),
            ("unknown", "x"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        config.apply_overrides(&overrides);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.auth_token, None);
        assert_eq!(config.api_base_url, "http://localhost:8080");
    }

    #[test]
    fn validation() {
        assert!(Config::default().validate().is_ok());
        let config = Config {
            page_size: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CatalogError::Config(_))));
    }

    #[test]
    fn data_dir_setting_wins() {
        let config = Config {
            data_dir: Some("/tmp/shopfront-test".into()),
            ..Config::default()
        };
        assert_eq!(config.store_path(), PathBuf::from("/tmp/shopfront-test/shopfront.json"));
    }
}

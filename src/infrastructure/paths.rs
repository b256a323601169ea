//! Platform paths for shopfront's data and configuration.

use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SHOPFRONT_DATA_DIR";

/// Environment variable overriding the configuration file.
pub const CONFIG_PATH_ENV: &str = "SHOPFRONT_CONFIG";

/// Returns the directory holding the persisted store and the trace file.
///
/// `$SHOPFRONT_DATA_DIR` if set, otherwise the platform's local data directory
/// (`~/.local/share/shopfront` on Linux), falling back to `./.shopfront`.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_local_dir().map_or_else(|| PathBuf::from(".shopfront"), |d| d.join("shopfront"))
}

/// Returns the configuration file location.
///
/// `$SHOPFRONT_CONFIG` if set, otherwise `shopfront/config.toml` under the
/// platform's configuration directory.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("shopfront").join("config.toml"))
}

/// Expands a leading `~` to the home directory. Other paths are returned as is.
///
/// ```
/// use shopfront::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/absolute/path"), std::path::PathBuf::from("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let expanded = if path == "~" {
        dirs::home_dir()
    } else {
        path.strip_prefix("~/")
            .and_then(|rest| dirs::home_dir().map(|home| home.join(rest)))
    };
    expanded.unwrap_or_else(|| PathBuf::from(path))
}

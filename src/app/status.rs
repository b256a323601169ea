//! Load status of the catalog and of the product detail.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary status of an asynchronous load.
///
/// ```text
/// Idle ──▶ Loading ──▶ Success ──(refresh / scope change)──▶ Loading
///                 └──▶ Failed  ──(retry)─────────────────────▶ Loading
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A replace-type fetch is in flight.
    Loading,
    /// The last replace-type fetch succeeded (live or from the cache).
    Success,
    /// The last replace-type fetch failed. Terminal until the next retry intent.
    Failed,
}

impl LoadStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

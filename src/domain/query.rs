//! Query dimensions: scope and sort order.
//!
//! A catalog request is always issued for one [`Scope`]. Sorting never reaches the
//! network; [`SortOption`] is applied locally by the filter engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::CatalogError;

/// The logical query dimension of a catalog request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Unscoped listing of the whole catalog.
    All,
    /// Products of one category, identified by slug.
    Category(String),
    /// Free-text search results.
    Search(String),
}

impl Scope {
    /// Search-scoped lists cannot be continued with an offset.
    #[must_use]
    pub const fn supports_pagination(&self) -> bool {
        !matches!(self, Self::Search(_))
    }

    /// Only the unscoped first page is written to, and restored from, the cache.
    #[must_use]
    pub const fn is_cacheable(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Category(slug) => write!(f, "category:{slug}"),
            Self::Search(query) => write!(f, "search:{query}"),
        }
    }
}

/// Local sort order for the displayed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Keep the server order.
    #[default]
    None,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Best rated first.
    RatingDesc,
}

impl SortOption {
    /// All sort options, in menu order.
    pub const ALL: [Self; 4] = [Self::None, Self::PriceAsc, Self::PriceDesc, Self::RatingDesc];

    /// The kebab-case identifier (`"price-asc"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::RatingDesc => "rating-desc",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == s.trim())
            .ok_or_else(|| CatalogError::InvalidRequest(format!("unknown sort option: {s}")))
    }
}

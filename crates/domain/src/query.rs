//! Query intent, sort keys and page requests.

use crate::primitives::is_all_digits;
use crate::{CategoryId, PrimitiveError, ProductId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result ordering requested by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most scanned first.
    #[default]
    Popularity,
    /// Alphabetical by product name.
    Name,
    /// Most recently created first.
    Newest,
    /// Nutrition grade A first; ungraded entries are dropped.
    Grade,
}

impl SortKey {
    /// All sort keys in display order.
    pub const ALL: [Self; 4] = [Self::Popularity, Self::Name, Self::Newest, Self::Grade];

    /// Upstream `sort_by` value.
    #[must_use]
    pub const fn api_key(self) -> &'static str {
        match self {
            Self::Popularity => "unique_scans_n",
            Self::Name => "product_name",
            Self::Newest => "created_t",
            Self::Grade => "nutriscore_score",
        }
    }

    /// Stable user-facing name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Popularity => "popularity",
            Self::Name => "name",
            Self::Newest => "newest",
            Self::Grade => "grade",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when a sort key name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl fmt::Display for UnknownSortKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "unknown sort key `{}` (expected popularity, name, newest or grade)",
            self.0
        )
    }
}

impl std::error::Error for UnknownSortKey {}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    /// Accepts both the user-facing names and the upstream keys.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized || key.api_key() == normalized)
            .ok_or_else(|| UnknownSortKey(value.to_owned()))
    }
}

/// The full set of filters defining what the user wants to see.
///
/// Two equal queries describe the same result list; any difference means a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Free-text term as typed (possibly empty).
    pub text: Box<str>,
    /// Selected category; `None` means all.
    pub category: Option<CategoryId>,
    /// Active ordering.
    pub sort: SortKey,
    /// Vegetarian-only filter.
    pub veg_only: bool,
}

/// Which upstream operation serves a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRoute {
    /// Numeric text: direct identifier lookup.
    Lookup(ProductId),
    /// Plain category listing.
    Browse(CategoryId),
    /// Full-text search with optional tag clauses.
    Search,
}

impl Query {
    /// Trimmed search terms, if any.
    #[must_use]
    pub fn search_terms(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Identifier to look up when the text is numeric only.
    #[must_use]
    pub fn lookup_id(&self) -> Option<ProductId> {
        self.search_terms()
            .filter(|terms| is_all_digits(terms))
            .and_then(|terms| ProductId::parse(terms).ok())
    }

    /// Decide which upstream operation serves this query.
    ///
    /// Category browsing is used only for a bare category with no text, no
    /// vegetarian filter and a non-grade sort; everything else is a search.
    #[must_use]
    pub fn route(&self) -> QueryRoute {
        if let Some(id) = self.lookup_id() {
            return QueryRoute::Lookup(id);
        }
        match &self.category {
            Some(category)
                if self.search_terms().is_none()
                    && !self.veg_only
                    && self.sort != SortKey::Grade =>
            {
                QueryRoute::Browse(category.clone())
            },
            _ => QueryRoute::Search,
        }
    }

    /// Copy with different text.
    #[must_use]
    pub fn with_text(&self, text: impl Into<Box<str>>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    /// Copy with a different category selection.
    #[must_use]
    pub fn with_category(&self, category: Option<CategoryId>) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }

    /// Copy with a different sort key.
    #[must_use]
    pub fn with_sort(&self, sort: SortKey) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    /// Copy with a different vegetarian filter.
    #[must_use]
    pub fn with_veg_only(&self, veg_only: bool) -> Self {
        Self {
            veg_only,
            ..self.clone()
        }
    }
}

/// (Query, page, page size). Built at fetch time, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Query being paged.
    pub query: Query,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
}

impl PageRequest {
    /// Build a validated page request.
    pub fn new(query: Query, page: u32, page_size: u32) -> Result<Self, PrimitiveError> {
        if page == 0 {
            return Err(PrimitiveError::InvalidPage { page });
        }
        if page_size == 0 {
            return Err(PrimitiveError::InvalidPageSize { page_size });
        }
        Ok(Self {
            query,
            page,
            page_size,
        })
    }

    /// Returns true for the first page of a query.
    #[must_use]
    pub const fn is_first_page(&self) -> bool {
        self.page == 1
    }
}

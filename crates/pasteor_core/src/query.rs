//! Canonical filter/sort/pagination state for paste list views.
//!
//! The controller owns the one authoritative [`Query`]; transient input-field
//! values live in the frontend. Mutators report whether the canonical query
//! changed so the session worker can treat `true` as its refetch trigger.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::paste::normalize_language_filter;

/// Items per page for owner-scoped listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Sort orders understood by the listing API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Views,
    Title,
}

impl SortKey {
    /// Wire value sent as the `sortBy` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Views => "views",
            SortKey::Title => "title",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "views" => Ok(SortKey::Views),
            "title" => Ok(SortKey::Title),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

/// Canonical query state for the owner-scoped listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Trimmed search text; empty means no filter.
    pub search: String,
    /// Normalized language tag; `None` is the "all" sentinel.
    pub language: Option<String>,
    pub sort: SortKey,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            search: String::new(),
            language: None,
            sort: SortKey::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Owns the canonical query and enforces the page-reset invariant.
///
/// Every canonical change advances `generation` exactly once, so observers
/// can tell real transitions from no-op mutator calls.
#[derive(Debug, Default)]
pub struct QueryController {
    query: Query,
    generation: u64,
}

impl QueryController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump(&mut self) -> bool {
        self.generation += 1;
        true
    }

    /// Update the search filter. Resets `page` to 1 per the filter invariant.
    pub fn set_search(&mut self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed == self.query.search && self.query.page == 1 {
            return false;
        }
        self.query.search = trimmed.to_string();
        self.query.page = 1;
        self.bump()
    }

    /// Update the language filter. Resets `page` to 1 per the filter invariant.
    pub fn set_language(&mut self, language: Option<&str>) -> bool {
        let normalized = normalize_language_filter(language);
        if normalized == self.query.language && self.query.page == 1 {
            return false;
        }
        self.query.language = normalized;
        self.query.page = 1;
        self.bump()
    }

    /// Update the sort order. Resets `page` to 1 per the filter invariant.
    pub fn set_sort(&mut self, sort: SortKey) -> bool {
        if sort == self.query.sort && self.query.page == 1 {
            return false;
        }
        self.query.sort = sort;
        self.query.page = 1;
        self.bump()
    }

    /// Set the page only; filters and sort are untouched. Callers clamp `page`
    /// to `[1, total_pages]` before calling.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if page == self.query.page {
            return false;
        }
        self.query.page = page;
        self.bump()
    }

    /// Restore all fields to defaults as one atomic transition.
    pub fn reset_filters(&mut self) -> bool {
        let defaults = Query::default();
        if self.query == defaults {
            return false;
        }
        self.query = defaults;
        self.bump()
    }

    /// Pull the page back into range after a refetch shrank `total_pages`.
    pub fn clamp_page(&mut self, total_pages: u32) -> bool {
        let last = total_pages.max(1);
        if self.query.page <= last {
            return false;
        }
        self.query.page = last;
        self.bump()
    }
}

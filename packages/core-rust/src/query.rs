//! Query options accepted by list endpoints, and the page metadata returned
//! with every listing.
//!
//! Option parsing never fails: unknown keys are ignored, unrecognized sort
//! directions are dropped, and non-positive or non-numeric `page`/`length`
//! fall back to their defaults.

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LENGTH: u32 = 10;

/// Sort direction for ordering. Parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid direction `{raw}`")))
    }
}

/// Search, order and pagination options for one listing.
///
/// `search` and `order` keep the order in which the caller supplied them;
/// order pairs form a compound sort key from left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryOptions {
    pub search: Vec<(String, String)>,
    pub order: Vec<(String, SortDirection)>,
    pub page: u32,
    pub length: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            search: Vec::new(),
            order: Vec::new(),
            page: DEFAULT_PAGE,
            length: DEFAULT_LENGTH,
        }
    }
}

impl QueryOptions {
    /// Builds options from flat request parameters such as
    /// `search[name]=Search`, `order[name]=desc`, `page=2`, `length=4`.
    ///
    /// A repeated key replaces the earlier value in place.
    pub fn from_params<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();
        for (key, value) in params {
            if let Some(field) = bracketed(key, "search") {
                upsert(&mut options.search, field, value.to_string());
            } else if let Some(field) = bracketed(key, "order") {
                if let Some(direction) = SortDirection::parse(value) {
                    upsert(&mut options.order, field, direction);
                }
            } else if key == "page" {
                options.page = coerce_positive(value, DEFAULT_PAGE);
            } else if key == "length" {
                options.length = coerce_positive(value, DEFAULT_LENGTH);
            }
        }
        options
    }

    #[must_use]
    pub fn with_search(mut self, field: &str, value: &str) -> Self {
        upsert(&mut self.search, field, value.to_string());
        self
    }

    #[must_use]
    pub fn with_order(mut self, field: &str, direction: SortDirection) -> Self {
        upsert(&mut self.order, field, direction);
        self
    }

    /// Sets page and length, substituting defaults for zero.
    #[must_use]
    pub fn with_page(mut self, page: u32, length: u32) -> Self {
        self.page = if page == 0 { DEFAULT_PAGE } else { page };
        self.length = if length == 0 { DEFAULT_LENGTH } else { length };
        self
    }

    /// Number of records skipped before the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.length)
    }
}

/// Extracts `field` from `prefix[field]`.
fn bracketed<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix)?
        .strip_prefix('[')?
        .strip_suffix(']')
        .filter(|field| !field.is_empty())
}

fn upsert<T>(pairs: &mut Vec<(String, T)>, field: &str, value: T) {
    if let Some(slot) = pairs.iter_mut().find(|(f, _)| f == field) {
        slot.1 = value;
    } else {
        pairs.push((field.to_string(), value));
    }
}

fn coerce_positive(raw: &str, default: u32) -> u32 {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .map_or(default, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

/// Page metadata rendered next to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub length: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    /// `total_pages = ceil(total / length)`, which is 0 for an empty set.
    #[must_use]
    pub fn new(page: u32, length: u32, total: u64) -> Self {
        let length = length.max(1);
        Self {
            page,
            length,
            total,
            total_pages: total.div_ceil(u64::from(length)),
        }
    }
}

/// One page of records plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<E> {
    pub records: Vec<E>,
    pub pagination: Pagination,
}

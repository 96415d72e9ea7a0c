//! Listing results: pages, aggregated results and page parsers.
//!
//! A list endpoint answers with an envelope such as
//!
//! ```json
//! {"issues": [...], "total_count": 27, "offset": 0, "limit": 25}
//! ```
//!
//! [`JsonPageParser`] turns that envelope into a [`Page`]; the listing engine
//! folds pages into a [`ResultsWrapper`].

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::{Error, RawResponse, Result};

/// Server envelope field carrying the unpaged total.
pub const TOTAL_COUNT: &str = "total_count";

/// A resource with a logical identity, used to drop duplicates across pages.
pub trait Identifiable {
    /// Identity type.
    type Id: Eq + Hash + Clone;

    /// Identity of this resource; `None` for resources without one, which are
    /// never treated as duplicates.
    fn identity(&self) -> Option<Self::Id>;
}

/// One server response to a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Elements of this page, in server order.
    pub items: Vec<T>,
    /// Total reported by the server for the unpaged query.
    pub total_count: Option<usize>,
    /// Offset echoed by the server.
    pub offset: Option<usize>,
    /// Limit echoed by the server.
    pub limit: Option<usize>,
}

impl<T> Page<T> {
    /// A page with items only.
    #[must_use]
    pub const fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total_count: None,
            offset: None,
            limit: None,
        }
    }

    /// Sets the reported total.
    #[must_use]
    pub fn with_total(mut self, total_count: usize) -> Self {
        self.total_count = Some(total_count);
        self
    }
}

/// Parses a decoded response body into a [`Page`].
pub trait PageParser<T>: Send + Sync {
    /// Parses one page.
    ///
    /// # Errors
    ///
    /// Returns a format error if the body does not have the expected shape.
    fn parse_page(&self, response: &RawResponse) -> Result<Page<T>>;
}

impl<T, F> PageParser<T> for F
where
    F: Fn(&RawResponse) -> Result<Page<T>> + Send + Sync,
{
    fn parse_page(&self, response: &RawResponse) -> Result<Page<T>> {
        self(response)
    }
}

/// Parses the standard JSON list envelope, reading elements under `key`.
pub struct JsonPageParser<T> {
    key: String,
    _element: PhantomData<fn() -> T>,
}

impl<T> JsonPageParser<T> {
    /// Parser for elements stored under `key` (e.g. `"issues"`).
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            _element: PhantomData,
        }
    }

    /// Envelope key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T> Clone for JsonPageParser<T> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone())
    }
}

impl<T> fmt::Debug for JsonPageParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonPageParser")
            .field("key", &self.key)
            .finish()
    }
}

fn count_field(envelope: &serde_json::Map<String, serde_json::Value>, name: &str) -> Result<Option<usize>> {
    match envelope.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| Error::format(format!("{name}: expected a non-negative integer, got {value}"))),
    }
}

impl<T: DeserializeOwned> PageParser<T> for JsonPageParser<T> {
    fn parse_page(&self, response: &RawResponse) -> Result<Page<T>> {
        let mut envelope: serde_json::Map<String, serde_json::Value> = response.json()?;
        let items = envelope
            .remove(&self.key)
            .ok_or_else(|| Error::format(format!("missing list field '{}'", self.key)))?;

        Ok(Page {
            items: crate::from_json_value(&self.key, items)?,
            total_count: count_field(&envelope, TOTAL_COUNT)?,
            offset: count_field(&envelope, crate::OFFSET)?,
            limit: count_field(&envelope, crate::LIMIT)?,
        })
    }
}

/// Outcome of a listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsWrapper<T> {
    results: Vec<T>,
    total_count: usize,
    limit_on_server: Option<usize>,
    offset_on_server: Option<usize>,
}

impl<T> ResultsWrapper<T> {
    /// Creates a wrapper.
    #[must_use]
    pub const fn new(
        results: Vec<T>,
        total_count: usize,
        limit_on_server: Option<usize>,
        offset_on_server: Option<usize>,
    ) -> Self {
        Self {
            results,
            total_count,
            limit_on_server,
            offset_on_server,
        }
    }

    /// Wraps a single page verbatim; a missing total becomes the page length.
    #[must_use]
    pub fn from_page(page: Page<T>) -> Self {
        let total_count = page.total_count.unwrap_or(page.items.len());
        Self::new(page.items, total_count, page.limit, page.offset)
    }

    /// Results in order.
    #[must_use]
    pub fn results(&self) -> &[T] {
        &self.results
    }

    /// Takes the results.
    #[must_use]
    pub fn into_results(self) -> Vec<T> {
        self.results
    }

    /// Total reported by the server for the unpaged query.
    ///
    /// This may differ from [`ResultsWrapper::results_number`].
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.total_count
    }

    /// Limit echoed by the server, if any.
    #[must_use]
    pub const fn limit_on_server(&self) -> Option<usize> {
        self.limit_on_server
    }

    /// Offset echoed by the server, if any.
    #[must_use]
    pub const fn offset_on_server(&self) -> Option<usize> {
        self.offset_on_server
    }

    /// Returns `true` if at least one result was returned.
    #[must_use]
    pub fn has_some_results(&self) -> bool {
        !self.results.is_empty()
    }

    /// Number of results held.
    #[must_use]
    pub fn results_number(&self) -> usize {
        self.results.len()
    }
}

impl<T> IntoIterator for ResultsWrapper<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

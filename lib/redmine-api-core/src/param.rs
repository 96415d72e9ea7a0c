//! Request parameters attached to a call as a query string.
//!
//! A [`RequestParams`] set deduplicates identical `(name, value)` pairs but
//! keeps distinct values that share a name, so repeated filters such as
//! `f[]=subject&f[]=author_id` survive intact.
//!
//! # Example
//!
//! ```
//! use redmine_api_core::Params;
//!
//! let params = Params::new()
//!     .add("set_filter", "1")
//!     .add("f[]", "subject")
//!     .add("f[]", "author_id")
//!     .add("f[]", "subject")
//!     .build()
//!     .expect("valid parameters");
//!
//! assert_eq!(params.len(), 3);
//! assert_eq!(params.values("f[]").count(), 2);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use crate::{Error, Result};

/// Query parameter name used for the page size.
pub const LIMIT: &str = "limit";

/// Query parameter name used for the page start.
pub const OFFSET: &str = "offset";

/// An immutable `(name, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestParam {
    name: String,
    value: String,
}

impl RequestParam {
    /// Creates a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if `name` is empty.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::internal("request parameter name may not be empty"));
        }
        Ok(Self {
            name,
            value: value.into(),
        })
    }

    /// Creates a parameter from values that may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if either part is missing or the
    /// name is empty.
    pub fn from_optional<N, V>(name: Option<N>, value: Option<V>) -> Result<Self>
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.ok_or_else(|| Error::internal("request parameter name may not be null"))?;
        let name = name.into();
        let value = value.ok_or_else(|| {
            Error::internal(format!("value of request parameter '{name}' may not be null"))
        })?;
        Self::new(name, value)
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for RequestParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// The set of parameters attached to one logical call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    params: BTreeSet<RequestParam>,
}

impl RequestParams {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from pairs whose values may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] on the first missing value or empty
    /// name.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(name, value)| RequestParam::from_optional(Some(name), value))
            .collect()
    }

    /// Inserts a parameter; returns `false` if the identical pair was present.
    pub fn insert(&mut self, param: RequestParam) -> bool {
        self.params.insert(param)
    }

    /// Returns the set with `param` added.
    #[must_use]
    pub fn with(mut self, param: RequestParam) -> Self {
        self.params.insert(param);
        self
    }

    /// Number of distinct pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if the set holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns `true` if any parameter has this name.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    /// All values recorded under `name`.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params
            .iter()
            .filter(move |p| p.name == name)
            .map(RequestParam::value)
    }

    /// Iterates over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = &RequestParam> {
        self.params.iter()
    }
}

impl FromIterator<RequestParam> for RequestParams {
    fn from_iter<T: IntoIterator<Item = RequestParam>>(iter: T) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl Extend<RequestParam> for RequestParams {
    fn extend<T: IntoIterator<Item = RequestParam>>(&mut self, iter: T) {
        self.params.extend(iter);
    }
}

impl<'a> IntoIterator for &'a RequestParams {
    type Item = &'a RequestParam;
    type IntoIter = std::collections::btree_set::Iter<'a, RequestParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Fluent builder for [`RequestParams`].
///
/// Validation is deferred to [`Params::build`], which runs before any
/// request is sent.
#[derive(Debug, Clone, Default)]
pub struct Params {
    entries: Vec<(String, Option<String>)>,
}

impl Params {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    #[must_use]
    pub fn add(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((name.into(), Some(value.into())));
        self
    }

    /// Adds a parameter whose value may be missing; a missing value fails
    /// the build.
    #[must_use]
    pub fn add_optional(mut self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.entries.push((name.into(), value.map(Into::into)));
        self
    }

    /// Validates the entries and produces the parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if any entry has an empty name or a
    /// missing value.
    pub fn build(self) -> Result<RequestParams> {
        RequestParams::from_pairs(self.entries)
    }
}

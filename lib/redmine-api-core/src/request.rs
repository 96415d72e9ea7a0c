//! HTTP request building.
//!
//! Use [`Request::builder`] to construct requests with headers, query parameters, and bodies.
//! Header names are stored lowercased, so lookups are case-insensitive.
//!
//! # Example
//!
//! ```
//! use redmine_api_core::{Method, Params, Request};
//! use bytes::Bytes;
//!
//! let params = Params::new().add("project_id", "7").build().expect("params");
//! let request = Request::<Bytes>::builder(
//!     Method::Get,
//!     "https://redmine.example.com/issues.json".parse().expect("url"),
//! )
//! .header("Accept", "application/json")
//! .query_params(&params)
//! .build();
//!
//! assert_eq!(request.header("accept"), Some("application/json"));
//! assert_eq!(request.target(), "https://redmine.example.com/issues.json");
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::{Method, RequestParams};

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
}

impl<B> Request<B> {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL, including the query string.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Scheme, host, port and path of the URL, without query or fragment.
    ///
    /// Safe to log: query parameters may carry credentials.
    #[must_use]
    pub fn target(&self) -> String {
        let mut target = self.url.clone();
        target.set_query(None);
        target.set_fragment(None);
        let _ = target.set_password(None);
        let _ = target.set_username("");
        target.into()
    }

    /// Request headers (lowercased names).
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Sets a header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Removes a header, returning its value.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&name.to_ascii_lowercase())
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HashMap<String, String>, Option<B>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Appends a query parameter to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Appends every parameter of the set to the URL.
    #[must_use]
    pub fn query_params(mut self, params: &RequestParams) -> Self {
        if params.is_empty() {
            return self;
        }
        {
            let mut query = self.url.query_pairs_mut();
            for param in params {
                query.append_pair(param.name(), param.value());
            }
        }
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl RequestBuilder<Bytes> {
    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns a format error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self
            .header("Content-Type", "application/json; charset=utf-8")
            .body(body))
    }
}

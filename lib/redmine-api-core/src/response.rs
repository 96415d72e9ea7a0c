//! HTTP response handling.
//!
//! [`Response`] is what the network returns: status, headers and the body as
//! it arrived on the wire (possibly compressed). [`RawResponse`] is the same
//! exchange after transport decoding: status, decoded body and the charset
//! needed to turn that body into text.

use std::collections::HashMap;

use bytes::Bytes;

use crate::{Charset, Error, Result};

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response. Header names are lowercased.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
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

    /// The declared `Content-Encoding`, if any.
    #[must_use]
    pub fn content_encoding(&self) -> Option<&str> {
        self.header("content-encoding")
    }

    /// The `charset` parameter of `Content-Type`, if any.
    ///
    /// This is independent of [`Response::content_encoding`].
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.header("content-type")?
            .split(';')
            .skip(1)
            .filter_map(|part| part.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.trim().trim_matches('"'))
            .filter(|value| !value.is_empty())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, B) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// A transport-decoded response, consumed once by a content handler.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: u16,
    body: Bytes,
    charset: String,
}

impl RawResponse {
    /// Creates a decoded response.
    #[must_use]
    pub fn new(status: u16, body: Bytes, charset: impl Into<String>) -> Self {
        Self {
            status,
            body,
            charset: charset.into(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Decoded body bytes (never absent; empty when the server sent none).
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Charset label used to turn the body into text.
    #[must_use]
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body into text using [`RawResponse::charset`].
    ///
    /// # Errors
    ///
    /// Returns a format error if the charset is unknown or the bytes are not
    /// valid in it.
    pub fn text(&self) -> Result<String> {
        let charset: Charset = self
            .charset
            .parse()
            .map_err(|_| Error::format(format!("unsupported response charset {}", self.charset)))?;
        charset.decode(&self.body).ok_or_else(|| {
            Error::format(format!("response body is not valid {}", charset.name()))
        })
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a format error naming the failing field path.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        crate::from_json(self.text()?.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = Response::new(
            200,
            headers(&[("Content-Encoding", "gzip")]),
            Bytes::new(),
        );

        assert_eq!(response.header("content-encoding"), Some("gzip"));
        assert_eq!(response.content_encoding(), Some("gzip"));
        assert!(response.is_success());
    }

    #[test]
    fn charset_is_read_from_content_type() {
        let response = Response::new(
            200,
            headers(&[("Content-Type", "application/json; charset=\"ISO-8859-1\"")]),
            Bytes::new(),
        );
        assert_eq!(response.charset(), Some("ISO-8859-1"));

        let response = Response::new(
            200,
            headers(&[("Content-Type", "application/json")]),
            Bytes::new(),
        );
        assert_eq!(response.charset(), None);
    }

    #[test]
    fn charset_and_encoding_are_independent() {
        let response = Response::new(
            200,
            headers(&[
                ("Content-Type", "application/json; charset=utf-8"),
                ("Content-Encoding", "deflate"),
            ]),
            Bytes::new(),
        );

        assert_eq!(response.charset(), Some("utf-8"));
        assert_eq!(response.content_encoding(), Some("deflate"));
    }

    #[test]
    fn raw_text_uses_charset() {
        let raw = RawResponse::new(200, Bytes::from_static(b"caf\xe9"), "ISO-8859-1");
        assert_eq!(raw.text().expect("latin1"), "café");

        let raw = RawResponse::new(200, Bytes::from_static(b"caf\xe9"), "UTF-8");
        assert!(raw.text().is_err_and(|e| e.is_format()));

        let raw = RawResponse::new(200, Bytes::from_static(b"x"), "KOI8-R");
        assert!(raw.text().is_err_and(|e| e.is_format()));
    }

    #[test]
    fn raw_json() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Status {
            id: u32,
            name: String,
        }

        let raw = RawResponse::new(200, Bytes::from(r#"{"id":1,"name":"New"}"#), "UTF-8");
        let status: Status = raw.json().expect("json");
        assert_eq!(
            status,
            Status {
                id: 1,
                name: "New".to_string()
            }
        );
    }
}

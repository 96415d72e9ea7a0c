//! Core types and traits for the Redmine REST client.
//!
//! This crate is transport-agnostic:
//! - [`Method`], [`Request`], [`Response`] and [`RawResponse`] - HTTP exchange types
//! - [`RequestParam`], [`RequestParams`] and [`Params`] - query parameters
//! - [`ContentHandler`] and [`compose`] - typed transforms over responses
//! - [`TransportEncoding`] and [`TransportDecoder`] - body decompression
//! - [`ErrorClassifier`] - status and error-body classification
//! - [`Page`], [`ResultsWrapper`] and [`PageParser`] - listing results
//! - [`HttpClient`] - the network execution seam
//! - [`Error`] and [`Result`] - error handling

mod body;
mod classify;
mod client;
mod codec;
mod error;
mod handler;
mod method;
mod param;
pub mod prelude;
mod request;
mod response;
mod results;

pub use body::{from_json, from_json_value, to_json};
pub use classify::{ErrorBodyDecoder, ErrorClassifier, JsonErrorDecoder, REQUEST_TOO_LARGE};
pub use client::HttpClient;
pub use codec::{Charset, DEFAULT_CHARSET, TransportDecoder, TransportEncoding, decode};
pub use error::{Error, ErrorKind, Result};
pub use handler::{Compose, ContentHandler, ContentHandlerExt, compose};
pub use method::Method;
pub use param::{LIMIT, OFFSET, Params, RequestParam, RequestParams};
pub use request::{Request, RequestBuilder};
pub use response::{RawResponse, Response};
pub use results::{Identifiable, JsonPageParser, Page, PageParser, ResultsWrapper, TOTAL_COUNT};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};

//! Async client for the Redmine REST API.
//!
//! A [`Transport`] owns one [`CommunicatorChain`]: the hyper base link,
//! credential injection and optional logging, all tower layers, with
//! transport decoding and error classification in front of every response
//! handler. On top of it sit single-object operations and the object listing
//! engine, which turns one "list" call into as many page requests as needed.
//!
//! # Example
//!
//! ```ignore
//! use redmine_api::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! struct Issue {
//!     id: u64,
//!     subject: String,
//! }
//!
//! impl Identifiable for Issue {
//!     type Id = u64;
//!
//!     fn identity(&self) -> Option<u64> {
//!         Some(self.id)
//!     }
//! }
//!
//! let transport = Transport::with_user_auth("https://redmine.example.com", "alice", "secret")?;
//! let params = Params::new().add("project_id", "7").add("status_id", "open").build()?;
//! let issues = transport
//!     .get_objects_list("issues.json", &params, &JsonPageParser::<Issue>::new("issues"))
//!     .await?;
//! println!("{} of {} issues", issues.results_number(), issues.total_count());
//! ```

mod client;
pub mod comm;
mod config;
mod connector;
mod listing;
pub mod middleware;
pub mod prelude;
mod transport;

pub use client::HyperClient;
pub use comm::{ChainBuilder, Communicator, CommunicatorChain, Fmap};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_MAX_PAGES, DEFAULT_OBJECTS_PER_PAGE};
pub use listing::DirectObjectsSearcher;
pub use middleware::{AuthHandle, Credentials};
pub use transport::{Transport, TransportBuilder};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use redmine_api_core::{
    Charset, ContentHandler, ContentHandlerExt, DEFAULT_CHARSET, Error, ErrorBodyDecoder,
    ErrorClassifier, ErrorKind, HttpClient, Identifiable, JsonErrorDecoder, JsonPageParser, LIMIT,
    Method, OFFSET, Page, PageParser, Params, REQUEST_TOO_LARGE, RawResponse, Request,
    RequestBuilder, RequestParam, RequestParams, Response, Result, ResultsWrapper, TOTAL_COUNT,
    TransportDecoder, TransportEncoding, compose, from_json, from_json_value, to_json,
};

// Re-export http types for status codes and headers
pub use redmine_api_core::{StatusCode, header};

pub use url;

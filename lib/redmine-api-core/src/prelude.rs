//! Prelude module for convenient imports.
//!
//! ```ignore
//! use redmine_api_core::prelude::*;
//! ```

pub use crate::{
    ContentHandler, ContentHandlerExt, Error, ErrorKind, HttpClient, Identifiable, JsonPageParser,
    Method, Page, PageParser, Params, RawResponse, Request, RequestBuilder, RequestParams,
    Response, Result, ResultsWrapper, from_json, to_json,
};

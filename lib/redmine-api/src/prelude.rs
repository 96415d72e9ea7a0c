//! Prelude module for convenient imports.
//!
//! ```ignore
//! use redmine_api::prelude::*;
//! ```

pub use crate::{
    ClientConfig, Credentials, DirectObjectsSearcher, Error, ErrorKind, Identifiable,
    JsonPageParser, Page, PageParser, Params, RawResponse, RequestParams, Result, ResultsWrapper,
    Transport,
};
pub use serde::{Deserialize, Serialize};

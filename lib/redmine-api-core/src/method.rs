//! HTTP method types.

use derive_more::Display;

/// HTTP request method used by the Redmine REST interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// Read a resource or a collection.
    #[display("GET")]
    Get,
    /// Create a resource.
    #[display("POST")]
    Post,
    /// Update a resource.
    #[display("PUT")]
    Put,
    /// Delete a resource.
    #[display("DELETE")]
    Delete,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

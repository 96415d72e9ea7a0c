//! Tower middleware layers for the communicator chain.
//!
//! - [`AuthLayer`] - injects the credentials and impersonation header held by
//!   an [`AuthHandle`]
//! - [`LoggingLayer`] - logs requests/responses using `tracing`
//!
//! Any other `tower::Layer` over the chain's request/response types can be
//! added with [`ChainBuilder::layer`](crate::ChainBuilder::layer).

mod auth;
mod logging;

pub use auth::{
    API_KEY_HEADER, AUTHORIZATION_HEADER, AuthHandle, AuthLayer, Authenticator, Credentials,
    SWITCH_USER_HEADER,
};
pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};

//! HTTP execution trait.
//!
//! [`HttpClient`] is the seam between the communicator chain and the network.
//! The runtime crate provides a hyper-based implementation; tests plug in
//! simulated transports.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Executes one HTTP exchange.
///
/// Implementations must read the response body fully and release the
/// underlying connection before the returned future completes, on success
/// and on failure.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns a transport error naming the request target if the exchange
    /// fails (connection refused, TLS failure, timeout, truncated body).
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).execute(request)
    }
}

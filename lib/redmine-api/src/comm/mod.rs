//! The communicator chain.
//!
//! A [`Communicator`] executes one request and hands the response to a
//! caller-supplied [`ContentHandler`]. Cross-cutting behavior is layered on
//! as tower middleware inside [`CommunicatorChain`]; [`Fmap`] inserts a
//! response transform (such as transport decoding) in front of every
//! handler.

use std::future::Future;

use bytes::Bytes;

use crate::{ContentHandler, Request, Result};

mod chain;
mod fmap;

pub use chain::{BaseLink, BoxedService, ChainBuilder, CommunicatorChain, ServiceFuture};
pub use fmap::Fmap;

/// Sends requests and processes responses of type `K`.
pub trait Communicator<K>: Send + Sync {
    /// Executes `request` and runs `handler` over the response.
    ///
    /// The response is released before the future completes, whether the
    /// handler succeeds or fails.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the exchange fails, or whatever error the
    /// handler produces. Response statuses are not interpreted here.
    fn send<R, H>(
        &self,
        request: Request<Bytes>,
        handler: H,
    ) -> impl Future<Output = Result<R>> + Send
    where
        H: ContentHandler<K, R>,
        R: Send;
}

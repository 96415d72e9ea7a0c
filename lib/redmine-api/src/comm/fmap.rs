use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use bytes::Bytes;

use super::Communicator;
use crate::{ContentHandler, Request, Result, compose};

/// A communicator that runs `handler` over its peer's responses before the
/// caller's handler sees them.
///
/// `Fmap<C, H, I>` turns a `Communicator<I>` into a `Communicator<K>` for any
/// `H: ContentHandler<I, K>`, so neither side needs to know the other's types.
pub struct Fmap<C, H, I> {
    peer: C,
    handler: H,
    _input: PhantomData<fn(I) -> I>,
}

impl<C, H, I> Fmap<C, H, I> {
    /// Wraps `peer`, mapping its responses through `handler`.
    pub const fn new(peer: C, handler: H) -> Self {
        Self {
            peer,
            handler,
            _input: PhantomData,
        }
    }

    /// The wrapped communicator.
    pub const fn peer(&self) -> &C {
        &self.peer
    }
}

impl<C: Clone, H: Clone, I> Clone for Fmap<C, H, I> {
    fn clone(&self) -> Self {
        Self::new(self.peer.clone(), self.handler.clone())
    }
}

impl<C: fmt::Debug, H: fmt::Debug, I> fmt::Debug for Fmap<C, H, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fmap")
            .field("peer", &self.peer)
            .field("handler", &self.handler)
            .finish()
    }
}

impl<C, H, I, K> Communicator<K> for Fmap<C, H, I>
where
    C: Communicator<I>,
    H: ContentHandler<I, K> + Clone,
{
    fn send<R, N>(
        &self,
        request: Request<Bytes>,
        handler: N,
    ) -> impl Future<Output = Result<R>> + Send
    where
        N: ContentHandler<K, R>,
        R: Send,
    {
        self.peer
            .send(request, compose(self.handler.clone(), handler))
    }
}

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use bytes::Bytes;
use http::header::ACCEPT_ENCODING;
use tower::util::BoxCloneService;
use tower::{Layer, ServiceExt};
use tower_service::Service;

use super::Communicator;
use crate::middleware::{AuthHandle, AuthLayer, LoggingLayer};
use crate::{ContentHandler, Error, HttpClient, Request, Response, Result};

/// Type-erased link of the chain.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

/// Future returned by chain links.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

type LayerFn = Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>;

/// Innermost link: performs the network exchange and asks for gzip bodies.
pub struct BaseLink<C> {
    client: Arc<C>,
}

impl<C> BaseLink<C> {
    /// Wraps an HTTP client.
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl<C> Clone for BaseLink<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C> Service<Request<Bytes>> for BaseLink<C>
where
    C: HttpClient + 'static,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        request.set_header(ACCEPT_ENCODING.as_str(), "gzip");
        let client = Arc::clone(&self.client);
        Box::pin(async move { client.execute(request).await })
    }
}

/// Makes a [`BoxedService`] shareable across threads.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request<Bytes>) -> ServiceFuture {
        // The lock is held only for the clone.
        let service = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        Box::pin(service.oneshot(request))
    }
}

/// The assembled chain: base link wrapped by every configured layer.
///
/// Built once and reused for every call; cloning shares the same links.
#[derive(Clone)]
pub struct CommunicatorChain {
    service: SyncService,
}

impl std::fmt::Debug for CommunicatorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommunicatorChain").finish_non_exhaustive()
    }
}

impl CommunicatorChain {
    /// Create a new chain builder.
    #[must_use]
    pub fn builder() -> ChainBuilder {
        ChainBuilder::default()
    }

    /// Executes the request through every link and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the exchange fails.
    pub fn execute(&self, request: Request<Bytes>) -> ServiceFuture {
        self.service.call(request)
    }
}

impl Communicator<Response<Bytes>> for CommunicatorChain {
    async fn send<R, H>(&self, request: Request<Bytes>, handler: H) -> Result<R>
    where
        H: ContentHandler<Response<Bytes>, R>,
        R: Send,
    {
        let response = self.execute(request).await?;
        handler.process(response)
    }
}

/// Builder for [`CommunicatorChain`].
///
/// Each added layer wraps the chain built so far, so the first one added sits
/// closest to the network and the last one sees requests first.
#[derive(Default)]
pub struct ChainBuilder {
    layers: Vec<LayerFn>,
}

impl std::fmt::Debug for ChainBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl ChainBuilder {
    /// Add a Tower layer to the chain.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Add credential injection backed by `auth`.
    #[must_use]
    pub fn with_auth(self, auth: AuthHandle) -> Self {
        self.layer(AuthLayer::new(auth))
    }

    /// Add request/response logging.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Add debug-level logging (includes redacted headers).
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Appends the layers of `other` after the ones already added.
    #[must_use]
    pub fn append(mut self, other: Self) -> Self {
        self.layers.extend(other.layers);
        self
    }

    /// Builds the chain on top of an HTTP client.
    #[must_use]
    pub fn build<C: HttpClient + 'static>(self, client: C) -> CommunicatorChain {
        self.build_on(BoxCloneService::new(BaseLink::new(client)))
    }

    /// Builds the chain on top of an already erased base service.
    #[must_use]
    pub fn build_on(self, base: BoxedService) -> CommunicatorChain {
        let service = self
            .layers
            .into_iter()
            .fold(base, |service, layer_fn| layer_fn(service));

        CommunicatorChain {
            service: SyncService::new(service),
        }
    }
}

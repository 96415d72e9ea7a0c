//! Request/response logging middleware.
//!
//! Logs the request target (never the query string, which may carry
//! credentials) and, at debug level, headers with secret values redacted.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

use super::auth::{API_KEY_HEADER, AUTHORIZATION_HEADER};
use crate::{Error, Request, Response, Result};

const REDACTED: &str = "<redacted>";

/// Layer that adds request/response logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Log level for the logging middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level (request/response details).
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

impl LoggingLayer {
    /// Create a new logging layer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging layer that logs at debug level.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// The configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs requests and responses.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

/// Header map safe to log: secret values replaced.
fn redacted_headers<B>(request: &Request<B>) -> BTreeMap<&str, &str> {
    request
        .headers()
        .iter()
        .map(|(name, value)| {
            let secret = name.eq_ignore_ascii_case(AUTHORIZATION_HEADER)
                || name.eq_ignore_ascii_case(API_KEY_HEADER);
            (name.as_str(), if secret { REDACTED } else { value.as_str() })
        })
        .collect()
}

impl<S> Service<Request<Bytes>> for Logging<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>,
    S::Future: Send + 'static,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let method = request.method();
        let target = request.target();

        let span = span!(Level::INFO, "redmine_request", %method, %target);
        span.in_scope(|| match self.level {
            LogLevel::Debug => {
                debug!(headers = ?redacted_headers(&request), "sending request");
            }
            LogLevel::Info => info!("sending request"),
        });

        let start = Instant::now();
        let future = self.inner.call(request);
        Box::pin(
            async move {
                let result = future.await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) if response.status() < 400 => {
                        info!(status = response.status(), elapsed_ms, "request completed");
                    }
                    Ok(response) => {
                        warn!(status = response.status(), elapsed_ms, "server returned an error status");
                    }
                    Err(err) => {
                        warn!(error = %err, elapsed_ms, "request failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    #[test]
    fn logging_layer_levels() {
        assert_eq!(LoggingLayer::new().level(), LogLevel::Info);
        assert_eq!(LoggingLayer::debug().level(), LogLevel::Debug);
    }

    #[test]
    fn secrets_are_redacted() {
        let request = Request::<Bytes>::builder(
            Method::Get,
            "http://redmine.local/issues.json".parse().expect("url"),
        )
        .header("Authorization", "Basic YWxpY2U6c2VjcmV0")
        .header(API_KEY_HEADER, "abc123")
        .header("Accept", "application/json")
        .build();

        let headers = redacted_headers(&request);
        assert_eq!(headers.get("authorization"), Some(&REDACTED));
        assert_eq!(headers.get("x-redmine-api-key"), Some(&REDACTED));
        assert_eq!(headers.get("accept"), Some(&"application/json"));
    }
}

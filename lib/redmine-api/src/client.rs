//! HTTP client implementation using hyper-util.

use std::collections::HashMap;
use std::error::Error as StdError;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};

use crate::{ClientConfig, Error, HttpClient, Request, Response, Result, connector::https_connector};

/// Pooled HTTP/HTTPS client backed by hyper-util.
///
/// Every exchange reads the response body to the end before returning, so the
/// connection goes back to the pool on success and on failure.
#[derive(Clone)]
pub struct HyperClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Create a new client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(&config));

        Self { inner, config }
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_hyper_request(request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
        let target = request.target();
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(body.map_or_else(Full::default, Full::new))
            .map_err(|e| Error::internal(format!("cannot build request for {target}: {e}")))
    }

    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for HyperClient {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let target = request.target();
        let hyper_request = Self::build_hyper_request(request)?;

        let response = tokio::time::timeout(self.config.timeout, self.inner.request(hyper_request))
            .await
            .map_err(|_| {
                Error::transport_at(
                    &target,
                    format!("timed out after {}s", self.config.timeout.as_secs_f32()),
                )
            })?
            .map_err(|e| exchange_error(&target, e))?;

        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| exchange_error(&target, e))?
            .to_bytes();

        Ok(Response::new(status, headers, body))
    }
}

/// Maps a failed exchange: a reply that is not valid HTTP is a format error,
/// anything else a transport error naming `target`.
fn exchange_error<E>(target: &str, err: E) -> Error
where
    E: StdError + 'static,
{
    let mut cause: Option<&(dyn StdError + 'static)> = Some(&err);
    while let Some(current) = cause {
        if let Some(hyper_err) = current.downcast_ref::<hyper::Error>()
            && (hyper_err.is_parse() || hyper_err.is_parse_status())
        {
            return Error::format(format!("malformed HTTP response from {target}: {hyper_err}"));
        }
        cause = current.source();
    }
    Error::transport_at(target, err)
}

//! The `Transport` facade: one configured chain plus the server base URL.
//!
//! # Example
//!
//! ```ignore
//! use redmine_api::{JsonPageParser, Params, Transport};
//!
//! let transport = Transport::with_api_key("https://redmine.example.com", "0123abcd")?;
//! let params = Params::new().add("project_id", "7").build()?;
//! let issues = transport
//!     .get_objects_list("issues.json", &params, &JsonPageParser::<Issue>::new("issues"))
//!     .await?;
//! ```

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;
use url::Url;

use crate::comm::{BaseLink, BoxedService, ChainBuilder, Communicator, CommunicatorChain, Fmap};
use crate::middleware::{AuthHandle, Credentials, LoggingLayer};
use crate::{
    Charset, ClientConfig, ContentHandler, Error, ErrorBodyDecoder,
    ErrorClassifier, HttpClient, HyperClient, Method, RawResponse, Request, RequestParams,
    Response, Result, TransportDecoder, compose,
};

type DecodingChain = Fmap<CommunicatorChain, TransportDecoder, Response<Bytes>>;

/// Entry point for talking to one Redmine server.
///
/// Cloning is cheap and clones share the chain, the connection pool and the
/// credential state.
#[derive(Debug, Clone)]
pub struct Transport {
    communicator: DecodingChain,
    base_url: Url,
    auth: AuthHandle,
    classifier: ErrorClassifier,
    config: ClientConfig,
}

impl Transport {
    /// Create a builder for the server at `uri`.
    #[must_use]
    pub fn builder(uri: impl Into<String>) -> TransportBuilder {
        TransportBuilder::new(uri)
    }

    /// Anonymous access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if `uri` is empty or invalid.
    pub fn unauthenticated(uri: impl Into<String>) -> Result<Self> {
        Self::builder(uri).build()
    }

    /// Access with an API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if `uri` is empty or invalid.
    pub fn with_api_key(uri: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::builder(uri)
            .credentials(Credentials::api_key(api_key))
            .build()
    }

    /// Access with login and password, encoded as UTF-8.
    ///
    /// Use [`Transport::builder`] with
    /// [`ClientConfig::auth_charset`](crate::ClientConfig) for another
    /// charset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if `uri` is empty or invalid.
    pub fn with_user_auth(
        uri: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(uri)
            .credentials(Credentials::basic(login, password))
            .build()
    }

    /// Access with login and password, encoded with the named charset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if `uri` is empty or invalid, the
    /// charset is unsupported, or the credentials cannot be encoded in it.
    pub fn with_user_auth_charset(
        uri: impl Into<String>,
        charset: &str,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let charset: Charset = charset.parse()?;
        Self::builder(uri)
            .credentials(Credentials::basic_with_charset(charset, login, password))
            .build()
    }

    /// Server base URL (always ends with `/`).
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Live credential state of the chain.
    #[must_use]
    pub const fn auth(&self) -> &AuthHandle {
        &self.auth
    }

    /// Replaces the credentials used by later requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if Basic credentials cannot be
    /// encoded in their charset.
    pub fn set_credentials(&self, credentials: &Credentials) -> Result<()> {
        self.auth.set(credentials)
    }

    /// Impersonates `login` on later requests, or stops when `None`.
    pub fn set_on_behalf_of_user(&self, login: Option<impl Into<String>>) {
        self.auth.set_on_behalf_of_user(login);
    }

    /// Resolves an endpoint path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if the result is not a valid URL.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Sends `request` and runs `handler` over the decoded response once the
    /// status has been classified.
    ///
    /// # Errors
    ///
    /// Returns the classified error for failed statuses, a transport error
    /// naming the request target for I/O failures, or the handler's error.
    pub async fn send<R, H>(&self, request: Request<Bytes>, handler: H) -> Result<R>
    where
        H: ContentHandler<RawResponse, R>,
        R: Send,
    {
        let target = request.target();
        let handler = compose::<RawResponse, RawResponse, R, _, _>(self.classifier.clone(), handler);
        Communicator::<RawResponse>::send(&self.communicator, request, handler)
            .await
            .map_err(|err| err.or_target(target))
    }

    /// Fetches one object wrapped under `key`, e.g. `{"issue": {...}}`.
    ///
    /// # Errors
    ///
    /// Returns a classified error, or [`Error::Format`] if `key` is missing.
    pub async fn get_object<T>(&self, path: &str, key: &str, params: &RequestParams) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let request = Request::<Bytes>::builder(Method::Get, self.url(path)?)
            .query_params(params)
            .build();
        self.send(request, unwrap_envelope(key)).await
    }

    /// Creates an object, sending and receiving it wrapped under `key`.
    ///
    /// `params` go to the query string, e.g. `include=journals`.
    ///
    /// # Errors
    ///
    /// Returns a classified error, or [`Error::Format`] if the response does
    /// not contain `key`.
    pub async fn create_object<B, T>(
        &self,
        path: &str,
        key: &str,
        object: &B,
        params: &RequestParams,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send,
    {
        let request = Request::<Bytes>::builder(Method::Post, self.url(path)?)
            .query_params(params)
            .json(&wrap_envelope(key, object)?)?
            .build();
        self.send(request, unwrap_envelope(key)).await
    }

    /// Updates an object, sending it wrapped under `key`; `params` go to the
    /// query string.
    ///
    /// # Errors
    ///
    /// Returns a classified error.
    pub async fn update_object<B>(
        &self,
        path: &str,
        key: &str,
        object: &B,
        params: &RequestParams,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let request = Request::<Bytes>::builder(Method::Put, self.url(path)?)
            .query_params(params)
            .json(&wrap_envelope(key, object)?)?
            .build();
        self.send(request, ignore_body).await
    }

    /// Deletes an object.
    ///
    /// # Errors
    ///
    /// Returns a classified error.
    pub async fn delete_object(&self, path: &str) -> Result<()> {
        let request = Request::<Bytes>::builder(Method::Delete, self.url(path)?).build();
        self.send(request, ignore_body).await
    }
}

#[allow(clippy::needless_pass_by_value)]
fn ignore_body(_: RawResponse) -> Result<()> {
    Ok(())
}

fn wrap_envelope<B: Serialize + ?Sized>(key: &str, object: &B) -> Result<serde_json::Value> {
    let mut envelope = serde_json::Map::new();
    envelope.insert(key.to_owned(), serde_json::to_value(object)?);
    Ok(serde_json::Value::Object(envelope))
}

fn unwrap_envelope<T: DeserializeOwned>(key: &str) -> impl Fn(RawResponse) -> Result<T> + Send + Sync + '_ {
    move |response| {
        let mut envelope: serde_json::Map<String, serde_json::Value> = response.json()?;
        let value = envelope
            .remove(key)
            .ok_or_else(|| Error::format(format!("missing field '{key}'")))?;
        crate::from_json_value(key, value)
    }
}

/// Builder for [`Transport`].
///
/// Credential injection runs first. Layers added with
/// [`TransportBuilder::layer`] come next, so they see authenticated requests,
/// and logging sits closest to the network, so it records what is sent.
pub struct TransportBuilder {
    uri: String,
    config: ClientConfig,
    credentials: Credentials,
    on_behalf_of: Option<String>,
    client: Option<BoxedService>,
    layers: ChainBuilder,
    logging: Option<LoggingLayer>,
    classifier: ErrorClassifier,
}

impl std::fmt::Debug for TransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportBuilder")
            .field("uri", &self.uri)
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("custom_client", &self.client.is_some())
            .field("layers", &self.layers)
            .field("logging", &self.logging)
            .finish_non_exhaustive()
    }
}

impl TransportBuilder {
    fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            config: ClientConfig::default(),
            credentials: Credentials::Anonymous,
            on_behalf_of: None,
            client: None,
            layers: ChainBuilder::default(),
            logging: None,
            classifier: ErrorClassifier::default(),
        }
    }

    /// Set the configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the initial credentials.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Impersonate `login` from the first request on.
    #[must_use]
    pub fn on_behalf_of_user(mut self, login: impl Into<String>) -> Self {
        self.on_behalf_of = Some(login.into());
        self
    }

    /// Use a pre-configured HTTP client instead of the built-in hyper client.
    ///
    /// Timeouts and pool settings of [`ClientConfig`] then belong to that
    /// client.
    #[must_use]
    pub fn http_client<C: HttpClient + 'static>(mut self, client: C) -> Self {
        self.client = Some(BoxCloneService::new(BaseLink::new(client)));
        self
    }

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
        self.layers = self.layers.layer(layer);
        self
    }

    /// Log every request at info level.
    #[must_use]
    pub fn with_logging(mut self) -> Self {
        self.logging = Some(LoggingLayer::new());
        self
    }

    /// Log every request at debug level, with redacted headers.
    #[must_use]
    pub fn with_debug_logging(mut self) -> Self {
        self.logging = Some(LoggingLayer::debug());
        self
    }

    /// Decode 422 bodies with `decoder` instead of the JSON default.
    #[must_use]
    pub fn error_decoder(mut self, decoder: impl ErrorBodyDecoder) -> Self {
        self.classifier = ErrorClassifier::new(decoder);
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if the URI is empty, invalid or
    /// cannot serve as a base, or if the credentials cannot be encoded.
    pub fn build(self) -> Result<Transport> {
        let base_url = parse_base_url(&self.uri)?;

        let auth = AuthHandle::new(self.config.auth_charset);
        auth.set(&self.credentials)?;
        auth.set_on_behalf_of_user(self.on_behalf_of);

        let mut chain = ChainBuilder::default();
        if let Some(logging) = self.logging {
            chain = chain.layer(logging);
        }
        let chain = chain.append(self.layers).with_auth(auth.clone());

        let base = self.client.unwrap_or_else(|| {
            BoxCloneService::new(BaseLink::new(HyperClient::with_config(self.config.clone())))
        });

        Ok(Transport {
            communicator: Fmap::new(chain.build_on(base), TransportDecoder),
            base_url,
            auth,
            classifier: self.classifier,
            config: self.config,
        })
    }
}

fn parse_base_url(uri: &str) -> Result<Url> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(Error::internal("server URI may not be empty"));
    }
    let mut url = Url::parse(uri)?;
    if url.cannot_be_a_base() {
        return Err(Error::internal(format!("server URI {uri} cannot be a base URL")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = parse_base_url("https://host/redmine").expect("url");
        check!(url.as_str() == "https://host/redmine/");
        check!(url.join("issues.json").expect("join").as_str() == "https://host/redmine/issues.json");
    }

    #[test]
    fn empty_and_invalid_uris_are_rejected() {
        for uri in ["", "   ", "not a uri", "mailto:admin@host"] {
            let_assert!(Err(err) = parse_base_url(uri));
            check!(err.is_internal(), "{uri}");
        }
    }

    #[tokio::test]
    async fn url_strips_leading_slash() {
        let transport = Transport::unauthenticated("https://host/redmine").expect("transport");
        check!(
            transport.url("/projects.json").expect("url").as_str()
                == "https://host/redmine/projects.json"
        );
    }

    #[tokio::test]
    async fn factories_set_credentials() {
        let transport = Transport::with_api_key("https://host", "abc").expect("transport");
        check!(transport.auth().is_authenticated());

        let transport = Transport::unauthenticated("https://host").expect("transport");
        check!(!transport.auth().is_authenticated());

        let_assert!(
            Err(err) = Transport::with_user_auth_charset("https://host", "KOI8-R", "u", "p")
        );
        check!(err.is_internal());
    }

    #[test]
    fn envelope_helpers() {
        #[derive(Serialize)]
        struct Project {
            name: &'static str,
        }

        let value = wrap_envelope("project", &Project { name: "Tracker" }).expect("wrap");
        check!(value == serde_json::json!({"project": {"name": "Tracker"}}));

        let response = RawResponse::new(201, Bytes::from_static(br#"{"project":{"id":3}}"#), "UTF-8");
        let id: serde_json::Value = unwrap_envelope("project")(response).expect("unwrap");
        check!(id == serde_json::json!({"id": 3}));
    }
}

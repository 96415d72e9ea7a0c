//! Credential injection middleware.
//!
//! [`AuthLayer`] reads the current credentials from an [`AuthHandle`] on every
//! request. The handle is shared with the [`Transport`](crate::Transport), so
//! credentials and impersonation can change on a live chain without
//! rebuilding it.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll};

use base64::Engine;
use bytes::Bytes;
use tower::{Layer, Service};

use crate::{Charset, Error, Request, Response, Result};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Header carrying Basic credentials.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Header naming the user a request is made on behalf of.
pub const SWITCH_USER_HEADER: &str = "X-Redmine-Switch-User";

/// Credentials attached to outgoing requests.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Credentials {
    /// No credentials; requests pass through untouched.
    #[default]
    Anonymous,
    /// API key sent in [`API_KEY_HEADER`].
    ApiKey(String),
    /// Login and password sent as `Authorization: Basic`.
    Basic {
        /// Login name.
        login: String,
        /// Password.
        password: String,
        /// Charset used to encode `login:password` before base64; `None`
        /// uses the charset configured on the [`AuthHandle`].
        charset: Option<Charset>,
    },
}

impl Credentials {
    /// API-key credentials.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }

    /// Login/password credentials encoded with the handle's charset, which
    /// comes from [`ClientConfig::auth_charset`](crate::ClientConfig).
    pub fn basic(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            login: login.into(),
            password: password.into(),
            charset: None,
        }
    }

    /// Login/password credentials encoded with `charset`.
    pub fn basic_with_charset(
        charset: Charset,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::Basic {
            login: login.into(),
            password: password.into(),
            charset: Some(charset),
        }
    }

    /// Header name and value carrying these credentials.
    fn header(&self, default_charset: Charset) -> Result<Option<(&'static str, String)>> {
        match self {
            Self::Anonymous => Ok(None),
            Self::ApiKey(key) => Ok(Some((API_KEY_HEADER, key.clone()))),
            Self::Basic {
                login,
                password,
                charset,
            } => {
                let charset = charset.unwrap_or(default_charset);
                let raw = charset.encode(&format!("{login}:{password}")).ok_or_else(|| {
                    Error::internal(format!(
                        "credentials cannot be encoded as {}",
                        charset.name()
                    ))
                })?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(raw);
                Ok(Some((AUTHORIZATION_HEADER, format!("Basic {encoded}"))))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"<redacted>").finish(),
            Self::Basic { login, charset, .. } => f
                .debug_struct("Basic")
                .field("login", login)
                .field("password", &"<redacted>")
                .field("charset", charset)
                .finish(),
        }
    }
}

#[derive(Default)]
struct AuthState {
    authorization: Option<(&'static str, String)>,
    on_behalf_of: Option<String>,
}

/// Shared, swappable credential state.
///
/// Clones share the same state. Updates take effect for requests issued after
/// the update returns; a request already in flight keeps what it was sent
/// with.
#[derive(Clone, Default)]
pub struct AuthHandle {
    state: Arc<RwLock<AuthState>>,
    default_charset: Charset,
}

impl fmt::Debug for AuthHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("AuthHandle")
            .field("authenticated", &state.authorization.is_some())
            .field("on_behalf_of", &state.on_behalf_of)
            .finish_non_exhaustive()
    }
}

impl AuthHandle {
    /// Anonymous handle; [`AuthHandle::set_basic`] will encode with
    /// `default_charset`.
    #[must_use]
    pub fn new(default_charset: Charset) -> Self {
        Self {
            state: Arc::default(),
            default_charset,
        }
    }

    /// Replaces the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if Basic credentials cannot be
    /// represented in their charset; the previous credentials stay in place.
    pub fn set(&self, credentials: &Credentials) -> Result<()> {
        let authorization = credentials.header(self.default_charset)?;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.authorization = authorization;
        Ok(())
    }

    /// Uses an API key, or no credentials when `key` is `None`.
    pub fn set_api_key(&self, key: Option<impl Into<String>>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.authorization = key.map(|key| (API_KEY_HEADER, key.into()));
    }

    /// Uses login and password with the handle's default charset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if the credentials cannot be encoded.
    pub fn set_basic(&self, login: impl Into<String>, password: impl Into<String>) -> Result<()> {
        self.set(&Credentials::basic(login, password))
    }

    /// Uses login and password encoded with the named charset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] if the charset is unsupported or the
    /// credentials cannot be encoded in it.
    pub fn set_basic_with_charset(
        &self,
        charset: &str,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<()> {
        let charset: Charset = charset.parse()?;
        self.set(&Credentials::basic_with_charset(charset, login, password))
    }

    /// Drops the credentials; later requests are anonymous.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.authorization = None;
    }

    /// Impersonates `login` on later requests, or stops when `None`.
    pub fn set_on_behalf_of_user(&self, login: Option<impl Into<String>>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.on_behalf_of = login.map(Into::into);
    }

    /// Returns `true` if credentials are set.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .authorization
            .is_some()
    }

    /// Adds the current credential and impersonation headers to `request`.
    pub fn apply<B>(&self, request: &mut Request<B>) {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if let Some((name, value)) = &state.authorization {
            request.set_header(name, value.clone());
        }
        if let Some(login) = &state.on_behalf_of {
            request.set_header(SWITCH_USER_HEADER, login.clone());
        }
    }
}

/// Layer that injects the credentials held by an [`AuthHandle`].
#[derive(Debug, Clone)]
pub struct AuthLayer {
    auth: AuthHandle,
}

impl AuthLayer {
    /// Create a layer reading from `auth`.
    #[must_use]
    pub const fn new(auth: AuthHandle) -> Self {
        Self { auth }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = Authenticator<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Authenticator {
            inner,
            auth: self.auth.clone(),
        }
    }
}

/// Service that adds authentication headers to requests.
#[derive(Debug, Clone)]
pub struct Authenticator<S> {
    inner: S,
    auth: AuthHandle,
}

impl<S> Service<Request<Bytes>> for Authenticator<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        self.auth.apply(&mut request);
        self.inner.call(request)
    }
}

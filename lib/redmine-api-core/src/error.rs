//! Error taxonomy for Redmine operations.
//!
//! Every failure is tagged with one of a small set of kinds (see [`ErrorKind`])
//! so callers can branch on what went wrong without parsing messages.

use derive_more::{Display, Error};

/// Fieldless view of an [`Error`], for matching on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// Credentials missing, wrong, or insufficient.
    #[display("authentication")]
    Authentication,
    /// Resource or collection does not exist.
    #[display("not found")]
    NotFound,
    /// The server rejected the request with validation messages.
    #[display("processing")]
    Processing,
    /// The response body could not be parsed.
    #[display("format")]
    Format,
    /// Network or I/O failure, or an unusable transport framing.
    #[display("transport")]
    Transport,
    /// The client was used incorrectly; no request was sent.
    #[display("internal client")]
    InternalClient,
}

/// Main error type for Redmine operations.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// Status 401 or 403.
    #[display("authentication error ({status}): {message}")]
    Authentication {
        /// HTTP status code that triggered the error.
        status: u16,
        /// Human readable explanation.
        message: String,
    },

    /// Status 404.
    #[display("not found: {message}")]
    NotFound {
        /// Explanation, usually including the response body.
        message: String,
    },

    /// Status 422 (or 413) with field-level validation messages.
    #[display("processing error: {}", errors.join("; "))]
    Processing {
        /// Messages in server order, verbatim.
        errors: Vec<String>,
    },

    /// A body that cannot be parsed as the expected structure.
    #[display("format error: {_0}")]
    Format(#[error(not(source))] String),

    /// Network or I/O failure.
    #[display("transport error: {message}")]
    Transport {
        /// Request target (scheme, host and path; never the query string).
        target: Option<String>,
        /// Description of the underlying cause.
        message: String,
    },

    /// Programmer error detected before any network I/O.
    #[display("internal client error: {_0}")]
    InternalClient(#[error(not(source))] String),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an authentication error.
    #[must_use]
    pub fn authentication(status: u16, message: impl Into<String>) -> Self {
        Self::Authentication {
            status,
            message: message.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a processing error from server messages.
    #[must_use]
    pub fn processing(errors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Processing {
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a format error.
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Create a transport error with no known target.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            target: None,
            message: message.into(),
        }
    }

    /// Create a transport error for a failed exchange with `target`.
    #[must_use]
    pub fn transport_at(target: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let target = target.into();
        Self::Transport {
            message: format!("cannot fetch data from {target}: {cause}"),
            target: Some(target),
        }
    }

    /// Create an internal client error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalClient(message.into())
    }

    /// Attaches `target` to a transport error that does not name one yet.
    ///
    /// Other kinds are returned unchanged.
    #[must_use]
    pub fn or_target(self, target: impl Into<String>) -> Self {
        match self {
            Self::Transport {
                target: None,
                message,
            } => Self::Transport {
                target: Some(target.into()),
                message,
            },
            other => other,
        }
    }

    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Processing { .. } => ErrorKind::Processing,
            Self::Format(_) => ErrorKind::Format,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::InternalClient(_) => ErrorKind::InternalClient,
        }
    }

    /// Returns `true` if this is an authentication error.
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a processing error.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(self, Self::Processing { .. })
    }

    /// Returns `true` if this is a format error.
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Returns `true` if this is a transport error.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns `true` if this is an internal client error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::InternalClient(_))
    }

    /// Server validation messages, if this is a processing error.
    #[must_use]
    pub fn errors(&self) -> Option<&[String]> {
        match self {
            Self::Processing { errors } => Some(errors),
            _ => None,
        }
    }

    /// Request target, if this is a transport error with a known target.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Transport { target, .. } => target.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InternalClient(format!("invalid URL: {err}"))
    }
}

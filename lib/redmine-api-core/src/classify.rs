//! Mapping of HTTP statuses and error bodies onto [`Error`] kinds.
//!
//! The classifier runs inside the content-handler pipeline, after transport
//! decoding and before the caller's parser. Successful responses pass
//! through untouched.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::{ContentHandler, Error, RawResponse, Result};

/// Message used when the server refuses an oversized request.
pub const REQUEST_TOO_LARGE: &str = "request is too large";

/// Extracts validation messages from an error body.
///
/// Implement this for servers whose error payloads differ from the JSON
/// shapes understood by [`JsonErrorDecoder`].
pub trait ErrorBodyDecoder: Send + Sync + 'static {
    /// Decodes the messages, in server order.
    ///
    /// # Errors
    ///
    /// Returns a format error if the body does not have the expected shape.
    fn decode_messages(&self, body: &str) -> Result<Vec<String>>;
}

/// Decodes `{"errors": ["..."]}` or a bare `["..."]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonErrorDecoder;

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Bare(Vec<String>),
    Wrapped { errors: Vec<String> },
}

impl ErrorBodyDecoder for JsonErrorDecoder {
    fn decode_messages(&self, body: &str) -> Result<Vec<String>> {
        let body: ErrorBody = serde_json::from_str(body)
            .map_err(|e| Error::format(format!("cannot parse error body: {e}")))?;
        Ok(match body {
            ErrorBody::Bare(errors) | ErrorBody::Wrapped { errors } => errors,
        })
    }
}

/// Turns a decoded response into `Ok(())` or a classified [`Error`].
#[derive(Clone)]
pub struct ErrorClassifier {
    decoder: Arc<dyn ErrorBodyDecoder>,
}

impl fmt::Debug for ErrorClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorClassifier").finish_non_exhaustive()
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(JsonErrorDecoder)
    }
}

impl ErrorClassifier {
    /// Creates a classifier using `decoder` for validation bodies.
    #[must_use]
    pub fn new(decoder: impl ErrorBodyDecoder) -> Self {
        Self {
            decoder: Arc::new(decoder),
        }
    }

    /// Classifies the response status.
    ///
    /// - 401, 403: [`Error::Authentication`]
    /// - 404: [`Error::NotFound`] with the body text
    /// - 413: [`Error::Processing`] with [`REQUEST_TOO_LARGE`]
    /// - 422: [`Error::Processing`] with the decoded messages, or
    ///   [`Error::Format`] if the body cannot be decoded
    /// - any other status from 400 up: [`Error::Transport`] naming the status
    ///
    /// # Errors
    ///
    /// Returns the classified error for any status from 400 up.
    pub fn classify(&self, response: &RawResponse) -> Result<()> {
        match response.status() {
            status if status < 400 => Ok(()),
            status @ 401 => Err(Error::authentication(
                status,
                "check the API key or login and password, and that the REST API is enabled",
            )),
            status @ 403 => Err(Error::authentication(
                status,
                "forbidden, the user does not have the required permissions",
            )),
            404 => {
                let body = response.text().unwrap_or_default();
                Err(Error::not_found(format!("server returned 404, body: {body}")))
            }
            413 => Err(Error::processing([REQUEST_TOO_LARGE])),
            422 => {
                let messages = self.decoder.decode_messages(&response.text()?)?;
                Err(Error::processing(messages))
            }
            status => Err(Error::transport(format!(
                "server responded with status {status}"
            ))),
        }
    }
}

impl ContentHandler<RawResponse, RawResponse> for ErrorClassifier {
    fn process(&self, response: RawResponse) -> Result<RawResponse> {
        self.classify(&response)?;
        Ok(response)
    }
}

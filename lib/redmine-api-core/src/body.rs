//! JSON body helpers.

use bytes::Bytes;

use crate::{Error, Result};

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns a format error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use redmine_api_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Project { name: String }
///
/// let project = Project { name: "Tracker".to_string() };
/// let bytes = to_json(&project).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Tracker"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// # Errors
///
/// Returns a format error whose message includes the path to the field that
/// failed (e.g. `issues[2].id`).
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(path_error)
}

/// Deserialize an already parsed JSON value, prefixing error paths with
/// `prefix`.
///
/// # Errors
///
/// Returns a format error naming the failing field path.
pub fn from_json_value<T: serde::de::DeserializeOwned>(
    prefix: &str,
    value: serde_json::Value,
) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        let path = e.path().to_string();
        let path = if path == "." {
            prefix.to_owned()
        } else if path.starts_with('[') {
            format!("{prefix}{path}")
        } else {
            format!("{prefix}.{path}")
        };
        Error::format(format!("{path}: {}", e.inner()))
    })
}

fn path_error(err: serde_path_to_error::Error<serde_json::Error>) -> Error {
    let path = err.path().to_string();
    if path == "." {
        Error::format(err.inner().to_string())
    } else {
        Error::format(format!("{path}: {}", err.inner()))
    }
}

//! Transport encoding and charset handling.
//!
//! Compression (`Content-Encoding`) and text charset (`Content-Type;
//! charset=...`) are separate pieces of response metadata and are resolved
//! independently.

use std::io::Read;
use std::str::FromStr;

use bytes::Bytes;

use crate::{ContentHandler, Error, RawResponse, Response, Result};

/// Charset assumed when a response does not declare one.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Compression applied to a response body in transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportEncoding {
    /// No compression.
    #[default]
    Identity,
    /// `gzip` (also accepts `x-gzip`).
    Gzip,
    /// `deflate`: zlib-wrapped, with raw deflate tolerated.
    Deflate,
}

impl TransportEncoding {
    /// Resolves a `Content-Encoding` header value.
    ///
    /// An absent, empty or `identity` value means no compression.
    ///
    /// # Errors
    ///
    /// Returns a transport error naming any other encoding.
    pub fn from_header(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::Identity),
            Some(value) => value.parse(),
        }
    }

    /// Decodes a body compressed with this encoding.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the body is not valid for the encoding.
    pub fn decode(self, body: Bytes) -> Result<Bytes> {
        match self {
            Self::Identity => Ok(body),
            Self::Gzip => {
                let mut decoded = Vec::new();
                flate2::read::GzDecoder::new(body.as_ref())
                    .read_to_end(&mut decoded)
                    .map_err(|e| Error::transport(format!("gzip decoding failed: {e}")))?;
                Ok(Bytes::from(decoded))
            }
            Self::Deflate => {
                let mut decoded = Vec::new();
                if flate2::read::ZlibDecoder::new(body.as_ref())
                    .read_to_end(&mut decoded)
                    .is_ok()
                {
                    return Ok(Bytes::from(decoded));
                }
                decoded.clear();
                flate2::read::DeflateDecoder::new(body.as_ref())
                    .read_to_end(&mut decoded)
                    .map_err(|e| Error::transport(format!("deflate decoding failed: {e}")))?;
                Ok(Bytes::from(decoded))
            }
        }
    }

    /// Header token for this encoding.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }
}

impl FromStr for TransportEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "identity" => Ok(Self::Identity),
            "gzip" | "x-gzip" => Ok(Self::Gzip),
            "deflate" => Ok(Self::Deflate),
            _ => Err(Error::transport(format!(
                "unsupported transport encoding {s}"
            ))),
        }
    }
}

/// Decodes `body` according to a `Content-Encoding` value.
///
/// # Errors
///
/// Returns a transport error for unsupported encodings or corrupt bodies.
pub fn decode(encoding: Option<&str>, body: Bytes) -> Result<Bytes> {
    TransportEncoding::from_header(encoding)?.decode(body)
}

/// Text charsets understood by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// UTF-8.
    #[default]
    Utf8,
    /// ISO-8859-1.
    Latin1,
    /// US-ASCII.
    Ascii,
}

impl Charset {
    /// Canonical name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
            Self::Ascii => "US-ASCII",
        }
    }

    /// Encodes text; `None` if a character is not representable.
    #[must_use]
    pub fn encode(&self, text: &str) -> Option<Vec<u8>> {
        match self {
            Self::Utf8 => Some(text.as_bytes().to_vec()),
            Self::Latin1 => text.chars().map(|c| u8::try_from(c).ok()).collect(),
            Self::Ascii => text
                .chars()
                .map(|c| u8::try_from(c).ok().filter(u8::is_ascii))
                .collect(),
        }
    }

    /// Decodes bytes; `None` if they are not valid in this charset.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Ascii => bytes
                .is_ascii()
                .then(|| bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

impl FromStr for Charset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "iso8859-1" | "iso8859_1" | "iso_8859-1" | "latin1" | "l1" => {
                Ok(Self::Latin1)
            }
            "us-ascii" | "ascii" => Ok(Self::Ascii),
            _ => Err(Error::internal(format!("unsupported charset {s}"))),
        }
    }
}

/// Content handler that turns a wire [`Response`] into a [`RawResponse`].
///
/// Decompresses the body per `Content-Encoding` and records the charset from
/// `Content-Type`, defaulting to [`DEFAULT_CHARSET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportDecoder;

impl ContentHandler<Response<Bytes>, RawResponse> for TransportDecoder {
    fn process(&self, response: Response<Bytes>) -> Result<RawResponse> {
        let encoding = TransportEncoding::from_header(response.content_encoding())?;
        let charset = response.charset().unwrap_or(DEFAULT_CHARSET).to_owned();
        let (status, _, body) = response.into_parts();
        Ok(RawResponse::new(status, encoding.decode(body)?, charset))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};

    use super::*;

    const PAYLOAD: &[u8] = b"{\"issues\":[{\"id\":1,\"subject\":\"caf\xc3\xa9\"}],\"total_count\":1}\x00\xff";

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).expect("write");
        encoder.finish().expect("finish")
    }

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).expect("write");
        encoder.finish().expect("finish")
    }

    fn raw_deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).expect("write");
        encoder.finish().expect("finish")
    }

    #[test]
    fn identity_round_trip() {
        for header in [None, Some(""), Some("identity")] {
            let decoded = decode(header, Bytes::from_static(PAYLOAD)).expect("identity");
            assert_eq!(decoded.as_ref(), PAYLOAD);
        }
    }

    #[test]
    fn gzip_round_trip() {
        let decoded = decode(Some("gzip"), Bytes::from(gzip(PAYLOAD))).expect("gzip");
        assert_eq!(decoded.as_ref(), PAYLOAD);
    }

    #[test]
    fn deflate_round_trip() {
        let decoded = decode(Some("deflate"), Bytes::from(zlib(PAYLOAD))).expect("zlib");
        assert_eq!(decoded.as_ref(), PAYLOAD);

        let decoded = decode(Some("deflate"), Bytes::from(raw_deflate(PAYLOAD))).expect("raw");
        assert_eq!(decoded.as_ref(), PAYLOAD);
    }

    #[test]
    fn unsupported_encoding_is_transport_error() {
        for name in ["br", "zstd", "compress", "gzip, br"] {
            for body in [Bytes::new(), Bytes::from_static(PAYLOAD)] {
                let err = decode(Some(name), body).expect_err("unsupported");
                assert!(err.is_transport());
                assert!(err.to_string().contains(name), "{err}");
            }
        }
    }

    #[test]
    fn corrupt_gzip_is_transport_error() {
        let err = decode(Some("gzip"), Bytes::from_static(b"not gzip")).expect_err("corrupt");
        assert!(err.is_transport());
    }

    #[test]
    fn charset_names() {
        assert_eq!("utf8".parse::<Charset>().expect("utf8"), Charset::Utf8);
        assert_eq!("ISO8859_1".parse::<Charset>().expect("latin1"), Charset::Latin1);
        assert_eq!("US-ASCII".parse::<Charset>().expect("ascii"), Charset::Ascii);
        assert!("EBCDIC".parse::<Charset>().is_err_and(|e| e.is_internal()));
    }

    #[test]
    fn charset_encode() {
        assert_eq!(Charset::Latin1.encode("é"), Some(vec![0xe9]));
        assert_eq!(Charset::Latin1.encode("€"), None);
        assert_eq!(Charset::Ascii.encode("é"), None);
        assert_eq!(Charset::Utf8.encode("é"), Some(vec![0xc3, 0xa9]));
    }

    #[test]
    fn decoder_handles_empty_body_with_default_charset() {
        let response = Response::new(204, HashMap::new(), Bytes::new());
        let raw = TransportDecoder.process(response).expect("decode");

        assert_eq!(raw.status(), 204);
        assert!(raw.body().is_empty());
        assert_eq!(raw.charset(), DEFAULT_CHARSET);
        assert_eq!(raw.text().expect("text"), "");
    }

    #[test]
    fn decoder_reads_encoding_and_charset_separately() {
        let mut headers = HashMap::new();
        headers.insert("Content-Encoding".to_string(), "gzip".to_string());
        headers.insert(
            "Content-Type".to_string(),
            "application/json; charset=ISO-8859-1".to_string(),
        );
        let response = Response::new(200, headers, Bytes::from(gzip(b"caf\xe9")));

        let raw = TransportDecoder.process(response).expect("decode");
        assert_eq!(raw.charset(), "ISO-8859-1");
        assert_eq!(raw.text().expect("text"), "café");
    }
}

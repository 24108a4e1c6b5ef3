//! Inline `data:` URI recognition and base64 payload decoding.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use thiserror::Error;

/// Recognised headers in match order, paired with the MIME type reported
/// for the payload.
const PREFIXES: [(&str, Option<&str>); 7] = [
    ("data:application/octet-stream;base64,", None),
    ("data:image/jpeg;base64,", Some("image/jpeg")),
    ("data:image/png;base64,", Some("image/png")),
    ("data:image/bmp;base64,", Some("image/bmp")),
    ("data:image/gif;base64,", Some("image/gif")),
    ("data:text/plain;base64,", Some("text/plain")),
    ("data:application/gltf-buffer;base64,", None),
];

// Input is truncated to the alphabet before decoding, so padding never
// reaches the engine and partial trailing groups are accepted.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUriError {
    #[error("URI is not a recognised data URI")]
    NotDataUri,
    #[error("data URI payload decoded to zero bytes")]
    Empty,
    #[error("decoded {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A data URI split into its header and still-encoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime_type: Option<&'static str>,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Matches `uri` against the known headers; the first match wins.
    pub fn parse(uri: &'a str) -> Option<Self> {
        PREFIXES.iter().find_map(|(prefix, mime_type)| {
            uri.strip_prefix(prefix).map(|payload| DataUri {
                mime_type: *mime_type,
                payload,
            })
        })
    }

    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        let bytes = decode_base64(self.payload)?;
        if bytes.is_empty() {
            return Err(DataUriError::Empty);
        }
        Ok(bytes)
    }
}

pub fn is_data_uri(uri: &str) -> bool {
    DataUri::parse(uri).is_some()
}

/// Decodes a data URI whose payload must be exactly `expected` bytes long.
pub fn decode_sized(uri: &str, expected: usize) -> Result<Vec<u8>, DataUriError> {
    let bytes = DataUri::parse(uri)
        .ok_or(DataUriError::NotDataUri)?
        .decode()?;
    if bytes.len() != expected {
        return Err(DataUriError::SizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Decodes a data URI, accepting whatever length the payload yields.
pub fn decode_unsized(uri: &str) -> Result<Vec<u8>, DataUriError> {
    DataUri::parse(uri)
        .ok_or(DataUriError::NotDataUri)?
        .decode()
}

/// Decodes standard-alphabet base64.
///
/// Decoding stops at the first `=` or character outside the alphabet. A
/// lone character left in the final group carries fewer than eight bits and
/// is dropped.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, DataUriError> {
    let end = encoded
        .bytes()
        .position(|b| !(b.is_ascii_alphanumeric() || b == b'+' || b == b'/'))
        .unwrap_or(encoded.len());
    let mut valid = &encoded[..end];
    if valid.len() % 4 == 1 {
        valid = &valid[..valid.len() - 1];
    }
    Ok(LENIENT.decode(valid)?)
}

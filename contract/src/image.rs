use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every accepted payload starts with this literal prefix.
pub const DATA_IMAGE_PREFIX: &str = "data:image/";

/// Why a string was refused as an image payload.
///
/// The display strings are part of the HTTP contract.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Image data is required")]
    Missing,
    #[error("Invalid image format")]
    InvalidFormat,
}

/// A single image encoded as a data URI (`data:image/<subtype>;base64,<bytes>`).
///
/// Construction validates the prefix, so a value of this type is always
/// something the endpoint will accept. It is never mutated; a new capture
/// builds a new payload.
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WirePayload")]
pub struct ImagePayload {
    #[serde(rename = "imageData")]
    image_data: String,
}

#[derive(Deserialize)]
struct WirePayload {
    #[serde(rename = "imageData", default)]
    image_data: Option<String>,
}

impl TryFrom<WirePayload> for ImagePayload {
    type Error = PayloadError;

    fn try_from(wire: WirePayload) -> Result<Self, Self::Error> {
        Self::new(wire.image_data.unwrap_or_default())
    }
}

impl ImagePayload {
    /// Validate `data` and wrap it.
    pub fn new(data: impl Into<String>) -> Result<Self, PayloadError> {
        let image_data = data.into();
        if image_data.is_empty() {
            return Err(PayloadError::Missing);
        }
        if !image_data.starts_with(DATA_IMAGE_PREFIX) {
            return Err(PayloadError::InvalidFormat);
        }
        Ok(Self { image_data })
    }

    /// Encode raw image bytes of the given MIME type (e.g. `image/jpeg`).
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Result<Self, PayloadError> {
        Self::new(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.image_data
    }

    /// MIME type named in the data URI header, e.g. `image/png`.
    pub fn mime(&self) -> Option<&str> {
        parse_data_uri(&self.image_data).map(|uri| uri.mime)
    }

}

/// Borrowed view of a data URI split at its header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime: &'a str,
    pub base64: bool,
    pub body: &'a str,
}

impl DataUri<'_> {
    /// Decode the body when it is base64 encoded.
    pub fn decode(&self) -> Option<Vec<u8>> {
        if !self.base64 {
            return None;
        }
        BASE64.decode(self.body).ok()
    }
}

/// Split `data:<mime>[;base64],<body>` into its parts.
pub fn parse_data_uri(uri: &str) -> Option<DataUri<'_>> {
    let rest = uri.strip_prefix("data:")?;
    let (header, body) = rest.split_once(',')?;
    let (mime, base64) = match header.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (header, false),
    };
    Some(DataUri { mime, base64, body })
}

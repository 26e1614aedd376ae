//! Data-URI encoded images.
//!
//! Images travel through the system as `data:<mime>;base64,<payload>` strings.
//! External AI calls only ever see the MIME type and the raw base64 payload.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_IMAGE_MIME;
use crate::error::{Error, Result};

/// An image carried as base64 text together with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub mime_type: String,
    /// Raw base64 payload, without any `data:` prefix.
    pub data: String,
}

impl EncodedImage {
    /// Build from an already-split MIME type and base64 payload.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encode raw bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(bytes),
        )
    }

    /// Parse a data URI, or a bare base64 payload whose MIME type is sniffed
    /// from the decoded bytes.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidInput("Image data is empty".into()));
        }

        if let Some(rest) = input.strip_prefix("data:") {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                Error::InvalidInput("Malformed data URI: missing ',' separator".into())
            })?;
            let mime_type = header
                .strip_suffix(";base64")
                .ok_or_else(|| Error::InvalidInput("Data URI is not base64 encoded".into()))?;
            if !mime_type.starts_with("image/") {
                return Err(Error::InvalidInput(format!(
                    "Unsupported media type: {}",
                    mime_type
                )));
            }
            decode_payload(payload)?;
            return Ok(Self::new(mime_type, payload));
        }

        let bytes = decode_payload(input)?;
        let mime_type = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .filter(|mime| mime.starts_with("image/"))
            .unwrap_or(DEFAULT_IMAGE_MIME);
        Ok(Self::new(mime_type, input))
    }

    /// Decode the payload to raw bytes.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        decode_payload(&self.data)
    }

    /// Render as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    if payload.is_empty() {
        return Err(Error::InvalidInput("Image payload is empty".into()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| Error::InvalidInput(format!("Invalid base64 image data: {}", e)))
}

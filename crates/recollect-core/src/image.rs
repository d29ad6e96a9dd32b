//! Opaque image locators.
//!
//! The engine never parses image content. It stores what the generation
//! backend returned as a MIME type plus base64 payload and renders it as a
//! `data:` URI wherever a locator is needed.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::generation::GenerationError;

/// Inline image reference, equivalent to a `data:<mime>;base64,<data>` URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    mime_type: String,
    data: String,
}

impl ImageRef {
    /// Builds a reference from a MIME type and an already base64-encoded
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::EmptyImage` if the payload is empty or the
    /// MIME type is not an image type.
    pub fn from_base64(
        mime_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let mime_type = mime_type.into();
        let data = data.into();
        if data.trim().is_empty() || !mime_type.starts_with("image/") {
            return Err(GenerationError::EmptyImage);
        }
        Ok(Self { mime_type, data })
    }

    /// Builds a reference by encoding raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::EmptyImage` if `bytes` is empty.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Result<Self, GenerationError> {
        Self::from_base64(mime_type, STANDARD.encode(bytes))
    }

    /// Parses a `data:<mime>;base64,<payload>` URI.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidResponse` if the string is not a
    /// base64 data URI.
    pub fn parse_data_uri(uri: &str) -> Result<Self, GenerationError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| GenerationError::InvalidResponse("not a data URI".to_owned()))?;
        let (mime_type, data) = rest.split_once(";base64,").ok_or_else(|| {
            GenerationError::InvalidResponse("data URI is not base64 encoded".to_owned())
        })?;
        Self::from_base64(mime_type, data)
    }

    /// Returns the MIME type, e.g. `image/png`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the base64 payload.
    #[must_use]
    pub fn base64(&self) -> &str {
        &self.data
    }

    /// Renders the reference as a `data:` URI.
    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decodes the payload into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidResponse` if the payload is not valid
    /// base64.
    pub fn decode(&self) -> Result<Vec<u8>, GenerationError> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| GenerationError::InvalidResponse(format!("invalid base64 image: {e}")))
    }

    /// File extension matching the MIME type.
    #[must_use]
    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,…({} chars)", self.mime_type, self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_uri_splits_mime_and_payload() {
        // Arrange
        let uri = "data:image/jpeg;base64,AAEC";

        // Act
        let image = ImageRef::parse_data_uri(uri).unwrap();

        // Assert
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.base64(), "AAEC");
        assert_eq!(image.file_extension(), "jpg");
        assert_eq!(image.data_uri(), uri);
    }

    #[test]
    fn test_parse_data_uri_rejects_plain_url() {
        let result = ImageRef::parse_data_uri("https://example.com/a.png");

        assert!(matches!(result, Err(GenerationError::InvalidResponse(_))));
    }

    #[test]
    fn test_from_base64_rejects_empty_payload() {
        let result = ImageRef::from_base64("image/png", "  ");

        assert!(matches!(result, Err(GenerationError::EmptyImage)));
    }

    #[test]
    fn test_from_base64_rejects_non_image_mime() {
        let result = ImageRef::from_base64("text/plain", "AAEC");

        assert!(matches!(result, Err(GenerationError::EmptyImage)));
    }

    #[test]
    fn test_decode_returns_original_bytes() {
        // Arrange
        let image = ImageRef::from_bytes("image/png", &[0x89, 0x50, 0x4e, 0x47]).unwrap();

        // Act
        let bytes = image.decode().unwrap();

        // Assert
        assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(image.file_extension(), "png");
    }
}

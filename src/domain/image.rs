use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

use crate::error::ValidationError;

/// An image to analyse, referenced either by URL or by inline base64 content.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    url: String,
    b64_content: String,
}

impl Image {
    /// Fails when both `url` and `b64_content` are empty.
    pub fn new(
        url: impl Into<String>,
        b64_content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let url = url.into();
        let b64_content = b64_content.into();
        if url.is_empty() && b64_content.is_empty() {
            return Err(ValidationError::MissingImageSource);
        }
        Ok(Self { url, b64_content })
    }

    pub fn from_url(url: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(url, "")
    }

    pub fn from_base64(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new("", content)
    }

    /// Encodes raw image bytes as inline content.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        Self::from_base64(STANDARD.encode(bytes))
    }

    /// The remote URL, if this image is referenced by one.
    pub fn url(&self) -> Option<&str> {
        (!self.url.is_empty()).then_some(self.url.as_str())
    }

    pub fn b64_content(&self) -> Option<&str> {
        (!self.b64_content.is_empty()).then_some(self.b64_content.as_str())
    }
}

// Inline content can be megabytes long; only its length is printed.
impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("url", &self.url)
            .field("b64_content_len", &self.b64_content.len())
            .finish()
    }
}

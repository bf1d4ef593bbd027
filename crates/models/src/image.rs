//! Annotated ear image sent back as base64.
//!
//! The service fills `annotated_image` with the literal `"base64 code"` when
//! it has nothing to show. That value, and an empty string, never reach a
//! decoder.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ValidationError};

/// Placeholder the service sends instead of image data
pub const PLACEHOLDER_SENTINEL: &str = "base64 code";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnnotatedImage {
    #[default]
    Unavailable,
    Base64(String),
}

impl AnnotatedImage {
    pub fn from_wire(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == PLACEHOLDER_SENTINEL {
            AnnotatedImage::Unavailable
        } else {
            AnnotatedImage::Base64(trimmed.to_string())
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, AnnotatedImage::Base64(_))
    }

    pub fn as_base64(&self) -> Option<&str> {
        match self {
            AnnotatedImage::Base64(data) => Some(data),
            AnnotatedImage::Unavailable => None,
        }
    }

    /// Decode to raw image bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        let data = self.as_base64().ok_or(ValidationError::NoImage)?;
        STANDARD
            .decode(data)
            .map_err(|e| ValidationError::ImageEncoding(e.to_string()))
    }

    /// `data:` URI; the service always encodes JPEG
    pub fn data_uri(&self) -> Option<String> {
        self.as_base64()
            .map(|data| format!("data:image/jpeg;base64,{}", data))
    }
}

impl<'de> Deserialize<'de> for AnnotatedImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .as_deref()
            .map(AnnotatedImage::from_wire)
            .unwrap_or(AnnotatedImage::Unavailable))
    }
}

impl Serialize for AnnotatedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AnnotatedImage::Base64(data) => serializer.serialize_str(data),
            AnnotatedImage::Unavailable => serializer.serialize_str(PLACEHOLDER_SENTINEL),
        }
    }
}

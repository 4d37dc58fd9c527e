//! Immutable image payloads passed between the timeline, the gateway and the
//! file system.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::error::{Result, WardrobeError};

/// Image bytes plus the metadata needed to send or save them.
///
/// Bytes are shared, so cloning an artifact (or a `Version` holding one) never
/// copies image data. The bytes are released when the last owner drops.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    file_name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl ImageArtifact {
    /// Creates an artifact, rejecting empty payloads and non-image MIME types.
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<Self> {
        let bytes = bytes.into();
        let mime_type = mime_type.into().trim().to_ascii_lowercase();

        if bytes.is_empty() {
            return Err(WardrobeError::invalid_image("image data is empty"));
        }
        if !mime_type.starts_with("image/") {
            return Err(WardrobeError::invalid_image(format!(
                "unsupported MIME type '{mime_type}'"
            )));
        }

        Ok(Self {
            file_name: file_name.into(),
            mime_type,
            bytes,
        })
    }

    /// Creates an artifact whose MIME type is sniffed from the leading bytes.
    pub fn sniffed(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let bytes = bytes.into();
        let mime_type = sniff_mime(&bytes)
            .ok_or_else(|| WardrobeError::invalid_image("unrecognized image encoding"))?;
        Self::new(file_name, mime_type, bytes)
    }

    /// Decodes base64 image data as returned by the image backend.
    pub fn from_base64(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: &str,
    ) -> Result<Self> {
        let bytes = BASE64_STANDARD.decode(data.trim())?;
        Self::new(file_name, mime_type, bytes)
    }

    /// Parses a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(data_url: &str, file_name: impl Into<String>) -> Result<Self> {
        let (header, payload) = data_url
            .split_once(',')
            .ok_or_else(|| WardrobeError::invalid_image("invalid data URL"))?;
        let mime_type = header
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .filter(|mime| !mime.is_empty())
            .ok_or_else(|| {
                WardrobeError::invalid_image("could not parse MIME type from data URL")
            })?;
        Self::from_base64(file_name, mime_type, payload)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a copy of this artifact under another file name.
    pub fn renamed(&self, file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: self.mime_type.clone(),
            bytes: Arc::clone(&self.bytes),
        }
    }

    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }
}

impl fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Detects PNG, JPEG, GIF and WebP payloads from their magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "png",
    }
}

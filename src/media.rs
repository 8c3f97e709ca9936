//! Source image helpers: format sniffing and data-URL handling.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Image formats accepted as video source frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Strips a `data:image/<subtype>;base64,` header, returning the raw base64
/// payload. Input without such a header is returned unchanged.
pub fn strip_data_url(input: &str) -> &str {
    let Some(rest) = input.strip_prefix("data:image/") else {
        return input;
    };
    match rest.split_once(";base64,") {
        Some((subtype, payload))
            if !subtype.is_empty()
                && subtype
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            payload
        }
        _ => input,
    }
}

/// Detect MIME type from base64-encoded data using magic byte detection.
/// Falls back to the provided default if detection fails.
pub fn detect_mime_from_base64(base64_data: &str, fallback: &str) -> String {
    // Only the header matters; 16 base64 chars decode to 12 bytes.
    let head: String = base64_data.chars().take(16).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&head)
        .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(&head))
        .unwrap_or_default();

    ImageFormat::from_magic_bytes(&bytes)
        .map(|f| f.mime_type().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

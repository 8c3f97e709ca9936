//! Core types for image-to-video generation.

use crate::error::{GenLabError, Result};
use crate::media::{detect_mime_from_base64, strip_data_url};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// Prompt sent when the caller leaves the prompt blank.
pub const DEFAULT_VIDEO_PROMPT: &str = "Animate this image cinematically.";

/// Output resolution requested for every job.
pub const VIDEO_RESOLUTION: &str = "720p";

/// Aspect ratios Veo accepts for image-to-video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 landscape.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait.
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// Returns the aspect ratio as a string (e.g., "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = GenLabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "16:9" => Ok(Self::Landscape),
            "9:16" => Ok(Self::Portrait),
            other => Err(GenLabError::InvalidRequest(format!(
                "unsupported aspect ratio '{other}', expected 16:9 or 9:16"
            ))),
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Veo model variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VeoModel {
    /// Veo 3.1 Fast (preview).
    #[default]
    Veo31Fast,
    /// Veo 3.1 (preview), higher quality.
    Veo31,
    /// Any other model identifier.
    Custom(String),
}

impl VeoModel {
    /// Returns the Gemini Developer API model identifier string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Veo31Fast => "veo-3.1-fast-generate-preview",
            Self::Veo31 => "veo-3.1-generate-preview",
            Self::Custom(id) => id,
        }
    }

    /// Models offered out of the box, with display names.
    pub fn known() -> [(Self, &'static str); 2] {
        [
            (Self::Veo31Fast, "Veo 3.1 Fast (Preview)"),
            (Self::Veo31, "Veo 3.1 High-Res (Preview)"),
        ]
    }
}

impl FromStr for VeoModel {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "veo-3.1-fast-generate-preview" => Self::Veo31Fast,
            "veo-3.1-generate-preview" => Self::Veo31,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl std::fmt::Display for VeoModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to animate a source image.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    /// Text prompt; blank means [`DEFAULT_VIDEO_PROMPT`].
    pub prompt: String,
    /// Source image as raw base64 or a `data:image/...;base64,` URL.
    pub image: String,
    /// Source image MIME type; blank means detect from the image bytes.
    pub mime_type: String,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Model override; the client's configured model is used when `None`.
    pub model: Option<VeoModel>,
}

impl VideoRequest {
    /// Creates a request for the given source image.
    pub fn new(image: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            prompt: String::new(),
            image: image.into(),
            mime_type: mime_type.into(),
            aspect_ratio: AspectRatio::default(),
            model: None,
        }
    }

    /// Sets the prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Sets the model.
    pub fn with_model(mut self, model: VeoModel) -> Self {
        self.model = Some(model);
        self
    }
}

/// The normalized job parameters sent to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSubmission {
    /// Prompt after default substitution.
    pub prompt: String,
    /// Raw base64 image bytes.
    pub image_base64: String,
    /// Image MIME type.
    pub mime_type: String,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Output resolution.
    pub resolution: String,
    /// Number of videos to generate.
    pub number_of_videos: u32,
}

impl VideoSubmission {
    /// Normalizes a caller request into submission parameters.
    pub fn from_request(req: &VideoRequest) -> Result<Self> {
        let image_base64 = strip_data_url(&req.image);
        if image_base64.is_empty() {
            return Err(GenLabError::InvalidRequest(
                "Please upload a source image first.".into(),
            ));
        }

        let prompt = if req.prompt.trim().is_empty() {
            DEFAULT_VIDEO_PROMPT.to_string()
        } else {
            req.prompt.clone()
        };

        let mime_type = if req.mime_type.trim().is_empty() {
            detect_mime_from_base64(image_base64, "image/png")
        } else {
            req.mime_type.trim().to_string()
        };

        Ok(Self {
            prompt,
            image_base64: image_base64.to_string(),
            mime_type,
            aspect_ratio: req.aspect_ratio,
            resolution: VIDEO_RESOLUTION.to_string(),
            number_of_videos: 1,
        })
    }
}

/// Handle to a long-running video generation operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoJob {
    /// Operation resource name, used to poll.
    pub name: String,
    /// Whether the operation has finished.
    pub done: bool,
    /// URI of the first generated video, once done.
    pub video_uri: Option<String>,
    /// Error reported by the operation, if any.
    pub error: Option<String>,
    /// Number of outputs removed by safety filters.
    pub filtered_count: u32,
}

impl VideoJob {
    /// A freshly submitted, unfinished job.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A finished job with a video URI.
    pub fn finished(name: impl Into<String>, video_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            video_uri: Some(video_uri.into()),
            ..Self::default()
        }
    }
}

//! Error types for search and video generation.

use std::time::Duration;

/// Marker the Gemini API puts in the message when the credential's project
/// cannot see the requested model or operation.
pub const ENTITY_NOT_FOUND_MARKER: &str = "Requested entity was not found";

/// Longest error body kept in an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while talking to the generative-AI service.
#[derive(Debug, thiserror::Error)]
pub enum GenLabError {
    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Polling exceeded its time bound.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Polling exceeded its attempt bound.
    #[error("operation still running after {attempts} status checks")]
    PollExhausted { attempts: u32 },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response stream broke off or carried malformed events.
    #[error("stream error: {0}")]
    Stream(String),

    /// The video operation finished with an error.
    #[error("video generation failed: {0}")]
    VideoGeneration(String),

    /// The video operation finished without a downloadable asset.
    #[error("no video URI returned")]
    NoAsset,
}

impl GenLabError {
    /// Returns true if the vendor reported that the requested entity does
    /// not exist for this credential.
    ///
    /// The API exposes no structured code for this case that differs from a
    /// plain 404, so this matches on the human-readable message.
    pub fn is_entity_not_found(&self) -> bool {
        self.to_string().contains(ENTITY_NOT_FOUND_MARKER)
    }

    /// Returns true if this error is likely transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_)
        )
    }

    /// Returns the suggested retry delay, if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            Self::Network(_) => Some(Duration::from_secs(2)),
            _ => None,
        }
    }

    /// Short text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { status: 404, .. } => {
                "Model not found (404). Verify your API key has access to this model.".into()
            }
            Self::Auth(_) | Self::Network(_) => {
                "Access denied. Verify API key validity or network status.".into()
            }
            Self::RateLimited { .. } => "Quota exceeded. Try again later.".into(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for genlab operations.
pub type Result<T> = std::result::Result<T, GenLabError>;

/// Trims an API error body to a bounded length and masks any `key=` query
/// values so credentials echoed back by the server never reach logs.
pub fn sanitize_error_message(text: &str) -> String {
    let text = text.trim();
    let mut out = String::with_capacity(text.len().min(MAX_ERROR_MESSAGE_LEN));
    let mut rest = text;

    while let Some(pos) = rest.find("key=") {
        out.push_str(&rest[..pos + 4]);
        out.push_str("***");
        rest = &rest[pos + 4..];
        let end = rest
            .find(|c: char| c == '&' || c == '"' || c == '\'' || c.is_whitespace())
            .unwrap_or(rest.len());
        rest = &rest[end..];
    }
    out.push_str(rest);

    if out.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = out.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        return format!("{truncated}...");
    }
    out
}

/// Reads a `Retry-After` header given in whole seconds.
pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

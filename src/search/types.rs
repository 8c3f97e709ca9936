//! Core types for grounded search.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// Text returned when the stream produced no text at all.
pub const EMPTY_RESPONSE_TEXT: &str = "No response generated.";

/// Text models that support the Google Search tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchModel {
    /// Gemini 2.5 Flash.
    #[default]
    Gemini25Flash,
    /// Gemini 2.0 Flash.
    Gemini20Flash,
    /// Any other model identifier.
    Custom(String),
}

impl SearchModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Gemini20Flash => "gemini-2.0-flash",
            Self::Custom(id) => id,
        }
    }

    /// Models offered out of the box, with display names.
    pub fn known() -> [(Self, &'static str); 2] {
        [
            (Self::Gemini25Flash, "Gemini 2.5 Flash"),
            (Self::Gemini20Flash, "Gemini 2.0 Flash"),
        ]
    }
}

impl FromStr for SearchModel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "gemini-2.5-flash" => Self::Gemini25Flash,
            "gemini-2.0-flash" => Self::Gemini20Flash,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl std::fmt::Display for SearchModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grounded search query.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Free-text query.
    pub query: String,
    /// Model override; the client's configured model is used when `None`.
    pub model: Option<SearchModel>,
}

impl SearchRequest {
    /// Creates a request for the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            model: None,
        }
    }

    /// Sets the model.
    pub fn with_model(mut self, model: SearchModel) -> Self {
        self.model = Some(model);
        self
    }
}

/// A web source backing part of the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Display title of the source page.
    pub title: String,
    /// Source URI.
    pub uri: String,
}

impl Citation {
    /// Creates a citation.
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }
}

/// One decoded element of a streaming response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamChunk {
    /// Text carried by this chunk.
    pub text: Option<String>,
    /// Citation snapshot, present when the chunk carried grounding metadata.
    /// The API resends the cumulative list, so each snapshot supersedes the
    /// previous one.
    pub citations: Option<Vec<Citation>>,
}

impl StreamChunk {
    /// A chunk carrying only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            citations: None,
        }
    }

    /// A chunk carrying only citations.
    pub fn citations(citations: Vec<Citation>) -> Self {
        Self {
            text: None,
            citations: Some(citations),
        }
    }
}

/// The finished answer of a grounded search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The full answer text.
    pub text: String,
    /// Sources from the last non-empty grounding snapshot.
    pub citations: Vec<Citation>,
}

//! Client for the Gemini Developer API.
//!
//! [`GenAiClient`] is the boundary the search and video flows talk to;
//! [`GeminiClient`] implements it over REST. A [`ClientFactory`] builds a
//! client for a given credential, which lets the key resolver swap keys
//! without knowing how clients are made.

mod wire;

use crate::credential::Credential;
use crate::error::{parse_retry_after, sanitize_error_message, GenLabError, Result};
use crate::search::types::StreamChunk;
use crate::video::types::{VideoJob, VideoSubmission};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

use wire::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, VeoOperationResponse, VeoRequest};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Ordered stream of decoded response chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Operations the flows need from the generative-AI service.
#[async_trait]
pub trait GenAiClient: Send + Sync {
    /// Opens a streaming generation with Google Search grounding.
    async fn stream_generate(&self, model: &str, query: &str) -> Result<ChunkStream>;

    /// Submits an image-to-video job.
    async fn submit_video(&self, model: &str, submission: &VideoSubmission) -> Result<VideoJob>;

    /// Re-fetches the status of a submitted job.
    async fn fetch_video_job(&self, job: &VideoJob) -> Result<VideoJob>;
}

/// Builds a client bound to one credential.
pub trait ClientFactory: Send + Sync {
    /// Returns a client that authenticates with `credential`.
    fn connect(&self, credential: Credential) -> Arc<dyn GenAiClient>;
}

/// Factory for [`GeminiClient`]s sharing one HTTP connection pool.
#[derive(Debug, Clone)]
pub struct GeminiClientFactory {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClientFactory {
    /// Creates a factory targeting `base_url`.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl ClientFactory for GeminiClientFactory {
    fn connect(&self, credential: Credential) -> Arc<dyn GenAiClient> {
        Arc::new(GeminiClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            api_key: credential,
        })
    }
}

/// REST client for one credential.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Credential,
}

impl GeminiClient {
    /// Creates a client against the public endpoint.
    pub fn new(api_key: Credential) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let headers = response.headers().clone();
        let text = response.text().await.unwrap_or_default();
        Err(parse_error(status.as_u16(), &text, &headers))
    }
}

#[async_trait]
impl GenAiClient for GeminiClient {
    async fn stream_generate(&self, model: &str, query: &str) -> Result<ChunkStream> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        );
        let body = GenerateContentRequest::grounded(query);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let stream = response
            .bytes_stream()
            .eventsource()
            .filter_map(|event| async move {
                match event {
                    Ok(event) => decode_event(&event.data),
                    Err(e) => Some(Err(GenLabError::Stream(e.to_string()))),
                }
            });

        Ok(Box::pin(stream))
    }

    async fn submit_video(&self, model: &str, submission: &VideoSubmission) -> Result<VideoJob> {
        let url = format!("{}/v1beta/models/{}:predictLongRunning", self.base_url, model);
        let body = VeoRequest::from_submission(submission);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let operation: VeoOperationResponse = response.json().await?;
        Ok(operation.into())
    }

    async fn fetch_video_job(&self, job: &VideoJob) -> Result<VideoJob> {
        let url = format!("{}/v1beta/{}", self.base_url, job.name);

        let response = self
            .http
            .get(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .send()
            .await?;
        let response = Self::check(response).await?;

        let operation: VeoOperationResponse = response.json().await?;
        Ok(operation.into())
    }
}

/// Decodes one SSE payload; keep-alives and blank events yield nothing.
///
/// The server may report a failure inside an already-open stream as an
/// error envelope event; that becomes an `Api` error.
fn decode_event(data: &str) -> Option<Result<StreamChunk>> {
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(data) {
        let error = envelope.error;
        let status = error
            .code
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(500);
        let message = error
            .message
            .map(|m| sanitize_error_message(&m))
            .unwrap_or_else(|| "Unknown error".into());
        return Some(Err(GenLabError::Api { status, message }));
    }
    Some(
        serde_json::from_str::<GenerateContentResponse>(data)
            .map(StreamChunk::from)
            .map_err(GenLabError::from),
    )
}

/// Maps a non-success response to an error, keeping the server's message.
fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> GenLabError {
    let message = serde_json::from_str::<ErrorEnvelope>(text)
        .ok()
        .and_then(|env| env.error.message)
        .map(|m| sanitize_error_message(&m))
        .unwrap_or_else(|| sanitize_error_message(text));

    match status {
        429 => {
            let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
            GenLabError::RateLimited { retry_after }
        }
        401 | 403 => GenLabError::Auth(message),
        _ => GenLabError::Api { status, message },
    }
}

//! Gemini Developer API wire format.

use crate::search::types::{Citation, StreamChunk};
use crate::video::types::{VideoJob, VideoSubmission};
use serde::{Deserialize, Serialize};

// ── generateContent ─────────────────────────────────────────────────────────

/// Body of a `streamGenerateContent` call with Google Search grounding.
///
/// There is deliberately no `generationConfig`: the API rejects
/// `responseMimeType`/`responseSchema` together with the search tool.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub tools: Vec<Tool>,
}

impl GenerateContentRequest {
    pub fn grounded(query: &str) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![TextPart {
                    text: query.to_string(),
                }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TextPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Tool {
    pub google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
pub(crate) struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Part {
    #[serde(default)]
    pub text: Option<String>,
    /// Set on reasoning summaries, which are not part of the answer.
    #[serde(default)]
    pub thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl From<GenerateContentResponse> for StreamChunk {
    fn from(response: GenerateContentResponse) -> Self {
        let Some(candidate) = response.candidates.into_iter().next() else {
            return StreamChunk::default();
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text)
            .collect();

        let citations = candidate
            .grounding_metadata
            .and_then(|m| m.grounding_chunks)
            .map(|chunks| {
                chunks
                    .into_iter()
                    .filter_map(|c| c.web)
                    .filter_map(|web| {
                        let uri = web.uri?;
                        let title = web.title.unwrap_or_else(|| uri.clone());
                        Some(Citation { title, uri })
                    })
                    .collect()
            });

        StreamChunk {
            text: (!text.is_empty()).then_some(text),
            citations,
        }
    }
}

// ── predictLongRunning ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VeoRequest {
    pub instances: Vec<VeoInstance>,
    pub parameters: VeoParameters,
}

/// Inline data wrapper (`{"inlineData": {"mimeType": "...", "data": "..."}}`).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VeoMediaData {
    pub inline_data: VeoInlineData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VeoInlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct VeoInstance {
    pub prompt: String,
    pub image: VeoMediaData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VeoParameters {
    pub aspect_ratio: String,
    pub resolution: String,
    pub number_of_videos: u32,
}

impl VeoRequest {
    pub fn from_submission(sub: &VideoSubmission) -> Self {
        Self {
            instances: vec![VeoInstance {
                prompt: sub.prompt.clone(),
                image: VeoMediaData {
                    inline_data: VeoInlineData {
                        mime_type: sub.mime_type.clone(),
                        data: sub.image_base64.clone(),
                    },
                },
            }],
            parameters: VeoParameters {
                aspect_ratio: sub.aspect_ratio.as_str().to_string(),
                resolution: sub.resolution.clone(),
                number_of_videos: sub.number_of_videos,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VeoOperationResponse {
    pub name: String,
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default)]
    pub response: Option<VeoVideoResponse>,
    #[serde(default)]
    pub error: Option<StatusError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VeoVideoResponse {
    #[serde(default)]
    pub generate_video_response: Option<VeoGenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VeoGenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Option<Vec<VeoGeneratedSample>>,
    #[serde(default)]
    pub rai_media_filtered_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VeoGeneratedSample {
    #[serde(default)]
    pub video: Option<VeoVideo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VeoVideo {
    #[serde(default)]
    pub uri: Option<String>,
}

impl From<VeoOperationResponse> for VideoJob {
    fn from(op: VeoOperationResponse) -> Self {
        let generated = op.response.and_then(|r| r.generate_video_response);
        let filtered_count = generated
            .as_ref()
            .and_then(|g| g.rai_media_filtered_count)
            .unwrap_or(0);
        let video_uri = generated
            .and_then(|g| g.generated_samples)
            .and_then(|samples| samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);

        VideoJob {
            name: op.name,
            done: op.done.unwrap_or(false),
            video_uri,
            error: op
                .error
                .map(|e| e.message.unwrap_or_else(|| "Unknown error".into())),
            filtered_count,
        }
    }
}

// ── errors ──────────────────────────────────────────────────────────────────

/// `google.rpc.Status`, used both for operation errors and HTTP error bodies.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: StatusError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::types::{AspectRatio, VideoRequest};

    #[test]
    fn test_grounded_request_shape() {
        let json = serde_json::to_value(GenerateContentRequest::grounded("who won?")).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "who won?");
        assert_eq!(json["tools"], serde_json::json!([{"googleSearch": {}}]));
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_chunk_text_and_citations() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Hello "}, {"text": "world"}], "role": "model"},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://a.test", "title": "A"}},
                        {"web": {"uri": "https://b.test"}},
                        {"retrievedContext": {}}
                    ]
                }
            }]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let chunk = StreamChunk::from(resp);
        assert_eq!(chunk.text.as_deref(), Some("Hello world"));
        assert_eq!(
            chunk.citations.unwrap(),
            vec![
                Citation::new("A", "https://a.test"),
                Citation::new("https://b.test", "https://b.test"),
            ]
        );
    }

    #[test]
    fn test_chunk_skips_thoughts() {
        let json = r#"{"candidates": [{"content": {"parts": [
            {"text": "thinking...", "thought": true},
            {"text": "answer"}
        ]}}]}"#;
        let chunk = StreamChunk::from(serde_json::from_str::<GenerateContentResponse>(json).unwrap());
        assert_eq!(chunk.text.as_deref(), Some("answer"));
        assert!(chunk.citations.is_none());
    }

    #[test]
    fn test_chunk_without_candidates() {
        let json = r#"{"usageMetadata": {"promptTokenCount": 3}}"#;
        let chunk = StreamChunk::from(serde_json::from_str::<GenerateContentResponse>(json).unwrap());
        assert_eq!(chunk, StreamChunk::default());
    }

    #[test]
    fn test_veo_request_serialization() {
        let req = VideoRequest::new("data:image/png;base64,iVBORw0KGgo=", "image/png")
            .with_aspect_ratio(AspectRatio::Portrait);
        let sub = VideoSubmission::from_request(&req).unwrap();
        let json = serde_json::to_value(VeoRequest::from_submission(&sub)).unwrap();

        let instance = &json["instances"][0];
        assert_eq!(instance["prompt"], "Animate this image cinematically.");
        assert_eq!(instance["image"]["inlineData"]["mimeType"], "image/png");
        assert_eq!(instance["image"]["inlineData"]["data"], "iVBORw0KGgo=");

        let params = &json["parameters"];
        assert_eq!(params["aspectRatio"], "9:16");
        assert_eq!(params["resolution"], "720p");
        assert_eq!(params["numberOfVideos"], 1);
    }

    #[test]
    fn test_operation_not_done() {
        let json = r#"{"name": "models/veo/operations/123"}"#;
        let job = VideoJob::from(serde_json::from_str::<VeoOperationResponse>(json).unwrap());
        assert_eq!(job, VideoJob::pending("models/veo/operations/123"));
    }

    #[test]
    fn test_operation_done_with_video() {
        let json = r#"{
            "name": "operations/123",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [{
                        "video": {"uri": "https://example.com/v1beta/files/abc:download?alt=media"}
                    }]
                }
            }
        }"#;
        let job = VideoJob::from(serde_json::from_str::<VeoOperationResponse>(json).unwrap());
        assert!(job.done);
        assert_eq!(
            job.video_uri.as_deref(),
            Some("https://example.com/v1beta/files/abc:download?alt=media")
        );
    }

    #[test]
    fn test_operation_filtered() {
        let json = r#"{
            "name": "operations/123",
            "done": true,
            "response": {"generateVideoResponse": {"raiMediaFilteredCount": 1}}
        }"#;
        let job = VideoJob::from(serde_json::from_str::<VeoOperationResponse>(json).unwrap());
        assert!(job.video_uri.is_none());
        assert_eq!(job.filtered_count, 1);
    }

    #[test]
    fn test_operation_with_error() {
        let json = r#"{"name": "operations/123", "done": true, "error": {"code": 8, "message": "Quota exceeded"}}"#;
        let job = VideoJob::from(serde_json::from_str::<VeoOperationResponse>(json).unwrap());
        assert_eq!(job.error.as_deref(), Some("Quota exceeded"));
    }

    #[test]
    fn test_error_envelope() {
        let json = r#"{"error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}}"#;
        let env: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.error.message.as_deref(), Some("Requested entity was not found."));
    }
}

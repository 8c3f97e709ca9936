//! Grounded search: streaming text generation with Google Search.

pub mod types;

use crate::credential::Credential;
use crate::error::{GenLabError, Result};
use crate::gemini::ChunkStream;
use crate::resolver::KeyResolver;
use futures::StreamExt;
use types::EMPTY_RESPONSE_TEXT;

pub use types::{Citation, SearchModel, SearchRequest, SearchResult, StreamChunk};

/// Per-token callback; called once for each text fragment, in order.
pub type TokenCallback<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Runs a grounded search.
///
/// Opening the stream is covered by the resolver's re-authentication retry;
/// failures after the first chunk propagate as-is, and tokens already handed
/// to `on_token` stay delivered.
pub async fn search(
    resolver: &KeyResolver,
    query: &str,
    model: &SearchModel,
    credential: Option<&Credential>,
    on_token: Option<TokenCallback<'_>>,
) -> Result<SearchResult> {
    if query.trim().is_empty() {
        return Err(GenLabError::InvalidRequest("search query is empty".into()));
    }

    let model_id = model.as_str();
    tracing::debug!(model = model_id, "opening grounded search stream");

    let (_, stream) = resolver
        .with_reauth(credential, |client| async move {
            client.stream_generate(model_id, query).await
        })
        .await?;

    let result = collect_stream(stream, on_token).await?;
    tracing::info!(
        model = model_id,
        chars = result.text.len(),
        citations = result.citations.len(),
        "grounded search complete"
    );
    Ok(result)
}

/// Drains a chunk stream into a [`SearchResult`].
///
/// Text fragments are concatenated in order and forwarded to `on_token`.
/// Each non-empty citation snapshot replaces the previous one.
pub async fn collect_stream(
    mut stream: ChunkStream,
    mut on_token: Option<TokenCallback<'_>>,
) -> Result<SearchResult> {
    let mut text = String::new();
    let mut citations: Vec<Citation> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;

        if let Some(fragment) = chunk.text.as_deref().filter(|t| !t.is_empty()) {
            text.push_str(fragment);
            if let Some(callback) = on_token.as_deref_mut() {
                callback(fragment);
            }
        }

        if let Some(snapshot) = chunk.citations.filter(|c| !c.is_empty()) {
            citations = snapshot;
        }
    }

    if text.is_empty() {
        text = EMPTY_RESPONSE_TEXT.to_string();
    }
    Ok(SearchResult { text, citations })
}

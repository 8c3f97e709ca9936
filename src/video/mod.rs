//! Image-to-video generation with Veo.

mod poll;
pub mod types;

use crate::credential::Credential;
use crate::error::{GenLabError, Result};
use crate::resolver::KeyResolver;
use std::time::Instant;

pub use poll::{poll_until_done, PollPolicy, DEFAULT_POLL_INTERVAL};
pub use types::{
    AspectRatio, VeoModel, VideoJob, VideoRequest, VideoSubmission, DEFAULT_VIDEO_PROMPT,
};

/// Generates a video from a source image and returns its download URL.
///
/// The URL carries the credential as a `key` query parameter, which the
/// file endpoint requires; treat it as a secret.
pub async fn generate_video(
    resolver: &KeyResolver,
    request: &VideoRequest,
    model: &VeoModel,
    credential: Option<&Credential>,
    policy: &PollPolicy,
) -> Result<String> {
    let start = Instant::now();
    let submission = VideoSubmission::from_request(request)?;
    let model_id = model.as_str();

    let (client, job) = resolver
        .with_reauth(credential, |client| {
            let submission = &submission;
            async move { client.submit_video(model_id, submission).await }
        })
        .await?;
    tracing::debug!(operation = %job.name, model = model_id, "submitted video generation request");

    let job = poll_until_done(client.as_ref(), job, policy).await?;
    let video_uri = finished_video_uri(job)?;

    tracing::info!(
        model = model_id,
        duration_ms = start.elapsed().as_millis() as u64,
        "video generation complete"
    );
    Ok(download_url(&video_uri, &resolver.download_key(credential)))
}

/// Extracts the asset URI from a finished job.
fn finished_video_uri(job: VideoJob) -> Result<String> {
    if let Some(message) = job.error {
        return Err(GenLabError::VideoGeneration(message));
    }
    match job.video_uri {
        Some(uri) => Ok(uri),
        None if job.filtered_count > 0 => Err(GenLabError::ContentBlocked(
            "Video was filtered by Veo safety filters".into(),
        )),
        None => Err(GenLabError::NoAsset),
    }
}

/// Appends the credential the file endpoint expects.
///
/// Generated file URIs already carry `?alt=media`, so the key is always
/// joined with `&`.
pub fn download_url(video_uri: &str, key: &Credential) -> String {
    format!("{}&key={}", video_uri, key.expose())
}

//! Polling of long-running video operations.

use crate::error::{GenLabError, Result};
use crate::gemini::GenAiClient;
use crate::video::types::VideoJob;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default wait between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How to wait for a video job to finish.
///
/// The default polls every five seconds with no bound, which is how the
/// service is normally used; set `max_attempts`, `timeout` or `cancel` to
/// stop waiting early.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Wait between status checks.
    pub interval: Duration,
    /// Maximum number of status checks.
    pub max_attempts: Option<u32>,
    /// Maximum total time spent polling.
    pub timeout: Option<Duration>,
    /// Cancels polling when triggered.
    pub cancel: Option<CancellationToken>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            timeout: None,
            cancel: None,
        }
    }
}

impl PollPolicy {
    /// Creates the default unbounded policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wait between status checks.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bounds the number of status checks.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Bounds the total polling time.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attaches a cancellation token.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    async fn wait(&self, delay: Duration) -> Result<()> {
        match &self.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(GenLabError::Cancelled),
                _ = tokio::time::sleep(delay) => Ok(()),
            },
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }

    /// Time left before the timeout, or `Timeout` once it has passed.
    fn remaining(&self, start: Instant) -> Result<Option<Duration>> {
        match self.timeout {
            Some(timeout) => match timeout.checked_sub(start.elapsed()) {
                Some(left) if !left.is_zero() => Ok(Some(left)),
                _ => Err(GenLabError::Timeout(timeout)),
            },
            None => Ok(None),
        }
    }
}

/// Re-fetches `job` until it reports done, honouring the policy's bounds.
///
/// A job that is already done is returned without any request.
pub async fn poll_until_done(
    client: &dyn GenAiClient,
    mut job: VideoJob,
    policy: &PollPolicy,
) -> Result<VideoJob> {
    let start = Instant::now();
    let mut attempts = 0u32;

    while !job.done {
        if policy.is_cancelled() {
            return Err(GenLabError::Cancelled);
        }
        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                return Err(GenLabError::PollExhausted { attempts });
            }
        }

        // Never sleep past the timeout.
        let delay = match policy.remaining(start)? {
            Some(left) => policy.interval.min(left),
            None => policy.interval,
        };
        policy.wait(delay).await?;
        policy.remaining(start)?;

        job = client.fetch_video_job(&job).await?;
        attempts += 1;

        tracing::debug!(
            operation = %job.name,
            attempts,
            elapsed_secs = start.elapsed().as_secs(),
            done = job.done,
            "polled Veo video generation"
        );
    }

    Ok(job)
}

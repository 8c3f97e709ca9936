//! In-memory doubles for the service and host boundaries.

use crate::credential::Credential;
use crate::error::{GenLabError, Result};
use crate::gemini::{ChunkStream, ClientFactory, GenAiClient};
use crate::host::KeySelector;
use crate::search::types::StreamChunk;
use crate::video::types::{VideoJob, VideoSubmission};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ServiceState {
    connected: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, (u16, String)>>,
    chunks: Mutex<Vec<StreamChunk>>,
    stream_error: Mutex<Option<String>>,
    submitted: Mutex<Vec<(String, String, VideoSubmission)>>,
    submit_reply: Mutex<Option<VideoJob>>,
    polls: Mutex<VecDeque<VideoJob>>,
    stream_calls: AtomicUsize,
    fetches: AtomicUsize,
}

/// Scripted stand-in for the generative-AI service.
#[derive(Clone, Default)]
pub(crate) struct ScriptedService {
    state: Arc<ServiceState>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(&self) -> Arc<dyn ClientFactory> {
        Arc::new(self.clone())
    }

    pub fn client(&self, key: &str) -> Arc<dyn GenAiClient> {
        self.connect(Credential::new(key))
    }

    /// Makes every stream/submit call made with `key` fail.
    pub fn fail_key(&self, key: &str, status: u16, message: &str) {
        self.state
            .failures
            .lock()
            .unwrap()
            .insert(key.to_string(), (status, message.to_string()));
    }

    pub fn set_chunks(&self, chunks: Vec<StreamChunk>) {
        *self.state.chunks.lock().unwrap() = chunks;
    }

    /// Ends the scripted stream with an error after all chunks.
    pub fn set_stream_error(&self, message: &str) {
        *self.state.stream_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_submit_reply(&self, job: VideoJob) {
        *self.state.submit_reply.lock().unwrap() = Some(job);
    }

    pub fn push_poll(&self, job: VideoJob) {
        self.state.polls.lock().unwrap().push_back(job);
    }

    pub fn connected(&self) -> Vec<String> {
        self.state.connected.lock().unwrap().clone()
    }

    /// `(key, model, submission)` for each submit call.
    pub fn submitted(&self) -> Vec<(String, String, VideoSubmission)> {
        self.state.submitted.lock().unwrap().clone()
    }

    pub fn stream_calls(&self) -> usize {
        self.state.stream_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }
}

impl ClientFactory for ScriptedService {
    fn connect(&self, credential: Credential) -> Arc<dyn GenAiClient> {
        self.state
            .connected
            .lock()
            .unwrap()
            .push(credential.expose().to_string());
        Arc::new(ScriptedClient {
            state: self.state.clone(),
            key: credential.expose().to_string(),
        })
    }
}

struct ScriptedClient {
    state: Arc<ServiceState>,
    key: String,
}

impl ScriptedClient {
    fn failure(&self) -> Option<GenLabError> {
        self.state
            .failures
            .lock()
            .unwrap()
            .get(&self.key)
            .map(|(status, message)| GenLabError::Api {
                status: *status,
                message: message.clone(),
            })
    }
}

#[async_trait]
impl GenAiClient for ScriptedClient {
    async fn stream_generate(&self, _model: &str, _query: &str) -> Result<ChunkStream> {
        self.state.stream_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure() {
            return Err(err);
        }
        let mut items: Vec<Result<StreamChunk>> = self
            .state
            .chunks
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(Ok)
            .collect();
        if let Some(message) = self.state.stream_error.lock().unwrap().clone() {
            items.push(Err(GenLabError::Stream(message)));
        }
        Ok(Box::pin(futures::stream::iter(items)))
    }

    async fn submit_video(&self, model: &str, submission: &VideoSubmission) -> Result<VideoJob> {
        self.state.submitted.lock().unwrap().push((
            self.key.clone(),
            model.to_string(),
            submission.clone(),
        ));
        if let Some(err) = self.failure() {
            return Err(err);
        }
        Ok(self
            .state
            .submit_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| VideoJob::pending("operations/scripted")))
    }

    async fn fetch_video_job(&self, _job: &VideoJob) -> Result<VideoJob> {
        self.state.fetches.fetch_add(1, Ordering::SeqCst);
        self.state
            .polls
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GenLabError::Stream("no scripted poll left".into()))
    }
}

/// Scripted host key selector.
#[derive(Default)]
pub(crate) struct ScriptedHost {
    key: Mutex<Option<Credential>>,
    next_key: Mutex<Option<Credential>>,
    has_key_queries: AtomicUsize,
    opens: AtomicUsize,
}

impl ScriptedHost {
    /// A host that already has `key` selected.
    pub fn with_key(key: &str) -> Arc<Self> {
        Arc::new(Self {
            key: Mutex::new(Some(Credential::new(key))),
            ..Self::default()
        })
    }

    /// A host with nothing selected whose selection flow yields `picked`.
    pub fn without_key(picked: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            next_key: Mutex::new(picked.map(Credential::new)),
            ..Self::default()
        })
    }

    /// Key the next selection flow will produce.
    pub fn set_next_key(&self, key: &str) {
        *self.next_key.lock().unwrap() = Some(Credential::new(key));
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn has_key_queries(&self) -> usize {
        self.has_key_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySelector for ScriptedHost {
    async fn has_selected_key(&self) -> bool {
        self.has_key_queries.fetch_add(1, Ordering::SeqCst);
        self.key.lock().unwrap().is_some()
    }

    async fn open_select_key(&self) {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.next_key.lock().unwrap().take() {
            *self.key.lock().unwrap() = Some(next);
        }
    }

    fn current_key(&self) -> Option<Credential> {
        self.key.lock().unwrap().clone()
    }
}

//! Runtime configuration.

use crate::credential::Credential;
use crate::gemini::{GeminiClientFactory, DEFAULT_BASE_URL};
use crate::host::KeySelector;
use crate::resolver::KeyResolver;
use crate::search::SearchModel;
use crate::video::{PollPolicy, VeoModel, DEFAULT_POLL_INTERVAL};
use std::sync::Arc;
use std::time::Duration;

/// Environment variables checked, in order, for the fallback key.
pub const KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "API_KEY"];

/// Environment variable overriding the API root.
pub const BASE_URL_ENV_VAR: &str = "GENLAB_BASE_URL";

/// Settings shared by both flows.
///
/// The fallback key is read once when the config is built; later changes to
/// the environment are not picked up.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key used when neither the caller nor the host supplies one.
    pub fallback_key: Credential,
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Default model for grounded search.
    pub search_model: SearchModel,
    /// Default model for video generation.
    pub video_model: VeoModel,
    /// Wait between video status checks.
    pub poll_interval: Duration,
    /// Maximum number of video status checks.
    pub max_poll_attempts: Option<u32>,
    /// Maximum total time spent polling.
    pub poll_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_key: Credential::empty(),
            base_url: DEFAULT_BASE_URL.to_string(),
            search_model: SearchModel::default(),
            video_model: VeoModel::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: None,
            poll_timeout: None,
        }
    }
}

impl Config {
    /// Creates a new `ConfigBuilder`.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Reads the fallback key and base URL from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Config::from_env`], with a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let fallback_key = KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
            .map(Credential::new)
            .unwrap_or_default();

        let mut builder = ConfigBuilder::new().fallback_key(fallback_key);
        if let Some(url) = lookup(BASE_URL_ENV_VAR).filter(|u| !u.trim().is_empty()) {
            builder = builder.base_url(url);
        }
        builder.build()
    }

    /// Builds a key resolver talking to `base_url`, optionally backed by a host.
    pub fn key_resolver(&self, host: Option<Arc<dyn KeySelector>>) -> KeyResolver {
        let factory = GeminiClientFactory::new(reqwest::Client::new(), self.base_url.clone());
        let resolver = KeyResolver::new(Arc::new(factory), self.fallback_key.clone());
        match host {
            Some(host) => resolver.with_host(host),
            None => resolver,
        }
    }

    /// Polling policy from the configured interval and bounds.
    pub fn poll_policy(&self) -> PollPolicy {
        let mut policy = PollPolicy::new().interval(self.poll_interval);
        if let Some(attempts) = self.max_poll_attempts {
            policy = policy.max_attempts(attempts);
        }
        if let Some(timeout) = self.poll_timeout {
            policy = policy.timeout(timeout);
        }
        policy
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback key.
    pub fn fallback_key(mut self, key: impl Into<Credential>) -> Self {
        self.config.fallback_key = key.into();
        self
    }

    /// Sets the API root.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the default search model.
    pub fn search_model(mut self, model: SearchModel) -> Self {
        self.config.search_model = model;
        self
    }

    /// Sets the default video model.
    pub fn video_model(mut self, model: VeoModel) -> Self {
        self.config.video_model = model;
        self
    }

    /// Sets the wait between video status checks.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Bounds the number of video status checks.
    pub fn max_poll_attempts(mut self, attempts: u32) -> Self {
        self.config.max_poll_attempts = Some(attempts);
        self
    }

    /// Bounds the total polling time.
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.config.poll_timeout = Some(timeout);
        self
    }

    /// Finishes the config.
    pub fn build(self) -> Config {
        self.config
    }
}

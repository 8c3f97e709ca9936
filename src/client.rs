//! High-level entry point tying config, key resolution and both flows together.

use crate::config::Config;
use crate::credential::Credential;
use crate::error::Result;
use crate::gemini::ClientFactory;
use crate::host::KeySelector;
use crate::resolver::KeyResolver;
use crate::search::{self, SearchRequest, SearchResult, TokenCallback};
use crate::video::{self, PollPolicy, VideoRequest};
use std::sync::Arc;

/// Grounded search and video generation with shared key handling.
///
/// ```no_run
/// use genlab::{Config, GenLab, SearchRequest};
///
/// #[tokio::main]
/// async fn main() -> genlab::Result<()> {
///     let lab = GenLab::new(Config::from_env());
///     let result = lab.search(&SearchRequest::new("Who won the 2024 Tour de France?"), None, None).await?;
///     println!("{}", result.text);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GenLab {
    config: Config,
    resolver: KeyResolver,
}

impl GenLab {
    /// Creates a client against the configured endpoint.
    pub fn new(config: Config) -> Self {
        let resolver = config.key_resolver(None);
        Self { config, resolver }
    }

    /// Creates a client with a custom service factory.
    pub fn from_parts(config: Config, factory: Arc<dyn ClientFactory>) -> Self {
        let resolver = KeyResolver::new(factory, config.fallback_key.clone());
        Self { config, resolver }
    }

    /// Attaches a host key selector.
    pub fn with_host(mut self, host: Arc<dyn KeySelector>) -> Self {
        self.resolver = self.resolver.with_host(host);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The key resolver shared by both flows.
    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    /// Runs a grounded search, using the request's model or the configured default.
    pub async fn search(
        &self,
        request: &SearchRequest,
        credential: Option<&Credential>,
        on_token: Option<TokenCallback<'_>>,
    ) -> Result<SearchResult> {
        let model = request.model.as_ref().unwrap_or(&self.config.search_model);
        search::search(&self.resolver, &request.query, model, credential, on_token).await
    }

    /// Generates a video with the configured polling policy.
    pub async fn generate_video(
        &self,
        request: &VideoRequest,
        credential: Option<&Credential>,
    ) -> Result<String> {
        self.generate_video_with(request, credential, &self.config.poll_policy())
            .await
    }

    /// Generates a video with an explicit polling policy.
    pub async fn generate_video_with(
        &self,
        request: &VideoRequest,
        credential: Option<&Credential>,
        policy: &PollPolicy,
    ) -> Result<String> {
        let model = request.model.as_ref().unwrap_or(&self.config.video_model);
        video::generate_video(&self.resolver, request, model, credential, policy).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchModel, StreamChunk};
    use crate::test_support::ScriptedService;
    use crate::video::{VeoModel, VideoJob};
    use std::time::Duration;

    #[tokio::test]
    async fn test_search_uses_configured_default_key() {
        let service = ScriptedService::new();
        service.set_chunks(vec![StreamChunk::text("hello")]);
        let lab = GenLab::from_parts(Config::builder().fallback_key("env").build(), service.factory());

        let result = lab
            .search(&SearchRequest::new("q").with_model(SearchModel::Gemini20Flash), None, None)
            .await
            .unwrap();

        assert_eq!(result.text, "hello");
        assert_eq!(service.connected(), vec!["env"]);
    }

    #[tokio::test]
    async fn test_video_uses_request_model_over_config() {
        let service = ScriptedService::new();
        service.set_submit_reply(VideoJob::finished("operations/x", "https://f.test/v?alt=media"));
        let config = Config::builder()
            .fallback_key("env")
            .video_model(VeoModel::Veo31)
            .poll_interval(Duration::from_millis(1))
            .build();
        let lab = GenLab::from_parts(config, service.factory());

        let request = VideoRequest::new("iVBORw0KGgo=", "image/png")
            .with_model(VeoModel::Custom("veo-test".into()));
        let url = lab.generate_video(&request, None).await.unwrap();

        assert_eq!(url, "https://f.test/v?alt=media&key=env");
        assert_eq!(service.submitted()[0].1, "veo-test");
    }
}

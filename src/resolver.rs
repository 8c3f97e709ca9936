//! Credential resolution and the one-shot re-authentication retry.

use crate::credential::Credential;
use crate::error::{GenLabError, Result};
use crate::gemini::{ClientFactory, GenAiClient};
use crate::host::KeySelector;
use std::future::Future;
use std::sync::Arc;

/// Turns an optional caller key into a ready client.
///
/// An explicit key is used as-is. Without one, the resolver asks the host
/// (if any) to make sure a key is selected, then uses the host's key or the
/// configured fallback. Keys are never checked up front; a bad key surfaces
/// as an error from the first request.
#[derive(Clone)]
pub struct KeyResolver {
    factory: Arc<dyn ClientFactory>,
    host: Option<Arc<dyn KeySelector>>,
    fallback_key: Credential,
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver")
            .field("has_host", &self.host.is_some())
            .field("fallback_key", &self.fallback_key)
            .finish()
    }
}

impl KeyResolver {
    /// Creates a resolver with no host integration.
    pub fn new(factory: Arc<dyn ClientFactory>, fallback_key: Credential) -> Self {
        Self {
            factory,
            host: None,
            fallback_key,
        }
    }

    /// Attaches a host key selector.
    pub fn with_host(mut self, host: Arc<dyn KeySelector>) -> Self {
        self.host = Some(host);
        self
    }

    /// Whether a host key selector is attached.
    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    /// The key used when the caller supplies none: the host's selection if
    /// it exposes one, else the configured fallback (possibly empty).
    pub fn ambient_key(&self) -> Credential {
        self.host
            .as_ref()
            .and_then(|h| h.current_key())
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| self.fallback_key.clone())
    }

    /// The key appended to download URLs.
    pub fn download_key(&self, explicit: Option<&Credential>) -> Credential {
        match Credential::non_empty(explicit) {
            Some(key) => key.clone(),
            None => self.ambient_key(),
        }
    }

    /// Builds a client for `explicit`, or for the ambient key after giving
    /// the host a chance to select one.
    pub async fn resolve(&self, explicit: Option<&Credential>) -> Arc<dyn GenAiClient> {
        if let Some(key) = Credential::non_empty(explicit) {
            return self.factory.connect(key.clone());
        }

        if let Some(host) = &self.host {
            if !host.has_selected_key().await {
                tracing::debug!("no key selected, opening host key selection");
                host.open_select_key().await;
            }
        }

        self.factory.connect(self.ambient_key())
    }

    /// Whether `err` from a first attempt warrants re-selecting the key.
    pub fn should_reauthenticate(&self, err: &GenLabError, explicit: Option<&Credential>) -> bool {
        Credential::non_empty(explicit).is_none() && self.host.is_some() && err.is_entity_not_found()
    }

    /// Runs `op` with a resolved client, retrying once with a freshly
    /// selected key when the first attempt fails with "entity not found"
    /// on an implicit key.
    ///
    /// Returns the client that produced the result so follow-up calls (job
    /// polling) use the same key.
    pub async fn with_reauth<T, F, Fut>(
        &self,
        explicit: Option<&Credential>,
        mut op: F,
    ) -> Result<(Arc<dyn GenAiClient>, T)>
    where
        F: FnMut(Arc<dyn GenAiClient>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let client = self.resolve(explicit).await;
        match op(client.clone()).await {
            Ok(value) => Ok((client, value)),
            Err(err) if self.should_reauthenticate(&err, explicit) => {
                tracing::warn!("requested entity not found with ambient key, re-selecting key and retrying once");
                if let Some(host) = &self.host {
                    host.open_select_key().await;
                }
                let client = self.resolve(None).await;
                let value = op(client.clone()).await?;
                Ok((client, value))
            }
            Err(err) => Err(err),
        }
    }
}

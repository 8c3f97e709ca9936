//! Host-mediated key selection.

use crate::credential::Credential;
use async_trait::async_trait;

/// An environment capability that can hand out an API key interactively.
///
/// Hosts that manage keys on the user's behalf (an embedding app, a terminal
/// prompt) implement this. The resolver only reads from it and asks it to
/// open its selection flow; storing the chosen key is the host's business.
#[async_trait]
pub trait KeySelector: Send + Sync {
    /// Whether a key has already been chosen.
    async fn has_selected_key(&self) -> bool;

    /// Runs the host's key-selection flow and resolves once it closes.
    async fn open_select_key(&self);

    /// The key chosen through the host, if the host exposes one.
    fn current_key(&self) -> Option<Credential> {
        None
    }
}

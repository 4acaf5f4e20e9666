use std::sync::Arc;

use crate::auth::CredentialSet;
use crate::error::ProviderError;
use crate::llm::{BackendFactory, PromptBackend};
use crate::routing::ProviderId;

/// Sends the final prompt to the rule's target provider.
///
/// This is the one step the gateway depends on: failures are returned, never
/// swallowed, and nothing is retried.
#[derive(Clone)]
pub struct Dispatcher {
    factory: Arc<dyn BackendFactory>,
}

impl Dispatcher {
    pub fn new(factory: Arc<dyn BackendFactory>) -> Self {
        Self { factory }
    }

    /// When `target` is the intermediary itself, the prompt goes straight back
    /// to the `intermediary` instance that already rewrote it, with no second
    /// rewrite.
    pub async fn dispatch(
        &self,
        prompt: &str,
        target: ProviderId,
        credentials: &CredentialSet,
        intermediary: &Arc<dyn PromptBackend>,
    ) -> Result<String, ProviderError> {
        let backend = if target == intermediary.provider() {
            intermediary.clone()
        } else {
            self.factory.build(target, credentials.token(target))
        };

        backend.submit(prompt).await
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::llm::{BackendFactory, PromptBackend};
use crate::routing::ProviderId;

/// Backend with a canned reply or error that records every prompt it sees.
pub(crate) struct ScriptedBackend {
    provider: ProviderId,
    reply: Option<String>,
    error: Mutex<Option<ProviderError>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub(crate) fn replying(provider: ProviderId, reply: &str) -> Self {
        Self {
            provider,
            reply: Some(reply.to_string()),
            error: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(provider: ProviderId, error: ProviderError) -> Self {
        Self {
            provider,
            reply: None,
            error: Mutex::new(Some(error)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PromptBackend for ScriptedBackend {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn submit(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(reply) = &self.reply {
            return Ok(reply.clone());
        }

        Err(self
            .error
            .lock()
            .unwrap()
            .take()
            .unwrap_or(ProviderError::Api {
                provider: self.provider,
                status: Some(500),
                message: "scripted failure".to_string(),
            }))
    }
}

/// Factory handing out one shared [`ScriptedBackend`] per provider.
#[derive(Default)]
pub(crate) struct ScriptedFactory {
    backends: HashMap<ProviderId, Arc<ScriptedBackend>>,
    builds: Mutex<Vec<(ProviderId, Option<String>)>>,
}

impl ScriptedFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, backend: ScriptedBackend) -> Self {
        self.backends.insert(backend.provider, Arc::new(backend));
        self
    }

    pub(crate) fn backend(&self, provider: ProviderId) -> Arc<ScriptedBackend> {
        self.backends
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| panic!("no scripted backend for {provider}"))
    }

    /// Every `build` call so far, with the credential it was given.
    pub(crate) fn builds(&self) -> Vec<(ProviderId, Option<String>)> {
        self.builds.lock().unwrap().clone()
    }
}

impl BackendFactory for ScriptedFactory {
    fn build(&self, provider: ProviderId, credential: Option<&str>) -> Arc<dyn PromptBackend> {
        self.builds
            .lock()
            .unwrap()
            .push((provider, credential.map(str::to_string)));

        match self.backends.get(&provider) {
            Some(backend) => backend.clone(),
            None => Arc::new(ScriptedBackend::failing(
                provider,
                ProviderError::MissingCredential { provider },
            )),
        }
    }
}

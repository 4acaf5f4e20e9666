use std::sync::Arc;
use std::time::Duration;

use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::llm::anthropic::AnthropicBackend;
use crate::llm::backend::PromptBackend;
use crate::llm::gemini::GeminiBackend;
use crate::llm::openai::OpenAiCompatBackend;
use crate::routing::ProviderId;

/// Builds a backend for one request from that request's resolved credential.
pub trait BackendFactory: Send + Sync {
    fn build(&self, provider: ProviderId, credential: Option<&str>) -> Arc<dyn PromptBackend>;
}

/// Production factory: real HTTP backends sharing one connection pool.
#[derive(Clone)]
pub struct HttpBackendFactory {
    config: Arc<ProvidersConfig>,
    http: reqwest::Client,
}

impl HttpBackendFactory {
    pub fn new(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| ProviderError::Http {
                provider: ProviderId::INTERMEDIARY,
                source,
            })?;

        Ok(Self {
            config: Arc::new(config.clone()),
            http,
        })
    }
}

impl BackendFactory for HttpBackendFactory {
    fn build(&self, provider: ProviderId, credential: Option<&str>) -> Arc<dyn PromptBackend> {
        let settings = self.config.get(provider);
        let http = self.http.clone();

        match provider {
            ProviderId::OpenAi | ProviderId::DeepSeek => Arc::new(OpenAiCompatBackend::new(
                provider, settings, credential, http,
            )),
            ProviderId::Anthropic => Arc::new(AnthropicBackend::new(
                settings,
                credential,
                self.config.anthropic_max_tokens,
                http,
            )),
            ProviderId::Gemini => Arc::new(GeminiBackend::new(settings, credential, http)),
        }
    }
}

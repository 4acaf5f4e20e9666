use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};
use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::llm::backend::{non_empty, require_key, PromptBackend};
use crate::routing::ProviderId;

/// Chat-completions backend for OpenAI and for DeepSeek, which exposes the
/// same schema under its own base URL.
#[derive(Clone)]
pub struct OpenAiCompatBackend {
    provider: ProviderId,
    api_key: Option<String>,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAiCompatBackend {
    pub fn new(
        provider: ProviderId,
        config: &ProviderConfig,
        api_key: Option<&str>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            provider,
            api_key: api_key.map(str::to_string),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn client(&self, api_key: &str) -> Client<OpenAIConfig> {
        let openai_config = OpenAIConfig::new()
            .with_api_base(self.base_url.clone())
            .with_api_key(api_key);

        // async-openai retries 429/5xx internally by default; an already
        // expired budget makes every call a single attempt.
        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        Client::with_config(openai_config)
            .with_http_client(self.http.clone())
            .with_backoff(backoff)
    }

    fn build_request(&self, prompt: &str) -> Result<CreateChatCompletionRequest, ProviderError> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|error| self.map_openai_error(error))?;

        CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(vec![message.into()])
            .build()
            .map_err(|error| self.map_openai_error(error))
    }

    fn extract_content(&self, response: CreateChatCompletionResponse) -> Result<String, ProviderError> {
        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode {
                provider: self.provider,
                message: "response contained no choices".to_string(),
            })?
            .message
            .content
            .unwrap_or_default();

        non_empty(self.provider, content)
    }

    fn map_openai_error(&self, error: OpenAIError) -> ProviderError {
        let provider = self.provider;
        match error {
            OpenAIError::Reqwest(source) => ProviderError::Http { provider, source },
            OpenAIError::ApiError(api_error) => ProviderError::Api {
                provider,
                status: None,
                message: api_error.message,
            },
            OpenAIError::JSONDeserialize(err) => ProviderError::Decode {
                provider,
                message: err.to_string(),
            },
            other => ProviderError::Api {
                provider,
                status: None,
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl PromptBackend for OpenAiCompatBackend {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn submit(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = require_key(self.provider, self.api_key.as_deref())?;
        let request = self.build_request(prompt)?;

        let response = self
            .client(api_key)
            .chat()
            .create(request)
            .await
            .map_err(|error| self.map_openai_error(error))?;

        self.extract_content(response)
    }
}

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::llm::backend::{api_error, non_empty, require_key, PromptBackend};
use crate::routing::ProviderId;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API backend.
#[derive(Clone)]
pub struct AnthropicBackend {
    api_key: Option<String>,
    model: String,
    base_url: String,
    max_tokens: u32,
    http: reqwest::Client,
}

impl AnthropicBackend {
    pub fn new(
        config: &ProviderConfig,
        api_key: Option<&str>,
        max_tokens: u32,
        http: reqwest::Client,
    ) -> Self {
        Self {
            api_key: api_key.map(str::to_string),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_tokens,
            http,
        }
    }
}

#[async_trait]
impl PromptBackend for AnthropicBackend {
    fn provider(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn submit(&self, prompt: &str) -> Result<String, ProviderError> {
        let provider = self.provider();
        let api_key = require_key(provider, self.api_key.as_deref())?;

        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::Http { provider, source })?;

        if !response.status().is_success() {
            return Err(api_error(provider, response).await);
        }

        let parsed: MessagesResponse =
            response
                .json()
                .await
                .map_err(|error| ProviderError::Decode {
                    provider,
                    message: error.to_string(),
                })?;

        let text = parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .unwrap_or_default();

        non_empty(provider, text)
    }
}

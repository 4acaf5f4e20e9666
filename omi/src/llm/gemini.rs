use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::llm::backend::{api_error, non_empty, require_key, PromptBackend};
use crate::routing::ProviderId;

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Google `generateContent` backend. Also serves as the prompt rewriter.
#[derive(Clone)]
pub struct GeminiBackend {
    api_key: Option<String>,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(config: &ProviderConfig, api_key: Option<&str>, http: reqwest::Client) -> Self {
        Self {
            api_key: api_key.map(str::to_string),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl PromptBackend for GeminiBackend {
    fn provider(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn submit(&self, prompt: &str) -> Result<String, ProviderError> {
        let provider = self.provider();
        let api_key = require_key(provider, self.api_key.as_deref())?;

        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::Http { provider, source })?;

        if !response.status().is_success() {
            return Err(api_error(provider, response).await);
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|error| ProviderError::Decode {
                    provider,
                    message: error.to_string(),
                })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        non_empty(provider, text)
    }
}

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::routing::ProviderId;

/// A backend that answers a single-turn text prompt with a single text reply.
///
/// Each provider speaks its own request/response schema; implementations
/// normalise that to this one shape so the pipeline never sees the
/// difference.
#[async_trait]
pub trait PromptBackend: Send + Sync {
    fn provider(&self) -> ProviderId;

    /// Submit `prompt` once. No retries happen here or below.
    async fn submit(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turns a non-success HTTP response into [`ProviderError::Api`].
///
/// Both the Anthropic and Gemini APIs wrap failures as
/// `{"error": {"message": ...}}`; anything else is reported verbatim.
pub(crate) async fn api_error(provider: ProviderId, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(source) => return ProviderError::Http { provider, source },
    };

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => body,
    };

    ProviderError::Api {
        provider,
        status: Some(status.as_u16()),
        message,
    }
}

pub(crate) fn require_key(
    provider: ProviderId,
    api_key: Option<&str>,
) -> Result<&str, ProviderError> {
    api_key.ok_or(ProviderError::MissingCredential { provider })
}

pub(crate) fn non_empty(provider: ProviderId, text: String) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::EmptyReply { provider })
    } else {
        Ok(text)
    }
}

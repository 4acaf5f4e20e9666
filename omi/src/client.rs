//! Thin HTTP client for the gateway, for callers embedding it in Rust.
//!
//! ```no_run
//! # async fn run() -> Result<(), omi::client::ClientError> {
//! let client = omi::client::GatewayClient::new("omi-pro-key-v1")?;
//! let reply = client.generate("What is 2 + 2?", "speed").await?;
//! println!("{} (via {})", reply.response, reply.meta.model);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;

use crate::api::dto::{ErrorDetail, GenerateRequest, GenerateResponse, HealthResponse};
use crate::api::API_KEY_HEADER;
use crate::routing::ProviderId;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Invalid header value for {0}")]
    InvalidHeader(String),
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    headers: HeaderMap,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(api_key: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let mut client = Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: HeaderMap::new(),
            http,
        };
        client.set_header(API_KEY_HEADER, api_key)?;
        Ok(client)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bills calls routed to `provider` to the caller's own key. The
    /// intermediary has no override header, so a key for it is ignored.
    pub fn with_provider_key(mut self, provider: ProviderId, key: &str) -> Result<Self, ClientError> {
        if let Some(name) = provider.override_header() {
            self.set_header(name, key)?;
        }
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn generate(&self, prompt: &str, mode: &str) -> Result<GenerateResponse, ClientError> {
        let body = GenerateRequest {
            prompt: prompt.to_string(),
            mode: mode.to_string(),
        };

        let response = self
            .http
            .post(format!("{}/generate", self.base_url))
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;

        Self::decode(response).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        Self::decode(response).await
    }

    fn set_header(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ClientError::InvalidHeader(name.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ClientError::InvalidHeader(name.to_string()))?;
        self.headers.insert(name, value);
        Ok(())
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorDetail>(&text)
            .map(|e| e.detail)
            .unwrap_or(text);

        Err(ClientError::Api {
            status: status.as_u16(),
            detail,
        })
    }
}

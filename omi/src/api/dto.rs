//! Wire types for the HTTP surface. Shared with [`crate::client`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::routing::{ProviderId, DEFAULT_MODE};

fn default_mode() -> String {
    DEFAULT_MODE.to_string()
}

/// Request body for `POST /generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerateRequest {
    pub prompt: String,
    /// One of `saving`, `coding`, `accuracy`, `balance`, `speed`. Unknown
    /// values are served as `balance`.
    #[serde(default = "default_mode")]
    #[schema(example = "balance")]
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerateMeta {
    /// Backend that produced the reply: `openai`, `deepseek`, `claude` or `gemini`.
    #[schema(value_type = String, example = "gemini")]
    pub model: ProviderId,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub response: String,
    pub meta: GenerateMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "operational")]
    pub status: String,
    pub version: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub detail: String,
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::routing::ProviderId;

/// Caller-visible failures. Everything else is absorbed where it happens.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid OMI Subscription Key.")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Dispatch(#[from] ProviderError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A single call to an LLM backend failed.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No API key available for {provider}")]
    MissingCredential { provider: ProviderId },

    #[error("{provider} request failed: {source}")]
    Http {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error: {message}")]
    Api {
        provider: ProviderId,
        status: Option<u16>,
        message: String,
    },

    #[error("{provider} returned an empty reply")]
    EmptyReply { provider: ProviderId },

    #[error("Failed to parse {provider} response: {message}")]
    Decode { provider: ProviderId, message: String },
}

impl ProviderError {
    pub fn provider(&self) -> ProviderId {
        match self {
            Self::MissingCredential { provider }
            | Self::Http { provider, .. }
            | Self::Api { provider, .. }
            | Self::EmptyReply { provider }
            | Self::Decode { provider, .. } => *provider,
        }
    }
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            GatewayError::Validation(msg) => msg.clone(),
            GatewayError::Internal(msg) => msg.clone(),
            GatewayError::Unauthorized
            | GatewayError::PayloadTooLarge
            | GatewayError::NotFound
            | GatewayError::MethodNotAllowed
            | GatewayError::Dispatch(_) => self.to_string(),
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

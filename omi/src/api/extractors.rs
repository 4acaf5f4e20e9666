use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};

use crate::auth::ProviderOverrides;
use crate::error::GatewayError;
use crate::routing::ProviderId;

/// Gateway credential header every `/generate` caller must send.
pub const API_KEY_HEADER: &str = "x-omi-api-key";

/// JSON body whose rejections render as `{"detail": ...}` with status 422.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(GatewayError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> GatewayError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            if let Some(field) = extract_missing_field(&message) {
                GatewayError::Validation(format!("Missing required field: {field}"))
            } else {
                GatewayError::Validation(format!("Invalid JSON: {message}"))
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            GatewayError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => {
            GatewayError::Validation("Missing `Content-Type: application/json` header".to_string())
        }
        JsonRejection::BytesRejection(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            GatewayError::PayloadTooLarge
        }
        JsonRejection::BytesRejection(_) => {
            GatewayError::Internal("Failed to read request body".to_string())
        }
        _ => GatewayError::Validation(rejection.body_text()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}

/// Credentials carried in `/generate` request headers.
///
/// A missing gateway credential is a shape error (422) and is rejected here,
/// before the body is read. Whether the credential is *valid* is decided later
/// by the authenticator.
#[derive(Debug)]
pub struct GatewayHeaders {
    pub api_key: String,
    pub overrides: ProviderOverrides,
}

impl<S> FromRequestParts<S> for GatewayHeaders
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let api_key = header_str(&parts.headers, API_KEY_HEADER)?.ok_or_else(|| {
            GatewayError::Validation(format!("Missing required header: {API_KEY_HEADER}"))
        })?;

        let mut overrides = ProviderOverrides::new();
        for provider in ProviderId::ALL {
            let Some(name) = provider.override_header() else {
                continue;
            };
            if let Some(key) = header_str(&parts.headers, name)? {
                overrides.insert(provider, key);
            }
        }

        Ok(Self {
            api_key: api_key.to_string(),
            overrides,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, GatewayError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| GatewayError::Validation(format!("Header {name} is not valid text")))
        })
        .transpose()
}

//! `POST /generate`: the gateway's single working endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::dto::{ErrorDetail, GenerateMeta, GenerateRequest, GenerateResponse};
use crate::api::extractors::{AppJson, GatewayHeaders};
use crate::api::AppState;
use crate::error::Result;
use crate::pipeline::GatewayRequest;

/// Rewrites the prompt for the requested mode, routes it to the mode's
/// backend and returns the sanitized reply.
///
/// Headers are checked before the body, so a request missing the gateway
/// credential is rejected with 422 even when its body is also malformed.
#[utoipa::path(
    post,
    path = "/generate",
    tag = "generate",
    request_body = GenerateRequest,
    params(
        ("x-omi-api-key" = String, Header, description = "Gateway subscription key"),
        ("x-openai-key" = Option<String>, Header, description = "Caller's own OpenAI key"),
        ("x-deepseek-key" = Option<String>, Header, description = "Caller's own DeepSeek key"),
        ("x-anthropic-key" = Option<String>, Header, description = "Caller's own Anthropic key"),
    ),
    responses(
        (status = 200, description = "Sanitized reply with routing metadata", body = GenerateResponse),
        (status = 401, description = "Invalid gateway key", body = ErrorDetail),
        (status = 422, description = "Malformed body or missing header", body = ErrorDetail),
        (status = 500, description = "Target backend failed", body = ErrorDetail),
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    headers: GatewayHeaders,
    AppJson(body): AppJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let request = GatewayRequest {
        prompt: body.prompt,
        mode: body.mode,
    };

    let outcome = state
        .pipeline
        .process(Some(&headers.api_key), &headers.overrides, request)
        .await?;

    let response = GenerateResponse {
        response: outcome.response,
        meta: GenerateMeta {
            model: outcome.target,
            mode: outcome.mode,
        },
    };

    state.notifier.notify(outcome.audit);

    Ok(Json(response))
}

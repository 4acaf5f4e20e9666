use axum::Json;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::extractors::API_KEY_HEADER;
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OMI Universal Gateway",
        version = "1.0.0",
        description = "Rewrites prompts per mode and routes them to the best-fit LLM backend.",
    ),
    paths(
        handlers::health::health_check,
        handlers::generate::generate,
    ),
    components(schemas(
        dto::GenerateRequest,
        dto::GenerateResponse,
        dto::GenerateMeta,
        dto::HealthResponse,
        dto::ErrorDetail,
    )),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "generate", description = "Prompt rewriting and routing"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "omi_api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}

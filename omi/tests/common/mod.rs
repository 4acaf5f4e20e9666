#![allow(dead_code)]

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use omi::api::{create_router, AppState};
use omi::audit::AuditNotifier;
use omi::config::{AuditConfig, Config, ProviderConfig, ProvidersConfig, ServerConfig};

pub const ADMIN_KEY: &str = "omi-pro-key-v1";
pub const WEBHOOK_SECRET: &str = "hook-secret";

/// One mock server per backend plus the audit sink.
pub struct Upstreams {
    pub openai: MockServer,
    pub deepseek: MockServer,
    pub anthropic: MockServer,
    pub gemini: MockServer,
    pub audit: MockServer,
}

impl Upstreams {
    pub async fn start() -> Self {
        Self {
            openai: MockServer::start().await,
            deepseek: MockServer::start().await,
            anthropic: MockServer::start().await,
            gemini: MockServer::start().await,
            audit: MockServer::start().await,
        }
    }

    pub fn config(&self) -> Config {
        let provider = |server: &MockServer, key: &str, model: &str| ProviderConfig {
            api_key: Some(key.to_string()),
            model: model.to_string(),
            base_url: server.uri(),
        };

        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                admin_key: Some(ADMIN_KEY.to_string()),
                max_body_bytes: 1024 * 1024,
            },
            providers: ProvidersConfig {
                openai: provider(&self.openai, "house-openai", "gpt-4o"),
                deepseek: provider(&self.deepseek, "house-deepseek", "deepseek-chat"),
                anthropic: provider(
                    &self.anthropic,
                    "house-anthropic",
                    "claude-3-5-sonnet-20241022",
                ),
                gemini: provider(&self.gemini, "house-google", "gemini-1.5-flash"),
                timeout_secs: 5,
                anthropic_max_tokens: 1024,
            },
            audit: Some(AuditConfig {
                webhook_url: format!("{}/webhook/omi", self.audit.uri()),
                secret: Some(WEBHOOK_SECRET.to_string()),
                timeout_ms: 1000,
            }),
        }
    }

    pub async fn accept_audit(&self) {
        Mock::given(method("POST"))
            .and(path("/webhook/omi"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.audit)
            .await;
    }

    pub async fn audit_records(&self) -> Vec<serde_json::Value> {
        self.audit
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }
}

/// A gateway bound to an ephemeral local port.
pub struct TestGateway {
    pub base_url: String,
    notifier: AuditNotifier,
}

impl TestGateway {
    pub async fn spawn(config: Config) -> Self {
        let state = AppState::from_config(config).expect("state should build");
        let notifier = state.notifier.clone();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            notifier,
        }
    }

    /// Waits for background audit deliveries to finish.
    pub async fn settle(&self) {
        self.notifier.drain().await;
    }
}

pub fn chat_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "test",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2 }
    })
}

pub fn anthropic_message(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    })
}

pub fn gemini_content(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

pub const GEMINI_PATH: &str = "/models/gemini-1.5-flash:generateContent";

use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use crate::audit::AuditRecord;
use crate::auth::{Authenticator, ProviderOverrides};
use crate::error::{GatewayError, Result};
use crate::llm::BackendFactory;
use crate::pipeline::{rewriter, Dispatcher, Sanitizer};
use crate::routing::{ProviderId, RuleTable, DEFAULT_MODE};

/// Where a request is in its single pass through the gateway.
///
/// Only `Authenticating` and `Dispatching` can move to `Failed`; every other
/// step is infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authenticating,
    RuleResolved,
    Rewriting,
    Dispatching,
    Sanitizing,
    Responding,
    Failed,
}

impl Stage {
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Authenticating => Some(Stage::RuleResolved),
            Stage::RuleResolved => Some(Stage::Rewriting),
            Stage::Rewriting => Some(Stage::Dispatching),
            Stage::Dispatching => Some(Stage::Sanitizing),
            Stage::Sanitizing => Some(Stage::Responding),
            Stage::Responding | Stage::Failed => None,
        }
    }

    pub fn is_fallible(self) -> bool {
        matches!(self, Stage::Authenticating | Stage::Dispatching)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Responding | Stage::Failed)
    }
}

struct StageTracker {
    current: Stage,
}

impl StageTracker {
    fn start() -> Self {
        tracing::debug!(stage = ?Stage::Authenticating, "Pipeline started");
        Self {
            current: Stage::Authenticating,
        }
    }

    fn advance(&mut self) {
        debug_assert!(!self.current.is_terminal(), "{:?} is terminal", self.current);
        if let Some(next) = self.current.next() {
            tracing::debug!(from = ?self.current, to = ?next, "Pipeline stage");
            self.current = next;
        }
    }

    fn fail(&mut self, error: GatewayError) -> GatewayError {
        debug_assert!(self.current.is_fallible(), "{:?} cannot fail", self.current);
        tracing::debug!(from = ?self.current, to = ?Stage::Failed, "Pipeline stage");
        self.current = Stage::Failed;
        error
    }
}

/// Caller payload for one `/generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub prompt: String,
    pub mode: String,
}

impl GatewayRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            mode: DEFAULT_MODE.to_string(),
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct GatewayOutcome {
    /// Sanitized reply.
    pub response: String,
    pub target: ProviderId,
    /// The mode as the caller sent it, even when it fell back to the default.
    pub mode: String,
    pub audit: AuditRecord,
}

/// Sequences one request: authenticate, resolve the rule, rewrite, dispatch,
/// sanitize. The audit record is returned for the caller to deliver once the
/// response is ready.
#[derive(Clone)]
pub struct GatewayPipeline {
    rules: Arc<RuleTable>,
    authenticator: Arc<Authenticator>,
    factory: Arc<dyn BackendFactory>,
    dispatcher: Dispatcher,
    sanitizer: Arc<Sanitizer>,
}

impl GatewayPipeline {
    pub fn new(
        rules: RuleTable,
        authenticator: Authenticator,
        factory: Arc<dyn BackendFactory>,
    ) -> Self {
        Self {
            rules: Arc::new(rules),
            authenticator: Arc::new(authenticator),
            dispatcher: Dispatcher::new(factory.clone()),
            factory,
            sanitizer: Arc::new(Sanitizer::default()),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = Arc::new(sanitizer);
        self
    }

    pub async fn process(
        &self,
        gateway_credential: Option<&str>,
        overrides: &ProviderOverrides,
        request: GatewayRequest,
    ) -> Result<GatewayOutcome> {
        let span = tracing::info_span!(
            "generate",
            request_id = %Uuid::new_v4(),
            mode = %request.mode,
        );

        self.run(gateway_credential, overrides, request)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        gateway_credential: Option<&str>,
        overrides: &ProviderOverrides,
        request: GatewayRequest,
    ) -> Result<GatewayOutcome> {
        let mut stage = StageTracker::start();

        let credentials = match self.authenticator.authenticate(gateway_credential, overrides) {
            Ok(credentials) => credentials,
            Err(error) => {
                tracing::info!("Rejected request with invalid gateway credential");
                return Err(stage.fail(error));
            }
        };
        stage.advance();

        let rule = self.rules.resolve(&request.mode);
        if rule.mode != request.mode {
            tracing::debug!(resolved = %rule.mode, "Unknown mode, using default rule");
        }
        stage.advance();

        let intermediary = self.factory.build(
            ProviderId::INTERMEDIARY,
            credentials.token(ProviderId::INTERMEDIARY),
        );
        let prompt = rewriter::rewrite(&request.prompt, &rule, intermediary.as_ref()).await;
        stage.advance();

        let raw = match self
            .dispatcher
            .dispatch(&prompt, rule.target, &credentials, &intermediary)
            .await
        {
            Ok(raw) => raw,
            Err(error) => {
                tracing::error!(target_provider = %rule.target, error = %error, "Dispatch failed");
                return Err(stage.fail(GatewayError::Dispatch(error)));
            }
        };
        stage.advance();

        let response = self.sanitizer.sanitize(&raw);
        stage.advance();

        let audit = AuditRecord {
            mode: request.mode.clone(),
            routed_to: rule.target,
            wallet: credentials.wallet(rule.target),
            prompt_len: request.prompt.chars().count(),
            response_len: response.chars().count(),
            timestamp: Utc::now(),
        };

        tracing::info!(
            routed_to = %rule.target,
            prompt_len = audit.prompt_len,
            response_len = audit.response_len,
            "Request completed"
        );

        Ok(GatewayOutcome {
            response,
            target: rule.target,
            mode: request.mode,
            audit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Wallet;
    use crate::error::ProviderError;
    use crate::llm::testing::{ScriptedBackend, ScriptedFactory};
    use crate::routing::ModeRule;

    const ADMIN: &str = "omi-pro-key-v1";

    fn authenticator() -> Authenticator {
        Authenticator::new(
            Some(ADMIN.to_string()),
            ProviderId::ALL.map(|p| (p, Some(format!("house-{p}")))),
        )
    }

    fn pipeline(factory: Arc<ScriptedFactory>) -> GatewayPipeline {
        GatewayPipeline::new(RuleTable::default(), authenticator(), factory)
    }

    #[test]
    fn test_stage_order() {
        let mut stage = Stage::Authenticating;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            seen.push(next);
            stage = next;
        }

        assert_eq!(
            seen,
            [
                Stage::Authenticating,
                Stage::RuleResolved,
                Stage::Rewriting,
                Stage::Dispatching,
                Stage::Sanitizing,
                Stage::Responding,
            ]
        );
        assert!(Stage::Responding.is_terminal());
        assert!(Stage::Failed.is_terminal());
        assert_eq!(Stage::Failed.next(), None);
        assert!(!Stage::Rewriting.is_fallible());
        assert!(!Stage::Sanitizing.is_fallible());
    }

    #[tokio::test]
    async fn test_full_pass_rewrites_dispatches_and_sanitizes() {
        let factory = Arc::new(
            ScriptedFactory::new()
                .with(ScriptedBackend::replying(ProviderId::Gemini, "```yaml\ntask: add\n```"))
                .with(ScriptedBackend::replying(
                    ProviderId::OpenAi,
                    "  System: {\"answer\": 4}<output_lang>  ",
                )),
        );

        let outcome = pipeline(factory.clone())
            .process(Some(ADMIN), &ProviderOverrides::new(), GatewayRequest::new("2+2?"))
            .await
            .expect("pipeline should succeed");

        assert_eq!(outcome.response, "{\"answer\": 4}");
        assert_eq!(outcome.target, ProviderId::OpenAi);
        assert_eq!(outcome.mode, "balance");
        assert_eq!(
            factory.backend(ProviderId::OpenAi).prompts(),
            ["```yaml\ntask: add\n```"]
        );

        assert_eq!(outcome.audit.routed_to, ProviderId::OpenAi);
        assert_eq!(outcome.audit.wallet, Wallet::House);
        assert_eq!(outcome.audit.prompt_len, 4);
        assert_eq!(outcome.audit.response_len, outcome.response.chars().count());
    }

    #[tokio::test]
    async fn test_rejected_credential_makes_no_provider_calls() {
        let factory = Arc::new(ScriptedFactory::new());

        let result = pipeline(factory.clone())
            .process(Some("fake-key-123"), &ProviderOverrides::new(), GatewayRequest::new("hi"))
            .await;

        assert!(matches!(result, Err(GatewayError::Unauthorized)));
        assert!(factory.builds().is_empty());
    }

    #[tokio::test]
    async fn test_rewrite_failure_dispatches_original_prompt() {
        let factory = Arc::new(
            ScriptedFactory::new()
                .with(ScriptedBackend::failing(
                    ProviderId::Gemini,
                    ProviderError::MissingCredential {
                        provider: ProviderId::Gemini,
                    },
                ))
                .with(ScriptedBackend::replying(ProviderId::DeepSeek, "cheap answer")),
        );

        let outcome = pipeline(factory.clone())
            .process(
                Some(ADMIN),
                &ProviderOverrides::new(),
                GatewayRequest::new("Explain Quantum Physics briefly").with_mode("saving"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.response, "cheap answer");
        assert_eq!(outcome.target, ProviderId::DeepSeek);
        assert_eq!(
            factory.backend(ProviderId::DeepSeek).prompts(),
            ["Explain Quantum Physics briefly"]
        );
    }

    #[tokio::test]
    async fn test_speed_mode_answers_from_intermediary() {
        let factory = Arc::new(
            ScriptedFactory::new()
                .with(ScriptedBackend::replying(ProviderId::Gemini, "4")),
        );

        let outcome = pipeline(factory.clone())
            .process(
                Some(ADMIN),
                &ProviderOverrides::new(),
                GatewayRequest::new("2+2?").with_mode("speed"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.target, ProviderId::Gemini);
        assert_eq!(outcome.response, "4");

        let prompts = factory.backend(ProviderId::Gemini).prompts();
        assert_eq!(prompts.len(), 2, "one rewrite, one answer");
        assert!(prompts[0].starts_with("System: "));
        assert_eq!(prompts[1], "4");
        assert_eq!(
            factory.builds(),
            [(ProviderId::Gemini, Some("house-gemini".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_surfaced() {
        let factory = Arc::new(
            ScriptedFactory::new()
                .with(ScriptedBackend::replying(ProviderId::Gemini, "<spec>hi</spec>"))
                .with(ScriptedBackend::failing(
                    ProviderId::Anthropic,
                    ProviderError::Api {
                        provider: ProviderId::Anthropic,
                        status: Some(529),
                        message: "Overloaded".into(),
                    },
                )),
        );

        let result = pipeline(factory)
            .process(
                Some(ADMIN),
                &ProviderOverrides::new(),
                GatewayRequest::new("hello world in rust").with_mode("coding"),
            )
            .await;

        match result {
            Err(GatewayError::Dispatch(error)) => {
                assert_eq!(error.provider(), ProviderId::Anthropic);
                assert!(error.to_string().contains("Overloaded"));
            }
            other => panic!("Expected dispatch error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_mode_uses_default_rule_but_echoes_mode() {
        let factory = Arc::new(
            ScriptedFactory::new()
                .with(ScriptedBackend::replying(ProviderId::Gemini, "rewritten"))
                .with(ScriptedBackend::replying(ProviderId::OpenAi, "ok")),
        );

        let outcome = pipeline(factory)
            .process(
                Some(ADMIN),
                &ProviderOverrides::new(),
                GatewayRequest::new("hi").with_mode("turbo"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.target, ProviderId::OpenAi);
        assert_eq!(outcome.mode, "turbo");
        assert_eq!(outcome.audit.mode, "turbo");
    }

    #[tokio::test]
    async fn test_user_key_for_target_bills_user_wallet() {
        let factory = Arc::new(
            ScriptedFactory::new()
                .with(ScriptedBackend::replying(ProviderId::Gemini, "spec"))
                .with(ScriptedBackend::replying(ProviderId::Anthropic, "code")),
        );
        let overrides = ProviderOverrides::new().with(ProviderId::Anthropic, "sk-ant-user");

        let outcome = pipeline(factory.clone())
            .process(
                Some(ADMIN),
                &overrides,
                GatewayRequest::new("fizzbuzz").with_mode("coding"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.audit.wallet, Wallet::User);
        assert!(factory
            .builds()
            .contains(&(ProviderId::Anthropic, Some("sk-ant-user".to_string()))));
    }

    #[tokio::test]
    async fn test_injected_rule_table() {
        let rules = RuleTable::new(
            [ModeRule::new("legal", ProviderId::Anthropic, "Role: Counsel.")],
            ModeRule::new("cheap", ProviderId::DeepSeek, "Be terse."),
        );
        let factory = Arc::new(
            ScriptedFactory::new()
                .with(ScriptedBackend::replying(ProviderId::Gemini, "r"))
                .with(ScriptedBackend::replying(ProviderId::Anthropic, "counsel"))
                .with(ScriptedBackend::replying(ProviderId::DeepSeek, "terse")),
        );
        let pipeline = GatewayPipeline::new(rules, authenticator(), factory.clone())
            .with_sanitizer(Sanitizer::new(["terse"]));

        let legal = pipeline
            .process(
                Some(ADMIN),
                &ProviderOverrides::new(),
                GatewayRequest::new("contract").with_mode("legal"),
            )
            .await
            .unwrap();
        assert_eq!(legal.response, "counsel");

        let fallback = pipeline
            .process(Some(ADMIN), &ProviderOverrides::new(), GatewayRequest::new("x"))
            .await
            .unwrap();
        assert_eq!(fallback.target, ProviderId::DeepSeek);
        assert_eq!(fallback.response, "");
        assert!(factory.backend(ProviderId::Gemini).prompts()[0].contains("Role: Counsel."));
    }
}

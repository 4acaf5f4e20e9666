use std::sync::Arc;

use crate::audit::AuditNotifier;
use crate::auth::Authenticator;
use crate::config::Config;
use crate::error::ProviderError;
use crate::llm::{BackendFactory, HttpBackendFactory};
use crate::pipeline::GatewayPipeline;
use crate::routing::RuleTable;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: GatewayPipeline,
    pub notifier: AuditNotifier,
}

impl AppState {
    /// State with the built-in rule table and real HTTP backends.
    pub fn from_config(config: Config) -> Result<Self, ProviderError> {
        let factory = HttpBackendFactory::new(&config.providers)?;
        Ok(Self::new(config, Arc::new(factory)))
    }

    pub fn new(config: Config, factory: Arc<dyn BackendFactory>) -> Self {
        Self::with_rules(config, RuleTable::default(), factory)
    }

    pub fn with_rules(config: Config, rules: RuleTable, factory: Arc<dyn BackendFactory>) -> Self {
        let authenticator = Authenticator::from_config(&config);
        let pipeline = GatewayPipeline::new(rules, authenticator, factory);
        let notifier = AuditNotifier::new(config.audit.as_ref());

        Self {
            config: Arc::new(config),
            pipeline,
            notifier,
        }
    }
}

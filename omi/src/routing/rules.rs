//! Mode → rule table.
//!
//! Every request is governed by exactly one [`ModeRule`]. Unknown modes are
//! not an error: they resolve to the default (`balance`) rule, so a caller
//! can never fail a request by sending a bogus mode string.

use std::collections::HashMap;
use std::sync::Arc;

use super::ProviderId;

pub const DEFAULT_MODE: &str = "balance";

/// Immutable routing decision for one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeRule {
    pub mode: String,
    pub target: ProviderId,
    /// Task-specific rewrite instruction handed to the intermediary model.
    pub instruction: String,
}

impl ModeRule {
    pub fn new(mode: impl Into<String>, target: ProviderId, instruction: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            target,
            instruction: instruction.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<String, Arc<ModeRule>>,
    default_rule: Arc<ModeRule>,
}

impl RuleTable {
    /// Builds a table from `rules`; `default_rule` answers every unknown mode.
    pub fn new(rules: impl IntoIterator<Item = ModeRule>, default_rule: ModeRule) -> Self {
        let default_rule = Arc::new(default_rule);
        let mut table: HashMap<String, Arc<ModeRule>> = rules
            .into_iter()
            .map(|rule| (rule.mode.clone(), Arc::new(rule)))
            .collect();
        table.insert(default_rule.mode.clone(), default_rule.clone());

        Self {
            rules: table,
            default_rule,
        }
    }

    pub fn resolve(&self, mode: &str) -> Arc<ModeRule> {
        self.rules
            .get(mode)
            .cloned()
            .unwrap_or_else(|| self.default_rule.clone())
    }

    #[cfg(test)]
    pub(crate) fn default_rule(&self) -> &ModeRule {
        &self.default_rule
    }

    #[cfg(test)]
    pub(crate) fn modes(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        let rules = [
            ModeRule::new(
                "saving",
                ProviderId::DeepSeek,
                "Role: Data Compressor. Task: Translate intent to SIMPLIFIED CHINESE to maximize token density. Remove fluff. END WITH COMMAND: 'OUTPUT_LANGUAGE: ENGLISH'.",
            ),
            ModeRule::new(
                "coding",
                ProviderId::Anthropic,
                "Role: Tech Lead. Task: Wrap requirements in strict XML <spec> tags. Focus on edge cases. END WITH TAG: <output_lang>English</output_lang>.",
            ),
            ModeRule::new(
                "accuracy",
                ProviderId::OpenAi,
                "Role: Logic Architect. Task: Create a dependency graph of the logic. Translate reasoning to POLISH (PL) for high-context differentiation. END WITH COMMAND: 'Answer in English'.",
            ),
            ModeRule::new(
                "speed",
                ProviderId::Gemini,
                "Summarize intent in 1 direct English sentence.",
            ),
        ];
        let balance = ModeRule::new(
            DEFAULT_MODE,
            ProviderId::OpenAi,
            "Role: Optimizer. Task: Rewrite to Pseudo-Code YAML for clarity. END WITH COMMAND: 'Output English JSON'.",
        );

        Self::new(rules, balance)
    }
}

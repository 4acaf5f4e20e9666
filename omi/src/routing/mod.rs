mod provider;
mod rules;

pub use provider::ProviderId;
pub use rules::{ModeRule, RuleTable, DEFAULT_MODE};

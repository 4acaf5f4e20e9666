use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four LLM backends the gateway can reach.
///
/// On the wire the Anthropic backend is reported as `claude`; `anthropic` is
/// still accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "claude", alias = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini", alias = "google")]
    Gemini,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::OpenAi,
        ProviderId::DeepSeek,
        ProviderId::Anthropic,
        ProviderId::Gemini,
    ];

    /// The provider that rewrites prompts before dispatch.
    pub const INTERMEDIARY: ProviderId = ProviderId::Gemini;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
            Self::Anthropic => "claude",
            Self::Gemini => "gemini",
        }
    }

    /// Request header carrying a caller's own key for this provider.
    ///
    /// The intermediary only ever runs on the house key, so it has none.
    pub fn override_header(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("x-openai-key"),
            Self::DeepSeek => Some("x-deepseek-key"),
            Self::Anthropic => Some("x-anthropic-key"),
            Self::Gemini => None,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "deepseek" => Ok(Self::DeepSeek),
            "claude" | "anthropic" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(format!("Unknown provider: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_value(ProviderId::Anthropic).unwrap(),
            serde_json::json!("claude")
        );
        assert_eq!(ProviderId::DeepSeek.to_string(), "deepseek");
    }

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!("anthropic".parse::<ProviderId>(), Ok(ProviderId::Anthropic));
        assert_eq!(" Claude ".parse::<ProviderId>(), Ok(ProviderId::Anthropic));
        assert_eq!("google".parse::<ProviderId>(), Ok(ProviderId::Gemini));
        assert!("mistral".parse::<ProviderId>().is_err());

        let parsed: ProviderId = serde_json::from_str(r#""anthropic""#).unwrap();
        assert_eq!(parsed, ProviderId::Anthropic);
    }

    #[test]
    fn test_only_final_targets_take_overrides() {
        for provider in ProviderId::ALL {
            assert_eq!(
                provider.override_header().is_none(),
                provider == ProviderId::INTERMEDIARY
            );
        }
    }
}

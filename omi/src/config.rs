use serde::Deserialize;
use std::env;

use crate::routing::ProviderId;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Reads a secret-like variable, treating an empty value as unset.
fn env_secret(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

/// Reads a plain setting; a blank value falls back to `default` like an unset one.
fn env_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    pub audit: Option<AuditConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Gateway admin credential every `/generate` caller must present.
    pub admin_key: Option<String>,
    pub max_body_bytes: usize,
}

/// Operator-side settings for the four LLM backends.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub deepseek: ProviderConfig,
    pub anthropic: ProviderConfig,
    pub gemini: ProviderConfig,
    pub timeout_secs: u64,
    pub anthropic_max_tokens: u32,
}

/// One backend: its house credential, model name and API root.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    pub webhook_url: String,
    pub secret: Option<String>,
    pub timeout_ms: u64,
}

impl ProvidersConfig {
    pub fn get(&self, provider: ProviderId) -> &ProviderConfig {
        match provider {
            ProviderId::OpenAi => &self.openai,
            ProviderId::DeepSeek => &self.deepseek,
            ProviderId::Anthropic => &self.anthropic,
            ProviderId::Gemini => &self.gemini,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: ProviderConfig {
                api_key: env_secret("OPENAI_API_KEY"),
                model: env_or("OPENAI_MODEL", "gpt-4o"),
                base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            },
            deepseek: ProviderConfig {
                api_key: env_secret("DEEPSEEK_API_KEY"),
                model: env_or("DEEPSEEK_MODEL", "deepseek-chat"),
                base_url: env_or("DEEPSEEK_BASE_URL", DEFAULT_DEEPSEEK_BASE_URL),
            },
            anthropic: ProviderConfig {
                api_key: env_secret("ANTHROPIC_API_KEY"),
                model: env_or("ANTHROPIC_MODEL", "claude-3-5-sonnet-20241022"),
                base_url: env_or("ANTHROPIC_BASE_URL", DEFAULT_ANTHROPIC_BASE_URL),
            },
            gemini: ProviderConfig {
                api_key: env_secret("GOOGLE_API_KEY"),
                model: env_or("GEMINI_MODEL", "gemini-1.5-flash"),
                base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            },
            timeout_secs: parse_env_or("PROVIDER_TIMEOUT_SECS", 60),
            anthropic_max_tokens: parse_env_or("ANTHROPIC_MAX_TOKENS", 4096),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env_or("OMI_HOST", "0.0.0.0"),
                port: parse_env_or("OMI_PORT", 8000),
                admin_key: env_secret("OMI_ADMIN_KEY"),
                max_body_bytes: parse_env_or("MAX_BODY_BYTES", 1024 * 1024),
            },
            providers: ProvidersConfig::default(),
            audit: env_secret("N8N_WEBHOOK_URL").map(|webhook_url| AuditConfig {
                webhook_url,
                secret: env_secret("N8N_WEBHOOK_SECRET"),
                timeout_ms: parse_env_or("AUDIT_TIMEOUT_MS", 1000),
            }),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

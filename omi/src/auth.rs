//! Admission control and per-request credential resolution.
//!
//! The gateway credential is compared exactly against the configured admin
//! key; an unset admin key rejects everyone. Provider credentials overlay
//! caller-supplied (BYOK) keys onto the house keys. A provider with neither is
//! left unresolved and fails later, at call time.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::routing::ProviderId;

/// Who pays for a provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Wallet {
    /// The caller supplied their own key.
    User,
    /// The operator's key was used.
    House,
}

/// Caller-supplied provider keys, as read from request headers.
#[derive(Clone, Default)]
pub struct ProviderOverrides {
    keys: HashMap<ProviderId, String>,
}

impl ProviderOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: ProviderId, key: impl Into<String>) -> Self {
        self.insert(provider, key);
        self
    }

    pub fn insert(&mut self, provider: ProviderId, key: impl Into<String>) {
        self.keys.insert(provider, key.into());
    }

    /// The override for `provider`, ignoring blank values.
    pub fn get(&self, provider: ProviderId) -> Option<&str> {
        self.keys
            .get(&provider)
            .map(String::as_str)
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        ProviderId::ALL.iter().all(|p| self.get(*p).is_none())
    }
}

impl fmt::Debug for ProviderOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present: Vec<_> = ProviderId::ALL
            .iter()
            .filter(|p| self.get(**p).is_some())
            .collect();
        f.debug_struct("ProviderOverrides")
            .field("providers", &present)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
struct ResolvedCredential {
    token: Option<String>,
    wallet: Wallet,
}

/// Credentials for one request, fully resolved before any provider call.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialSet {
    entries: HashMap<ProviderId, ResolvedCredential>,
}

impl CredentialSet {
    pub fn token(&self, provider: ProviderId) -> Option<&str> {
        self.entries
            .get(&provider)
            .and_then(|entry| entry.token.as_deref())
    }

    pub fn wallet(&self, provider: ProviderId) -> Wallet {
        self.entries
            .get(&provider)
            .map(|entry| entry.wallet)
            .unwrap_or(Wallet::House)
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for provider in ProviderId::ALL {
            let state = match self.entries.get(&provider) {
                Some(ResolvedCredential { token: None, .. }) | None => "missing",
                Some(ResolvedCredential {
                    wallet: Wallet::User,
                    ..
                }) => "user",
                Some(ResolvedCredential {
                    wallet: Wallet::House,
                    ..
                }) => "house",
            };
            map.entry(&provider, &state);
        }
        map.finish()
    }
}

#[derive(Clone)]
pub struct Authenticator {
    admin_key: Option<String>,
    house_keys: HashMap<ProviderId, Option<String>>,
}

impl Authenticator {
    pub fn new(
        admin_key: Option<String>,
        house_keys: impl IntoIterator<Item = (ProviderId, Option<String>)>,
    ) -> Self {
        Self {
            admin_key,
            house_keys: house_keys.into_iter().collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.server.admin_key.clone(),
            ProviderId::ALL
                .into_iter()
                .map(|p| (p, config.providers.get(p).api_key.clone())),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.admin_key.is_some()
    }

    pub fn authenticate(
        &self,
        gateway_credential: Option<&str>,
        overrides: &ProviderOverrides,
    ) -> Result<CredentialSet> {
        let admitted = match (self.admin_key.as_deref(), gateway_credential) {
            (Some(expected), Some(presented)) => expected == presented,
            _ => false,
        };
        if !admitted {
            return Err(GatewayError::Unauthorized);
        }

        let entries = ProviderId::ALL
            .into_iter()
            .map(|provider| {
                let resolved = match overrides.get(provider) {
                    Some(key) => ResolvedCredential {
                        token: Some(key.to_string()),
                        wallet: Wallet::User,
                    },
                    None => ResolvedCredential {
                        token: self.house_keys.get(&provider).cloned().flatten(),
                        wallet: Wallet::House,
                    },
                };
                (provider, resolved)
            })
            .collect();

        Ok(CredentialSet { entries })
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}

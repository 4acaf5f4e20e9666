//! Fire-and-forget delivery of per-request audit records to an external sink.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::task::TaskTracker;

use crate::auth::Wallet;
use crate::config::AuditConfig;
use crate::routing::ProviderId;

pub const SECRET_HEADER: &str = "x-omi-webhook-secret";

/// One completed request, as reported to the audit sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub mode: String,
    pub routed_to: ProviderId,
    pub wallet: Wallet,
    /// Length of the caller's original prompt, in characters.
    pub prompt_len: usize,
    /// Length of the sanitized reply, in characters.
    pub response_len: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
struct Sink {
    url: String,
    secret: Option<String>,
    http: reqwest::Client,
}

/// Sends audit records in the background. Has no error channel.
#[derive(Clone)]
pub struct AuditNotifier {
    sink: Option<Sink>,
    tracker: TaskTracker,
}

impl AuditNotifier {
    pub fn new(config: Option<&AuditConfig>) -> Self {
        let sink = config.and_then(|config| {
            match reqwest::Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
            {
                Ok(http) => Some(Sink {
                    url: config.webhook_url.clone(),
                    secret: config.secret.clone(),
                    http,
                }),
                Err(e) => {
                    tracing::warn!("Failed to build audit client, audit disabled: {}", e);
                    None
                }
            }
        });

        Self {
            sink,
            tracker: TaskTracker::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Schedules delivery of `record` and returns immediately.
    pub fn notify(&self, record: AuditRecord) {
        let Some(sink) = self.sink.clone() else {
            return;
        };

        self.tracker.spawn(async move {
            let mut request = sink.http.post(&sink.url).json(&record);
            if let Some(secret) = &sink.secret {
                request = request.header(SECRET_HEADER, secret);
            }

            match request.send().await.and_then(|r| r.error_for_status()) {
                Ok(_) => tracing::debug!(routed_to = %record.routed_to, "Audit record delivered"),
                Err(e) => tracing::debug!("Audit delivery failed: {}", e),
            }
        });
    }

    /// Waits for every delivery already scheduled. Used at shutdown.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

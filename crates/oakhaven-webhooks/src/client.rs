//! `reqwest`-backed webhook POST, dispatched off the caller's task.

use std::time::Duration;

use reqwest::Client;

use crate::payload::WebhookPayload;

const DISPATCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Error delivering a webhook payload.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The request could not be sent, or the upstream returned a non-2xx status.
    #[error("webhook delivery to {url} failed: {source}")]
    Delivery {
        /// The URL the payload was sent to.
        url: String,
        /// The underlying `reqwest` error.
        #[source]
        source: reqwest::Error,
    },
}

/// Dispatches webhook payloads to resident-registered URLs.
///
/// Delivery is fire-and-forget: [`WebhookClient::dispatch`] spawns the POST
/// onto its own task and returns immediately, so a slow or unreachable
/// subscriber never blocks the tick scheduler. A failed delivery is logged
/// via `tracing` and dropped.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: Client,
}

impl WebhookClient {
    /// Build a client with the fixed dispatch timeout.
    #[must_use]
    pub fn new() -> Self {
        let http = Client::builder()
            .timeout(DISPATCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http }
    }

    /// POST `payload` to `url`, awaiting the response.
    ///
    /// Use [`WebhookClient::dispatch`] from tick-hot code; this is the
    /// awaitable primitive it spawns onto its own task.
    pub async fn send(&self, url: &str, payload: &WebhookPayload) -> Result<(), WebhookError> {
        self.http
            .post(url)
            .json(payload)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map(|_| ())
            .map_err(|source| WebhookError::Delivery {
                url: url.to_owned(),
                source,
            })
    }

    /// Fire-and-forget dispatch: spawns the delivery and returns immediately.
    ///
    /// Failures are logged at `warn` level and otherwise swallowed -- a
    /// subscriber's downtime must never affect the simulation.
    pub fn dispatch(&self, url: String, payload: WebhookPayload) {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(error) = client.send(&url, &payload).await {
                tracing::warn!(%error, %url, event = %payload.event, "webhook delivery failed");
            }
        });
    }
}

impl Default for WebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

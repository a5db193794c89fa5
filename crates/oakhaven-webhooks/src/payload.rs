//! JSON envelope posted to a resident's subscribed webhook URL.

use oakhaven_types::ResidentId;

/// The envelope every webhook delivery carries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WebhookPayload {
    /// The event tag, e.g. `"collapse"`, `"arrest"`, `"speech_heard"`.
    pub event: String,
    /// World-seconds timestamp the event occurred at.
    pub world_seconds: u64,
    /// The resident this webhook is delivered to.
    pub resident_id: ResidentId,
    /// Event-specific structured payload.
    pub data: serde_json::Value,
}

impl WebhookPayload {
    /// Construct a new payload.
    #[must_use]
    pub fn new(
        event: impl Into<String>,
        world_seconds: u64,
        resident_id: ResidentId,
        data: serde_json::Value,
    ) -> Self {
        Self {
            event: event.into(),
            world_seconds,
            resident_id,
            data,
        }
    }
}

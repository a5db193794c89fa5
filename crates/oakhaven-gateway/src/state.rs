//! Shared application state for the connection gateway.
//!
//! [`GatewayState`] holds the broadcast channel every connection draws
//! its outbound traffic from, the command channel the tick scheduler
//! drains inbound actions from, and a read-only snapshot of just enough
//! world state (resident status, world clock) for bind-time checks and
//! the `welcome` packet. The full simulation stays owned by the
//! scheduler (§5); the gateway never touches it directly.

use std::collections::BTreeMap;
use std::sync::Arc;

use oakhaven_types::actions::ActionEnvelope;
use oakhaven_types::enums::LifecycleStatus;
use oakhaven_types::ids::{FeedbackToken, ResidentId};
use oakhaven_types::protocol::ServerMessage;
use oakhaven_types::structs::Resident;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

/// Capacity of the outbound broadcast channel.
///
/// A connection that falls behind by more than this many messages
/// receives a [`broadcast::error::RecvError::Lagged`] and skips ahead,
/// per §5's drop/coalesce-on-overflow requirement.
const BROADCAST_CAPACITY: usize = 512;

/// Capacity of the inbound command channel to the tick scheduler.
const COMMAND_CAPACITY: usize = 1024;

/// Who an [`OutboundEnvelope`] should be delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Deliver only to the player connection bound to this resident.
    Resident(ResidentId),
    /// Deliver to every connected spectator.
    Spectators,
}

/// One message pushed onto the outbound broadcast channel, addressed to
/// either a single bound resident or the whole spectator set.
#[derive(Debug, Clone)]
pub struct OutboundEnvelope {
    /// Who should receive this message.
    pub recipient: Recipient,
    /// The message itself.
    pub message: ServerMessage,
}

/// A command drained by the tick scheduler from the gateway's inbound
/// channel, once per tick (§5).
#[derive(Debug)]
pub enum GatewayCommand {
    /// A player connection's action request, to be dispatched against
    /// its bound resident.
    Action {
        /// The resident the action applies to.
        resident_id: ResidentId,
        /// The client's action envelope.
        envelope: ActionEnvelope,
    },
    /// A newly registered resident, to be queued for the next train
    /// arrival (`WorldState::queue_for_train`).
    RegisterResident(Resident),
    /// A feedback token redemption, minted by the reflection subsystem.
    /// The scheduler replies `true` if the token existed and had not
    /// already been redeemed.
    ResolveFeedback {
        /// The token being redeemed.
        token: FeedbackToken,
        /// The free-text response to persist.
        response_text: String,
        /// Where to send the redemption outcome.
        reply: oneshot::Sender<bool>,
    },
}

/// Just enough per-resident state for gateway-side bind checks.
#[derive(Debug, Clone, Copy)]
pub struct ResidentSnapshot {
    /// The resident's current lifecycle status.
    pub status: LifecycleStatus,
}

/// A read-only snapshot of world state the gateway needs, refreshed by
/// the scheduler once per perception tick.
#[derive(Debug, Clone, Default)]
pub struct GatewaySnapshot {
    /// World-seconds elapsed since the configured starting hour.
    pub world_seconds: u64,
    /// Every known resident's lifecycle status, keyed by id.
    pub residents: BTreeMap<ResidentId, ResidentSnapshot>,
}

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct GatewayState {
    /// Broadcast sender every connection subscribes to and filters by
    /// [`Recipient`].
    tx: broadcast::Sender<OutboundEnvelope>,
    /// Channel the tick scheduler drains once per tick.
    pub commands: mpsc::Sender<GatewayCommand>,
    /// Read-only world snapshot for bind-time checks.
    pub snapshot: Arc<RwLock<GatewaySnapshot>>,
    /// HMAC key for session token verification (shared with the
    /// external registration surface via `REGISTRATION_TOKEN`).
    pub session_secret: Arc<Vec<u8>>,
    /// URL the client should fetch the map artifact from.
    pub map_url: String,
}

impl GatewayState {
    /// Create new gateway state bound to a command channel and signing
    /// secret.
    #[must_use]
    pub fn new(commands: mpsc::Sender<GatewayCommand>, session_secret: Vec<u8>, map_url: String) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx, commands, snapshot: Arc::new(RwLock::new(GatewaySnapshot::default())), session_secret: Arc::new(session_secret), map_url }
    }

    /// Create a paired command channel and gateway state, for callers
    /// that construct both together (the common case at boot).
    #[must_use]
    pub fn with_channel(session_secret: Vec<u8>, map_url: String) -> (Self, mpsc::Receiver<GatewayCommand>) {
        let (commands, rx) = mpsc::channel(COMMAND_CAPACITY);
        (Self::new(commands, session_secret, map_url), rx)
    }

    /// Subscribe to the outbound broadcast channel.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundEnvelope> {
        self.tx.subscribe()
    }

    /// Publish a message to every subscriber; each connection filters by
    /// [`Recipient`] itself.
    ///
    /// Returns the number of receivers notified. Zero is normal (no
    /// clients connected) and is not an error.
    pub fn publish(&self, recipient: Recipient, message: ServerMessage) -> usize {
        self.tx.send(OutboundEnvelope { recipient, message }).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use oakhaven_types::protocol::{ErrorMessage, WelcomeMessage};

    use super::*;

    #[tokio::test]
    async fn publish_with_no_subscribers_returns_zero() {
        let (state, _rx) = GatewayState::with_channel(b"secret".to_vec(), "https://example.test/map".to_owned());
        let delivered = state.publish(Recipient::Spectators, ServerMessage::Error(ErrorMessage { code: "x".to_owned(), message: "y".to_owned() }));
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn subscriber_receives_a_published_envelope() {
        let (state, _rx) = GatewayState::with_channel(b"secret".to_vec(), "https://example.test/map".to_owned());
        let mut sub = state.subscribe();
        let resident_id = ResidentId::new();

        state.publish(
            Recipient::Resident(resident_id),
            ServerMessage::Welcome(WelcomeMessage { resident_id, map_url: state.map_url.clone(), world_seconds: 0 }),
        );

        let envelope = sub.recv().await.expect("recv");
        assert_eq!(envelope.recipient, Recipient::Resident(resident_id));
    }
}

//! WebSocket wire envelopes exchanged between a connection and the gateway.

use serde::{Deserialize, Serialize};

use crate::actions::{ActionEnvelope, ActionResult};
use crate::ids::ResidentId;
use crate::perception::{Perception, SpectatorView};
use crate::structs::{Event, InspectCard, PainMessage};

/// The first message on a player connection, carrying the signed token
/// (when not supplied as a query parameter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthMessage {
    /// The signed session token.
    pub token: String,
}

/// Every message a player connection may send after authenticating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientMessage {
    /// The initial auth handshake.
    Auth(AuthMessage),
    /// Any subsequent action request.
    Action(ActionEnvelope),
}

/// The token carried by a signed player session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The bound resident.
    pub resident_id: ResidentId,
    /// The resident's passport number, for display without a lookup.
    pub passport_no: String,
    /// The resident kind (human or agent), echoed in the welcome packet.
    pub kind: crate::enums::ResidentKind,
}

/// The resident snapshot and map reference sent immediately on bind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    /// The bound resident's current full state, as a self-perception.
    pub resident_id: ResidentId,
    /// URL the client should fetch the map artifact from.
    pub map_url: String,
    /// World-seconds elapsed since the configured starting hour.
    pub world_seconds: u64,
}

/// A changelog announcement delivered once after `welcome`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemAnnouncement {
    /// Short changelog title.
    pub title: String,
    /// Build/version string.
    pub version: String,
}

/// A protocol-level error, sent before closing the socket with a `4xxx`
/// close code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable explanation.
    pub message: String,
}

/// Every message the gateway may send to a player connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once immediately after bind.
    Welcome(WelcomeMessage),
    /// Sent once per perception tick.
    Perception(Perception),
    /// Sent once per perception tick to spectator connections instead of
    /// [`ServerMessage::Perception`].
    Spectator(SpectatorView),
    /// Sent in response to every dispatched action.
    ActionResult(ActionResult),
    /// Sent in response to `inspect`.
    InspectResult(InspectCard),
    /// An out-of-band pain signal.
    Pain(PainMessage),
    /// A one-time changelog announcement.
    SystemAnnouncement(SystemAnnouncement),
    /// A structured side-channel event.
    Event(Event),
    /// A protocol or auth error; the socket closes after this is sent.
    Error(ErrorMessage),
}

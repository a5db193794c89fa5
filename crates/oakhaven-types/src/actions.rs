//! Action request and result types exchanged between a client connection
//! and the action arbiter.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{ActionType, ItemType, RejectionReason, SpeedMode, Volume};
use crate::ids::{ForageNodeId, JobId, PetitionId, ResidentId};
use crate::structs::RejectionDetails;

// ---------------------------------------------------------------------------
// Inbound envelope
// ---------------------------------------------------------------------------

/// The envelope every inbound client message is wrapped in: `{type,
/// request_id?, params?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEnvelope {
    /// The action tag being invoked.
    #[serde(rename = "type")]
    pub action: ActionType,
    /// Client-supplied idempotency key.
    pub request_id: Option<Uuid>,
    /// Action-specific parameters, validated by the handler for this
    /// action type.
    #[serde(default)]
    pub params: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Typed parameter payloads
// ---------------------------------------------------------------------------

/// Parameters for [`ActionType::Move`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveParams {
    /// Facing direction in degrees, `0..360`.
    pub direction_degrees: u16,
    /// Requested locomotion speed.
    pub speed: SpeedMode,
}

/// Parameters for [`ActionType::Face`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FaceParams {
    /// New facing direction in degrees, `0..360`.
    pub direction_degrees: u16,
}

/// Parameters for [`ActionType::MoveTo`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveToParams {
    /// Destination x coordinate in pixels.
    pub x: f64,
    /// Destination y coordinate in pixels.
    pub y: f64,
}

/// Parameters for [`ActionType::Speak`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakParams {
    /// The text to speak, pre-trim.
    pub text: String,
    /// Volume, governing cost and audible range.
    pub volume: Volume,
    /// Directed target, if any.
    pub to: Option<ResidentId>,
}

/// Parameters for [`ActionType::EnterBuilding`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnterBuildingParams {
    /// The building to enter.
    pub building_id: crate::ids::StructureId,
}

/// Parameters for [`ActionType::Buy`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BuyParams {
    /// The item type to purchase.
    pub item_type: ItemType,
}

/// Parameters for [`ActionType::Eat`] and [`ActionType::Drink`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConsumeParams {
    /// The inventory item type to consume.
    pub item_type: ItemType,
}

/// Parameters for [`ActionType::Inspect`], [`ActionType::Arrest`], and
/// [`ActionType::CollectBody`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetResidentParams {
    /// The resident this action targets.
    pub target: ResidentId,
}

/// Parameters for [`ActionType::Trade`] (currency-only transfer).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TradeParams {
    /// The recipient resident.
    pub to: ResidentId,
    /// The amount of currency to transfer.
    pub amount: u64,
}

/// Parameters for [`ActionType::Give`] (item transfer).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GiveParams {
    /// The recipient resident.
    pub to: ResidentId,
    /// The item type to transfer.
    pub item_type: ItemType,
    /// The quantity to transfer.
    pub quantity: u32,
}

/// Parameters for [`ActionType::ApplyJob`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApplyJobParams {
    /// The job vacancy to take.
    pub job_id: JobId,
}

/// Parameters for [`ActionType::WritePetition`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritePetitionParams {
    /// Short petition title.
    pub title: String,
    /// Petition body text.
    pub body: String,
}

/// Parameters for [`ActionType::VotePetition`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VotePetitionParams {
    /// The petition being voted on.
    pub petition_id: PetitionId,
    /// Whether the vote is in favor.
    pub in_favor: bool,
}

/// Parameters for [`ActionType::Forage`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForageParams {
    /// The foraging node to harvest.
    pub node_id: ForageNodeId,
}

/// Parameters for [`ActionType::SubmitFeedback`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitFeedbackParams {
    /// The single-use reflection token being redeemed.
    pub token: crate::ids::FeedbackToken,
    /// Free-text feedback.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Outbound result
// ---------------------------------------------------------------------------

/// Whether an action succeeded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// The action was validated and applied.
    Ok,
    /// The action was rejected; see `reason`.
    Error,
}

/// The `action_result` message sent back to the client after dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// Echoes the client's `request_id`, if one was supplied.
    pub request_id: Option<Uuid>,
    /// Whether the action succeeded.
    pub status: ActionStatus,
    /// The machine-readable rejection reason, present only on error.
    pub reason: Option<RejectionReason>,
    /// Action-specific success payload, present only on success.
    pub data: Option<serde_json::Value>,
}

impl ActionResult {
    /// Build a successful result.
    #[must_use]
    pub fn ok(request_id: Option<Uuid>, data: Option<serde_json::Value>) -> Self {
        Self {
            request_id,
            status: ActionStatus::Ok,
            reason: None,
            data,
        }
    }

    /// Build a rejected result from a [`RejectionDetails`].
    #[must_use]
    pub fn rejected(request_id: Option<Uuid>, details: RejectionDetails) -> Self {
        Self {
            request_id,
            status: ActionStatus::Error,
            reason: Some(details.reason),
            data: Some(serde_json::json!({ "message": details.message })),
        }
    }
}

//! Core entity structs for the Oakhaven colony simulation.
//!
//! Covers the `Resident`, `ForagingNode`, and `Event` data model from the
//! persistence and protocol layer, plus the smaller value types (`Needs`,
//! `Custody`, `Offense`, ...) that compose a resident.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{
    ForageNodeKind, ItemType, LifecycleStatus, OffenseKind, PainSeverity, PainSource, ResidentKind,
    SpeedMode, Volume,
};
use crate::ids::{EventId, ForageNodeId, JobId, ResidentId, RuleId, StructureId};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A fractional-pixel position on the tile map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate in pixels.
    pub x: f64,
    /// Y coordinate in pixels.
    pub y: f64,
}

impl Position {
    /// Construct a position from raw pixel coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }
}

/// The off-map resting position for an unprocessed corpse, matching the
/// fixed sentinel coordinate used by the invariant that a carried body has
/// exactly one carrying-position relation.
pub const CORPSE_PARKING_POSITION: Position = Position::new(-9999.0, -9999.0);

// ---------------------------------------------------------------------------
// Needs
// ---------------------------------------------------------------------------

/// The six scalar need dimensions, each clamped to `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Needs {
    /// Hunger; decays toward 0, restored by eating.
    pub hunger: u32,
    /// Thirst; decays toward 0, restored by drinking.
    pub thirst: u32,
    /// Energy; decays while awake and active, restored by sleeping.
    pub energy: u32,
    /// Bladder fullness; rises over time, reset by `use_toilet`.
    pub bladder: u32,
    /// Health; damaged when hunger/thirst/social reach 0.
    pub health: u32,
    /// Social fulfillment; decays over time, restored by conversation.
    pub social: u32,
}

impl Needs {
    /// Needs at the start of a resident's life: full except bladder.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            hunger: 100,
            thirst: 100,
            energy: 100,
            bladder: 0,
            health: 100,
            social: 100,
        }
    }

    /// Saturating-add `delta` (which may be negative) to `value`, clamped
    /// to `[0, 100]`.
    #[must_use]
    pub fn apply_delta(value: u32, delta: i32) -> u32 {
        let signed = i64::from(value) + i64::from(delta);
        signed.clamp(0, 100) as u32
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A single inventory slot: one item type, a quantity, and a durability
/// counter where `-1` means stackable/non-durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// The kind of item held.
    pub item_type: ItemType,
    /// How many units of this item are held.
    pub quantity: u32,
    /// Remaining durability, or `-1` for stackable/non-durable items.
    pub durability: i32,
}

// ---------------------------------------------------------------------------
// Employment
// ---------------------------------------------------------------------------

/// A resident's current job assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employment {
    /// The job vacancy this resident occupies.
    pub job_id: JobId,
    /// Whether the resident is currently clocked in.
    pub on_shift: bool,
    /// Seconds of world-time accrued toward the next wage payment.
    pub shift_seconds_accrued: u64,
}

// ---------------------------------------------------------------------------
// Custody
// ---------------------------------------------------------------------------

/// A single law offense recorded against a resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offense {
    /// Unique identifier for this offense entry.
    pub id: RuleId,
    /// What kind of offense this is.
    pub kind: OffenseKind,
    /// World-seconds timestamp when the offense was recorded.
    pub recorded_at_world_seconds: u64,
}

/// A resident's custody state: active offenses, arrest/escort links, and
/// any pending prison sentence.
///
/// `carrying_body_id` and `carrying_suspect_id` and `prison_sentence_end`
/// are pairwise exclusive within one resident (a resident is never
/// simultaneously carrying a body, carrying a suspect, and imprisoned).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Custody {
    /// Offenses currently on record.
    pub offenses: Vec<Offense>,
    /// The officer who arrested this resident, if any.
    pub arrested_by: Option<ResidentId>,
    /// World-seconds timestamp after which this resident is released.
    pub prison_sentence_end_world_seconds: Option<u64>,
    /// The suspect this resident (an officer) is currently escorting.
    pub carrying_suspect_id: Option<ResidentId>,
    /// The corpse this resident is currently carrying to the mortuary.
    pub carrying_body_id: Option<ResidentId>,
}

impl Custody {
    /// Whether this resident is currently imprisoned.
    #[must_use]
    pub const fn is_imprisoned(&self) -> bool {
        self.prison_sentence_end_world_seconds.is_some()
    }
}

// ---------------------------------------------------------------------------
// Path-follow state
// ---------------------------------------------------------------------------

/// A cached pathfinder result a resident is walking along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathState {
    /// Remaining waypoints, nearest first.
    pub waypoints: Vec<Position>,
    /// Consecutive position ticks during which the resident was fully
    /// blocked while following this path.
    pub blocked_ticks: u32,
    /// Building to auto-enter once the last waypoint is reached, if any.
    pub auto_enter_building: Option<StructureId>,
}

// ---------------------------------------------------------------------------
// Speech and pain
// ---------------------------------------------------------------------------

/// A speech act queued on the speaker, delivered to listeners at the next
/// perception tick and then cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSpeech {
    /// The spoken text.
    pub text: String,
    /// Volume, governing audible range.
    pub volume: Volume,
    /// The directed target, if this was directed speech.
    pub to: Option<ResidentId>,
    /// World-seconds timestamp when the speech was emitted.
    pub spoken_at_world_seconds: u64,
}

/// A pain signal enqueued for out-of-band delivery to the owning client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainMessage {
    /// Human-readable pain description.
    pub message: String,
    /// Which need dimension triggered this pain.
    pub source: PainSource,
    /// The severity tier crossed.
    pub intensity: PainSeverity,
    /// The resident's needs at the moment the pain was recorded.
    pub needs_snapshot: Needs,
}

// ---------------------------------------------------------------------------
// Transient (non-persisted) resident state
// ---------------------------------------------------------------------------

/// Runtime-only state that is never persisted and is always reset fresh on
/// load: speech/notification/pain buffers, path-follow state, loiter
/// tracking, conversation bookkeeping, and request deduplication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResidentTransient {
    /// Speech queued this tick, delivered and cleared at perception time.
    pub speech_buffer: Vec<PendingSpeech>,
    /// Notifications queued for delivery out-of-band from perception.
    pub pending_notifications: Vec<String>,
    /// Pain messages queued for delivery out-of-band from perception.
    pub pending_pain_messages: Vec<PainMessage>,
    /// Active pathfinder result, if walking toward a destination.
    pub path_state: Option<PathState>,
    /// Anchor position for loitering detection.
    pub loiter_anchor: Option<Position>,
    /// Accumulated world-seconds spent within the loiter-check radius of
    /// the anchor.
    pub loiter_accumulated_seconds: u64,
    /// World-seconds timestamp of the last conversation-window speech this
    /// resident took part in.
    pub last_conversation_time: Option<u64>,
    /// Number of successful directed conversations this resident has had.
    pub conversation_count: u32,
    /// Per-target timestamp (world-seconds) recording an unanswered
    /// directed speech act; cleared when the target replies or the turn
    /// timeout passes.
    pub awaiting_reply_from: HashMap<ResidentId, u64>,
    /// Request ids seen in the last 30 s, mapped to the world-seconds
    /// timestamp they were first seen, for idempotent replay.
    pub seen_request_ids: HashMap<Uuid, u64>,
    /// World-seconds timestamp of this resident's last successful `speak`.
    pub last_speak_time: Option<u64>,
    /// World-seconds timestamp when sleep began; re-anchored to "now" on
    /// load per the runtime-only `sleep_started_at` semantics.
    pub sleep_started_at_world_seconds: Option<u64>,
    /// World-seconds timestamp a pain message was last enqueued, keyed by
    /// `(source, severity)`, for the per-tier cooldown in §4.9.
    pub pain_cooldowns: HashMap<(PainSource, PainSeverity), u64>,
    /// Case-folded, trimmed texts spoken recently, with the world-seconds
    /// timestamp each was spoken, for duplicate-speech suppression (§4.8).
    pub recent_speech: Vec<(String, u64)>,
}

// ---------------------------------------------------------------------------
// Resident
// ---------------------------------------------------------------------------

/// The central entity: a registered inhabitant, either an autonomous agent
/// or a human-operated character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
    /// Opaque, immutable unique identifier.
    pub id: ResidentId,
    /// External passport number, monotonic with population (`OC-NNNNNNN`).
    pub passport_no: String,
    /// Display name.
    pub display_name: String,
    /// Human or autonomous-agent controlled.
    pub kind: ResidentKind,
    /// Current lifecycle status.
    pub status: LifecycleStatus,
    /// Current pixel position.
    pub position: Position,
    /// Facing, in degrees, `0..360`.
    pub facing_degrees: u16,
    /// Current velocity vector in pixels per second.
    pub velocity: Position,
    /// Current locomotion mode.
    pub speed_mode: SpeedMode,
    /// Whether the resident is currently sleeping.
    pub sleeping: bool,
    /// The six need dimensions.
    pub needs: Needs,
    /// Non-negative wallet balance in currency units.
    pub wallet: u64,
    /// Owned inventory, one slot per distinct item type.
    pub inventory: Vec<InventoryItem>,
    /// Current job assignment, if employed.
    pub employment: Option<Employment>,
    /// The building this resident is currently inside, if any.
    pub current_building: Option<StructureId>,
    /// Opt-in webhook URL for side-channel notifications.
    pub webhook_url: Option<String>,
    /// Opt-in free-text bio shown on the public inspect card.
    pub bio: Option<String>,
    /// Custody state (offenses, arrest/escort links, prison sentence).
    pub custody: Custody,
    /// Runtime-only transient state, reset on load.
    #[serde(skip_serializing, default)]
    pub transient: ResidentTransient,
    /// Real-world registration timestamp.
    pub registered_at: DateTime<Utc>,
}

impl Resident {
    /// Whether this resident currently accepts interactive actions.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        matches!(self.status, LifecycleStatus::Alive)
    }

    /// Whether this resident is currently imprisoned.
    #[must_use]
    pub const fn is_imprisoned(&self) -> bool {
        self.custody.is_imprisoned()
    }
}

// ---------------------------------------------------------------------------
// Foraging node
// ---------------------------------------------------------------------------

/// A harvestable resource node on the tile map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForagingNode {
    /// Unique identifier.
    pub id: ForageNodeId,
    /// Position on the tile map.
    pub position: Position,
    /// What this node yields.
    pub kind: ForageNodeKind,
    /// Uses remaining, `0..=max_uses`.
    pub uses_remaining: u32,
    /// Maximum uses before depletion.
    pub max_uses: u32,
    /// World-seconds timestamp of depletion; `None` while uses remain.
    pub depleted_at_world_seconds: Option<u64>,
    /// World-seconds duration after depletion before the node regrows.
    pub regrow_interval_seconds: u64,
}

impl ForagingNode {
    /// Whether this node currently has no uses remaining.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.uses_remaining == 0
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// An immutable, append-only event log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonically increasing unique identifier.
    pub id: EventId,
    /// World-seconds timestamp when the event occurred.
    pub world_seconds: u64,
    /// The category of event.
    pub event_type: crate::enums::EventType,
    /// The primary resident involved, if any.
    pub resident_id: Option<ResidentId>,
    /// A secondary resident involved (target of an action), if any.
    pub target_id: Option<ResidentId>,
    /// The building involved, if any.
    pub building_id: Option<StructureId>,
    /// The position where the event occurred, if applicable.
    pub position: Option<Position>,
    /// Opaque structured payload, type-specific.
    pub details: serde_json::Value,
    /// Real-world timestamp when the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// The public, rejection-facing detail payload returned in `action_result`
/// and `error` messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionDetails {
    /// The machine-readable rejection reason code.
    pub reason: crate::enums::RejectionReason,
    /// Human-readable explanation.
    pub message: String,
}

/// A target resident's public card, returned by `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectCard {
    /// The inspected resident's id.
    pub id: ResidentId,
    /// Display name.
    pub display_name: String,
    /// Passport number.
    pub passport_no: String,
    /// Lifecycle status.
    pub status: LifecycleStatus,
    /// Opt-in bio, if set.
    pub bio: Option<String>,
    /// Current building, if any (visible to spectators/inspectors).
    pub current_building: Option<StructureId>,
}

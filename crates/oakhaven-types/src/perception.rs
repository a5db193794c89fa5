//! Perception payload types delivered to connections each perception tick.
//!
//! The perception packet is the only information a player connection
//! receives about the world each tick; a spectator connection instead
//! receives the unfiltered [`SpectatorView`].

use serde::{Deserialize, Serialize};

use crate::enums::{LifecycleStatus, SpeedMode, StructureKind, TimeOfDay};
use crate::ids::{ForageNodeId, JobId, ResidentId, StructureId};
use crate::structs::{ForagingNode, InventoryItem, Position, Resident};

/// Needs rounded to one decimal place, represented as fixed-point tenths
/// (e.g. `805` means `80.5`). Perception is the only boundary at which
/// needs leave their whole-number in-memory representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedsTenths {
    /// Hunger in tenths, `0..=1000`.
    pub hunger: i32,
    /// Thirst in tenths, `0..=1000`.
    pub thirst: i32,
    /// Energy in tenths, `0..=1000`.
    pub energy: i32,
    /// Bladder in tenths, `0..=1000`.
    pub bladder: i32,
    /// Health in tenths, `0..=1000`.
    pub health: i32,
    /// Social in tenths, `0..=1000`.
    pub social: i32,
}

impl From<crate::structs::Needs> for NeedsTenths {
    fn from(needs: crate::structs::Needs) -> Self {
        let tenths = |value: u32| i32::try_from(value).unwrap_or(i32::MAX).saturating_mul(10);
        Self {
            hunger: tenths(needs.hunger),
            thirst: tenths(needs.thirst),
            energy: tenths(needs.energy),
            bladder: tenths(needs.bladder),
            health: tenths(needs.health),
            social: tenths(needs.social),
        }
    }
}

/// A compact summary of a resident's employment, for the self-state block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentSummary {
    /// The job vacancy held.
    pub job_id: JobId,
    /// Whether currently clocked in.
    pub on_shift: bool,
}

/// A compact summary of a resident's custody state, for the self-state
/// block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustodySummary {
    /// Number of active offenses.
    pub offense_count: u32,
    /// The arresting officer, if any.
    pub arrested_by: Option<ResidentId>,
    /// World-seconds release timestamp, if imprisoned.
    pub prison_sentence_end_world_seconds: Option<u64>,
    /// Suspect currently being escorted, if any.
    pub carrying_suspect_id: Option<ResidentId>,
    /// Body currently being carried, if any.
    pub carrying_body_id: Option<ResidentId>,
}

/// The connected resident's own state, as presented in perception.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfState {
    /// The resident's id.
    pub id: ResidentId,
    /// Current position.
    pub position: Position,
    /// Current facing in degrees.
    pub facing_degrees: u16,
    /// Needs rounded to tenths.
    pub needs: NeedsTenths,
    /// Current wallet balance.
    pub wallet: u64,
    /// Current inventory.
    pub inventory: Vec<InventoryItem>,
    /// Current lifecycle status.
    pub status: LifecycleStatus,
    /// Current employment, if any.
    pub employment: Option<EmploymentSummary>,
    /// Custody summary.
    pub custody: CustodySummary,
    /// Targets this resident is still awaiting a reply from.
    pub awaiting_reply_from: Vec<ResidentId>,
}

/// Another resident visible this tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VisibleResident {
    /// The visible resident's id.
    pub id: ResidentId,
    /// Current position.
    pub position: Position,
    /// Current facing in degrees.
    pub facing_degrees: u16,
    /// Current lifecycle status (alive residents vs. unprocessed bodies).
    pub status: LifecycleStatus,
    /// Current locomotion mode.
    pub speed_mode: SpeedMode,
}

/// A building visible this tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VisibleBuilding {
    /// The building's id.
    pub id: StructureId,
    /// The building's category.
    pub kind: StructureKind,
    /// The building's position (door reference point).
    pub position: Position,
}

/// A foraging node visible this tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VisibleForageNode {
    /// The node's id.
    pub id: ForageNodeId,
    /// Position on the tile map.
    pub position: Position,
    /// Uses remaining.
    pub uses_remaining: u32,
}

/// A speech act heard this tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudibleMessage {
    /// Who spoke.
    pub from: ResidentId,
    /// The spoken text.
    pub text: String,
    /// Whether this speech was directed at the receiving resident.
    pub directed_at_me: bool,
}

/// The complete perception payload delivered to a connected resident at
/// each perception tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perception {
    /// World-seconds timestamp this perception was computed at.
    pub world_seconds: u64,
    /// Current time-of-day phase.
    pub time_of_day: TimeOfDay,
    /// The resident's own state.
    pub self_state: SelfState,
    /// Other residents currently visible.
    pub visible_residents: Vec<VisibleResident>,
    /// Buildings currently visible.
    pub visible_buildings: Vec<VisibleBuilding>,
    /// Foraging nodes currently visible.
    pub visible_forage_nodes: Vec<VisibleForageNode>,
    /// Speech heard this tick.
    pub audible_messages: Vec<AudibleMessage>,
    /// Interaction tags currently permitted, derived from state.
    pub interaction_tags: Vec<String>,
    /// Pending notifications delivered this tick.
    pub pending_notifications: Vec<String>,
}

/// The unfiltered view delivered to spectator connections: every resident,
/// every building, every forage node, every currently buffered speech, with
/// no FOV, LOS, or range restriction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectatorView {
    /// World-seconds timestamp this view was computed at.
    pub world_seconds: u64,
    /// Every resident in the world, alive or not-yet-processed.
    pub residents: Vec<Resident>,
    /// Every building on the map.
    pub buildings: Vec<VisibleBuilding>,
    /// Every foraging node on the map.
    pub forage_nodes: Vec<ForagingNode>,
    /// All speech currently buffered across all residents.
    pub buffered_speech: Vec<AudibleMessage>,
}

//! Shared type definitions for the Oakhaven colony simulation.
//!
//! This crate is the single source of truth for the data model shared
//! across the simulation workspace: entity structs, identifiers,
//! enumerations, the action/perception wire shapes, and the WebSocket
//! protocol envelopes.
//!
//! # Modules
//!
//! - [`ids`] -- type-safe UUID wrappers for every entity identifier
//! - [`enums`] -- enumeration types (status, action tags, event tags, ...)
//! - [`structs`] -- core entity structs (`Resident`, `ForagingNode`, `Event`)
//! - [`actions`] -- action request/result types for the action arbiter
//! - [`perception`] -- the perception payload delivered each tick
//! - [`protocol`] -- the WebSocket client/server message envelopes

pub mod actions;
pub mod enums;
pub mod ids;
pub mod perception;
pub mod protocol;
pub mod structs;

pub use actions::{
    ActionEnvelope, ActionResult, ActionStatus, ApplyJobParams, BuyParams, ConsumeParams,
    EnterBuildingParams, FaceParams, ForageParams, GiveParams, MoveParams, MoveToParams,
    SpeakParams, SubmitFeedbackParams, TargetResidentParams, TradeParams, VotePetitionParams,
    WritePetitionParams,
};
pub use enums::{
    ActionType, EventType, ForageNodeKind, ItemType, LedgerEntryType, LifecycleStatus,
    OffenseKind, PainSeverity, PainSource, RejectionReason, ResidentKind, SpeedMode, StructureKind,
    TimeOfDay, Volume,
};
pub use ids::{
    EventId, FeedbackToken, ForageNodeId, JobId, PetitionId, ResidentId, RuleId, StructureId,
    TradeId,
};
pub use perception::{
    AudibleMessage, CustodySummary, EmploymentSummary, NeedsTenths, Perception, SelfState,
    SpectatorView, VisibleBuilding, VisibleForageNode, VisibleResident,
};
pub use protocol::{
    AuthMessage, ClientMessage, ErrorMessage, ServerMessage, SessionClaims, SystemAnnouncement,
    WelcomeMessage,
};
pub use structs::{
    Custody, Employment, Event, ForagingNode, InspectCard, InventoryItem, Needs, Offense,
    PainMessage, PathState, PendingSpeech, Position, RejectionDetails, Resident,
    ResidentTransient, CORPSE_PARKING_POSITION,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_clamp_to_bounds() {
        assert_eq!(Needs::apply_delta(95, 20), 100);
        assert_eq!(Needs::apply_delta(5, -20), 0);
        assert_eq!(Needs::apply_delta(50, -10), 40);
    }

    #[test]
    fn needs_tenths_scales_correctly() {
        let needs = Needs {
            hunger: 80,
            thirst: 0,
            energy: 100,
            bladder: 5,
            health: 50,
            social: 33,
        };
        let tenths = NeedsTenths::from(needs);
        assert_eq!(tenths.hunger, 800);
        assert_eq!(tenths.bladder, 50);
    }

    #[test]
    fn action_result_ok_has_no_reason() {
        let result = ActionResult::ok(None, None);
        assert_eq!(result.status, ActionStatus::Ok);
        assert!(result.reason.is_none());
    }
}

//! Precondition pipeline shared by every action (§4.10): idempotent
//! request-id dedup, the lifecycle status gate, and the awake gate.
//!
//! Per-action preconditions (energy, building, range, target existence)
//! are each subsystem function's own responsibility and are not
//! duplicated here.

use oakhaven_types::{ActionType, RejectionReason, Resident};
use uuid::Uuid;

use crate::error::AgentError;

/// Actions an imprisoned resident may still perform.
const ALLOWED_WHILE_IMPRISONED: [ActionType; 3] =
    [ActionType::Inspect, ActionType::Speak, ActionType::SubmitFeedback];

/// Actions that do not require the resident to be awake: pure queries, the
/// referral/feedback surface, and `Wake` itself.
const EXEMPT_FROM_AWAKE_GATE: [ActionType; 7] = [
    ActionType::Wake,
    ActionType::ListJobs,
    ActionType::ListPetitions,
    ActionType::Inspect,
    ActionType::GetReferralLink,
    ActionType::ClaimReferrals,
    ActionType::SubmitFeedback,
];

/// Check `request_id` against `resident.transient.seen_request_ids`,
/// pruning entries older than `ttl_seconds` and recording the new one.
///
/// Returns `true` if this is a duplicate that should be rejected without
/// re-running the action.
fn check_and_record_request_id(
    resident: &mut Resident,
    request_id: Uuid,
    now_seconds: u64,
    ttl_seconds: u64,
) -> bool {
    resident
        .transient
        .seen_request_ids
        .retain(|_, seen_at| now_seconds.saturating_sub(*seen_at) < ttl_seconds);
    if resident.transient.seen_request_ids.contains_key(&request_id) {
        return true;
    }
    resident.transient.seen_request_ids.insert(request_id, now_seconds);
    false
}

/// The lifecycle status gate: deceased residents may perform nothing, and
/// imprisoned residents may only perform [`ALLOWED_WHILE_IMPRISONED`].
fn status_gate(resident: &Resident, action: ActionType) -> Result<(), AgentError> {
    if resident.status != oakhaven_types::LifecycleStatus::Alive {
        return Err(AgentError::rejected(RejectionReason::Deceased, "resident is not alive"));
    }
    if resident.custody.is_imprisoned() && !ALLOWED_WHILE_IMPRISONED.contains(&action) {
        return Err(AgentError::rejected(RejectionReason::Imprisoned, "resident is imprisoned"));
    }
    Ok(())
}

/// The awake gate: a sleeping resident may only act through
/// [`EXEMPT_FROM_AWAKE_GATE`].
fn awake_gate(resident: &Resident, action: ActionType) -> Result<(), AgentError> {
    if resident.sleeping && !EXEMPT_FROM_AWAKE_GATE.contains(&action) {
        return Err(AgentError::rejected(RejectionReason::NotAwake, "resident is asleep"));
    }
    Ok(())
}

/// Run the full shared precondition pipeline ahead of per-action dispatch.
pub fn check_preconditions(
    resident: &mut Resident,
    action: ActionType,
    request_id: Option<Uuid>,
    world_seconds: u64,
    request_id_ttl_seconds: u64,
) -> Result<(), AgentError> {
    if let Some(request_id) = request_id {
        if check_and_record_request_id(resident, request_id, world_seconds, request_id_ttl_seconds) {
            return Err(AgentError::rejected(RejectionReason::TooSoon, "duplicate request_id"));
        }
    }
    status_gate(resident, action)?;
    awake_gate(resident, action)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use oakhaven_types::{
        Custody, LifecycleStatus, Needs, Position, ResidentId, ResidentKind, ResidentTransient, SpeedMode,
    };

    use super::*;

    fn resident() -> Resident {
        Resident {
            id: ResidentId::new(),
            passport_no: "OC-0000001".to_owned(),
            display_name: "Test".to_owned(),
            kind: ResidentKind::Agent,
            status: LifecycleStatus::Alive,
            position: Position::new(0.0, 0.0),
            facing_degrees: 0,
            velocity: Position::new(0.0, 0.0),
            speed_mode: SpeedMode::Stopped,
            sleeping: false,
            needs: Needs::full(),
            wallet: 0,
            inventory: Vec::new(),
            employment: None,
            current_building: None,
            webhook_url: None,
            bio: None,
            custody: Custody::default(),
            transient: ResidentTransient::default(),
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn deceased_residents_are_rejected_for_every_action() {
        let mut r = resident();
        r.status = LifecycleStatus::Deceased;
        let err = check_preconditions(&mut r, ActionType::Speak, None, 0, 30).unwrap_err();
        assert_eq!(err.into_details().reason, RejectionReason::Deceased);
    }

    #[test]
    fn imprisoned_residents_may_still_speak() {
        let mut r = resident();
        r.custody.prison_sentence_end_world_seconds = Some(1000);
        check_preconditions(&mut r, ActionType::Speak, None, 0, 30).unwrap();
    }

    #[test]
    fn imprisoned_residents_cannot_move() {
        let mut r = resident();
        r.custody.prison_sentence_end_world_seconds = Some(1000);
        let err = check_preconditions(&mut r, ActionType::Move, None, 0, 30).unwrap_err();
        assert_eq!(err.into_details().reason, RejectionReason::Imprisoned);
    }

    #[test]
    fn sleeping_residents_cannot_move_but_can_wake() {
        let mut r = resident();
        r.sleeping = true;
        let err = check_preconditions(&mut r, ActionType::Move, None, 0, 30).unwrap_err();
        assert_eq!(err.into_details().reason, RejectionReason::NotAwake);
        check_preconditions(&mut r, ActionType::Wake, None, 0, 30).unwrap();
    }

    #[test]
    fn duplicate_request_ids_are_rejected_within_the_ttl() {
        let mut r = resident();
        let id = Uuid::new_v4();
        check_preconditions(&mut r, ActionType::Speak, Some(id), 0, 30).unwrap();
        let err = check_preconditions(&mut r, ActionType::Speak, Some(id), 1, 30).unwrap_err();
        assert_eq!(err.into_details().reason, RejectionReason::TooSoon);
    }

    #[test]
    fn duplicate_request_ids_are_allowed_again_after_the_ttl() {
        let mut r = resident();
        let id = Uuid::new_v4();
        check_preconditions(&mut r, ActionType::Speak, Some(id), 0, 30).unwrap();
        check_preconditions(&mut r, ActionType::Speak, Some(id), 31, 30).unwrap();
    }
}

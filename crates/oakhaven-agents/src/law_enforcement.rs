//! Law enforcement: prison release, loitering, suspect escort, arrest/book
//! (§4.7).

use oakhaven_types::{OffenseKind, Offense, Position, RejectionReason, Resident, RuleId};

use crate::config::LawConfig;
use crate::error::AgentError;
use crate::jobs::{JobBoard, JobRole};

/// If `resident`'s prison sentence has expired, clear custody and place
/// them just outside `release_point`.
///
/// Returns `true` if the resident was released this call.
pub fn tick_prison_release(resident: &mut Resident, release_point: Position, world_seconds: u64) -> bool {
    let Some(release_at) = resident.custody.prison_sentence_end_world_seconds else {
        return false;
    };
    if world_seconds < release_at {
        return false;
    }
    resident.custody.offenses.clear();
    resident.custody.arrested_by = None;
    resident.custody.prison_sentence_end_world_seconds = None;
    resident.position = release_point;
    true
}

/// Whether `resident` is currently exempt from loitering detection:
/// imprisoned, under arrest, sleeping, or inside a building.
fn exempt_from_loitering(resident: &Resident) -> bool {
    resident.custody.is_imprisoned()
        || resident.custody.arrested_by.is_some()
        || resident.sleeping
        || resident.current_building.is_some()
}

/// Advance loitering detection for one resident by `elapsed_seconds`.
///
/// Returns `true` if a new loitering offense was recorded this call.
pub fn tick_loitering(resident: &mut Resident, config: &LawConfig, elapsed_seconds: u64) -> bool {
    if exempt_from_loitering(resident) {
        resident.transient.loiter_anchor = None;
        resident.transient.loiter_accumulated_seconds = 0;
        return false;
    }

    let Some(anchor) = resident.transient.loiter_anchor else {
        resident.transient.loiter_anchor = Some(resident.position);
        resident.transient.loiter_accumulated_seconds = 0;
        return false;
    };

    if resident.position.distance_to(anchor) > config.loiter_check_radius {
        resident.transient.loiter_anchor = Some(resident.position);
        resident.transient.loiter_accumulated_seconds = 0;
        resident
            .custody
            .offenses
            .retain(|offense| offense.kind != OffenseKind::Loitering);
        return false;
    }

    resident.transient.loiter_accumulated_seconds =
        resident.transient.loiter_accumulated_seconds.saturating_add(elapsed_seconds);

    if resident.transient.loiter_accumulated_seconds < config.loiter_threshold_world_seconds {
        return false;
    }

    let already_loitering = resident
        .custody
        .offenses
        .iter()
        .any(|offense| offense.kind == OffenseKind::Loitering);
    if already_loitering {
        return false;
    }

    resident.custody.offenses.push(Offense {
        id: RuleId::new(),
        kind: OffenseKind::Loitering,
        recorded_at_world_seconds: resident.transient.loiter_accumulated_seconds,
    });
    true
}

/// Place an escorted suspect behind the officer's facing by the configured
/// offset. If the suspect is no longer alive, clears the carrying link
/// instead and returns `false`.
pub fn follow_suspect(officer: &mut Resident, suspect: &mut Resident, config: &LawConfig) -> bool {
    if suspect.status != oakhaven_types::LifecycleStatus::Alive {
        officer.custody.carrying_suspect_id = None;
        return false;
    }
    let radians = f64::from(officer.facing_degrees).to_radians();
    suspect.position = Position::new(
        officer.position.x - radians.sin() * config.escort_offset,
        officer.position.y + radians.cos() * config.escort_offset,
    );
    true
}

/// Arrest `suspect`: only by a resident holding [`JobRole::PoliceOfficer`],
/// within arrest range, against a suspect with at least one recorded
/// offense.
pub fn arrest(
    officer: &mut Resident,
    suspect: &mut Resident,
    board: &JobBoard,
    config: &LawConfig,
) -> Result<(), AgentError> {
    if !board.holds_role(officer.id, JobRole::PoliceOfficer) {
        return Err(AgentError::rejected(RejectionReason::Unauthorized, "not a police officer"));
    }
    if officer.position.distance_to(suspect.position) > config.arrest_range {
        return Err(AgentError::rejected(RejectionReason::OutOfRange, "suspect out of arrest range"));
    }
    if suspect.custody.offenses.is_empty() {
        return Err(AgentError::rejected(RejectionReason::NoActiveOffenses, "suspect has no recorded offenses"));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let energy_cost = config.arrest_energy_cost.round() as u32;
    if officer.needs.energy < energy_cost {
        return Err(AgentError::rejected(RejectionReason::InsufficientEnergy, "not enough energy to arrest"));
    }

    suspect.custody.arrested_by = Some(officer.id);
    officer.custody.carrying_suspect_id = Some(suspect.id);
    suspect.speed_mode = oakhaven_types::SpeedMode::Stopped;
    officer.needs.energy = officer.needs.energy.saturating_sub(energy_cost);
    Ok(())
}

/// Book the suspect currently escorted by `officer`, provided the officer
/// is inside the police station. Returns the booked suspect's id and the
/// bounty to credit the officer.
pub fn book_suspect(
    officer: &mut Resident,
    suspect: &mut Resident,
    config: &LawConfig,
    world_seconds: u64,
) -> Result<u64, AgentError> {
    if officer.custody.carrying_suspect_id != Some(suspect.id) {
        return Err(AgentError::rejected(RejectionReason::NotEscorting, "not escorting this suspect"));
    }
    suspect.custody.prison_sentence_end_world_seconds =
        Some(world_seconds.saturating_add(config.sentence_world_seconds));
    officer.custody.carrying_suspect_id = None;
    Ok(config.arrest_bounty)
}

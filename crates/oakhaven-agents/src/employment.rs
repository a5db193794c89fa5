//! Employment: seating, shift accrual, and wage payment (§4.6).

use oakhaven_ledger::Ledger;
use oakhaven_types::{Employment, JobId, RejectionReason, Resident, StructureId};

use crate::error::AgentError;
use crate::jobs::JobBoard;

/// Seat `resident` in job `id`, provided they are inside the job's building
/// and a vacancy exists.
pub fn apply_job(resident: &mut Resident, board: &mut JobBoard, id: JobId) -> Result<(), AgentError> {
    if resident.employment.is_some() {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "already employed"));
    }
    let Some(listing) = board.listing(id) else {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "no such job"));
    };
    if resident.current_building != Some(listing.building) {
        return Err(AgentError::rejected(RejectionReason::WrongBuilding, "must be inside the hiring hall"));
    }
    if !board.apply(id, resident.id) {
        return Err(AgentError::rejected(RejectionReason::NoVacancy, "no vacancy"));
    }
    resident.employment = Some(Employment {
        job_id: id,
        on_shift: false,
        shift_seconds_accrued: 0,
    });
    Ok(())
}

/// Clear `resident`'s job, releasing any escorted suspect per §4.6.
pub fn quit_job(resident: &mut Resident, board: &mut JobBoard) -> Result<(), AgentError> {
    let Some(employment) = resident.employment.take() else {
        return Err(AgentError::rejected(RejectionReason::NotEmployed, "not employed"));
    };
    board.quit(employment.job_id, resident.id);
    resident.custody.carrying_suspect_id = None;
    Ok(())
}

/// Outcome of advancing a resident's shift timer this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftOutcome {
    /// The job id the wage was paid against, if a shift completed.
    pub job_id: JobId,
    /// The wage credited.
    pub wage: u64,
}

/// Advance the shift timer for an on-shift resident inside their employer's
/// building; pays the wage and resets the counter on crossing the
/// shift-duration threshold.
pub fn tick_shift(
    resident: &mut Resident,
    board: &JobBoard,
    ledger: &mut Ledger,
    world_seconds: u64,
    elapsed_seconds: u64,
    shift_duration_seconds: u64,
    employer_building: StructureId,
) -> Result<Option<ShiftOutcome>, AgentError> {
    let Some(employment) = resident.employment.as_mut() else {
        return Ok(None);
    };
    if !employment.on_shift || resident.current_building != Some(employer_building) {
        return Ok(None);
    }
    employment.shift_seconds_accrued = employment.shift_seconds_accrued.saturating_add(elapsed_seconds);
    if employment.shift_seconds_accrued < shift_duration_seconds {
        return Ok(None);
    }
    let job_id = employment.job_id;
    employment.shift_seconds_accrued = 0;
    let wage = board.listing(job_id).map_or(0, |listing| listing.wage);
    let entry = ledger
        .record_wage(world_seconds, resident.id, wage, job_id.into_inner())?
        .clone();
    Ledger::apply(&entry, resident.id, &mut resident.wallet)?;
    Ok(Some(ShiftOutcome { job_id, wage }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use oakhaven_types::{Custody, LifecycleStatus, Needs, Position, ResidentId, ResidentKind, ResidentTransient, SpeedMode};

    use super::*;
    use crate::jobs::{JobListing, JobRole};

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

    fn board_with_job(building: StructureId) -> (JobBoard, JobId) {
        let mut board = JobBoard::new();
        let job = JobListing {
            id: JobId::new(),
            title: "Laborer".to_owned(),
            role: JobRole::Laborer,
            building,
            wage: 15,
            vacancies: 1,
            occupants: Vec::new(),
        };
        let id = job.id;
        board.post(job);
        (board, id)
    }

    #[test]
    fn apply_job_requires_presence_in_the_hall() {
        let building = StructureId::new();
        let (mut board, id) = board_with_job(building);
        let mut r = resident();
        let err = apply_job(&mut r, &mut board, id).unwrap_err();
        assert_eq!(err.into_details().reason, RejectionReason::WrongBuilding);
    }

    #[test]
    fn apply_job_seats_the_resident() {
        let building = StructureId::new();
        let (mut board, id) = board_with_job(building);
        let mut r = resident();
        r.current_building = Some(building);
        apply_job(&mut r, &mut board, id).unwrap();
        assert!(r.employment.is_some());
    }

    #[test]
    fn quit_job_releases_an_escorted_suspect() {
        let building = StructureId::new();
        let (mut board, id) = board_with_job(building);
        let mut r = resident();
        r.current_building = Some(building);
        apply_job(&mut r, &mut board, id).unwrap();
        r.custody.carrying_suspect_id = Some(ResidentId::new());
        quit_job(&mut r, &mut board).unwrap();
        assert!(r.employment.is_none());
        assert!(r.custody.carrying_suspect_id.is_none());
    }

    #[test]
    fn tick_shift_pays_a_wage_on_crossing_the_threshold() {
        let building = StructureId::new();
        let (mut board, id) = board_with_job(building);
        let mut r = resident();
        r.current_building = Some(building);
        apply_job(&mut r, &mut board, id).unwrap();
        r.employment.as_mut().unwrap().on_shift = true;
        let mut ledger = Ledger::new();
        let outcome = tick_shift(&mut r, &board, &mut ledger, 0, 100, 100, building)
            .unwrap()
            .expect("shift completed");
        assert_eq!(outcome.wage, 15);
        assert_eq!(r.wallet, 15);
        assert_eq!(r.employment.unwrap().shift_seconds_accrued, 0);
    }

    #[test]
    fn tick_shift_does_nothing_while_off_shift() {
        let building = StructureId::new();
        let (mut board, id) = board_with_job(building);
        let mut r = resident();
        r.current_building = Some(building);
        apply_job(&mut r, &mut board, id).unwrap();
        let mut ledger = Ledger::new();
        let outcome = tick_shift(&mut r, &board, &mut ledger, 0, 100, 100, building).unwrap();
        assert!(outcome.is_none());
    }
}

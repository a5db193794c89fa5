//! Death and corpse handling (§4.4 step 8, §4.5 `collect_body`/`process_body`).
//!
//! Oakhaven residents die exactly one way: health reaches zero. There is no
//! aging or lifespan. On death the body is parked off-map at
//! [`CORPSE_PARKING_POSITION`] until an officer or mortuary worker collects
//! and processes it, preserving the invariant that a corpse has exactly one
//! carrying-position relation at a time: either parked, or carried by the
//! resident whose `custody.carrying_body_id` names it.

use oakhaven_types::{CORPSE_PARKING_POSITION, LifecycleStatus, Resident, ResidentId};

/// Check whether `resident` has just died (health at zero, still marked
/// alive) and, if so, transition it to [`LifecycleStatus::Deceased`] and
/// park the body.
///
/// Returns `true` if this call caused the transition.
pub fn check_death(resident: &mut Resident) -> bool {
    if resident.status == LifecycleStatus::Alive && resident.needs.health == 0 {
        resident.status = LifecycleStatus::Deceased;
        resident.position = CORPSE_PARKING_POSITION;
        resident.sleeping = false;
        resident.transient.path_state = None;
        true
    } else {
        false
    }
}

/// Outcome of a `collect_body` action (§4.5): the body is picked up by a
/// carrier and removed from the map until processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectBodyOutcome {
    /// The deceased resident now being carried.
    pub body_id: ResidentId,
}

/// Attach `body_id` to `carrier`'s custody, provided the body is a deceased
/// resident not already being carried and the carrier is not already
/// carrying another body or suspect.
///
/// Precondition checks (target alive/found, wrong building, etc.) are the
/// caller's responsibility; this only enforces the carrying-relation
/// invariant.
pub fn collect_body(carrier: &mut Resident, body: &Resident) -> Option<CollectBodyOutcome> {
    if body.status != LifecycleStatus::Deceased {
        return None;
    }
    if carrier.custody.carrying_body_id.is_some() || carrier.custody.carrying_suspect_id.is_some() {
        return None;
    }
    carrier.custody.carrying_body_id = Some(body.id);
    Some(CollectBodyOutcome { body_id: body.id })
}

/// Finalise a carried body at the mortuary (§4.5 `process_body`): release
/// the carrying relation so the caller can remove the body from the world.
pub fn process_body(carrier: &mut Resident) -> Option<ResidentId> {
    carrier.custody.carrying_body_id.take()
}

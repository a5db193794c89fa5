//! Job board (§4.6 Employment).
//!
//! Jobs are not part of the wire data model in `oakhaven-types` — they are
//! agent-subsystem state, kept here rather than upstream so `oakhaven-core`
//! (which depends on this crate) can compose them into perception and
//! persistence without this crate needing to depend back on core.

use oakhaven_types::{JobId, ResidentId, StructureId};

/// A job's function, used to gate role-restricted actions like `arrest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobRole {
    /// Can arrest and book suspects at the police station.
    PoliceOfficer,
    /// Works the mortuary, processing bodies.
    MortuaryWorker,
    /// General labour with no special privileges.
    Laborer,
}

/// A single job vacancy posted on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobListing {
    /// Unique identifier.
    pub id: JobId,
    /// Human-readable title shown in `list_jobs`.
    pub title: String,
    /// The functional role this job grants.
    pub role: JobRole,
    /// The building a resident must be inside to work this job.
    pub building: StructureId,
    /// Wage credited on each completed shift.
    pub wage: u64,
    /// Maximum residents who may hold this job at once.
    pub vacancies: u32,
    /// Residents currently seated in this job.
    pub occupants: Vec<ResidentId>,
}

impl JobListing {
    /// Whether another resident can currently be seated in this job.
    #[must_use]
    pub fn has_vacancy(&self) -> bool {
        u32::try_from(self.occupants.len()).unwrap_or(u32::MAX) < self.vacancies
    }
}

/// The set of job listings available in the colony.
#[derive(Debug, Clone, Default)]
pub struct JobBoard {
    listings: Vec<JobListing>,
}

impl JobBoard {
    /// An empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self { listings: Vec::new() }
    }

    /// Post a new job listing.
    pub fn post(&mut self, listing: JobListing) {
        self.listings.push(listing);
    }

    /// All postings, for `list_jobs`.
    #[must_use]
    pub fn listings(&self) -> &[JobListing] {
        &self.listings
    }

    /// Look up a listing by id.
    #[must_use]
    pub fn listing(&self, id: JobId) -> Option<&JobListing> {
        self.listings.iter().find(|listing| listing.id == id)
    }

    /// Seat `resident` in job `id`, provided a vacancy exists and the
    /// resident is not already seated.
    ///
    /// Returns `true` on success.
    pub fn apply(&mut self, id: JobId, resident: ResidentId) -> bool {
        let Some(listing) = self.listings.iter_mut().find(|listing| listing.id == id) else {
            return false;
        };
        if !listing.has_vacancy() || listing.occupants.contains(&resident) {
            return false;
        }
        listing.occupants.push(resident);
        true
    }

    /// Remove `resident` from job `id`, if seated there.
    pub fn quit(&mut self, id: JobId, resident: ResidentId) {
        if let Some(listing) = self.listings.iter_mut().find(|listing| listing.id == id) {
            listing.occupants.retain(|occupant| *occupant != resident);
        }
    }

    /// Whether `resident` currently holds a job with the given role.
    #[must_use]
    pub fn holds_role(&self, resident: ResidentId, role: JobRole) -> bool {
        self.listings
            .iter()
            .any(|listing| listing.role == role && listing.occupants.contains(&resident))
    }
}

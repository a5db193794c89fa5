//! Petition board (`write_petition`, `vote_petition`, `list_petitions`).

use oakhaven_types::{PetitionId, ResidentId};

/// A single petition posted to the council hall board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Petition {
    /// Unique identifier.
    pub id: PetitionId,
    /// Short title.
    pub title: String,
    /// Free-text body.
    pub body: String,
    /// Who wrote it.
    pub author: ResidentId,
    /// Residents who voted in favor.
    pub votes_for: Vec<ResidentId>,
    /// Residents who voted against.
    pub votes_against: Vec<ResidentId>,
    /// World-seconds timestamp this petition expires and is removed from
    /// the active board.
    pub expires_at_world_seconds: u64,
}

/// Active petitions in the colony.
#[derive(Debug, Clone, Default)]
pub struct PetitionBoard {
    petitions: Vec<Petition>,
}

impl PetitionBoard {
    /// An empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self { petitions: Vec::new() }
    }

    /// Post a new petition.
    pub fn write(&mut self, petition: Petition) {
        self.petitions.push(petition);
    }

    /// All currently active petitions.
    #[must_use]
    pub fn petitions(&self) -> &[Petition] {
        &self.petitions
    }

    /// Record `resident`'s vote on `id`. A resident may cast only one vote
    /// per petition; a repeat vote overwrites the prior choice.
    ///
    /// Returns `false` if no petition with `id` exists.
    pub fn vote(&mut self, id: PetitionId, resident: ResidentId, in_favor: bool) -> bool {
        let Some(petition) = self.petitions.iter_mut().find(|petition| petition.id == id) else {
            return false;
        };
        petition.votes_for.retain(|voter| *voter != resident);
        petition.votes_against.retain(|voter| *voter != resident);
        if in_favor {
            petition.votes_for.push(resident);
        } else {
            petition.votes_against.push(resident);
        }
        true
    }

    /// Drop every petition whose expiry has passed `world_seconds`.
    pub fn expire(&mut self, world_seconds: u64) {
        self.petitions.retain(|petition| petition.expires_at_world_seconds > world_seconds);
    }
}

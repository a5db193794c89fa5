//! Coordinates a full save or load across every store in this crate.
//!
//! The engine's save scheduler (§5: a 30-second interval plus a save on
//! shutdown) calls [`PersistenceCoordinator::save`] once per batch rather
//! than invoking each store directly, so a save is all-or-nothing from
//! the caller's point of view.

use oakhaven_agents::jobs::JobBoard;
use oakhaven_agents::petitions::PetitionBoard;
use oakhaven_agents::shop::ShopRegistry;
use oakhaven_types::{Event, Resident};
use sqlx::SqlitePool;

use crate::board_store::BoardStore;
use crate::error::DbError;
use crate::event_store::EventStore;
use crate::resident_store::ResidentStore;
use crate::world_state_store::{WorldStateRow, WorldStateStore};

/// Everything a save batch or a boot-time load needs to move as one
/// unit.
#[derive(Debug, Clone)]
pub struct ColonySave {
    /// Every resident currently known to the simulation.
    pub residents: Vec<Resident>,
    /// Events recorded since the previous save.
    pub pending_events: Vec<Event>,
    /// The job board.
    pub jobs: JobBoard,
    /// The petition board.
    pub petitions: PetitionBoard,
    /// The shop's price/stock table.
    pub shop: ShopRegistry,
    /// The world clock's counters.
    pub world_state: WorldStateRow,
}

/// Loaded colony state, as returned by [`PersistenceCoordinator::load`].
#[derive(Debug, Clone)]
pub struct ColonyLoad {
    /// Every persisted resident.
    pub residents: Vec<Resident>,
    /// The job board, restored from its persisted listings.
    pub jobs: JobBoard,
    /// The petition board, restored from its persisted petitions.
    pub petitions: PetitionBoard,
    /// The shop's price/stock table, restored from its persisted stock.
    pub shop: ShopRegistry,
    /// The world clock's counters, if a prior save exists.
    pub world_state: Option<WorldStateRow>,
}

/// Ties together every store in this crate behind one save/load call.
pub struct PersistenceCoordinator<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PersistenceCoordinator<'a> {
    /// Create a coordinator bound to a connection pool.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a full batch: residents, new events, and the job/petition/shop
    /// boards, plus the world clock's counters.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any underlying write fails. A failure
    /// partway through leaves the batch partially applied; the caller is
    /// expected to retry the whole batch on the next scheduled save.
    pub async fn save(&self, save: &ColonySave) -> Result<(), DbError> {
        ResidentStore::new(self.pool).save_all(&save.residents).await?;
        EventStore::new(self.pool).batch_insert(&save.pending_events).await?;

        let boards = BoardStore::new(self.pool);
        boards.save_jobs(&save.jobs).await?;
        boards.save_petitions(&save.petitions).await?;
        boards.save_shop(&save.shop).await?;

        WorldStateStore::new(self.pool).save(save.world_state).await?;

        tracing::info!(
            residents = save.residents.len(),
            events = save.pending_events.len(),
            "saved colony batch"
        );
        Ok(())
    }

    /// Load everything needed to restore a simulation at boot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any underlying query fails.
    pub async fn load(&self) -> Result<ColonyLoad, DbError> {
        let residents = ResidentStore::new(self.pool).load_all().await?;

        let boards = BoardStore::new(self.pool);
        let jobs = boards.load_jobs().await?;
        let petitions = boards.load_petitions().await?;
        let shop = boards.load_shop().await?;

        let world_state = WorldStateStore::new(self.pool).load().await?;

        tracing::info!(residents = residents.len(), "loaded colony state");
        Ok(ColonyLoad { residents, jobs, petitions, shop, world_state })
    }
}

#[cfg(test)]
mod tests {
    use oakhaven_types::{Needs, Position, ResidentKind};

    use super::*;
    use crate::sqlite::SqlitePool as OakhavenPool;

    fn minimal_resident() -> Resident {
        Resident {
            id: oakhaven_types::ResidentId::new(),
            passport_no: "OAK-1".to_owned(),
            display_name: "Test".to_owned(),
            kind: ResidentKind::Agent,
            status: oakhaven_types::LifecycleStatus::Alive,
            position: Position::new(0.0, 0.0),
            facing_degrees: 0,
            velocity: Position::new(0.0, 0.0),
            speed_mode: oakhaven_types::SpeedMode::Stopped,
            sleeping: false,
            needs: Needs::full(),
            wallet: 0,
            inventory: Vec::new(),
            employment: None,
            current_building: None,
            webhook_url: None,
            bio: None,
            custody: oakhaven_types::Custody::default(),
            transient: oakhaven_types::ResidentTransient::default(),
            registered_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_then_load_restores_residents_and_world_state() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let coordinator = PersistenceCoordinator::new(pool.pool());

        let save = ColonySave {
            residents: vec![minimal_resident()],
            pending_events: Vec::new(),
            jobs: JobBoard::new(),
            petitions: PetitionBoard::new(),
            shop: ShopRegistry::new(Vec::new()),
            world_state: WorldStateRow {
                world_seconds: 60,
                train_timer_seconds: 120,
                restock_timer_seconds: 600,
                save_timer_seconds: 30,
            },
        };
        coordinator.save(&save).await.unwrap();

        let loaded = coordinator.load().await.unwrap();
        assert_eq!(loaded.residents.len(), 1);
        assert_eq!(loaded.world_state, Some(save.world_state));
    }

    #[tokio::test]
    async fn load_with_nothing_saved_returns_empty_state() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let coordinator = PersistenceCoordinator::new(pool.pool());

        let loaded = coordinator.load().await.unwrap();
        assert!(loaded.residents.is_empty());
        assert!(loaded.world_state.is_none());
    }
}

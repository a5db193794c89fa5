//! World clock persistence: the single-row `world_state` table.

use sqlx::SqlitePool;

use crate::error::DbError;

/// The world clock's persisted counters, mirroring
/// `oakhaven_core::clock::WorldClock`'s saved fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldStateRow {
    /// World-seconds elapsed since the colony was founded.
    pub world_seconds: u64,
    /// Seconds remaining until the next train arrival.
    pub train_timer_seconds: u64,
    /// Seconds remaining until the next shop restock.
    pub restock_timer_seconds: u64,
    /// Seconds remaining until the next scheduled save.
    pub save_timer_seconds: u64,
}

/// Operations on the singleton `world_state` row.
pub struct WorldStateStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> WorldStateStore<'a> {
    /// Create a new world-state store bound to a connection pool.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert the single `world_state` row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the write fails.
    pub async fn save(&self, state: WorldStateRow) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO world_state (id, world_seconds, train_timer_seconds, restock_timer_seconds, save_timer_seconds)
              VALUES (0, ?, ?, ?, ?)
              ON CONFLICT (id) DO UPDATE SET
                world_seconds = excluded.world_seconds,
                train_timer_seconds = excluded.train_timer_seconds,
                restock_timer_seconds = excluded.restock_timer_seconds,
                save_timer_seconds = excluded.save_timer_seconds",
        )
        .bind(i64::try_from(state.world_seconds).unwrap_or(i64::MAX))
        .bind(i64::try_from(state.train_timer_seconds).unwrap_or(i64::MAX))
        .bind(i64::try_from(state.restock_timer_seconds).unwrap_or(i64::MAX))
        .bind(i64::try_from(state.save_timer_seconds).unwrap_or(i64::MAX))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Load the persisted world state, if a save has ever occurred.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn load(&self) -> Result<Option<WorldStateRow>, DbError> {
        let row: Option<(i64, i64, i64, i64)> = sqlx::query_as(
            "SELECT world_seconds, train_timer_seconds, restock_timer_seconds, save_timer_seconds FROM world_state WHERE id = 0",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(world_seconds, train_timer_seconds, restock_timer_seconds, save_timer_seconds)| WorldStateRow {
            world_seconds: u64::try_from(world_seconds).unwrap_or(0),
            train_timer_seconds: u64::try_from(train_timer_seconds).unwrap_or(0),
            restock_timer_seconds: u64::try_from(restock_timer_seconds).unwrap_or(0),
            save_timer_seconds: u64::try_from(save_timer_seconds).unwrap_or(0),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqlitePool as OakhavenPool;

    #[tokio::test]
    async fn load_with_no_prior_save_returns_none() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = WorldStateStore::new(pool.pool());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = WorldStateStore::new(pool.pool());

        let state = WorldStateRow {
            world_seconds: 1000,
            train_timer_seconds: 500,
            restock_timer_seconds: 2000,
            save_timer_seconds: 10,
        };
        store.save(state).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(state));

        let updated = WorldStateRow { world_seconds: 1030, ..state };
        store.save(updated).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(updated));
    }
}

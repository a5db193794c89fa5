//! Event log persistence: batch-inserting and querying the append-only
//! `events` table.
//!
//! The in-memory [`oakhaven_events::EventLog`] is authoritative during a
//! run; this store is how its contents survive a restart and how the
//! (out-of-scope) HTTP companion surface would read event history.

use oakhaven_types::{Event, EventId, EventType, Position, ResidentId, StructureId};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbError;

/// Default batch size for event inserts.
const DEFAULT_BATCH_SIZE: usize = 200;

/// Operations on the `events` table.
pub struct EventStore<'a> {
    pool: &'a SqlitePool,
    batch_size: usize,
}

impl<'a> EventStore<'a> {
    /// Create a new event store bound to a connection pool.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool, batch_size: DEFAULT_BATCH_SIZE }
    }

    /// Set the batch size used by [`Self::batch_insert`].
    #[must_use]
    pub const fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Batch-insert events into the `events` table, typically all events
    /// recorded since the last save.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the insert fails.
    pub async fn batch_insert(&self, events: &[Event]) -> Result<(), DbError> {
        if events.is_empty() {
            return Ok(());
        }

        for chunk in events.chunks(self.batch_size) {
            let mut tx = self.pool.begin().await?;

            for event in chunk {
                sqlx::query(
                    r"INSERT INTO events (
                        id, world_seconds, event_type, resident_id, target_id,
                        building_id, position_x, position_y, details, created_at
                      ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(event.id.into_inner())
                .bind(i64::try_from(event.world_seconds).unwrap_or(i64::MAX))
                .bind(event_type_to_db(event.event_type))
                .bind(event.resident_id.map(ResidentId::into_inner))
                .bind(event.target_id.map(ResidentId::into_inner))
                .bind(event.building_id.map(StructureId::into_inner))
                .bind(event.position.map(|p| p.x))
                .bind(event.position.map(|p| p.y))
                .bind(&event.details)
                .bind(event.created_at.to_rfc3339())
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;
        }

        tracing::debug!(count = events.len(), "inserted events");
        Ok(())
    }

    /// Query all events for a specific resident (as either actor or
    /// target), oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn get_events_for_resident(&self, resident: ResidentId) -> Result<Vec<EventRow>, DbError> {
        let id = resident.into_inner();
        let rows = sqlx::query_as::<_, EventRow>(
            r"SELECT * FROM events
              WHERE resident_id = ? OR target_id = ?
              ORDER BY world_seconds, created_at",
        )
        .bind(id)
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Query all events within a world-seconds range, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn get_events_in_range(&self, from_world_seconds: u64, to_world_seconds: u64) -> Result<Vec<EventRow>, DbError> {
        let from = i64::try_from(from_world_seconds).unwrap_or(i64::MAX);
        let to = i64::try_from(to_world_seconds).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, EventRow>(
            r"SELECT * FROM events
              WHERE world_seconds >= ? AND world_seconds < ?
              ORDER BY world_seconds, created_at",
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// A row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Event UUID.
    pub id: Uuid,
    /// World-seconds timestamp when the event occurred.
    pub world_seconds: i64,
    /// Event type, as its database string representation.
    pub event_type: String,
    /// The primary resident involved, if any.
    pub resident_id: Option<Uuid>,
    /// A secondary resident involved, if any.
    pub target_id: Option<Uuid>,
    /// The building involved, if any.
    pub building_id: Option<Uuid>,
    /// X coordinate where the event occurred, if applicable.
    pub position_x: Option<f64>,
    /// Y coordinate where the event occurred, if applicable.
    pub position_y: Option<f64>,
    /// Opaque structured payload, type-specific.
    pub details: serde_json::Value,
    /// Real-world timestamp when the event was recorded.
    pub created_at: String,
}

impl EventRow {
    /// Reconstruct the typed [`Event`] this row represents.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::CorruptRow`] if the stored `event_type` or
    /// `created_at` cannot be parsed.
    pub fn into_event(self) -> Result<Event, DbError> {
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| DbError::CorruptRow { table: "events", reason: format!("bad created_at: {e}") })?
            .with_timezone(&chrono::Utc);
        let position = match (self.position_x, self.position_y) {
            (Some(x), Some(y)) => Some(Position::new(x, y)),
            _ => None,
        };

        Ok(Event {
            id: EventId::from(self.id),
            world_seconds: u64::try_from(self.world_seconds).unwrap_or(0),
            event_type: event_type_from_db(&self.event_type)?,
            resident_id: self.resident_id.map(ResidentId::from),
            target_id: self.target_id.map(ResidentId::from),
            building_id: self.building_id.map(StructureId::from),
            position,
            details: self.details,
            created_at,
        })
    }
}

/// Convert an [`EventType`] to its database string representation.
const fn event_type_to_db(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Arrival => "arrival",
        EventType::Collapse => "collapse",
        EventType::Death => "death",
        EventType::Buy => "buy",
        EventType::ShiftComplete => "shift_complete",
        EventType::LawViolation => "law_violation",
        EventType::Arrest => "arrest",
        EventType::BookSuspect => "book_suspect",
        EventType::PrisonRelease => "prison_release",
        EventType::Forage => "forage",
        EventType::Depart => "depart",
        EventType::BodyProcessed => "body_processed",
        EventType::BladderAccident => "bladder_accident",
        EventType::JobApplied => "job_applied",
        EventType::JobQuit => "job_quit",
        EventType::PetitionWritten => "petition_written",
        EventType::PetitionVoted => "petition_voted",
        EventType::UbiCollected => "ubi_collected",
        EventType::Transfer => "transfer",
    }
}

fn event_type_from_db(value: &str) -> Result<EventType, DbError> {
    match value {
        "arrival" => Ok(EventType::Arrival),
        "collapse" => Ok(EventType::Collapse),
        "death" => Ok(EventType::Death),
        "buy" => Ok(EventType::Buy),
        "shift_complete" => Ok(EventType::ShiftComplete),
        "law_violation" => Ok(EventType::LawViolation),
        "arrest" => Ok(EventType::Arrest),
        "book_suspect" => Ok(EventType::BookSuspect),
        "prison_release" => Ok(EventType::PrisonRelease),
        "forage" => Ok(EventType::Forage),
        "depart" => Ok(EventType::Depart),
        "body_processed" => Ok(EventType::BodyProcessed),
        "bladder_accident" => Ok(EventType::BladderAccident),
        "job_applied" => Ok(EventType::JobApplied),
        "job_quit" => Ok(EventType::JobQuit),
        "petition_written" => Ok(EventType::PetitionWritten),
        "petition_voted" => Ok(EventType::PetitionVoted),
        "ubi_collected" => Ok(EventType::UbiCollected),
        "transfer" => Ok(EventType::Transfer),
        other => Err(DbError::CorruptRow { table: "events", reason: format!("unknown event_type {other:?}") }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::sqlite::SqlitePool as OakhavenPool;

    fn sample_event(world_seconds: u64) -> Event {
        Event {
            id: EventId::new(),
            world_seconds,
            event_type: EventType::Arrival,
            resident_id: Some(ResidentId::new()),
            target_id: None,
            building_id: None,
            position: Some(Position::new(1.0, 2.0)),
            details: serde_json::json!({"note": "spawned"}),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn batch_insert_and_query_by_range() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = EventStore::new(pool.pool());

        let events = vec![sample_event(10), sample_event(20), sample_event(30)];
        store.batch_insert(&events).await.unwrap();

        let rows = store.get_events_in_range(0, 25).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].event_type, "arrival");
    }

    #[tokio::test]
    async fn query_by_resident_matches_actor_or_target() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = EventStore::new(pool.pool());

        let target = ResidentId::new();
        let mut event = sample_event(5);
        event.target_id = Some(target);
        store.batch_insert(&[event]).await.unwrap();

        let rows = store.get_events_for_resident(target).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = EventStore::new(pool.pool());
        store.batch_insert(&[]).await.unwrap();
    }

    #[test]
    fn event_row_round_trips_through_into_event() {
        let row = EventRow {
            id: Uuid::now_v7(),
            world_seconds: 42,
            event_type: "forage".to_owned(),
            resident_id: Some(Uuid::now_v7()),
            target_id: None,
            building_id: None,
            position_x: Some(1.0),
            position_y: Some(2.0),
            details: serde_json::json!({}),
            created_at: Utc::now().to_rfc3339(),
        };
        let event = row.into_event().unwrap();
        assert_eq!(event.event_type, EventType::Forage);
        assert_eq!(event.position, Some(Position::new(1.0, 2.0)));
    }
}

//! Resident, inventory, and law-offense persistence.
//!
//! Residents are saved and loaded whole: [`ResidentStore::save_all`] and
//! [`ResidentStore::load_all`] round-trip the full table on the 30-second
//! save interval and at boot (§5, §6). Runtime-only [`ResidentTransient`]
//! state is never written and is reconstructed fresh by the caller.

use std::collections::HashMap;

use oakhaven_types::{
    Custody, Employment, InventoryItem, ItemType, JobId, LifecycleStatus, Needs, Offense,
    OffenseKind, Position, Resident, ResidentId, ResidentKind, ResidentTransient, RuleId,
    SpeedMode, StructureId,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `residents`, `inventory`, and `laws` tables.
pub struct ResidentStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ResidentStore<'a> {
    /// Create a new resident store bound to a connection pool.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace the full contents of `residents`, `inventory`, and `laws`
    /// with `residents`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the transaction fails.
    pub async fn save_all(&self, residents: &[Resident]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM residents").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM inventory").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM laws").execute(&mut *tx).await?;

        for resident in residents {
            let id = resident.id.into_inner();
            sqlx::query(
                r"INSERT INTO residents (
                    id, passport_no, display_name, kind, status,
                    position_x, position_y, facing_degrees, velocity_x, velocity_y,
                    speed_mode, sleeping, hunger, thirst, energy, bladder, health, social,
                    wallet, employment_job_id, employment_on_shift, employment_shift_seconds_accrued,
                    current_building, webhook_url, bio,
                    arrested_by, prison_sentence_end_world_seconds, carrying_suspect_id, carrying_body_id,
                    registered_at
                  ) VALUES (
                    ?, ?, ?, ?, ?,
                    ?, ?, ?, ?, ?,
                    ?, ?, ?, ?, ?, ?, ?, ?,
                    ?, ?, ?, ?,
                    ?, ?, ?,
                    ?, ?, ?, ?,
                    ?
                  )",
            )
            .bind(id)
            .bind(&resident.passport_no)
            .bind(&resident.display_name)
            .bind(resident_kind_to_db(resident.kind))
            .bind(lifecycle_status_to_db(resident.status))
            .bind(resident.position.x)
            .bind(resident.position.y)
            .bind(i64::from(resident.facing_degrees))
            .bind(resident.velocity.x)
            .bind(resident.velocity.y)
            .bind(speed_mode_to_db(resident.speed_mode))
            .bind(resident.sleeping)
            .bind(i64::from(resident.needs.hunger))
            .bind(i64::from(resident.needs.thirst))
            .bind(i64::from(resident.needs.energy))
            .bind(i64::from(resident.needs.bladder))
            .bind(i64::from(resident.needs.health))
            .bind(i64::from(resident.needs.social))
            .bind(i64::try_from(resident.wallet).unwrap_or(i64::MAX))
            .bind(resident.employment.map(|e| e.job_id.into_inner()))
            .bind(resident.employment.map(|e| e.on_shift))
            .bind(
                resident
                    .employment
                    .map(|e| i64::try_from(e.shift_seconds_accrued).unwrap_or(i64::MAX)),
            )
            .bind(resident.current_building.map(StructureId::into_inner))
            .bind(&resident.webhook_url)
            .bind(&resident.bio)
            .bind(resident.custody.arrested_by.map(ResidentId::into_inner))
            .bind(
                resident
                    .custody
                    .prison_sentence_end_world_seconds
                    .map(|s| i64::try_from(s).unwrap_or(i64::MAX)),
            )
            .bind(resident.custody.carrying_suspect_id.map(ResidentId::into_inner))
            .bind(resident.custody.carrying_body_id.map(ResidentId::into_inner))
            .bind(resident.registered_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;

            for item in &resident.inventory {
                sqlx::query(
                    "INSERT INTO inventory (resident_id, item_type, quantity, durability) VALUES (?, ?, ?, ?)",
                )
                .bind(id)
                .bind(item_type_to_db(item.item_type))
                .bind(i64::from(item.quantity))
                .bind(i64::from(item.durability))
                .execute(&mut *tx)
                .await?;
            }

            for offense in &resident.custody.offenses {
                sqlx::query(
                    "INSERT INTO laws (id, resident_id, kind, recorded_at_world_seconds) VALUES (?, ?, ?, ?)",
                )
                .bind(offense.id.into_inner())
                .bind(id)
                .bind(offense_kind_to_db(offense.kind))
                .bind(i64::try_from(offense.recorded_at_world_seconds).unwrap_or(i64::MAX))
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        tracing::debug!(count = residents.len(), "saved residents");
        Ok(())
    }

    /// Load every resident, with its inventory and law-offense rows
    /// reassembled, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if a query fails, or
    /// [`DbError::CorruptRow`] if a stored enum value is unrecognized.
    pub async fn load_all(&self) -> Result<Vec<Resident>, DbError> {
        let resident_rows = sqlx::query_as::<_, ResidentRow>("SELECT * FROM residents")
            .fetch_all(self.pool)
            .await?;
        let inventory_rows = sqlx::query_as::<_, InventoryRow>("SELECT * FROM inventory")
            .fetch_all(self.pool)
            .await?;
        let law_rows = sqlx::query_as::<_, LawRow>("SELECT * FROM laws")
            .fetch_all(self.pool)
            .await?;

        let mut inventory_by_resident: HashMap<Uuid, Vec<InventoryItem>> = HashMap::new();
        for row in inventory_rows {
            let item = InventoryItem {
                item_type: item_type_from_db(&row.item_type)?,
                quantity: u32::try_from(row.quantity).unwrap_or(0),
                durability: i32::try_from(row.durability).unwrap_or(-1),
            };
            inventory_by_resident.entry(row.resident_id).or_default().push(item);
        }

        let mut offenses_by_resident: HashMap<Uuid, Vec<Offense>> = HashMap::new();
        for row in law_rows {
            let offense = Offense {
                id: RuleId::from(row.id),
                kind: offense_kind_from_db(&row.kind)?,
                recorded_at_world_seconds: u64::try_from(row.recorded_at_world_seconds).unwrap_or(0),
            };
            offenses_by_resident.entry(row.resident_id).or_default().push(offense);
        }

        resident_rows
            .into_iter()
            .map(|row| {
                let inventory = inventory_by_resident.remove(&row.id).unwrap_or_default();
                let offenses = offenses_by_resident.remove(&row.id).unwrap_or_default();
                resident_from_row(row, inventory, offenses)
            })
            .collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ResidentRow {
    id: Uuid,
    passport_no: String,
    display_name: String,
    kind: String,
    status: String,
    position_x: f64,
    position_y: f64,
    facing_degrees: i64,
    velocity_x: f64,
    velocity_y: f64,
    speed_mode: String,
    sleeping: bool,
    hunger: i64,
    thirst: i64,
    energy: i64,
    bladder: i64,
    health: i64,
    social: i64,
    wallet: i64,
    employment_job_id: Option<Uuid>,
    employment_on_shift: Option<bool>,
    employment_shift_seconds_accrued: Option<i64>,
    current_building: Option<Uuid>,
    webhook_url: Option<String>,
    bio: Option<String>,
    arrested_by: Option<Uuid>,
    prison_sentence_end_world_seconds: Option<i64>,
    carrying_suspect_id: Option<Uuid>,
    carrying_body_id: Option<Uuid>,
    registered_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    resident_id: Uuid,
    item_type: String,
    quantity: i64,
    durability: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct LawRow {
    id: Uuid,
    resident_id: Uuid,
    kind: String,
    recorded_at_world_seconds: i64,
}

fn resident_from_row(
    row: ResidentRow,
    inventory: Vec<InventoryItem>,
    offenses: Vec<Offense>,
) -> Result<Resident, DbError> {
    let employment = row.employment_job_id.map(|job_id| Employment {
        job_id: JobId::from(job_id),
        on_shift: row.employment_on_shift.unwrap_or(false),
        shift_seconds_accrued: row
            .employment_shift_seconds_accrued
            .and_then(|s| u64::try_from(s).ok())
            .unwrap_or(0),
    });

    let registered_at = chrono::DateTime::parse_from_rfc3339(&row.registered_at)
        .map_err(|e| DbError::CorruptRow {
            table: "residents",
            reason: format!("bad registered_at: {e}"),
        })?
        .with_timezone(&chrono::Utc);

    Ok(Resident {
        id: ResidentId::from(row.id),
        passport_no: row.passport_no,
        display_name: row.display_name,
        kind: resident_kind_from_db(&row.kind)?,
        status: lifecycle_status_from_db(&row.status)?,
        position: Position::new(row.position_x, row.position_y),
        facing_degrees: u16::try_from(row.facing_degrees).unwrap_or(0),
        velocity: Position::new(row.velocity_x, row.velocity_y),
        speed_mode: speed_mode_from_db(&row.speed_mode)?,
        sleeping: row.sleeping,
        needs: Needs {
            hunger: u32::try_from(row.hunger).unwrap_or(0),
            thirst: u32::try_from(row.thirst).unwrap_or(0),
            energy: u32::try_from(row.energy).unwrap_or(0),
            bladder: u32::try_from(row.bladder).unwrap_or(0),
            health: u32::try_from(row.health).unwrap_or(0),
            social: u32::try_from(row.social).unwrap_or(0),
        },
        wallet: u64::try_from(row.wallet).unwrap_or(0),
        inventory,
        employment,
        current_building: row.current_building.map(StructureId::from),
        webhook_url: row.webhook_url,
        bio: row.bio,
        custody: Custody {
            offenses,
            arrested_by: row.arrested_by.map(ResidentId::from),
            prison_sentence_end_world_seconds: row
                .prison_sentence_end_world_seconds
                .and_then(|s| u64::try_from(s).ok()),
            carrying_suspect_id: row.carrying_suspect_id.map(ResidentId::from),
            carrying_body_id: row.carrying_body_id.map(ResidentId::from),
        },
        transient: ResidentTransient::default(),
        registered_at,
    })
}

const fn resident_kind_to_db(kind: ResidentKind) -> &'static str {
    match kind {
        ResidentKind::Agent => "agent",
        ResidentKind::Human => "human",
    }
}

fn resident_kind_from_db(value: &str) -> Result<ResidentKind, DbError> {
    match value {
        "agent" => Ok(ResidentKind::Agent),
        "human" => Ok(ResidentKind::Human),
        other => Err(DbError::CorruptRow {
            table: "residents",
            reason: format!("unknown kind {other:?}"),
        }),
    }
}

const fn lifecycle_status_to_db(status: LifecycleStatus) -> &'static str {
    match status {
        LifecycleStatus::Alive => "alive",
        LifecycleStatus::Deceased => "deceased",
        LifecycleStatus::Processed => "processed",
        LifecycleStatus::Departed => "departed",
    }
}

fn lifecycle_status_from_db(value: &str) -> Result<LifecycleStatus, DbError> {
    match value {
        "alive" => Ok(LifecycleStatus::Alive),
        "deceased" => Ok(LifecycleStatus::Deceased),
        "processed" => Ok(LifecycleStatus::Processed),
        "departed" => Ok(LifecycleStatus::Departed),
        other => Err(DbError::CorruptRow {
            table: "residents",
            reason: format!("unknown status {other:?}"),
        }),
    }
}

const fn speed_mode_to_db(mode: SpeedMode) -> &'static str {
    match mode {
        SpeedMode::Stopped => "stopped",
        SpeedMode::Walking => "walking",
        SpeedMode::Running => "running",
    }
}

fn speed_mode_from_db(value: &str) -> Result<SpeedMode, DbError> {
    match value {
        "stopped" => Ok(SpeedMode::Stopped),
        "walking" => Ok(SpeedMode::Walking),
        "running" => Ok(SpeedMode::Running),
        other => Err(DbError::CorruptRow {
            table: "residents",
            reason: format!("unknown speed_mode {other:?}"),
        }),
    }
}

const fn item_type_to_db(item_type: ItemType) -> &'static str {
    match item_type {
        ItemType::Bread => "bread",
        ItemType::WildBerries => "wild_berries",
        ItemType::WaterFlask => "water_flask",
        ItemType::SleepingBag => "sleeping_bag",
    }
}

fn item_type_from_db(value: &str) -> Result<ItemType, DbError> {
    match value {
        "bread" => Ok(ItemType::Bread),
        "wild_berries" => Ok(ItemType::WildBerries),
        "water_flask" => Ok(ItemType::WaterFlask),
        "sleeping_bag" => Ok(ItemType::SleepingBag),
        other => Err(DbError::CorruptRow {
            table: "inventory",
            reason: format!("unknown item_type {other:?}"),
        }),
    }
}

const fn offense_kind_to_db(kind: OffenseKind) -> &'static str {
    match kind {
        OffenseKind::Loitering => "loitering",
    }
}

fn offense_kind_from_db(value: &str) -> Result<OffenseKind, DbError> {
    match value {
        "loitering" => Ok(OffenseKind::Loitering),
        other => Err(DbError::CorruptRow {
            table: "laws",
            reason: format!("unknown offense kind {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use oakhaven_types::{ResidentTransient, SpeedMode};

    use super::*;
    use crate::sqlite::SqlitePool as OakhavenPool;

    fn sample_resident() -> Resident {
        Resident {
            id: ResidentId::new(),
            passport_no: "OC-0000001".to_owned(),
            display_name: "Test Resident".to_owned(),
            kind: ResidentKind::Agent,
            status: LifecycleStatus::Alive,
            position: Position::new(10.0, 20.0),
            facing_degrees: 90,
            velocity: Position::new(0.0, 0.0),
            speed_mode: SpeedMode::Stopped,
            sleeping: false,
            needs: Needs::full(),
            wallet: 50,
            inventory: vec![InventoryItem {
                item_type: ItemType::Bread,
                quantity: 2,
                durability: -1,
            }],
            employment: None,
            current_building: None,
            webhook_url: None,
            bio: Some("A test resident.".to_owned()),
            custody: Custody {
                offenses: vec![Offense {
                    id: RuleId::new(),
                    kind: OffenseKind::Loitering,
                    recorded_at_world_seconds: 120,
                }],
                ..Custody::default()
            },
            transient: ResidentTransient::default(),
            registered_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_and_load_round_trips_a_resident() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = ResidentStore::new(pool.pool());

        let resident = sample_resident();
        store.save_all(std::slice::from_ref(&resident)).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, resident.id);
        assert_eq!(loaded[0].inventory.len(), 1);
        assert_eq!(loaded[0].custody.offenses.len(), 1);
        assert_eq!(loaded[0].bio.as_deref(), Some("A test resident."));
    }

    #[tokio::test]
    async fn save_all_replaces_the_prior_contents() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = ResidentStore::new(pool.pool());

        store.save_all(&[sample_resident()]).await.unwrap();
        store.save_all(&[]).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert!(loaded.is_empty());
    }
}

//! Persistence for the colony's job board, petition board, and shop
//! registry: the `jobs`, `petitions`, `petition_votes`, and `shop_stock`
//! tables.

use oakhaven_agents::jobs::{JobBoard, JobListing, JobRole};
use oakhaven_agents::petitions::{Petition, PetitionBoard};
use oakhaven_agents::shop::{ShopListing, ShopRegistry};
use oakhaven_types::{ItemType, JobId, PetitionId, ResidentId, StructureId};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `jobs`, `petitions`, `petition_votes`, and
/// `shop_stock` tables.
pub struct BoardStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BoardStore<'a> {
    /// Create a new board store bound to a connection pool.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace the persisted `jobs` table with the board's current
    /// listings.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the write fails.
    pub async fn save_jobs(&self, board: &JobBoard) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM jobs").execute(&mut *tx).await?;

        for listing in board.listings() {
            let occupant_ids = serde_json::to_string(&listing.occupants)?;
            sqlx::query(
                r"INSERT INTO jobs (id, title, role, building, wage, vacancies, occupant_ids)
                  VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(listing.id.into_inner())
            .bind(&listing.title)
            .bind(job_role_to_db(listing.role))
            .bind(listing.building.into_inner())
            .bind(i64::try_from(listing.wage).unwrap_or(i64::MAX))
            .bind(i64::from(listing.vacancies))
            .bind(occupant_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Load the persisted `jobs` table into a fresh [`JobBoard`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails, or
    /// [`DbError::CorruptRow`]/[`DbError::Serialization`] if a row cannot
    /// be reconstructed.
    pub async fn load_jobs(&self) -> Result<JobBoard, DbError> {
        let rows: Vec<JobRow> = sqlx::query_as("SELECT * FROM jobs").fetch_all(self.pool).await?;

        let mut board = JobBoard::new();
        for row in rows {
            let occupants: Vec<Uuid> = serde_json::from_str(&row.occupant_ids)?;
            board.post(JobListing {
                id: JobId::from(row.id),
                title: row.title,
                role: job_role_from_db(&row.role)?,
                building: StructureId::from(row.building),
                wage: u64::try_from(row.wage).unwrap_or(0),
                vacancies: u32::try_from(row.vacancies).unwrap_or(0),
                occupants: occupants.into_iter().map(ResidentId::from).collect(),
            });
        }
        Ok(board)
    }

    /// Replace the persisted `petitions`/`petition_votes` tables with the
    /// board's current contents.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the write fails.
    pub async fn save_petitions(&self, board: &PetitionBoard) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM petition_votes").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM petitions").execute(&mut *tx).await?;

        for petition in board.petitions() {
            sqlx::query(
                r"INSERT INTO petitions (id, title, body, author, expires_at_world_seconds)
                  VALUES (?, ?, ?, ?, ?)",
            )
            .bind(petition.id.into_inner())
            .bind(&petition.title)
            .bind(&petition.body)
            .bind(petition.author.into_inner())
            .bind(i64::try_from(petition.expires_at_world_seconds).unwrap_or(i64::MAX))
            .execute(&mut *tx)
            .await?;

            for resident in &petition.votes_for {
                insert_vote(&mut tx, petition.id, *resident, true).await?;
            }
            for resident in &petition.votes_against {
                insert_vote(&mut tx, petition.id, *resident, false).await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Load the persisted petition tables into a fresh [`PetitionBoard`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn load_petitions(&self) -> Result<PetitionBoard, DbError> {
        let rows: Vec<PetitionRow> = sqlx::query_as("SELECT * FROM petitions").fetch_all(self.pool).await?;
        let votes: Vec<VoteRow> = sqlx::query_as("SELECT * FROM petition_votes").fetch_all(self.pool).await?;

        let mut board = PetitionBoard::new();
        for row in rows {
            let id = PetitionId::from(row.id);
            let votes_for = votes
                .iter()
                .filter(|v| v.petition_id == row.id && v.in_favor)
                .map(|v| ResidentId::from(v.resident_id))
                .collect();
            let votes_against = votes
                .iter()
                .filter(|v| v.petition_id == row.id && !v.in_favor)
                .map(|v| ResidentId::from(v.resident_id))
                .collect();

            board.write(Petition {
                id,
                title: row.title,
                body: row.body,
                author: ResidentId::from(row.author),
                votes_for,
                votes_against,
                expires_at_world_seconds: u64::try_from(row.expires_at_world_seconds).unwrap_or(0),
            });
        }
        Ok(board)
    }

    /// Replace the persisted `shop_stock` table with the registry's
    /// current listings.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the write fails.
    pub async fn save_shop(&self, registry: &ShopRegistry) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM shop_stock").execute(&mut *tx).await?;

        for listing in registry.listings() {
            sqlx::query(
                r"INSERT INTO shop_stock (item_type, price, stock, default_stock)
                  VALUES (?, ?, ?, ?)",
            )
            .bind(item_type_to_db(listing.item_type))
            .bind(i64::try_from(listing.price).unwrap_or(i64::MAX))
            .bind(i64::from(listing.stock))
            .bind(i64::from(listing.default_stock))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Load the persisted `shop_stock` table into a fresh
    /// [`ShopRegistry`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails, or
    /// [`DbError::CorruptRow`] if a row's `item_type` is unrecognized.
    pub async fn load_shop(&self) -> Result<ShopRegistry, DbError> {
        let rows: Vec<ShopStockRow> = sqlx::query_as("SELECT * FROM shop_stock").fetch_all(self.pool).await?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            listings.push(ShopListing {
                item_type: item_type_from_db(&row.item_type)?,
                price: u64::try_from(row.price).unwrap_or(0),
                stock: u32::try_from(row.stock).unwrap_or(0),
                default_stock: u32::try_from(row.default_stock).unwrap_or(0),
            });
        }
        Ok(ShopRegistry::new(listings))
    }
}

async fn insert_vote(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    petition_id: PetitionId,
    resident: ResidentId,
    in_favor: bool,
) -> Result<(), DbError> {
    sqlx::query("INSERT INTO petition_votes (petition_id, resident_id, in_favor) VALUES (?, ?, ?)")
        .bind(petition_id.into_inner())
        .bind(resident.into_inner())
        .bind(in_favor)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    role: String,
    building: Uuid,
    wage: i64,
    vacancies: i64,
    occupant_ids: String,
}

#[derive(Debug, sqlx::FromRow)]
struct PetitionRow {
    id: Uuid,
    title: String,
    body: String,
    author: Uuid,
    expires_at_world_seconds: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct VoteRow {
    petition_id: Uuid,
    resident_id: Uuid,
    in_favor: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct ShopStockRow {
    item_type: String,
    price: i64,
    stock: i64,
    default_stock: i64,
}

const fn job_role_to_db(role: JobRole) -> &'static str {
    match role {
        JobRole::PoliceOfficer => "police_officer",
        JobRole::MortuaryWorker => "mortuary_worker",
        JobRole::Laborer => "laborer",
    }
}

fn job_role_from_db(value: &str) -> Result<JobRole, DbError> {
    match value {
        "police_officer" => Ok(JobRole::PoliceOfficer),
        "mortuary_worker" => Ok(JobRole::MortuaryWorker),
        "laborer" => Ok(JobRole::Laborer),
        other => Err(DbError::CorruptRow { table: "jobs", reason: format!("unknown role {other:?}") }),
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
        other => Err(DbError::CorruptRow { table: "shop_stock", reason: format!("unknown item_type {other:?}") }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqlitePool as OakhavenPool;

    #[tokio::test]
    async fn jobs_round_trip_with_occupants() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = BoardStore::new(pool.pool());

        let mut board = JobBoard::new();
        let id = JobId::new();
        board.post(JobListing {
            id,
            title: "Beat cop".to_owned(),
            role: JobRole::PoliceOfficer,
            building: StructureId::new(),
            wage: 50,
            vacancies: 2,
            occupants: Vec::new(),
        });
        let resident = ResidentId::new();
        board.apply(id, resident);

        store.save_jobs(&board).await.unwrap();
        let loaded = store.load_jobs().await.unwrap();
        let listing = loaded.listing(id).unwrap();
        assert_eq!(listing.occupants, vec![resident]);
        assert_eq!(listing.title, "Beat cop");
    }

    #[tokio::test]
    async fn petitions_round_trip_with_votes() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = BoardStore::new(pool.pool());

        let mut board = PetitionBoard::new();
        let author = ResidentId::new();
        let id = PetitionId::new();
        board.write(Petition {
            id,
            title: "More bread".to_owned(),
            body: "Please.".to_owned(),
            author,
            votes_for: Vec::new(),
            votes_against: Vec::new(),
            expires_at_world_seconds: 9999,
        });
        let voter = ResidentId::new();
        board.vote(id, voter, true);

        store.save_petitions(&board).await.unwrap();
        let loaded = store.load_petitions().await.unwrap();
        let petition = loaded.petitions().iter().find(|p| p.id == id).unwrap();
        assert_eq!(petition.votes_for, vec![voter]);
        assert!(petition.votes_against.is_empty());
    }

    #[tokio::test]
    async fn shop_stock_round_trips() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = BoardStore::new(pool.pool());

        let registry = ShopRegistry::new(vec![ShopListing {
            item_type: ItemType::Bread,
            price: 5,
            stock: 10,
            default_stock: 10,
        }]);
        store.save_shop(&registry).await.unwrap();
        let loaded = store.load_shop().await.unwrap();
        assert_eq!(loaded.listing(ItemType::Bread).unwrap().stock, 10);
    }
}

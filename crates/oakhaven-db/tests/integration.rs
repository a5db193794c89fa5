//! Integration tests for the `oakhaven-db` persistence layer.
//!
//! These run against an in-memory SQLite database, so they need no
//! external services and run under a plain `cargo test`.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::too_many_lines)]

use oakhaven_agents::jobs::{JobBoard, JobListing, JobRole};
use oakhaven_agents::petitions::{Petition, PetitionBoard};
use oakhaven_agents::shop::{ShopListing, ShopRegistry};
use oakhaven_db::tick_persist::ColonySave;
use oakhaven_db::{BoardStore, EventStore, PersistenceCoordinator, ResidentStore, SqlitePool, WorldStateRow, WorldStateStore};
use oakhaven_types::{
    Custody, Event, EventId, EventType, InventoryItem, ItemType, LifecycleStatus, Needs, Position, Resident, ResidentId,
    ResidentKind, ResidentTransient, SpeedMode, StructureId,
};

fn resident(display_name: &str) -> Resident {
    Resident {
        id: ResidentId::new(),
        passport_no: format!("OC-{display_name}"),
        display_name: display_name.to_owned(),
        kind: ResidentKind::Agent,
        status: LifecycleStatus::Alive,
        position: Position::new(10.0, 20.0),
        facing_degrees: 90,
        velocity: Position::new(0.0, 0.0),
        speed_mode: SpeedMode::Walking,
        sleeping: false,
        needs: Needs::full(),
        wallet: 100,
        inventory: vec![InventoryItem { item_type: ItemType::Bread, quantity: 2, durability: -1 }],
        employment: None,
        current_building: None,
        webhook_url: None,
        bio: Some("A test resident.".to_owned()),
        custody: Custody::default(),
        transient: ResidentTransient::default(),
        registered_at: chrono::Utc::now(),
    }
}

async fn migrated_pool() -> SqlitePool {
    let pool = SqlitePool::connect_in_memory().await.expect("connect");
    pool.run_migrations().await.expect("migrate");
    pool
}

#[tokio::test]
async fn resident_store_round_trips_a_full_population() {
    let pool = migrated_pool().await;
    let store = ResidentStore::new(pool.pool());

    let residents = vec![resident("Alice"), resident("Bob")];
    store.save_all(&residents).await.expect("save");

    let loaded = store.load_all().await.expect("load");
    assert_eq!(loaded.len(), 2);
    let names: Vec<&str> = loaded.iter().map(|r| r.display_name.as_str()).collect();
    assert!(names.contains(&"Alice"));
    assert!(names.contains(&"Bob"));
}

#[tokio::test]
async fn event_store_filters_by_world_seconds_range() {
    let pool = migrated_pool().await;
    let store = EventStore::new(pool.pool());

    let events = vec![
        Event {
            id: EventId::new(),
            world_seconds: 5,
            event_type: EventType::Arrival,
            resident_id: Some(ResidentId::new()),
            target_id: None,
            building_id: None,
            position: None,
            details: serde_json::json!({}),
            created_at: chrono::Utc::now(),
        },
        Event {
            id: EventId::new(),
            world_seconds: 500,
            event_type: EventType::Depart,
            resident_id: Some(ResidentId::new()),
            target_id: None,
            building_id: None,
            position: None,
            details: serde_json::json!({}),
            created_at: chrono::Utc::now(),
        },
    ];
    store.batch_insert(&events).await.expect("insert");

    let early = store.get_events_in_range(0, 100).await.expect("query");
    assert_eq!(early.len(), 1);
    assert_eq!(early[0].event_type, "arrival");
}

#[tokio::test]
async fn board_store_round_trips_jobs_petitions_and_shop() {
    let pool = migrated_pool().await;
    let stores = BoardStore::new(pool.pool());

    let mut jobs = JobBoard::new();
    let job_id = oakhaven_types::JobId::new();
    jobs.post(JobListing {
        id: job_id,
        title: "Laborer".to_owned(),
        role: JobRole::Laborer,
        building: StructureId::new(),
        wage: 20,
        vacancies: 3,
        occupants: Vec::new(),
    });
    stores.save_jobs(&jobs).await.expect("save jobs");
    assert_eq!(stores.load_jobs().await.expect("load jobs").listings().len(), 1);

    let mut petitions = PetitionBoard::new();
    let petition_id = oakhaven_types::PetitionId::new();
    petitions.write(Petition {
        id: petition_id,
        title: "Lower prices".to_owned(),
        body: "Bread is too expensive.".to_owned(),
        author: ResidentId::new(),
        votes_for: Vec::new(),
        votes_against: Vec::new(),
        expires_at_world_seconds: 86_400,
    });
    stores.save_petitions(&petitions).await.expect("save petitions");
    assert_eq!(stores.load_petitions().await.expect("load petitions").petitions().len(), 1);

    let shop = ShopRegistry::new(vec![ShopListing {
        item_type: ItemType::WaterFlask,
        price: 3,
        stock: 20,
        default_stock: 20,
    }]);
    stores.save_shop(&shop).await.expect("save shop");
    assert_eq!(stores.load_shop().await.expect("load shop").listing(ItemType::WaterFlask).unwrap().stock, 20);
}

#[tokio::test]
async fn world_state_store_round_trips_the_clock() {
    let pool = migrated_pool().await;
    let store = WorldStateStore::new(pool.pool());

    let state = WorldStateRow {
        world_seconds: 12_345,
        train_timer_seconds: 60,
        restock_timer_seconds: 7_200,
        save_timer_seconds: 30,
    };
    store.save(state).await.expect("save");
    assert_eq!(store.load().await.expect("load"), Some(state));
}

#[tokio::test]
async fn persistence_coordinator_saves_and_reloads_an_entire_colony() {
    let pool = migrated_pool().await;
    let coordinator = PersistenceCoordinator::new(pool.pool());

    let save = ColonySave {
        residents: vec![resident("Carol")],
        pending_events: vec![Event {
            id: EventId::new(),
            world_seconds: 1,
            event_type: EventType::Arrival,
            resident_id: None,
            target_id: None,
            building_id: None,
            position: None,
            details: serde_json::json!({}),
            created_at: chrono::Utc::now(),
        }],
        jobs: JobBoard::new(),
        petitions: PetitionBoard::new(),
        shop: ShopRegistry::new(Vec::new()),
        world_state: WorldStateRow {
            world_seconds: 1,
            train_timer_seconds: 120,
            restock_timer_seconds: 3_600,
            save_timer_seconds: 30,
        },
    };
    coordinator.save(&save).await.expect("save");

    let loaded = coordinator.load().await.expect("load");
    assert_eq!(loaded.residents.len(), 1);
    assert_eq!(loaded.world_state, Some(save.world_state));

    let events = EventStore::new(pool.pool()).get_events_in_range(0, 10).await.expect("events");
    assert_eq!(events.len(), 1);
}

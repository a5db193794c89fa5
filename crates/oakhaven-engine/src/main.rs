//! Colony engine binary for the Oakhaven simulation.
//!
//! This is the process that owns the live [`Simulation`] exclusively:
//! it loads configuration and persisted state, spawns the connection
//! gateway on a background task, and drives the position/simulation/
//! perception tick loop until asked to shut down.
//!
//! # Startup sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from the environment and `oakhaven-config.yaml`
//! 3. Connect to SQLite and run migrations
//! 4. Load the tile map artifact
//! 5. Load persisted colony state
//! 6. Reconstruct foraging nodes from the map's placements (never persisted)
//! 7. Assemble the simulation, restoring persisted boards and the clock
//! 8. Seed default jobs and shop stock on a first-ever boot
//! 9. Spawn the connection gateway
//! 10. Run the tick loop until shutdown

mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use oakhaven_agents::jobs::{JobBoard, JobListing, JobRole};
use oakhaven_agents::shop::{ShopListing, ShopRegistry};
use oakhaven_core::clock::WorldClock;
use oakhaven_core::config::SimulationConfig;
use oakhaven_core::tick::Simulation;
use oakhaven_db::tick_persist::{ColonySave, PersistenceCoordinator};
use oakhaven_db::sqlite::{SqliteConfig, SqlitePool};
use oakhaven_db::world_state_store::WorldStateRow;
use oakhaven_gateway::state::{GatewayCommand, GatewaySnapshot, GatewayState, Recipient, ResidentSnapshot};
use oakhaven_types::{ActionType, ForageNodeId, ForageNodeKind, ForagingNode, InspectCard, ItemType, JobId, ResidentId, ServerMessage, StructureKind};
use oakhaven_world::tile_map::TileMap;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Position-tick rate, nominally 30 Hz.
const POSITION_TICK_HZ: f64 = 30.0;
/// Simulation-tick rate, nominally 10 Hz: one simulation tick per three
/// position ticks.
const POSITION_TICKS_PER_SIMULATION_TICK: u32 = 3;
/// How long a graceful shutdown is given to finish its final save before
/// the process is forced to exit.
const SHUTDOWN_WATCHDOG: Duration = Duration::from_secs(5);
/// Default foraging node capacity for nodes reconstructed fresh at boot
/// (§4.7's worked example).
const DEFAULT_FORAGE_NODE_MAX_USES: u32 = 3;
/// Default foraging node regrowth interval, in world-seconds, for nodes
/// reconstructed fresh at boot.
const DEFAULT_FORAGE_NODE_REGROW_SECONDS: u64 = 600;

/// Application entry point for the colony engine.
///
/// # Errors
///
/// Returns an error if any startup step fails.
#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("oakhaven-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(port = config.server.port, node_env = ?config.server.node_env, "configuration loaded");

    // 3. Connect to SQLite and run migrations.
    let db_pool = SqlitePool::connect(&SqliteConfig::new(config.server.db_path.clone())).await.map_err(EngineError::from)?;
    db_pool.run_migrations().await.map_err(EngineError::from)?;
    info!(db_path = %config.server.db_path, "database ready");

    // 4. Load the tile map artifact.
    let map = load_map(&config.server.map_path)?;
    info!(map_path = %config.server.map_path, buildings = map.buildings.len(), forage_nodes = map.forage_nodes.len(), "map artifact loaded");

    // 5. Load persisted colony state.
    let coordinator = PersistenceCoordinator::new(db_pool.pool());
    let load = coordinator.load().await.map_err(EngineError::from)?;
    info!(residents = load.residents.len(), "persisted colony state loaded");

    // 6. Reconstruct foraging nodes fresh from the map's placements --
    //    runtime depletion/regrowth state is never persisted (§6).
    let forage_nodes: Vec<ForagingNode> = map
        .forage_nodes
        .iter()
        .map(|placement| ForagingNode {
            id: ForageNodeId::new(),
            position: placement.position,
            kind: ForageNodeKind::BerryBush,
            uses_remaining: DEFAULT_FORAGE_NODE_MAX_USES,
            max_uses: DEFAULT_FORAGE_NODE_MAX_USES,
            depleted_at_world_seconds: None,
            regrow_interval_seconds: DEFAULT_FORAGE_NODE_REGROW_SECONDS,
        })
        .collect();

    // 7. Assemble the simulation and restore persisted state.
    let first_boot = load.jobs.listings().is_empty() && load.shop.listings().is_empty();
    let jobs = if first_boot { seed_jobs(&map) } else { load.jobs };
    let shop = if first_boot { seed_shop() } else { load.shop };

    let node_env = config.server.node_env;
    let mut sim = Simulation::new(map, jobs, shop, config.clone(), node_env).map_err(EngineError::from)?;
    *sim.petitions_mut() = load.petitions;
    sim.world_mut().load_from_store(load.residents, forage_nodes);
    if let Some(ws) = load.world_state {
        *sim.world_mut().clock_mut() =
            WorldClock::from_parts(ws.world_seconds, ws.train_timer_seconds, ws.restock_timer_seconds, ws.save_timer_seconds, config.time.clone())
                .map_err(EngineError::from)?;
    }
    info!(first_boot, "simulation assembled");

    // 9. Spawn the connection gateway.
    let (gateway_state, mut commands) =
        GatewayState::with_channel(config.server.registration_token.clone().into_bytes(), config.server.map_path.clone());
    let gateway_state = Arc::new(gateway_state);
    let _gateway_handle = oakhaven_gateway::spawn_gateway(config.server.port, Arc::clone(&gateway_state)).await.map_err(EngineError::from)?;
    refresh_snapshot(&gateway_state, &sim).await;
    info!(port = config.server.port, "gateway spawned");

    // 10. Run the tick loop.
    run_tick_loop(&mut sim, &gateway_state, &mut commands, &coordinator).await?;

    db_pool.close().await;
    info!("oakhaven-engine shutdown complete");
    Ok(())
}

/// Load simulation configuration from the environment and, if present,
/// `oakhaven-config.yaml` relative to the current working directory.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new("oakhaven-config.yaml");
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        info!("no oakhaven-config.yaml found, using environment and defaults");
        Ok(SimulationConfig::from_env()?)
    }
}

/// Load the tile map artifact from `map_path`.
///
/// If the file does not exist, falls back to a minimal single-tile
/// development map rather than refusing to start, since the map
/// generator that produces the real artifact is an external concern.
fn load_map(map_path: &str) -> Result<TileMap, EngineError> {
    let path = Path::new(map_path);
    if !path.exists() {
        warn!(%map_path, "map artifact not found, falling back to a minimal development map");
        return TileMap::new(4, 4, 32.0, vec![false; 16], Vec::new(), Vec::new(), oakhaven_types::Position::new(64.0, 64.0))
            .map_err(EngineError::from);
    }
    let contents = std::fs::read_to_string(path).map_err(|err| EngineError::MapArtifact { message: format!("failed to read {map_path}: {err}") })?;
    serde_json::from_str(&contents).map_err(|err| EngineError::MapArtifact { message: format!("failed to parse {map_path}: {err}") })
}

/// Seed a default job board from the map's police station and mortuary
/// placements, for a colony's first-ever boot.
fn seed_jobs(map: &TileMap) -> JobBoard {
    let mut jobs = JobBoard::new();
    for building in &map.buildings {
        let (title, role, wage, vacancies) = match building.kind {
            StructureKind::PoliceStation => ("Police Officer", JobRole::PoliceOfficer, 20, 2),
            StructureKind::Mortuary => ("Mortuary Worker", JobRole::MortuaryWorker, 15, 1),
            _ => continue,
        };
        jobs.post(JobListing {
            id: JobId::new(),
            title: title.to_owned(),
            role,
            building: building.id,
            wage,
            vacancies,
            occupants: Vec::new(),
        });
    }
    jobs
}

/// Seed a default shop stock table for a colony's first-ever boot.
fn seed_shop() -> ShopRegistry {
    ShopRegistry::new(vec![
        ShopListing { item_type: ItemType::Bread, price: 5, stock: 20, default_stock: 20 },
        ShopListing { item_type: ItemType::WaterFlask, price: 3, stock: 20, default_stock: 20 },
        ShopListing { item_type: ItemType::SleepingBag, price: 50, stock: 5, default_stock: 5 },
    ])
}

/// Extract the `target`/`to` resident id named in an action's params, if any.
///
/// Each handler validates its own params via its typed struct; this only
/// needs to resolve enough to hand `Simulation::submit_action` the right
/// `&mut Resident`, so a missing or malformed field simply resolves to
/// `None` and the handler reports the precise rejection itself.
fn extract_target_id(action: ActionType, params: &serde_json::Value) -> Option<ResidentId> {
    let key = match action {
        ActionType::Inspect | ActionType::CollectBody | ActionType::Arrest | ActionType::BookSuspect => "target",
        ActionType::Speak | ActionType::Trade | ActionType::Give => "to",
        _ => return None,
    };
    serde_json::from_value(params.get(key)?.clone()).ok()
}

/// Extract the foraging node id from a `forage` action's params, if any.
fn extract_node_id(action: ActionType, params: &serde_json::Value) -> Option<ForageNodeId> {
    if action != ActionType::Forage {
        return None;
    }
    serde_json::from_value(params.get("node_id")?.clone()).ok()
}

/// Drain every command queued by the gateway since the last tick.
fn drain_commands(sim: &mut Simulation, gateway_state: &GatewayState, commands: &mut tokio::sync::mpsc::Receiver<GatewayCommand>) {
    while let Ok(command) = commands.try_recv() {
        match command {
            GatewayCommand::Action { resident_id, envelope } => {
                let target_id = extract_target_id(envelope.action, &envelope.params);
                let node_id = extract_node_id(envelope.action, &envelope.params);
                let result = sim.submit_action(resident_id, target_id, node_id, &envelope);
                let card = (envelope.action == ActionType::Inspect)
                    .then(|| result.data.clone())
                    .flatten()
                    .and_then(|data| serde_json::from_value::<InspectCard>(data).ok());
                let message = match card {
                    Some(card) => ServerMessage::InspectResult(card),
                    None => ServerMessage::ActionResult(result),
                };
                gateway_state.publish(Recipient::Resident(resident_id), message);
            }
            GatewayCommand::RegisterResident(resident) => {
                sim.register_resident(resident);
            }
            GatewayCommand::ResolveFeedback { token, response_text: _, reply } => {
                let redeemed = sim.resolve_feedback_token(token);
                let _ = reply.send(redeemed);
            }
        }
    }
}

/// Refresh the gateway's read-only snapshot from the live simulation.
async fn refresh_snapshot(gateway_state: &GatewayState, sim: &Simulation) {
    let mut snapshot = GatewaySnapshot { world_seconds: sim.world().clock().world_seconds(), residents: std::collections::BTreeMap::new() };
    for resident in sim.world().all_residents() {
        snapshot.residents.insert(resident.id, ResidentSnapshot { status: resident.status });
    }
    *gateway_state.snapshot.write().await = snapshot;
}

/// Publish one perception tick's output to every connected player and
/// spectator.
fn publish_perception(sim: &Simulation, gateway_state: &GatewayState) {
    let (perceptions, spectator_view) = sim.tick_perception();
    for (resident_id, perception) in perceptions {
        gateway_state.publish(Recipient::Resident(resident_id), ServerMessage::Perception(perception));
    }
    gateway_state.publish(Recipient::Spectators, ServerMessage::Spectator(spectator_view));
}

/// Persist the current simulation state as one batch.
///
/// `saved_event_count` is the number of events already written to disk
/// by a previous save; only the events appended since then are sent,
/// since the event log is append-only and `EventStore::batch_insert`
/// does not tolerate re-inserting the same id twice. Returns the new
/// total event count for the caller to carry forward.
async fn save_colony(sim: &Simulation, coordinator: &PersistenceCoordinator<'_>, saved_event_count: usize) -> Result<usize, EngineError> {
    let clock = sim.world().clock();
    let all_events = sim.events().all();
    let pending_events = all_events.get(saved_event_count..).unwrap_or_default().to_vec();
    let save = ColonySave {
        residents: sim.world().all_residents(),
        pending_events,
        jobs: sim.jobs().clone(),
        petitions: sim.petitions().clone(),
        shop: sim.shop().clone(),
        world_state: WorldStateRow {
            world_seconds: clock.world_seconds(),
            train_timer_seconds: clock.train_timer_seconds(),
            restock_timer_seconds: clock.restock_timer_seconds(),
            save_timer_seconds: clock.save_timer_seconds(),
        },
    };
    coordinator.save(&save).await.map_err(EngineError::from)?;
    Ok(all_events.len())
}

/// Drive the position/simulation/perception tick loop until a shutdown
/// signal is received, saving once on the way out.
async fn run_tick_loop(
    sim: &mut Simulation,
    gateway_state: &Arc<GatewayState>,
    commands: &mut tokio::sync::mpsc::Receiver<GatewayCommand>,
    coordinator: &PersistenceCoordinator<'_>,
) -> Result<(), EngineError> {
    let position_interval = Duration::from_secs_f64(1.0 / POSITION_TICK_HZ);
    let mut ticker = tokio::time::interval(position_interval);
    let mut position_ticks_since_simulation_tick: u32 = 0;
    let mut save_interval = tokio::time::interval(Duration::from_secs(30));
    let mut saved_event_count: usize = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received, saving final state");
                break;
            }
            _ = save_interval.tick() => {
                match save_colony(sim, coordinator, saved_event_count).await {
                    Ok(new_count) => saved_event_count = new_count,
                    Err(err) => warn!(%err, "periodic save failed"),
                }
            }
            _ = ticker.tick() => {
                drain_commands(sim, gateway_state, commands);
                sim.tick_position(position_interval.as_secs_f64());

                position_ticks_since_simulation_tick = position_ticks_since_simulation_tick.saturating_add(1);
                if position_ticks_since_simulation_tick >= POSITION_TICKS_PER_SIMULATION_TICK {
                    position_ticks_since_simulation_tick = 0;
                    let simulation_tick_seconds = position_interval.as_secs_f64() * f64::from(POSITION_TICKS_PER_SIMULATION_TICK);
                    match sim.tick_simulation(simulation_tick_seconds) {
                        Ok(report) => {
                            if !report.arrivals.is_empty() {
                                info!(arrivals = report.arrivals.len(), "residents admitted from the train queue");
                            }
                        }
                        Err(err) => warn!(%err, "simulation tick failed"),
                    }
                    publish_perception(sim, gateway_state);
                    refresh_snapshot(gateway_state, sim).await;
                }
            }
        }
    }

    match tokio::time::timeout(SHUTDOWN_WATCHDOG, save_colony(sim, coordinator, saved_event_count)).await {
        Ok(Ok(_)) => info!("final save completed"),
        Ok(Err(err)) => warn!(%err, "final save failed"),
        Err(_) => warn!("final save timed out, forcing exit"),
    }
    Ok(())
}

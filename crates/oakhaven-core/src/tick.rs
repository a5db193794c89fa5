//! The position/simulation/perception tick scheduler (§4.11, §4.12).
//!
//! [`Simulation`] owns the whole colony: the resident/foraging-node table,
//! the tile map, the job/shop/petition boards, the currency ledger, the
//! event log, and the webhook dispatcher. It runs three independent loops
//! at different rates:
//!
//! - [`Simulation::tick_position`] -- path-following and velocity
//!   integration against the tile map's collision geometry, meant to run
//!   at a high, steady rate (nominally 30 Hz).
//! - [`Simulation::tick_simulation`] -- the world clock, needs decay,
//!   employment shifts, law enforcement, foraging regrowth, and reflection
//!   milestones, meant to run at a slower rate (nominally 10 Hz). Every
//!   per-resident subsystem outcome is translated here into an
//!   [`oakhaven_events::Event`] and, where a resident has an opt-in
//!   webhook registered, a fire-and-forget delivery.
//! - [`Simulation::tick_perception`] -- assembles the per-resident
//!   perception packets and the unfiltered spectator view.
//!
//! Action dispatch ([`Simulation::submit_action`]) sits outside all three
//! loops and runs synchronously whenever the gateway receives a client
//! action frame.

use std::collections::HashMap;

use oakhaven_agents::jobs::JobBoard;
use oakhaven_agents::petitions::PetitionBoard;
use oakhaven_agents::reflection::{Milestone, ReflectionTracker};
use oakhaven_agents::shop::ShopRegistry;
use oakhaven_agents::{actions, conversation, death, employment, law_enforcement, needs};
use oakhaven_ledger::Ledger;
use oakhaven_types::{
    ActionEnvelope, ActionResult, ActionStatus, ActionType, EventType, FeedbackToken, ForageNodeId,
    LifecycleStatus, Perception, Position, RejectionDetails, RejectionReason, Resident,
    ResidentId, SpectatorView, SpeedMode,
};
use oakhaven_webhooks::{Throttle, WebhookClient, WebhookPayload};
use oakhaven_world::TileMap;

use crate::clock::{ClockError, WorldClock};
use crate::config::{NodeEnv, SimulationConfig};
use crate::perception::{assemble_perception, assemble_spectator_view, PerceptionContext};
use crate::world::WorldState;

/// Undirected pain chatter is throttled per-resident to roughly once per
/// this many world-seconds.
const PAIN_WEBHOOK_THROTTLE_SECONDS: u64 = 1;

/// Periodic reflection fires at most once per this many world-seconds per
/// resident, matching the half-hour cadence implied by
/// [`Milestone::ThirtyMinutesSurvival`].
const REFLECTION_INTERVAL_SECONDS: u64 = 1_800;

/// How many simulation ticks elapse between peer-proximity recounts
/// (§4.4 step 1): a pairwise scan, deliberately kept off the hot path.
const PEER_RECOUNT_EVERY_N_TICKS: u64 = 10;

/// Errors that can occur while driving the tick scheduler.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The world clock failed to advance.
    #[error(transparent)]
    Clock(#[from] ClockError),
    /// A tile-map or pathfinding operation failed.
    #[error(transparent)]
    World(#[from] oakhaven_world::WorldError),
}

/// What happened during one simulation tick, for the caller (the gateway's
/// system-announcement surface) to decide what, if anything, to broadcast.
#[derive(Debug, Default)]
pub struct SimulationTickReport {
    /// Residents admitted from the train queue this tick.
    pub arrivals: Vec<ResidentId>,
}

/// Split a mutable slice into two distinct mutable references by index.
///
/// Returns `None` if `i == j` (aliasing) or either index is out of bounds.
fn split_two_mut<T>(items: &mut [T], i: usize, j: usize) -> Option<(&mut T, &mut T)> {
    if i == j {
        return None;
    }
    if i < j {
        let (left, right) = items.split_at_mut(j);
        Some((left.get_mut(i)?, right.first_mut()?))
    } else {
        let (left, right) = items.split_at_mut(i);
        Some((right.first_mut()?, left.get_mut(j)?))
    }
}

/// Round a sub-second config value down to whole world-seconds, mirroring
/// the conversion `oakhaven-agents` applies to its own second-denominated
/// float tunables.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn seconds(value: f64) -> u64 {
    value as u64
}

/// The whole colony simulation: world state, tile map, agent-side boards,
/// ledger, event log, and webhook dispatcher.
pub struct Simulation {
    world: WorldState,
    map: TileMap,
    jobs: JobBoard,
    shop: ShopRegistry,
    petitions: PetitionBoard,
    ledger: Ledger,
    reflections: ReflectionTracker,
    events: oakhaven_events::EventLog,
    webhooks: WebhookClient,
    health_throttle: Throttle,
    pain_throttle: Throttle,
    reflection_throttle: Throttle,
    config: SimulationConfig,
    peer_counts: HashMap<ResidentId, u32>,
    simulation_ticks: u64,
}

impl Simulation {
    /// Build a fresh simulation over an empty resident table.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] if
    /// `config.time.day_length_world_seconds` is zero.
    pub fn new(
        map: TileMap,
        jobs: JobBoard,
        shop: ShopRegistry,
        config: SimulationConfig,
        node_env: NodeEnv,
    ) -> Result<Self, TickError> {
        let clock = WorldClock::new(config.time.clone())?;
        let health_throttle_interval = config.needs.health_critical_webhook_interval_seconds;
        Ok(Self {
            world: WorldState::new(clock, node_env),
            map,
            jobs,
            shop,
            petitions: PetitionBoard::new(),
            ledger: Ledger::new(),
            reflections: ReflectionTracker::new(),
            events: oakhaven_events::EventLog::new(),
            webhooks: WebhookClient::new(),
            health_throttle: Throttle::new(health_throttle_interval),
            pain_throttle: Throttle::new(PAIN_WEBHOOK_THROTTLE_SECONDS),
            reflection_throttle: Throttle::new(REFLECTION_INTERVAL_SECONDS),
            config,
            peer_counts: HashMap::new(),
            simulation_ticks: 0,
        })
    }

    /// The authoritative resident/foraging-node table.
    #[must_use]
    pub const fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable access to the resident/foraging-node table, for the
    /// connection-lifecycle and registration surfaces.
    pub const fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    /// The tile map artifact.
    #[must_use]
    pub const fn map(&self) -> &TileMap {
        &self.map
    }

    /// The append-only event log.
    #[must_use]
    pub const fn events(&self) -> &oakhaven_events::EventLog {
        &self.events
    }

    /// The currency ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The colony job board, for persistence and `list_jobs`.
    #[must_use]
    pub const fn jobs(&self) -> &JobBoard {
        &self.jobs
    }

    /// Mutable access to the job board, for restoring persisted listings at boot.
    pub const fn jobs_mut(&mut self) -> &mut JobBoard {
        &mut self.jobs
    }

    /// The colony shop's price/stock table, for persistence.
    #[must_use]
    pub const fn shop(&self) -> &ShopRegistry {
        &self.shop
    }

    /// Mutable access to the shop registry, for restoring persisted stock at boot.
    pub const fn shop_mut(&mut self) -> &mut ShopRegistry {
        &mut self.shop
    }

    /// The council petition board, for persistence.
    #[must_use]
    pub const fn petitions(&self) -> &PetitionBoard {
        &self.petitions
    }

    /// Mutable access to the petition board, for restoring persisted petitions at boot.
    pub const fn petitions_mut(&mut self) -> &mut PetitionBoard {
        &mut self.petitions
    }

    /// Register a newly-connected resident, admitting them immediately in
    /// development mode or queuing them for the next train in production.
    pub fn register_resident(&mut self, resident: Resident) {
        self.world.queue_for_train(resident);
    }

    /// Redeem a reflection feedback token presented at the HTTP feedback
    /// endpoint, without the caller knowing which resident minted it.
    ///
    /// Returns `true` if the token existed and had not already been
    /// redeemed.
    pub fn resolve_feedback_token(&mut self, token: FeedbackToken) -> bool {
        self.reflections.redeem_by_token(token).is_some()
    }

    /// Dispatch one client action against the resident table.
    ///
    /// Removes the actor (and, if named, the target and foraging node)
    /// from the world table for the duration of dispatch so the borrow
    /// checker can hand out independent `&mut` references, then reinserts
    /// them and translates a successful outcome into an event and, where
    /// applicable, a webhook delivery.
    pub fn submit_action(
        &mut self,
        actor_id: ResidentId,
        target_id: Option<ResidentId>,
        node_id: Option<ForageNodeId>,
        envelope: &ActionEnvelope,
    ) -> ActionResult {
        let Some(mut actor) = self.world.remove_resident(actor_id) else {
            return ActionResult::rejected(
                envelope.request_id,
                RejectionDetails {
                    reason: RejectionReason::TargetNotFound,
                    message: "actor not found".to_owned(),
                },
            );
        };
        let mut target = target_id.and_then(|id| self.world.remove_resident(id));
        let world_seconds = self.world.clock().world_seconds();

        let result = {
            let node = node_id.and_then(|id| self.world.forage_node_mut(id));
            let mut ctx = actions::ActionContext {
                tile_map: &self.map,
                economy: &self.config.economy,
                law: &self.config.law,
                conversation: &self.config.conversation,
                jobs: &mut self.jobs,
                shop: &mut self.shop,
                petitions: &mut self.petitions,
                ledger: &mut self.ledger,
                reflections: &mut self.reflections,
                world_seconds,
            };
            actions::dispatch(&mut actor, target.as_mut(), node, envelope, &mut ctx)
        };

        if result.status == ActionStatus::Ok {
            self.record_action_side_effects(&actor, target.as_ref(), envelope.action, world_seconds);
        }

        if let Some(target) = target {
            self.world.add_resident_from_row(target);
        }
        self.world.add_resident_from_row(actor);
        result
    }

    /// Translate a successfully-dispatched action into an event, and for
    /// arrests, a webhook delivery to the suspect.
    fn record_action_side_effects(
        &mut self,
        actor: &Resident,
        target: Option<&Resident>,
        action: ActionType,
        world_seconds: u64,
    ) {
        let Some(event_type) = event_type_for_action(action) else {
            return;
        };
        let mut builder = oakhaven_events::EventBuilder::new(world_seconds, event_type)
            .resident(actor.id)
            .position(actor.position);
        if let Some(target) = target {
            builder = builder.target(target.id);
        }
        self.events.append(builder.build());

        if action == ActionType::Arrest {
            if let Some(target) = target {
                self.dispatch_webhook_for(target, "arrest", world_seconds, serde_json::Value::Null);
            }
        }
    }

    /// Fire-and-forget a webhook for `resident` if they have an opt-in
    /// URL registered.
    fn dispatch_webhook_for(&self, resident: &Resident, event: &str, world_seconds: u64, data: serde_json::Value) {
        if let Some(url) = &resident.webhook_url {
            self.webhooks.dispatch(
                url.clone(),
                WebhookPayload::new(event, world_seconds, resident.id, data),
            );
        }
    }

    /// Advance every non-sleeping, non-imprisoned, alive resident's
    /// position by one high-rate position tick.
    pub fn tick_position(&mut self, dt_seconds: f64) {
        for id in self.world.alive_resident_ids() {
            let Some(mut resident) = self.world.remove_resident(id) else {
                continue;
            };
            self.step_position(&mut resident, dt_seconds);
            self.world.add_resident_from_row(resident);
        }
    }

    fn step_position(&self, resident: &mut Resident, dt_seconds: f64) {
        if resident.status != LifecycleStatus::Alive || resident.sleeping || resident.custody.is_imprisoned() {
            return;
        }
        if let Some(path) = resident.transient.path_state.take() {
            resident.transient.path_state = self.advance_path(resident, path);
        } else {
            self.integrate_velocity(resident, dt_seconds);
        }
    }

    /// Step one resident along their cached path by one position tick's
    /// worth of movement (a flat per-tick pixel amount, per
    /// [`crate::config::MovementConfig`]), using the tile map's
    /// wall-sliding collision resolution.
    fn advance_path(&self, resident: &mut Resident, mut path: oakhaven_types::PathState) -> Option<oakhaven_types::PathState> {
        let next = *path.waypoints.first()?;
        let speed_px = match resident.speed_mode {
            SpeedMode::Running => self.config.movement.run_speed_px,
            _ => self.config.movement.walk_speed_px,
        };
        let dx = next.x - resident.position.x;
        let dy = next.y - resident.position.y;
        let distance = dx.hypot(dy);
        let requested = if distance <= speed_px {
            next
        } else {
            let ratio = speed_px / distance.max(f64::EPSILON);
            Position::new(resident.position.x + dx * ratio, resident.position.y + dy * ratio)
        };

        let outcome = oakhaven_world::resolve_move(&self.map, resident.position, requested, self.config.movement.half_hitbox_px);
        resident.position = outcome.position;

        if outcome.blocked {
            path.blocked_ticks = path.blocked_ticks.saturating_add(1);
            if path.blocked_ticks >= self.config.movement.path_stuck_ticks {
                resident.speed_mode = SpeedMode::Stopped;
                return None;
            }
            return Some(path);
        }
        path.blocked_ticks = 0;

        if resident.position.distance_to(next) <= self.config.movement.waypoint_tolerance_px {
            path.waypoints.remove(0);
            if path.waypoints.is_empty() {
                resident.speed_mode = SpeedMode::Stopped;
                if let Some(building) = path.auto_enter_building {
                    resident.current_building = Some(building);
                }
                return None;
            }
        }
        Some(path)
    }

    /// Integrate a resident's free-form velocity (set directly by `move`)
    /// over `dt_seconds`, stopping them dead on collision.
    fn integrate_velocity(&self, resident: &mut Resident, dt_seconds: f64) {
        if resident.speed_mode == SpeedMode::Stopped {
            return;
        }
        let requested = Position::new(
            resident.position.x + resident.velocity.x * dt_seconds,
            resident.position.y + resident.velocity.y * dt_seconds,
        );
        let outcome = oakhaven_world::resolve_move(&self.map, resident.position, requested, self.config.movement.half_hitbox_px);
        resident.position = outcome.position;
        if outcome.blocked {
            resident.velocity = Position::new(0.0, 0.0);
            resident.speed_mode = SpeedMode::Stopped;
        }
    }

    /// Advance the world clock by one simulation tick and run every
    /// per-resident subsystem: needs decay, employment shifts, law
    /// enforcement, foraging regrowth, and reflection milestones.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] on world-time overflow.
    pub fn tick_simulation(&mut self, tick_real_seconds: f64) -> Result<SimulationTickReport, TickError> {
        let previous_world_seconds = self.world.clock().world_seconds();
        let timers = self.world.clock_mut().advance(tick_real_seconds)?;
        let world_seconds = self.world.clock().world_seconds();
        let elapsed = world_seconds.saturating_sub(previous_world_seconds);
        self.simulation_ticks = self.simulation_ticks.saturating_add(1);

        let mut report = SimulationTickReport::default();

        if timers.train_due {
            let admitted = self.world.admit_queued_arrivals(self.map.spawn_point);
            for id in &admitted {
                self.events.append(
                    oakhaven_events::EventBuilder::new(world_seconds, EventType::Arrival)
                        .resident(*id)
                        .position(self.map.spawn_point)
                        .build(),
                );
            }
            report.arrivals = admitted;
        }
        if timers.restock_due {
            self.shop.restock();
        }

        if self.simulation_ticks % PEER_RECOUNT_EVERY_N_TICKS == 0 {
            let residents = self.world.all_residents();
            self.peer_counts = needs::compute_nearby_awake_peer_counts(&residents, self.config.needs.social_proximity_radius);
        }

        let mut residents = self.world.all_residents();
        self.tick_needs_and_translate(&mut residents, previous_world_seconds, world_seconds);
        self.tick_employment(&mut residents, world_seconds, elapsed);
        self.tick_law_enforcement(&mut residents, world_seconds, elapsed);
        self.tick_reflection(&mut residents, world_seconds);

        for resident in residents {
            if let Some(slot) = self.world.resident_mut(resident.id) {
                *slot = resident;
            }
        }

        let node_ids: Vec<ForageNodeId> = self.world.all_forage_nodes().iter().map(|node| node.id).collect();
        for id in node_ids {
            if let Some(node) = self.world.forage_node_mut(id) {
                oakhaven_world::tick_regrowth(node, world_seconds);
            }
        }

        Ok(report)
    }

    fn tick_needs_and_translate(&mut self, residents: &mut [Resident], previous_world_seconds: u64, world_seconds: u64) {
        let conversation_window_seconds = seconds(self.config.conversation.conversation_window_seconds);
        let outcomes = needs::tick_needs(
            residents,
            &self.peer_counts,
            &self.config.needs,
            conversation_window_seconds,
            previous_world_seconds,
            world_seconds,
        );

        let index: HashMap<ResidentId, usize> = residents.iter().enumerate().map(|(i, r)| (r.id, i)).collect();

        for (id, outcome) in outcomes {
            let Some(&idx) = index.get(&id) else { continue };
            let Some(resident) = residents.get(idx) else { continue };

            if outcome.collapsed {
                self.events.append(
                    oakhaven_events::EventBuilder::new(world_seconds, EventType::Collapse)
                        .resident(id)
                        .position(resident.position)
                        .build(),
                );
                self.dispatch_webhook_for(resident, "collapse", world_seconds, serde_json::Value::Null);
            }
            if outcome.died {
                self.events.append(
                    oakhaven_events::EventBuilder::new(world_seconds, EventType::Death)
                        .resident(id)
                        .position(resident.position)
                        .build(),
                );
                self.dispatch_webhook_for(resident, "death", world_seconds, serde_json::Value::Null);
            }
            if outcome.bladder_accident {
                self.events.append(
                    oakhaven_events::EventBuilder::new(world_seconds, EventType::BladderAccident)
                        .resident(id)
                        .details(serde_json::json!({ "fee": outcome.cleaning_fee }))
                        .build(),
                );
            }
            if outcome.health_critical {
                let key = id.to_string();
                if self.health_throttle.allow(&key, world_seconds) {
                    self.dispatch_webhook_for(
                        resident,
                        "health_critical",
                        world_seconds,
                        serde_json::json!({ "health": resident.needs.health }),
                    );
                }
            }
            if self.reflections.track_health_recovery(id, resident.needs.health) {
                if let Some(token) = self.reflections.fire_milestone(id, Milestone::HealthRecovery) {
                    self.dispatch_webhook_for(
                        resident,
                        "reflection",
                        world_seconds,
                        serde_json::json!({ "milestone": "health_recovery", "token": token.into_inner() }),
                    );
                }
            }
        }

        for resident in residents.iter_mut() {
            if resident.transient.pending_pain_messages.is_empty() {
                continue;
            }
            let messages = std::mem::take(&mut resident.transient.pending_pain_messages);
            let key = resident.id.to_string();
            let webhook_url = resident.webhook_url.clone();
            let resident_id = resident.id;
            for message in messages {
                if webhook_url.is_none() || !self.pain_throttle.allow(&key, world_seconds) {
                    continue;
                }
                if let Some(url) = webhook_url.clone() {
                    self.webhooks.dispatch(
                        url,
                        WebhookPayload::new(
                            "pain",
                            world_seconds,
                            resident_id,
                            serde_json::json!({
                                "message": message.message,
                                "source": message.source,
                                "intensity": message.intensity,
                            }),
                        ),
                    );
                }
            }
        }
    }

    fn tick_employment(&mut self, residents: &mut [Resident], world_seconds: u64, elapsed: u64) {
        for resident in residents.iter_mut() {
            if resident.status != LifecycleStatus::Alive {
                continue;
            }
            let Some(employment) = resident.employment else {
                continue;
            };
            let Some(building) = self.jobs.listing(employment.job_id).map(|listing| listing.building) else {
                continue;
            };
            let outcome = employment::tick_shift(
                resident,
                &self.jobs,
                &mut self.ledger,
                world_seconds,
                elapsed,
                self.config.economy.shift_duration_world_seconds,
                building,
            );
            if let Ok(Some(outcome)) = outcome {
                self.events.append(
                    oakhaven_events::EventBuilder::new(world_seconds, EventType::ShiftComplete)
                        .resident(resident.id)
                        .details(serde_json::json!({ "job_id": outcome.job_id.into_inner(), "wage": outcome.wage }))
                        .build(),
                );
            }
        }
    }

    fn tick_law_enforcement(&mut self, residents: &mut [Resident], world_seconds: u64, elapsed: u64) {
        for resident in residents.iter_mut() {
            if resident.status != LifecycleStatus::Alive {
                continue;
            }
            if resident.custody.is_imprisoned() {
                if law_enforcement::tick_prison_release(resident, self.map.spawn_point, world_seconds) {
                    self.events.append(
                        oakhaven_events::EventBuilder::new(world_seconds, EventType::PrisonRelease)
                            .resident(resident.id)
                            .position(resident.position)
                            .build(),
                    );
                }
            } else if law_enforcement::tick_loitering(resident, &self.config.law, elapsed) {
                self.events.append(
                    oakhaven_events::EventBuilder::new(world_seconds, EventType::LawViolation)
                        .resident(resident.id)
                        .position(resident.position)
                        .build(),
                );
            }
        }

        let escorts: Vec<(ResidentId, ResidentId)> = residents
            .iter()
            .filter_map(|r| r.custody.carrying_suspect_id.map(|suspect_id| (r.id, suspect_id)))
            .collect();
        if escorts.is_empty() {
            return;
        }
        let index: HashMap<ResidentId, usize> = residents.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        for (officer_id, suspect_id) in escorts {
            let (Some(&oi), Some(&si)) = (index.get(&officer_id), index.get(&suspect_id)) else {
                continue;
            };
            if let Some((officer, suspect)) = split_two_mut(residents, oi, si) {
                law_enforcement::follow_suspect(officer, suspect, &self.config.law);
            }
        }
    }

    fn tick_reflection(&mut self, residents: &mut [Resident], world_seconds: u64) {
        for resident in residents.iter() {
            if resident.status != LifecycleStatus::Alive {
                continue;
            }
            let age_seconds = u64::try_from(
                chrono::Utc::now()
                    .signed_duration_since(resident.registered_at)
                    .num_seconds(),
            )
            .unwrap_or(0);
            if age_seconds < REFLECTION_INTERVAL_SECONDS || self.reflections.has_fired(resident.id, Milestone::ThirtyMinutesSurvival) {
                continue;
            }
            if let Some(token) = self.reflections.fire_milestone(resident.id, Milestone::ThirtyMinutesSurvival) {
                self.dispatch_webhook_for(
                    resident,
                    "reflection",
                    world_seconds,
                    serde_json::json!({ "milestone": "thirty_minutes_survival", "token": token.into_inner() }),
                );
            }
        }

        for resident in residents.iter() {
            if resident.status == LifecycleStatus::Alive
                && resident.transient.conversation_count > 0
                && !self.reflections.has_fired(resident.id, Milestone::FirstConversation)
            {
                if let Some(token) = self.reflections.fire_milestone(resident.id, Milestone::FirstConversation) {
                    self.dispatch_webhook_for(
                        resident,
                        "reflection",
                        world_seconds,
                        serde_json::json!({ "milestone": "first_conversation", "token": token.into_inner() }),
                    );
                }
            }
        }

        let key = "periodic".to_owned();
        if self.reflection_throttle.allow(&key, world_seconds) {
            for resident in residents.iter() {
                if resident.status != LifecycleStatus::Alive {
                    continue;
                }
                let token = self.reflections.fire_periodic(resident.id);
                self.dispatch_webhook_for(
                    resident,
                    "reflection",
                    world_seconds,
                    serde_json::json!({ "milestone": "periodic", "token": token.into_inner() }),
                );
            }
        }
    }

    /// Record that `listener` heard `speaker`'s speech, applying the
    /// conversation-window bookkeeping and, on a directed reply, clearing
    /// the turn lock -- called by the gateway once per listener it
    /// determines was in audible range.
    pub fn record_speech_heard(&mut self, speaker_id: ResidentId, listener_id: ResidentId, world_seconds: u64) {
        let Some(mut speaker) = self.world.remove_resident(speaker_id) else {
            return;
        };
        if let Some(listener) = self.world.resident_mut(listener_id) {
            conversation::record_heard(&mut speaker, listener, world_seconds);
        }
        self.world.add_resident_from_row(speaker);
    }

    /// Whether `speaker` still holds an unexpired turn lock against
    /// `listener_id`.
    #[must_use]
    pub fn has_turn_lock(&self, speaker: &Resident, listener_id: ResidentId, world_seconds: u64) -> bool {
        conversation::has_turn_lock(speaker, listener_id, &self.config.conversation, world_seconds)
    }

    /// Check whether a body carried by `carrier_id` can be collected from
    /// `body_id`, and if so, mark the corpse as in transit.
    pub fn collect_body(&mut self, carrier_id: ResidentId, body_id: ResidentId) -> bool {
        let Some(mut carrier) = self.world.remove_resident(carrier_id) else {
            return false;
        };
        let collected = self
            .world
            .resident(body_id)
            .and_then(|body| death::collect_body(&mut carrier, body))
            .is_some();
        self.world.add_resident_from_row(carrier);
        collected
    }

    /// Assemble the perception packet for every currently-connected
    /// resident, plus the unfiltered spectator view.
    #[must_use]
    pub fn tick_perception(&self) -> (HashMap<ResidentId, Perception>, SpectatorView) {
        let clock = self.world.clock();
        let residents = self.world.all_residents();
        let forage_nodes = self.world.all_forage_nodes();
        let ctx = PerceptionContext {
            world_seconds: clock.world_seconds(),
            time_of_day: clock.time_of_day(),
            map: &self.map,
            residents: &residents,
            forage_nodes: &forage_nodes,
            config: &self.config.perception,
        };

        let mut perceptions = HashMap::with_capacity(residents.len());
        for resident in &residents {
            if resident.status == LifecycleStatus::Alive {
                perceptions.insert(resident.id, assemble_perception(resident, &ctx));
            }
        }
        let spectator_view = assemble_spectator_view(&ctx);
        (perceptions, spectator_view)
    }
}

/// Map a successfully-dispatched action to the event type it should be
/// logged as, or `None` for actions with no durable event (queries, and
/// actions whose state change is fully captured by the resident row
/// itself, e.g. `Move`, `Speak`, `Sleep`).
const fn event_type_for_action(action: ActionType) -> Option<EventType> {
    match action {
        ActionType::Buy => Some(EventType::Buy),
        ActionType::CollectUbi => Some(EventType::UbiCollected),
        ActionType::ApplyJob => Some(EventType::JobApplied),
        ActionType::QuitJob => Some(EventType::JobQuit),
        ActionType::WritePetition => Some(EventType::PetitionWritten),
        ActionType::VotePetition => Some(EventType::PetitionVoted),
        ActionType::Trade | ActionType::Give => Some(EventType::Transfer),
        ActionType::Depart => Some(EventType::Depart),
        ActionType::ProcessBody => Some(EventType::BodyProcessed),
        ActionType::Forage => Some(EventType::Forage),
        ActionType::Arrest => Some(EventType::Arrest),
        ActionType::BookSuspect => Some(EventType::BookSuspect),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use oakhaven_types::{ActionType, ResidentKind};

    use super::*;

    fn map() -> TileMap {
        TileMap::new(4, 4, 32.0, vec![false; 16], Vec::new(), Vec::new(), Position::new(16.0, 16.0)).expect("valid map")
    }

    fn resident(position: Position) -> Resident {
        Resident {
            id: ResidentId::new(),
            passport_no: "OC-0000001".to_owned(),
            display_name: "Test".to_owned(),
            kind: ResidentKind::Agent,
            status: LifecycleStatus::Alive,
            position,
            facing_degrees: 0,
            velocity: Position::new(0.0, 0.0),
            speed_mode: SpeedMode::Stopped,
            sleeping: false,
            needs: oakhaven_types::Needs::full(),
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

    fn simulation() -> Simulation {
        Simulation::new(map(), JobBoard::new(), ShopRegistry::new(Vec::new()), SimulationConfig::default(), NodeEnv::Development)
            .expect("valid simulation")
    }

    #[test]
    fn submit_action_runs_dispatch_against_the_real_table() {
        let mut sim = simulation();
        let resident = resident(Position::new(16.0, 16.0));
        let id = resident.id;
        sim.register_resident(resident);

        let envelope = ActionEnvelope {
            action: ActionType::Face,
            request_id: None,
            params: serde_json::json!({ "facing_degrees": 90 }),
        };
        let result = sim.submit_action(id, None, None, &envelope);
        assert_eq!(result.status, ActionStatus::Ok);
        assert_eq!(sim.world().resident(id).unwrap().facing_degrees, 90);
    }

    #[test]
    fn submit_action_against_missing_actor_is_rejected() {
        let mut sim = simulation();
        let envelope = ActionEnvelope {
            action: ActionType::Stop,
            request_id: None,
            params: serde_json::Value::Null,
        };
        let result = sim.submit_action(ResidentId::new(), None, None, &envelope);
        assert_eq!(result.status, ActionStatus::Error);
        assert_eq!(result.reason, Some(RejectionReason::TargetNotFound));
    }

    #[test]
    fn tick_simulation_advances_the_clock() {
        let mut sim = simulation();
        let before = sim.world().clock().world_seconds();
        sim.tick_simulation(0.1).expect("tick ok");
        assert!(sim.world().clock().world_seconds() >= before);
    }

    #[test]
    fn tick_position_moves_a_resident_along_its_path() {
        let mut sim = simulation();
        let mut r = resident(Position::new(16.0, 16.0));
        r.transient.path_state = Some(oakhaven_types::PathState {
            waypoints: vec![Position::new(48.0, 16.0)],
            blocked_ticks: 0,
            auto_enter_building: None,
        });
        let id = r.id;
        sim.register_resident(r);
        sim.tick_position(1.0 / 30.0);
        let moved = sim.world().resident(id).unwrap().position;
        assert!(moved.x > 16.0);
    }

    #[test]
    fn tick_perception_reports_the_registered_resident() {
        let mut sim = simulation();
        let r = resident(Position::new(16.0, 16.0));
        let id = r.id;
        sim.register_resident(r);
        let (perceptions, spectator) = sim.tick_perception();
        assert!(perceptions.contains_key(&id));
        assert_eq!(spectator.residents.len(), 1);
    }
}

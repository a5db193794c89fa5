//! Authoritative in-memory world state (§4.3).
//!
//! Holds the mutable resident table, the foraging-node table, the world
//! clock, and the train arrival queue. This is the single mutable root the
//! tick scheduler operates on each tick; persistence and the gateway only
//! ever observe it through the accessors here.

use std::collections::{HashMap, VecDeque};

use oakhaven_types::{ForageNodeId, ForagingNode, LifecycleStatus, Position, Resident, ResidentId};

use crate::clock::WorldClock;
use crate::config::NodeEnv;

/// The authoritative, mutable world: residents, foraging nodes, the clock,
/// and the queue of residents awaiting the next train arrival.
#[derive(Debug)]
pub struct WorldState {
    residents: HashMap<ResidentId, Resident>,
    forage_nodes: HashMap<ForageNodeId, ForagingNode>,
    clock: WorldClock,
    train_queue: VecDeque<Resident>,
    node_env: NodeEnv,
}

impl WorldState {
    /// Build an empty world with the given clock and environment.
    #[must_use]
    pub fn new(clock: WorldClock, node_env: NodeEnv) -> Self {
        Self {
            residents: HashMap::new(),
            forage_nodes: HashMap::new(),
            clock,
            train_queue: VecDeque::new(),
            node_env,
        }
    }

    /// Rehydrate the world from persisted rows on boot (§4.3).
    ///
    /// Replaces any existing in-memory residents and foraging nodes with
    /// the supplied records. Deceased residents are kept (they remain
    /// visible as bodies until processed at the mortuary).
    pub fn load_from_store(
        &mut self,
        residents: impl IntoIterator<Item = Resident>,
        forage_nodes: impl IntoIterator<Item = ForagingNode>,
    ) {
        self.residents = residents.into_iter().map(|r| (r.id, r)).collect();
        self.forage_nodes = forage_nodes.into_iter().map(|n| (n.id, n)).collect();
    }

    /// Materialise a single in-memory resident from a persisted record,
    /// overwriting any existing entry with the same id.
    pub fn add_resident_from_row(&mut self, resident: Resident) {
        self.residents.insert(resident.id, resident);
    }

    /// Queue a newly-registered resident for the next train arrival.
    ///
    /// In [`NodeEnv::Development`] the resident is admitted immediately
    /// instead of waiting for the train timer, so a developer testing
    /// locally never has to wait out a real train interval.
    pub fn queue_for_train(&mut self, resident: Resident) {
        if matches!(self.node_env, NodeEnv::Development) {
            self.residents.insert(resident.id, resident);
        } else {
            self.train_queue.push_back(resident);
        }
    }

    /// Admit every resident currently waiting for a train, placing them at
    /// `spawn_point`. Called when the clock reports `train_due` (§3).
    ///
    /// Returns the ids admitted this call, for event-log and webhook
    /// notification.
    pub fn admit_queued_arrivals(&mut self, spawn_point: Position) -> Vec<ResidentId> {
        let mut admitted = Vec::with_capacity(self.train_queue.len());
        while let Some(mut resident) = self.train_queue.pop_front() {
            resident.position = spawn_point;
            admitted.push(resident.id);
            self.residents.insert(resident.id, resident);
        }
        admitted
    }

    /// Push `message` to every alive resident within `range` pixels of
    /// `(x, y)`.
    pub fn notify_nearby(&mut self, origin: Position, range: f64, message: &str) {
        for resident in self.residents.values_mut() {
            if resident.status == LifecycleStatus::Alive && resident.position.distance_to(origin) <= range {
                resident.transient.pending_notifications.push(message.to_owned());
            }
        }
    }

    /// Look up a resident by id.
    #[must_use]
    pub fn resident(&self, id: ResidentId) -> Option<&Resident> {
        self.residents.get(&id)
    }

    /// Look up a resident by id, mutably.
    pub fn resident_mut(&mut self, id: ResidentId) -> Option<&mut Resident> {
        self.residents.get_mut(&id)
    }

    /// Remove a resident from the world (e.g. after mortuary processing).
    pub fn remove_resident(&mut self, id: ResidentId) -> Option<Resident> {
        self.residents.remove(&id)
    }

    /// Snapshot of every resident currently in the world, alive or not.
    #[must_use]
    pub fn all_residents(&self) -> Vec<Resident> {
        self.residents.values().cloned().collect()
    }

    /// Ids of every currently alive resident.
    #[must_use]
    pub fn alive_resident_ids(&self) -> Vec<ResidentId> {
        self.residents
            .values()
            .filter(|r| r.status == LifecycleStatus::Alive)
            .map(|r| r.id)
            .collect()
    }

    /// Look up a foraging node by id.
    #[must_use]
    pub fn forage_node(&self, id: ForageNodeId) -> Option<&ForagingNode> {
        self.forage_nodes.get(&id)
    }

    /// Look up a foraging node by id, mutably.
    pub fn forage_node_mut(&mut self, id: ForageNodeId) -> Option<&mut ForagingNode> {
        self.forage_nodes.get_mut(&id)
    }

    /// Snapshot of every foraging node.
    #[must_use]
    pub fn all_forage_nodes(&self) -> Vec<ForagingNode> {
        self.forage_nodes.values().cloned().collect()
    }

    /// Number of residents waiting for the next train.
    #[must_use]
    pub fn train_queue_len(&self) -> usize {
        self.train_queue.len()
    }

    /// The world clock.
    #[must_use]
    pub const fn clock(&self) -> &WorldClock {
        &self.clock
    }

    /// The world clock, mutably, for the tick scheduler to advance.
    pub fn clock_mut(&mut self) -> &mut WorldClock {
        &mut self.clock
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use oakhaven_types::{
        Custody, Needs, ResidentKind, ResidentTransient, SpeedMode,
    };

    use super::*;
    use crate::config::TimeConfig;

    fn test_resident(position: Position) -> Resident {
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
            needs: Needs::full(),
            wallet: 0,
            inventory: Vec::new(),
            employment: None,
            current_building: None,
            webhook_url: None,
            bio: None,
            custody: Custody::default(),
            transient: ResidentTransient::default(),
            registered_at: Utc::now(),
        }
    }

    fn world(node_env: NodeEnv) -> WorldState {
        let clock = WorldClock::new(TimeConfig::default()).unwrap();
        WorldState::new(clock, node_env)
    }

    #[test]
    fn development_mode_admits_immediately() {
        let mut state = world(NodeEnv::Development);
        let resident = test_resident(Position::new(0.0, 0.0));
        let id = resident.id;
        state.queue_for_train(resident);
        assert_eq!(state.train_queue_len(), 0);
        assert!(state.resident(id).is_some());
    }

    #[test]
    fn production_mode_queues_until_admitted() {
        let mut state = world(NodeEnv::Production);
        let resident = test_resident(Position::new(0.0, 0.0));
        let id = resident.id;
        state.queue_for_train(resident);
        assert_eq!(state.train_queue_len(), 1);
        assert!(state.resident(id).is_none());

        let admitted = state.admit_queued_arrivals(Position::new(50.0, 50.0));
        assert_eq!(admitted, vec![id]);
        assert_eq!(state.train_queue_len(), 0);
        assert_eq!(state.resident(id).unwrap().position, Position::new(50.0, 50.0));
    }

    #[test]
    fn notify_nearby_reaches_only_residents_in_range() {
        let mut state = world(NodeEnv::Development);
        let near = test_resident(Position::new(10.0, 0.0));
        let far = test_resident(Position::new(500.0, 0.0));
        let near_id = near.id;
        let far_id = far.id;
        state.add_resident_from_row(near);
        state.add_resident_from_row(far);

        state.notify_nearby(Position::new(0.0, 0.0), 100.0, "train arriving");

        assert_eq!(
            state.resident(near_id).unwrap().transient.pending_notifications,
            vec!["train arriving".to_owned()]
        );
        assert!(state.resident(far_id).unwrap().transient.pending_notifications.is_empty());
    }

    #[test]
    fn load_from_store_replaces_existing_state() {
        let mut state = world(NodeEnv::Development);
        state.add_resident_from_row(test_resident(Position::new(0.0, 0.0)));
        assert_eq!(state.all_residents().len(), 1);

        state.load_from_store(Vec::new(), Vec::new());
        assert!(state.all_residents().is_empty());
    }
}

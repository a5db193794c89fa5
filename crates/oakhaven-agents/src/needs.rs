//! Per-tick needs simulation (§4.4).
//!
//! Runs once per simulation tick (10 Hz) over every non-deceased resident.
//! Decay and recovery are expressed in [`crate::config::NeedsConfig`] as
//! world-second intervals; a point is lost or gained whenever the global
//! world-seconds counter crosses a multiple of the relevant interval,
//! mirroring the boundary-crossing idiom `oakhaven-core`'s `WorldClock`
//! uses for its own timers. This keeps every resident's decay perfectly
//! synchronised and needs no per-resident accumulator state.

use std::collections::HashMap;

use oakhaven_types::{LifecycleStatus, Needs, PainSource, Resident, ResidentId, SpeedMode};

use crate::config::NeedsConfig;
use crate::death;
use crate::pain;

/// What happened to a single resident during one needs tick, for the
/// caller to turn into events and webhooks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeedsOutcome {
    /// Energy reached zero while awake; the resident was forced to sleep.
    pub collapsed: bool,
    /// Health reached zero; the resident died this tick.
    pub died: bool,
    /// Bladder reached the accident threshold.
    pub bladder_accident: bool,
    /// Currency deducted for a bladder-accident cleaning fee, if any.
    pub cleaning_fee: u64,
    /// Health is in a critical band and the throttled webhook should fire.
    pub health_critical: bool,
}

/// How many multiples of `interval_seconds` lie in `(previous, current]`.
///
/// Returns 0 if `interval_seconds` is 0 (disabled channel).
fn boundaries_crossed(previous: u64, current: u64, interval_seconds: u64) -> u32 {
    if interval_seconds == 0 || current <= previous {
        return 0;
    }
    let before = previous.checked_div(interval_seconds).unwrap_or(0);
    let after = current.checked_div(interval_seconds).unwrap_or(0);
    u32::try_from(after.saturating_sub(before)).unwrap_or(u32::MAX)
}

/// Stretch a base interval by the inverse of a decay multiplier: a bonus
/// fraction of 0.3 means hunger/thirst decay 30% slower, i.e. the interval
/// between points lost is roughly 1 / (1 - 0.3) times longer.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn stretched_interval(base_seconds: u64, bonus: f64) -> u64 {
    let multiplier = (1.0 - bonus.clamp(0.0, 0.95)).max(0.05);
    ((base_seconds as f64) / multiplier).round() as u64
}

/// Count, for every awake and alive resident, how many other awake alive
/// residents sit within `radius` pixels. Recomputed only every 10th needs
/// tick by the caller (§4.4 step 1); pairwise, so deliberately kept off
/// the hot path.
#[must_use]
pub fn compute_nearby_awake_peer_counts(
    residents: &[Resident],
    radius: f64,
) -> HashMap<ResidentId, u32> {
    let awake: Vec<&Resident> = residents
        .iter()
        .filter(|r| r.status == LifecycleStatus::Alive && !r.sleeping)
        .collect();

    let mut counts = HashMap::with_capacity(awake.len());
    for subject in &awake {
        let mut count = 0u32;
        for other in &awake {
            if other.id != subject.id && subject.position.distance_to(other.position) <= radius {
                count = count.saturating_add(1);
            }
        }
        counts.insert(subject.id, count);
    }
    counts
}

/// Run one needs tick for every alive resident in `residents`.
///
/// `nearby_awake_peers` is the map built by
/// [`compute_nearby_awake_peer_counts`], refreshed by the caller every 10th
/// tick. `previous_world_seconds`/`world_seconds` bound the interval this
/// tick covers.
pub fn tick_needs(
    residents: &mut [Resident],
    nearby_awake_peers: &HashMap<ResidentId, u32>,
    config: &NeedsConfig,
    conversation_window_seconds: u64,
    previous_world_seconds: u64,
    world_seconds: u64,
) -> Vec<(ResidentId, NeedsOutcome)> {
    let mut outcomes = Vec::new();
    for resident in residents.iter_mut() {
        if resident.status != LifecycleStatus::Alive {
            continue;
        }
        let peers = nearby_awake_peers.get(&resident.id).copied().unwrap_or(0);
        let outcome = tick_one(
            resident,
            peers,
            config,
            conversation_window_seconds,
            previous_world_seconds,
            world_seconds,
        );
        outcomes.push((resident.id, outcome));
    }
    outcomes
}

#[allow(clippy::too_many_lines)]
fn tick_one(
    resident: &mut Resident,
    nearby_awake_peers: u32,
    config: &NeedsConfig,
    conversation_window_seconds: u64,
    previous_world_seconds: u64,
    world_seconds: u64,
) -> NeedsOutcome {
    let mut outcome = NeedsOutcome::default();

    // Step 2: conversing state.
    let conversing = resident
        .transient
        .last_conversation_time
        .is_some_and(|last| world_seconds.saturating_sub(last) <= conversation_window_seconds);

    // Step 3: hunger/thirst decay interval, stretched by the social bonus.
    let hunger_interval = if conversing {
        stretched_interval(config.hunger_decay_interval_seconds, config.strong_social_bonus)
    } else if nearby_awake_peers > 0 {
        stretched_interval(config.hunger_decay_interval_seconds, config.weak_social_bonus)
    } else {
        config.hunger_decay_interval_seconds
    };
    let thirst_interval = if conversing {
        stretched_interval(config.thirst_decay_interval_seconds, config.strong_social_bonus)
    } else if nearby_awake_peers > 0 {
        stretched_interval(config.thirst_decay_interval_seconds, config.weak_social_bonus)
    } else {
        config.thirst_decay_interval_seconds
    };

    // Step 4: hunger/thirst/bladder/social.
    let hunger_loss = boundaries_crossed(previous_world_seconds, world_seconds, hunger_interval);
    resident.needs.hunger = resident.needs.hunger.saturating_sub(hunger_loss);

    let thirst_loss = boundaries_crossed(previous_world_seconds, world_seconds, thirst_interval);
    resident.needs.thirst = resident.needs.thirst.saturating_sub(thirst_loss);

    let bladder_gain = boundaries_crossed(
        previous_world_seconds,
        world_seconds,
        config.bladder_fill_interval_seconds,
    );
    resident.needs.bladder = resident.needs.bladder.saturating_add(bladder_gain).min(100);

    if conversing {
        let social_gain = boundaries_crossed(
            previous_world_seconds,
            world_seconds,
            config.social_decay_interval_seconds,
        );
        resident.needs.social = resident.needs.social.saturating_add(social_gain).min(100);
    } else {
        let social_loss = boundaries_crossed(
            previous_world_seconds,
            world_seconds,
            config.social_decay_interval_seconds,
        );
        resident.needs.social = resident.needs.social.saturating_sub(social_loss);
    }

    // Step 5: energy.
    if resident.sleeping {
        let has_bag = resident.inventory.iter().any(|item| {
            matches!(item.item_type, oakhaven_types::ItemType::SleepingBag) && item.quantity > 0
        });
        let interval = if has_bag {
            config.sleep_recovery_with_bag_interval_seconds
        } else {
            config.sleep_recovery_interval_seconds
        };
        let gain = boundaries_crossed(previous_world_seconds, world_seconds, interval);
        resident.needs.energy = resident.needs.energy.saturating_add(gain).min(100);
        if resident.needs.energy >= config.auto_wake_energy {
            resident.sleeping = false;
            resident.transient.sleep_started_at_world_seconds = None;
        }
    } else {
        let interval = match resident.speed_mode {
            SpeedMode::Running => config.energy_decay_interval_running_seconds,
            SpeedMode::Walking => config.energy_decay_interval_walking_seconds,
            SpeedMode::Stopped => config.energy_decay_interval_idle_seconds,
        };
        let loss = boundaries_crossed(previous_world_seconds, world_seconds, interval);
        resident.needs.energy = resident.needs.energy.saturating_sub(loss);
    }

    // Step 7: forced sleep on energy exhaustion.
    if resident.needs.energy == 0 && !resident.sleeping {
        resident.sleeping = true;
        resident.transient.sleep_started_at_world_seconds = Some(world_seconds);
        resident.transient.path_state = None;
        resident.speed_mode = SpeedMode::Stopped;
        outcome.collapsed = true;
    }

    // Step 8: health damage / recovery.
    let zeroed_channels = u32::from(resident.needs.hunger == 0)
        .saturating_add(u32::from(resident.needs.thirst == 0))
        .saturating_add(u32::from(resident.needs.social == 0));
    if zeroed_channels > 0 {
        let loss = boundaries_crossed(
            previous_world_seconds,
            world_seconds,
            config.health_drain_interval_seconds,
        )
        .saturating_mul(zeroed_channels);
        resident.needs.health = resident.needs.health.saturating_sub(loss);
    } else if resident.needs.hunger > config.health_recovery_threshold
        && resident.needs.thirst > config.health_recovery_threshold
        && resident.needs.energy > config.health_recovery_threshold
        && resident.needs.social > 0
    {
        let gain = boundaries_crossed(
            previous_world_seconds,
            world_seconds,
            config.health_recovery_interval_seconds,
        );
        resident.needs.health = resident.needs.health.saturating_add(gain).min(100);
    }

    // Step 9: health-critical webhook throttle decision left to the caller;
    // we only report whether health is presently in the critical band.
    outcome.health_critical = resident.needs.health > 0 && resident.needs.health <= 20;

    // Step 10: pain messages.
    pain::evaluate(resident, world_seconds);

    // Step 6 belongs to the employment subsystem; left to the caller, which
    // has access to the job board this resident's employment references.

    if death::check_death(resident) {
        outcome.died = true;
    }

    // Step 11: bladder accident.
    if resident.needs.bladder >= config.bladder_accident_threshold {
        resident.needs.bladder = 50;
        outcome.bladder_accident = true;
        outcome.cleaning_fee = config.bladder_cleaning_fee.min(resident.wallet);
        resident.wallet = resident.wallet.saturating_sub(outcome.cleaning_fee);
        resident.transient.pending_pain_messages.push(oakhaven_types::PainMessage {
            message: "a bladder accident cost a cleaning fee".to_owned(),
            source: PainSource::Health,
            intensity: oakhaven_types::PainSeverity::Mild,
            needs_snapshot: resident.needs,
        });
    }

    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use oakhaven_types::{Custody, Position, ResidentKind, ResidentTransient};

    use super::*;

    fn resident(needs: Needs) -> Resident {
        Resident {
            id: ResidentId::new(),
            passport_no: "OC-0000001".to_owned(),
            display_name: "Test".to_owned(),
            kind: ResidentKind::Agent,
            status: LifecycleStatus::Alive,
            position: Position::new(0.0, 0.0),
            facing_degrees: 0,
            velocity: Position::new(0.0, 0.0),
            speed_mode: SpeedMode::Stopped,
            sleeping: false,
            needs,
            wallet: 10,
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

    #[test]
    fn hunger_decays_across_an_interval_boundary() {
        let mut r = resident(Needs::full());
        let config = NeedsConfig::default();
        let peers = HashMap::new();
        tick_needs(std::slice::from_mut(&mut r), &peers, &config, 20, 0, config.hunger_decay_interval_seconds);
        assert_eq!(r.needs.hunger, 99);
    }

    #[test]
    fn energy_exhaustion_forces_sleep_and_reports_collapse() {
        let mut r = resident(Needs { energy: 0, ..Needs::full() });
        let config = NeedsConfig::default();
        let peers = HashMap::new();
        let outcomes = tick_needs(std::slice::from_mut(&mut r), &peers, &config, 20, 0, 1);
        assert!(r.sleeping);
        assert!(outcomes[0].1.collapsed);
    }

    #[test]
    fn zero_health_after_zeroed_channel_drain_kills_the_resident() {
        let mut r = resident(Needs {
            hunger: 0,
            health: 1,
            ..Needs::full()
        });
        let config = NeedsConfig::default();
        let peers = HashMap::new();
        let interval = config.health_drain_interval_seconds;
        let outcomes = tick_needs(std::slice::from_mut(&mut r), &peers, &config, 20, 0, interval);
        assert_eq!(r.status, LifecycleStatus::Deceased);
        assert!(outcomes[0].1.died);
    }

    #[test]
    fn bladder_accident_fires_at_threshold_and_charges_a_fee() {
        let mut r = resident(Needs { bladder: 100, ..Needs::full() });
        let config = NeedsConfig::default();
        let peers = HashMap::new();
        let outcomes = tick_needs(std::slice::from_mut(&mut r), &peers, &config, 20, 0, 0);
        assert_eq!(r.needs.bladder, 50);
        assert!(outcomes[0].1.bladder_accident);
        assert_eq!(r.wallet, 10 - outcomes[0].1.cleaning_fee);
    }

    #[test]
    fn sleeping_resident_recovers_energy_and_auto_wakes() {
        let mut r = resident(Needs { energy: 79, ..Needs::full() });
        r.sleeping = true;
        let config = NeedsConfig::default();
        let peers = HashMap::new();
        tick_needs(
            std::slice::from_mut(&mut r),
            &peers,
            &config,
            20,
            0,
            config.sleep_recovery_interval_seconds,
        );
        assert!(!r.sleeping);
    }
}

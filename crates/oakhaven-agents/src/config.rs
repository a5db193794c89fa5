//! Tunable constants for the needs, economy, law enforcement, and
//! conversation subsystems.
//!
//! These groups are deserialized as part of the top-level simulation
//! configuration (`oakhaven-core::config::SimulationConfig`); this crate
//! only owns their shape and baked defaults so the subsystems that consume
//! them don't depend on the orchestration crate that loads them.

use serde::Deserialize;

/// Needs decay, recovery, and health-threshold configuration (§4.4).
///
/// Decay and recovery are expressed as world-second intervals ("one point
/// every N seconds") rather than fractional per-tick rates, since
/// [`oakhaven_types::structs::Needs`] fields are whole-number tenths and the
/// needs tick runs at a fixed rate (§4.11): the scheduler fires a point
/// whenever the world-seconds counter crosses a multiple of the interval,
/// the same boundary-crossing idiom `WorldClock` uses for its timers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NeedsConfig {
    /// World-seconds per hunger point lost.
    #[serde(default = "default_hunger_decay_interval_seconds")]
    pub hunger_decay_interval_seconds: u64,
    /// World-seconds per thirst point lost.
    #[serde(default = "default_thirst_decay_interval_seconds")]
    pub thirst_decay_interval_seconds: u64,
    /// World-seconds per bladder point gained.
    #[serde(default = "default_bladder_fill_interval_seconds")]
    pub bladder_fill_interval_seconds: u64,
    /// World-seconds per social point lost absent conversation.
    #[serde(default = "default_social_decay_interval_seconds")]
    pub social_decay_interval_seconds: u64,
    /// Fraction by which hunger/thirst decay slows when a nearby peer is
    /// awake (stretches the decay interval).
    #[serde(default = "default_weak_social_bonus")]
    pub weak_social_bonus: f64,
    /// Fraction by which hunger/thirst decay slows while conversing.
    #[serde(default = "default_strong_social_bonus")]
    pub strong_social_bonus: f64,
    /// Radius, in pixels, within which an awake peer grants the weak bonus.
    #[serde(default = "default_social_proximity_radius")]
    pub social_proximity_radius: f64,
    /// World-seconds per energy point recovered while sleeping without a
    /// sleeping bag.
    #[serde(default = "default_sleep_recovery_interval_seconds")]
    pub sleep_recovery_interval_seconds: u64,
    /// World-seconds per energy point recovered while sleeping with a
    /// sleeping bag.
    #[serde(default = "default_sleep_recovery_with_bag_interval_seconds")]
    pub sleep_recovery_with_bag_interval_seconds: u64,
    /// Energy level at which a sleeping resident automatically wakes.
    #[serde(default = "default_auto_wake_energy")]
    pub auto_wake_energy: u32,
    /// World-seconds per energy point lost while awake and stopped.
    #[serde(default = "default_energy_decay_interval_idle_seconds")]
    pub energy_decay_interval_idle_seconds: u64,
    /// World-seconds per energy point lost while walking.
    #[serde(default = "default_energy_decay_interval_walking_seconds")]
    pub energy_decay_interval_walking_seconds: u64,
    /// World-seconds per energy point lost while running.
    #[serde(default = "default_energy_decay_interval_running_seconds")]
    pub energy_decay_interval_running_seconds: u64,
    /// World-seconds per health point lost, for each of hunger/thirst/social
    /// currently at zero.
    #[serde(default = "default_health_drain_interval_seconds")]
    pub health_drain_interval_seconds: u64,
    /// Needs threshold above which health recovers naturally.
    #[serde(default = "default_health_recovery_threshold")]
    pub health_recovery_threshold: u32,
    /// World-seconds per health point recovered when recovery conditions
    /// hold.
    #[serde(default = "default_health_recovery_interval_seconds")]
    pub health_recovery_interval_seconds: u64,
    /// Bladder level at which a bladder accident fires and resets to 50.
    #[serde(default = "default_bladder_accident_threshold")]
    pub bladder_accident_threshold: u32,
    /// Currency units deducted for a bladder accident cleaning fee.
    #[serde(default = "default_bladder_cleaning_fee")]
    pub bladder_cleaning_fee: u64,
    /// Roughly one health-critical webhook fires per this many real seconds.
    #[serde(default = "default_health_critical_webhook_interval_seconds")]
    pub health_critical_webhook_interval_seconds: u64,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            hunger_decay_interval_seconds: default_hunger_decay_interval_seconds(),
            thirst_decay_interval_seconds: default_thirst_decay_interval_seconds(),
            bladder_fill_interval_seconds: default_bladder_fill_interval_seconds(),
            social_decay_interval_seconds: default_social_decay_interval_seconds(),
            weak_social_bonus: default_weak_social_bonus(),
            strong_social_bonus: default_strong_social_bonus(),
            social_proximity_radius: default_social_proximity_radius(),
            sleep_recovery_interval_seconds: default_sleep_recovery_interval_seconds(),
            sleep_recovery_with_bag_interval_seconds: default_sleep_recovery_with_bag_interval_seconds(),
            auto_wake_energy: default_auto_wake_energy(),
            energy_decay_interval_idle_seconds: default_energy_decay_interval_idle_seconds(),
            energy_decay_interval_walking_seconds: default_energy_decay_interval_walking_seconds(),
            energy_decay_interval_running_seconds: default_energy_decay_interval_running_seconds(),
            health_drain_interval_seconds: default_health_drain_interval_seconds(),
            health_recovery_threshold: default_health_recovery_threshold(),
            health_recovery_interval_seconds: default_health_recovery_interval_seconds(),
            bladder_accident_threshold: default_bladder_accident_threshold(),
            bladder_cleaning_fee: default_bladder_cleaning_fee(),
            health_critical_webhook_interval_seconds: default_health_critical_webhook_interval_seconds(),
        }
    }
}

/// Economy and employment configuration (§4.6).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EconomyConfig {
    /// UBI payout amount, in currency units.
    #[serde(default = "default_ubi_amount")]
    pub ubi_amount: u64,
    /// UBI collection cooldown, in world-seconds (24 game-hours).
    #[serde(default = "default_ubi_cooldown_world_seconds")]
    pub ubi_cooldown_world_seconds: u64,
    /// Shift length, in world-seconds, before a wage is paid.
    #[serde(default = "default_shift_duration_world_seconds")]
    pub shift_duration_world_seconds: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            ubi_amount: default_ubi_amount(),
            ubi_cooldown_world_seconds: default_ubi_cooldown_world_seconds(),
            shift_duration_world_seconds: default_shift_duration_world_seconds(),
        }
    }
}

/// Law enforcement configuration (§4.7).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LawConfig {
    /// Displacement, in pixels, beyond which a loitering anchor resets.
    #[serde(default = "default_loiter_check_radius")]
    pub loiter_check_radius: f64,
    /// World-seconds stationary within the radius before loitering is logged.
    #[serde(default = "default_loiter_threshold_world_seconds")]
    pub loiter_threshold_world_seconds: u64,
    /// Range, in pixels, within which an officer may arrest a suspect.
    #[serde(default = "default_arrest_range")]
    pub arrest_range: f64,
    /// Energy cost to an officer for a successful arrest.
    #[serde(default = "default_arrest_energy_cost")]
    pub arrest_energy_cost: f64,
    /// Prison sentence length, in world-seconds.
    #[serde(default = "default_sentence_world_seconds")]
    pub sentence_world_seconds: u64,
    /// Bounty credited to an officer for a successful booking.
    #[serde(default = "default_arrest_bounty")]
    pub arrest_bounty: u64,
    /// Fixed offset, in pixels, behind the officer's facing for an escorted suspect.
    #[serde(default = "default_escort_offset")]
    pub escort_offset: f64,
}

impl Default for LawConfig {
    fn default() -> Self {
        Self {
            loiter_check_radius: default_loiter_check_radius(),
            loiter_threshold_world_seconds: default_loiter_threshold_world_seconds(),
            arrest_range: default_arrest_range(),
            arrest_energy_cost: default_arrest_energy_cost(),
            sentence_world_seconds: default_sentence_world_seconds(),
            arrest_bounty: default_arrest_bounty(),
            escort_offset: default_escort_offset(),
        }
    }
}

/// Conversation turn-taking configuration (§4.8).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationConfig {
    /// Minimum interval, in real seconds, between a resident's successive
    /// `speak` actions.
    #[serde(default = "default_speak_cooldown_seconds")]
    pub speak_cooldown_seconds: f64,
    /// Window, in real seconds, within which an identical normalised text
    /// is rejected as a duplicate.
    #[serde(default = "default_duplicate_window_seconds")]
    pub duplicate_window_seconds: f64,
    /// How long, in real seconds, a turn lock on directed speech lasts
    /// before it expires unanswered.
    #[serde(default = "default_turn_timeout_seconds")]
    pub turn_timeout_seconds: f64,
    /// Radius, in pixels, within which a listener counts as "in
    /// conversation" with the speaker.
    #[serde(default = "default_conversation_range_px")]
    pub conversation_range_px: f64,
    /// Window, in real seconds, during which a resident is considered
    /// "conversing" after their last conversational exchange.
    #[serde(default = "default_conversation_window_seconds")]
    pub conversation_window_seconds: f64,
    /// Extra energy cost of a shouted message over a normal one.
    #[serde(default = "default_shout_energy_cost")]
    pub shout_energy_cost: f64,
    /// Energy cost of a normal or whispered message.
    #[serde(default = "default_speak_energy_cost")]
    pub speak_energy_cost: f64,
    /// Window, in real seconds, for idempotent `request_id` deduplication.
    #[serde(default = "default_request_id_ttl_seconds")]
    pub request_id_ttl_seconds: u64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            speak_cooldown_seconds: default_speak_cooldown_seconds(),
            duplicate_window_seconds: default_duplicate_window_seconds(),
            turn_timeout_seconds: default_turn_timeout_seconds(),
            conversation_range_px: default_conversation_range_px(),
            conversation_window_seconds: default_conversation_window_seconds(),
            shout_energy_cost: default_shout_energy_cost(),
            speak_energy_cost: default_speak_energy_cost(),
            request_id_ttl_seconds: default_request_id_ttl_seconds(),
        }
    }
}

const fn default_hunger_decay_interval_seconds() -> u64 {
    18
}

const fn default_thirst_decay_interval_seconds() -> u64 {
    14
}

const fn default_bladder_fill_interval_seconds() -> u64 {
    12
}

const fn default_social_decay_interval_seconds() -> u64 {
    30
}

const fn default_weak_social_bonus() -> f64 {
    0.3
}

const fn default_strong_social_bonus() -> f64 {
    0.7
}

const fn default_social_proximity_radius() -> f64 {
    160.0
}

const fn default_sleep_recovery_interval_seconds() -> u64 {
    4
}

const fn default_sleep_recovery_with_bag_interval_seconds() -> u64 {
    2
}

const fn default_auto_wake_energy() -> u32 {
    80
}

const fn default_energy_decay_interval_idle_seconds() -> u64 {
    40
}

const fn default_energy_decay_interval_walking_seconds() -> u64 {
    22
}

const fn default_energy_decay_interval_running_seconds() -> u64 {
    10
}

const fn default_health_drain_interval_seconds() -> u64 {
    6
}

const fn default_health_recovery_threshold() -> u32 {
    40
}

const fn default_health_recovery_interval_seconds() -> u64 {
    8
}

const fn default_bladder_accident_threshold() -> u32 {
    100
}

const fn default_bladder_cleaning_fee() -> u64 {
    5
}

const fn default_health_critical_webhook_interval_seconds() -> u64 {
    10
}

const fn default_ubi_amount() -> u64 {
    20
}

const fn default_ubi_cooldown_world_seconds() -> u64 {
    86_400
}

const fn default_shift_duration_world_seconds() -> u64 {
    14_400
}

const fn default_loiter_check_radius() -> f64 {
    48.0
}

const fn default_loiter_threshold_world_seconds() -> u64 {
    1_800
}

const fn default_arrest_range() -> f64 {
    48.0
}

const fn default_arrest_energy_cost() -> f64 {
    5.0
}

const fn default_sentence_world_seconds() -> u64 {
    3_600
}

const fn default_arrest_bounty() -> u64 {
    25
}

const fn default_escort_offset() -> f64 {
    24.0
}

const fn default_speak_cooldown_seconds() -> f64 {
    1.5
}

const fn default_duplicate_window_seconds() -> f64 {
    10.0
}

const fn default_turn_timeout_seconds() -> f64 {
    45.0
}

const fn default_conversation_range_px() -> f64 {
    128.0
}

const fn default_conversation_window_seconds() -> f64 {
    20.0
}

const fn default_shout_energy_cost() -> f64 {
    1.5
}

const fn default_speak_energy_cost() -> f64 {
    0.5
}

const fn default_request_id_ttl_seconds() -> u64 {
    30
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn needs_defaults_are_stable() {
        let config = NeedsConfig::default();
        assert_eq!(config.auto_wake_energy, 80);
        assert_eq!(config.bladder_cleaning_fee, 5);
    }

    #[test]
    fn law_defaults_are_stable() {
        let config = LawConfig::default();
        assert_eq!(config.sentence_world_seconds, 3_600);
        assert_eq!(config.arrest_bounty, 25);
    }
}

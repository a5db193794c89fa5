//! World clock and timer tracking for the Oakhaven colony simulation.
//!
//! The clock is the single source of truth for all temporal state: a
//! monotonic world-time counter (scaled from real time -- see
//! [`crate::config::TimeConfig::world_time_scale`]) plus three timers that
//! fire during the tick scheduler's simulation phase (§4.11): train
//! arrivals, shop restocking, and batched persistence saves. Time of day is
//! derived from the world-time counter, never stored independently.
//!
//! # Design Principles
//!
//! - All temporal derivations use checked or saturating arithmetic (no
//!   silent overflow).
//! - Time of day is computed from the world-seconds counter -- never
//!   stored independently.
//! - The train and restock timers advance in world-time; the save timer
//!   advances in real time, per §3.

use oakhaven_types::TimeOfDay;

use crate::config::TimeConfig;

/// Number of phases in a full day/night cycle.
const TIME_OF_DAY_PHASES: u64 = 4;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// World-time counter would overflow.
    #[error("world-time counter overflow: cannot advance beyond u64::MAX")]
    WorldTimeOverflow,

    /// Invalid time configuration (e.g. zero day length).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Timers that fired during a single call to [`WorldClock::advance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerEvents {
    /// The train timer elapsed; a queued resident should spawn.
    pub train_due: bool,
    /// The restock timer elapsed; the shop should reset to default stock.
    pub restock_due: bool,
    /// The save timer elapsed; the scheduler should persist a batch.
    pub save_due: bool,
}

/// World clock tracking world-time and the train/restock/save timers.
///
/// The clock advances once per simulation tick (§4.11, 10 Hz). Time of day
/// is derived from the world-seconds counter and [`TimeConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorldClock {
    /// Current world-time, in simulated seconds since the clock started.
    world_seconds: u64,
    /// World-seconds remaining until the next train arrival.
    train_timer_seconds: u64,
    /// World-seconds remaining until the next shop restock.
    restock_timer_seconds: u64,
    /// Real-seconds remaining until the next batched persistence save.
    save_timer_seconds: u64,
    config: TimeConfig,
}

impl WorldClock {
    /// Create a new world clock starting at world-time 0, with all timers
    /// freshly armed from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `day_length_world_seconds`
    /// is zero.
    pub fn new(config: TimeConfig) -> Result<Self, ClockError> {
        if config.day_length_world_seconds == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "day_length_world_seconds must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            world_seconds: 0,
            train_timer_seconds: config.train_interval_world_seconds,
            restock_timer_seconds: config.restock_interval_world_seconds,
            save_timer_seconds: config.save_interval_real_seconds,
            config,
        })
    }

    /// Restore a clock from persisted state (`world_state` table, §6).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `day_length_world_seconds`
    /// is zero.
    pub fn from_parts(
        world_seconds: u64,
        train_timer_seconds: u64,
        restock_timer_seconds: u64,
        save_timer_seconds: u64,
        config: TimeConfig,
    ) -> Result<Self, ClockError> {
        if config.day_length_world_seconds == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "day_length_world_seconds must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            world_seconds,
            train_timer_seconds,
            restock_timer_seconds,
            save_timer_seconds,
            config,
        })
    }

    /// Advance the clock by one simulation tick.
    ///
    /// `tick_real_seconds` is the wall-clock duration of one simulation
    /// tick (e.g. 0.1 s at 10 Hz); world-time advances by that duration
    /// scaled by [`TimeConfig::world_time_scale`]. Timers that reach zero
    /// are reported in the returned [`TimerEvents`] and rearmed.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::WorldTimeOverflow`] if the world-seconds
    /// counter would exceed `u64::MAX`.
    pub fn advance(&mut self, tick_real_seconds: f64) -> Result<TimerEvents, ClockError> {
        let world_delta = tick_world_seconds(tick_real_seconds, self.config.world_time_scale);
        self.world_seconds = self
            .world_seconds
            .checked_add(world_delta)
            .ok_or(ClockError::WorldTimeOverflow)?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let real_delta = tick_real_seconds.max(0.0).round() as u64;

        let train_due = Self::tick_timer(&mut self.train_timer_seconds, world_delta);
        if train_due {
            self.train_timer_seconds = self.config.train_interval_world_seconds;
        }
        let restock_due = Self::tick_timer(&mut self.restock_timer_seconds, world_delta);
        if restock_due {
            self.restock_timer_seconds = self.config.restock_interval_world_seconds;
        }
        let save_due = Self::tick_timer(&mut self.save_timer_seconds, real_delta);
        if save_due {
            self.save_timer_seconds = self.config.save_interval_real_seconds;
        }

        Ok(TimerEvents {
            train_due,
            restock_due,
            save_due,
        })
    }

    /// Decrement a countdown timer by `delta`, reporting whether it fired.
    const fn tick_timer(timer: &mut u64, delta: u64) -> bool {
        *timer = timer.saturating_sub(delta);
        *timer == 0
    }

    /// Return the current world-time, in simulated seconds.
    pub const fn world_seconds(&self) -> u64 {
        self.world_seconds
    }

    /// Return the world-seconds remaining until the next train arrival.
    pub const fn train_timer_seconds(&self) -> u64 {
        self.train_timer_seconds
    }

    /// Return the world-seconds remaining until the next shop restock.
    pub const fn restock_timer_seconds(&self) -> u64 {
        self.restock_timer_seconds
    }

    /// Return the real-seconds remaining until the next batched save.
    pub const fn save_timer_seconds(&self) -> u64 {
        self.save_timer_seconds
    }

    /// Force the train timer to fire on the next tick (development mode
    /// immediate spawn, §3 Lifecycle).
    pub const fn fire_train_immediately(&mut self) {
        self.train_timer_seconds = 0;
    }

    /// Compute the current time of day from the world-seconds counter.
    ///
    /// A day is divided into four equal phases: Dawn, Day, Dusk, Night.
    pub fn time_of_day(&self) -> TimeOfDay {
        let within_day = self
            .world_seconds
            .checked_rem(self.config.day_length_world_seconds)
            .unwrap_or(0);
        let phase_length = self
            .config
            .day_length_world_seconds
            .checked_div(TIME_OF_DAY_PHASES)
            .unwrap_or(1)
            .max(1);
        match within_day.checked_div(phase_length).unwrap_or(0) {
            0 => TimeOfDay::Dawn,
            1 => TimeOfDay::Day,
            2 => TimeOfDay::Dusk,
            _ => TimeOfDay::Night,
        }
    }

    /// Return the configured time settings.
    pub const fn config(&self) -> &TimeConfig {
        &self.config
    }
}

/// Compute the world-seconds elapsed for a tick lasting `tick_real_seconds`
/// of wall-clock time at the given scale factor.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn tick_world_seconds(tick_real_seconds: f64, world_time_scale: u64) -> u64 {
    let scaled = tick_real_seconds.max(0.0) * world_time_scale as f64;
    scaled.round() as u64
}

//! Configuration loading and typed config structures for the Oakhaven
//! colony simulation.
//!
//! Deployment settings (`PORT`, `DB_PATH`, `REGISTRATION_TOKEN`,
//! `CLIENT_DIST`, `MAP_PATH`, `NODE_ENV`) come from the process environment, following
//! twelve-factor convention. Simulation balance constants (decay rates,
//! ranges, thresholds, energy costs, bounties, sentence lengths) are baked
//! defaults that may be overridden from an optional `oakhaven-config.yaml`
//! for tuning without a rebuild.

use std::path::Path;

use oakhaven_agents::config::{ConversationConfig, EconomyConfig, LawConfig, NeedsConfig};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A required environment-driven setting was missing or malformed.
    #[error("invalid environment configuration: {reason}")]
    InvalidEnv {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Deployment mode, affecting train arrival immediacy and spawn behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeEnv {
    /// Production: residents wait for the next scheduled train.
    Production,
    /// Development: residents spawn immediately on registration.
    Development,
}

impl Default for NodeEnv {
    fn default() -> Self {
        Self::Development
    }
}

/// Process-wide deployment settings, sourced from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listening port for the WebSocket gateway and HTTP companion surface.
    pub port: u16,
    /// Path to the persistent store.
    pub db_path: String,
    /// Bearer token gating registration and benchmark endpoints.
    pub registration_token: String,
    /// Static asset root for the browser client.
    pub client_dist: String,
    /// Path to the tile map artifact produced by the (out-of-scope)
    /// external map generator.
    pub map_path: String,
    /// Production vs. development deployment mode.
    pub node_env: NodeEnv,
}

impl ServerConfig {
    /// Build server settings from environment variables, falling back to
    /// development-friendly defaults for everything but the registration
    /// token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `PORT` is set but is not a
    /// valid `u16`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(val) => val
                .parse()
                .map_err(|_err| ConfigError::InvalidEnv {
                    reason: format!("PORT {val:?} is not a valid port number"),
                })?,
            Err(_) => default_port(),
        };
        let node_env = match std::env::var("NODE_ENV").as_deref() {
            Ok("production") => NodeEnv::Production,
            _ => NodeEnv::Development,
        };
        Ok(Self {
            port,
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_err| default_db_path()),
            registration_token: std::env::var("REGISTRATION_TOKEN").unwrap_or_default(),
            client_dist: std::env::var("CLIENT_DIST").unwrap_or_else(|_err| default_client_dist()),
            map_path: std::env::var("MAP_PATH").unwrap_or_else(|_err| default_map_path()),
            node_env,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            db_path: default_db_path(),
            registration_token: String::new(),
            client_dist: default_client_dist(),
            map_path: default_map_path(),
            node_env: NodeEnv::default(),
        }
    }
}

/// World-time and timer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeConfig {
    /// Simulated world-seconds elapsed per real second (§3 World Clock).
    #[serde(default = "default_world_time_scale")]
    pub world_time_scale: u64,
    /// Length of a full day/night cycle, in world-seconds.
    #[serde(default = "default_day_length_world_seconds")]
    pub day_length_world_seconds: u64,
    /// Train interval in production, in world-seconds.
    #[serde(default = "default_train_interval_world_seconds")]
    pub train_interval_world_seconds: u64,
    /// Shop restock interval, in world-seconds.
    #[serde(default = "default_restock_interval_world_seconds")]
    pub restock_interval_world_seconds: u64,
    /// Petition voting-window expiry, in world-seconds.
    #[serde(default = "default_petition_expiry_world_seconds")]
    pub petition_expiry_world_seconds: u64,
    /// Batched persistence save interval, in real seconds.
    #[serde(default = "default_save_interval_real_seconds")]
    pub save_interval_real_seconds: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            world_time_scale: default_world_time_scale(),
            day_length_world_seconds: default_day_length_world_seconds(),
            train_interval_world_seconds: default_train_interval_world_seconds(),
            restock_interval_world_seconds: default_restock_interval_world_seconds(),
            petition_expiry_world_seconds: default_petition_expiry_world_seconds(),
            save_interval_real_seconds: default_save_interval_real_seconds(),
        }
    }
}

/// Movement and collision configuration (§4.11, §4.12).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovementConfig {
    /// Pixels per position tick at walking speed.
    #[serde(default = "default_walk_speed_px")]
    pub walk_speed_px: f64,
    /// Pixels per position tick at running speed.
    #[serde(default = "default_run_speed_px")]
    pub run_speed_px: f64,
    /// Distance, in pixels, within which a waypoint is considered reached.
    #[serde(default = "default_waypoint_tolerance_px")]
    pub waypoint_tolerance_px: f64,
    /// Half the resident hitbox side length, in pixels.
    #[serde(default = "default_half_hitbox_px")]
    pub half_hitbox_px: f64,
    /// Consecutive fully-blocked position ticks before a path is cancelled.
    #[serde(default = "default_path_stuck_ticks")]
    pub path_stuck_ticks: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed_px: default_walk_speed_px(),
            run_speed_px: default_run_speed_px(),
            waypoint_tolerance_px: default_waypoint_tolerance_px(),
            half_hitbox_px: default_half_hitbox_px(),
            path_stuck_ticks: default_path_stuck_ticks(),
        }
    }
}

/// Spatial perception configuration (§4.5).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PerceptionConfig {
    /// Radius, in pixels, within which another resident is always visible.
    #[serde(default = "default_ambient_radius_px")]
    pub ambient_radius_px: f64,
    /// Radius, in pixels, of the facing-dependent field-of-view cone.
    #[serde(default = "default_fov_radius_px")]
    pub fov_radius_px: f64,
    /// Full angle, in degrees, of the field-of-view cone.
    #[serde(default = "default_fov_angle_degrees")]
    pub fov_angle_degrees: f64,
    /// Radius, in pixels, within which buildings and forage nodes are visible.
    #[serde(default = "default_structure_visibility_radius_px")]
    pub structure_visibility_radius_px: f64,
    /// Night-vision multiplier floor applied to ambient/FOV ranges at night.
    #[serde(default = "default_night_vision_floor")]
    pub night_vision_floor: f64,
    /// Base audible range, in pixels, for a whispered message.
    #[serde(default = "default_whisper_range_px")]
    pub whisper_range_px: f64,
    /// Base audible range, in pixels, for a normal-volume message.
    #[serde(default = "default_normal_range_px")]
    pub normal_range_px: f64,
    /// Base audible range, in pixels, for a shouted message.
    #[serde(default = "default_shout_range_px")]
    pub shout_range_px: f64,
    /// Per-wall multiplicative attenuation applied to audible range.
    #[serde(default = "default_wall_attenuation")]
    pub wall_attenuation: f64,
    /// Distance, in pixels, within which a door counts as "near" for the
    /// `enter_building` interaction tag.
    #[serde(default = "default_door_interaction_radius_px")]
    pub door_interaction_radius_px: f64,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            ambient_radius_px: default_ambient_radius_px(),
            fov_radius_px: default_fov_radius_px(),
            fov_angle_degrees: default_fov_angle_degrees(),
            structure_visibility_radius_px: default_structure_visibility_radius_px(),
            night_vision_floor: default_night_vision_floor(),
            whisper_range_px: default_whisper_range_px(),
            normal_range_px: default_normal_range_px(),
            shout_range_px: default_shout_range_px(),
            wall_attenuation: default_wall_attenuation(),
            door_interaction_radius_px: default_door_interaction_radius_px(),
        }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-time and timer tunables.
    #[serde(default)]
    pub time: TimeConfig,
    /// Needs decay/recovery tunables.
    #[serde(default)]
    pub needs: NeedsConfig,
    /// Economy and employment tunables.
    #[serde(default)]
    pub economy: EconomyConfig,
    /// Law enforcement tunables.
    #[serde(default)]
    pub law: LawConfig,
    /// Movement and collision tunables.
    #[serde(default)]
    pub movement: MovementConfig,
    /// Spatial perception tunables.
    #[serde(default)]
    pub perception: PerceptionConfig,
    /// Conversation turn-taking tunables.
    #[serde(default)]
    pub conversation: ConversationConfig,
    /// Deployment settings, always sourced from the environment and never
    /// from the YAML tuning file.
    #[serde(skip)]
    pub server: ServerConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time: TimeConfig::default(),
            needs: NeedsConfig::default(),
            economy: EconomyConfig::default(),
            law: LawConfig::default(),
            movement: MovementConfig::default(),
            perception: PerceptionConfig::default(),
            conversation: ConversationConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load balance tunables from a YAML file and deployment settings from
    /// the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if its content is not valid YAML, or
    /// [`ConfigError::InvalidEnv`] if an environment setting is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.server = ServerConfig::from_env()?;
        Ok(config)
    }

    /// Load balance tunables from baked defaults and deployment settings
    /// from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if an environment setting is
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            ..Self::default()
        })
    }

    /// Parse balance tunables from a YAML string, for tests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

const fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "oakhaven.db".to_owned()
}

fn default_client_dist() -> String {
    "client/dist".to_owned()
}

fn default_map_path() -> String {
    "map.json".to_owned()
}

const fn default_world_time_scale() -> u64 {
    60
}

const fn default_day_length_world_seconds() -> u64 {
    1_440
}

const fn default_train_interval_world_seconds() -> u64 {
    18_000
}

const fn default_restock_interval_world_seconds() -> u64 {
    36_000
}

const fn default_petition_expiry_world_seconds() -> u64 {
    259_200
}

const fn default_save_interval_real_seconds() -> u64 {
    30
}

const fn default_walk_speed_px() -> f64 {
    3.0
}

const fn default_run_speed_px() -> f64 {
    6.0
}

const fn default_waypoint_tolerance_px() -> f64 {
    16.0
}

const fn default_half_hitbox_px() -> f64 {
    12.0
}

const fn default_path_stuck_ticks() -> u32 {
    30
}

const fn default_ambient_radius_px() -> f64 {
    96.0
}

const fn default_fov_radius_px() -> f64 {
    320.0
}

const fn default_fov_angle_degrees() -> f64 {
    120.0
}

const fn default_structure_visibility_radius_px() -> f64 {
    480.0
}

const fn default_night_vision_floor() -> f64 {
    0.35
}

const fn default_whisper_range_px() -> f64 {
    48.0
}

const fn default_normal_range_px() -> f64 {
    160.0
}

const fn default_shout_range_px() -> f64 {
    400.0
}

const fn default_wall_attenuation() -> f64 {
    0.25
}

const fn default_door_interaction_radius_px() -> f64 {
    64.0
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.time.world_time_scale, 60);
        assert_eq!(config.needs.auto_wake_energy, 80);
        assert_eq!(config.law.sentence_world_seconds, 3_600);
    }

    #[test]
    fn parse_partial_yaml_overrides_only_named_fields() {
        let yaml = r"
needs:
  hunger_decay_interval_seconds: 5
law:
  arrest_bounty: 50
";
        let config = SimulationConfig::parse(yaml).unwrap_or_else(|_err| SimulationConfig::default());
        assert_eq!(config.needs.hunger_decay_interval_seconds, 5);
        assert_eq!(config.law.arrest_bounty, 50);
        // Untouched groups keep their defaults.
        assert_eq!(config.economy.ubi_amount, 20);
    }

    #[test]
    fn parse_empty_yaml_is_all_defaults() {
        let config = SimulationConfig::parse("").unwrap_or_else(|_err| SimulationConfig::default());
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn node_env_defaults_to_development() {
        assert_eq!(NodeEnv::default(), NodeEnv::Development);
    }
}

//! Configuration loading and typed config structures for the berry farming agent.
//!
//! Engine tuning lives in `berryfarmer.yaml`. These structs mirror the YAML
//! structure; every field has a serde default matching the values the agent
//! was tuned with, so an empty or partial file is valid.
//!
//! Per-tick operator options (which berries to collect, combat toggles, the
//! route) are not read from here; see [`crate::options`].

use std::path::Path;

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FarmerConfig {
    /// Distances, tolerances, and throttle intervals.
    #[serde(default)]
    pub tuning: TuningConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FarmerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Distances, tolerances, and cooldowns used by the behaviours.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TuningConfig {
    /// Horizontal distance at which a waypoint counts as reached.
    #[serde(default = "default_waypoint_reach_distance")]
    pub waypoint_reach_distance: f32,

    /// Horizontal distance within which a bush can be collected.
    #[serde(default = "default_harvest_reach_distance")]
    pub harvest_reach_distance: f32,

    /// Multiple of the harvest reach allowed on the vertical axis.
    #[serde(default = "default_harvest_height_factor")]
    pub harvest_height_factor: f32,

    /// Distance within which a new target is treated as the in-flight one.
    #[serde(default = "default_navigation_tolerance")]
    pub navigation_tolerance: f32,

    /// Tolerance used instead when pathfinding is skipped.
    #[serde(default = "default_direct_navigation_tolerance")]
    pub direct_navigation_tolerance: f32,

    /// Tick gaps at or above this many milliseconds count as a pause.
    #[serde(default = "default_pause_threshold_ms")]
    pub pause_threshold_ms: u64,

    /// Minimum interval between statistics display refreshes.
    #[serde(default = "default_statistics_interval_ms")]
    pub statistics_interval_ms: u64,

    /// Minimum interval between collect commands.
    #[serde(default = "default_collect_interval_ms")]
    pub collect_interval_ms: u64,

    /// Back-off after a harvest success or cooldown message.
    #[serde(default = "default_harvest_backoff_ms")]
    pub harvest_backoff_ms: u64,

    /// Minimum interval between equip/unequip commands.
    #[serde(default = "default_equip_interval_ms")]
    pub equip_interval_ms: u64,

    /// Minimum interval between vendor UI clicks.
    #[serde(default = "default_ui_interaction_interval_ms")]
    pub ui_interaction_interval_ms: u64,

    /// Minimum interval between purchase commands.
    #[serde(default = "default_purchase_interval_ms")]
    pub purchase_interval_ms: u64,

    /// Time to wait for an upgrade result before retrying the scroll.
    #[serde(default = "default_upgrade_retry_ms")]
    pub upgrade_retry_ms: u64,

    /// Minimum interval between "missing Power Dice 8" complaints.
    #[serde(default = "default_missing_dice_complaint_ms")]
    pub missing_dice_complaint_ms: u64,

    /// Minimum interval between repeats of the same soft-fault warning.
    #[serde(default = "default_despam_interval_ms")]
    pub despam_interval_ms: u64,

    /// Name of the NPC that sells harvesting gloves.
    #[serde(default = "default_glove_vendor")]
    pub glove_vendor: String,

    /// Distance at which the vendor can be interacted with.
    #[serde(default = "default_vendor_reach_distance")]
    pub vendor_reach_distance: f32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            waypoint_reach_distance: default_waypoint_reach_distance(),
            harvest_reach_distance: default_harvest_reach_distance(),
            harvest_height_factor: default_harvest_height_factor(),
            navigation_tolerance: default_navigation_tolerance(),
            direct_navigation_tolerance: default_direct_navigation_tolerance(),
            pause_threshold_ms: default_pause_threshold_ms(),
            statistics_interval_ms: default_statistics_interval_ms(),
            collect_interval_ms: default_collect_interval_ms(),
            harvest_backoff_ms: default_harvest_backoff_ms(),
            equip_interval_ms: default_equip_interval_ms(),
            ui_interaction_interval_ms: default_ui_interaction_interval_ms(),
            purchase_interval_ms: default_purchase_interval_ms(),
            upgrade_retry_ms: default_upgrade_retry_ms(),
            missing_dice_complaint_ms: default_missing_dice_complaint_ms(),
            despam_interval_ms: default_despam_interval_ms(),
            glove_vendor: default_glove_vendor(),
            vendor_reach_distance: default_vendor_reach_distance(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_waypoint_reach_distance() -> f32 {
    10.0
}

const fn default_harvest_reach_distance() -> f32 {
    2.0
}

const fn default_harvest_height_factor() -> f32 {
    3.0
}

const fn default_navigation_tolerance() -> f32 {
    1.5
}

const fn default_direct_navigation_tolerance() -> f32 {
    0.5
}

const fn default_pause_threshold_ms() -> u64 {
    1000
}

const fn default_statistics_interval_ms() -> u64 {
    2000
}

const fn default_collect_interval_ms() -> u64 {
    800
}

const fn default_harvest_backoff_ms() -> u64 {
    1000
}

const fn default_equip_interval_ms() -> u64 {
    1500
}

const fn default_ui_interaction_interval_ms() -> u64 {
    800
}

const fn default_purchase_interval_ms() -> u64 {
    2000
}

const fn default_upgrade_retry_ms() -> u64 {
    10_000
}

const fn default_missing_dice_complaint_ms() -> u64 {
    5 * 60 * 1000
}

const fn default_despam_interval_ms() -> u64 {
    30_000
}

fn default_glove_vendor() -> String {
    "Pet Tamer".to_owned()
}

const fn default_vendor_reach_distance() -> f32 {
    2.0
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_tuned_values() {
        let config = FarmerConfig::default();
        assert_eq!(config.tuning.pause_threshold_ms, 1000);
        assert_eq!(config.tuning.statistics_interval_ms, 2000);
        assert_eq!(config.tuning.collect_interval_ms, 800);
        assert_eq!(config.tuning.equip_interval_ms, 1500);
        assert_eq!(config.tuning.glove_vendor, "Pet Tamer");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = "tuning:\n  waypoint_reach_distance: 6.5\n  glove_vendor: \"Glove Seller\"\n";
        let config = FarmerConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert!((config.tuning.waypoint_reach_distance - 6.5).abs() < f32::EPSILON);
        assert_eq!(config.tuning.glove_vendor, "Glove Seller");
        // Everything else uses defaults
        assert_eq!(config.tuning.upgrade_retry_ms, 10_000);
        assert!(!config.logging.json);
    }

    #[test]
    fn parse_logging_section() {
        let yaml = "logging:\n  level: debug\n  json: true\n";
        let config = FarmerConfig::parse(yaml).ok().unwrap_or_default();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = FarmerConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn parse_invalid_yaml_fails() {
        let config = FarmerConfig::parse("tuning: [not, a, map");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("berryfarmer.yaml");
        if path.exists() {
            let config = FarmerConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}

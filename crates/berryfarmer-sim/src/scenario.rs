//! Scenario files describing a simulated world.
//!
//! A scenario lists everything the simulated host needs to answer the
//! engine's queries: where the player starts and what it carries, which
//! bushes, vendors, and monsters exist, what the operator configured, and
//! how long the session runs. It is loaded from YAML with `serde_yml`;
//! every section except `options` may be omitted.

use std::path::Path;

use berryfarmer_core::options::{OptionKey, OptionValue};
use berryfarmer_types::{BerryType, InventoryItem, ItemId, MoverRank, PropId, WorldPosition};
use serde::Deserialize;

/// Scenario shipped with the binary, used when no file is given.
pub const BUILTIN_SCENARIO: &str = include_str!("../../../berryfarmer-scenario.yaml");

/// Errors that can occur when loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// Failed to read the scenario file from disk.
    #[error("failed to read scenario file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse scenario YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ScenarioError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// A complete simulated world.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    /// Seed for every random roll in the session.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Session length and pacing.
    #[serde(default)]
    pub session: SessionSpec,

    /// Player start state.
    #[serde(default)]
    pub player: PlayerSpec,

    /// Items owned at start.
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,

    /// Berry bushes.
    #[serde(default)]
    pub bushes: Vec<BushSpec>,

    /// Vendor NPCs.
    #[serde(default)]
    pub vendors: Vec<VendorSpec>,

    /// Monsters.
    #[serde(default)]
    pub monsters: Vec<MonsterSpec>,

    /// Operator options.
    pub options: OptionsSpec,

    /// Harvest and upgrade mechanics.
    #[serde(default)]
    pub mechanics: MechanicsSpec,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Io`] if the file cannot be read, or
    /// [`ScenarioError::Yaml`] if it is not a valid scenario.
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a scenario from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Yaml`] if the string is not a valid scenario.
    pub fn parse(yaml: &str) -> Result<Self, ScenarioError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// The scenario shipped with the binary.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Yaml`] if the bundled file is malformed.
    pub fn builtin() -> Result<Self, ScenarioError> {
        Self::parse(BUILTIN_SCENARIO)
    }
}

/// Session pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SessionSpec {
    /// Stop after this many ticks (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Simulated milliseconds between ticks.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Real milliseconds to sleep between ticks (0 = as fast as possible).
    #[serde(default)]
    pub real_interval_ms: u64,
}

impl Default for SessionSpec {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            tick_ms: default_tick_ms(),
            real_interval_ms: 0,
        }
    }
}

/// Player start state.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PlayerSpec {
    /// Start position; also where the player revives.
    #[serde(default)]
    pub position: WorldPosition,

    /// Walking speed in units per second.
    #[serde(default = "default_player_speed")]
    pub speed: f32,

    /// Hit points.
    #[serde(default = "default_player_health")]
    pub health: u32,
}

impl Default for PlayerSpec {
    fn default() -> Self {
        Self {
            position: WorldPosition::ZERO,
            speed: default_player_speed(),
            health: default_player_health(),
        }
    }
}

/// One berry bush.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BushSpec {
    /// Runtime id.
    pub id: u64,
    /// What grows on it.
    pub berry: BerryType,
    /// Where it stands.
    pub position: WorldPosition,
    /// Override the prop id (to model unknown bush kinds).
    #[serde(default)]
    pub prop: Option<PropId>,
}

/// One vendor NPC.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VendorSpec {
    /// Runtime id.
    pub id: u64,
    /// Name the engine looks it up by.
    pub name: String,
    /// Where it stands.
    pub position: WorldPosition,
    /// Items it sells.
    #[serde(default)]
    pub sells: Vec<ItemId>,
}

/// One monster.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MonsterSpec {
    /// Runtime id.
    pub id: u64,
    /// Game-data kind.
    pub prop: PropId,
    /// Where it stands.
    pub position: WorldPosition,
    /// Strength class.
    #[serde(default = "default_rank")]
    pub rank: MoverRank,
    /// Whether it attacks on sight.
    #[serde(default)]
    pub aggressive: bool,
    /// Hit points.
    #[serde(default = "default_monster_health")]
    pub health: u32,
    /// Damage dealt per simulated second while adjacent.
    #[serde(default)]
    pub damage_per_second: u32,
}

/// Operator options as configured in the host UI.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OptionsSpec {
    /// Berry types to collect.
    #[serde(default)]
    pub collect: Vec<BerryType>,
    /// Fight ordinary monsters.
    #[serde(default)]
    pub kill_normal_mobs: bool,
    /// Fight berry carriers.
    #[serde(default)]
    pub kill_berry_carriers: bool,
    /// Fight giant-class monsters.
    #[serde(default)]
    pub kill_giants: bool,
    /// Glove upgrade target as shown in the combo box.
    #[serde(default = "default_upgrade_gloves")]
    pub upgrade_gloves: String,
    /// Buy gloves when none are owned.
    #[serde(default)]
    pub purchase_gloves: bool,
    /// Route.
    #[serde(default)]
    pub waypoints: Vec<WorldPosition>,
}

impl OptionsSpec {
    /// Every option as the key-value pairs the host widgets would expose.
    pub fn to_values(&self) -> Vec<(OptionKey, OptionValue)> {
        let mut values: Vec<(OptionKey, OptionValue)> = BerryType::ALL
            .into_iter()
            .map(|berry| {
                (
                    OptionKey::Collect(berry),
                    OptionValue::Bool(self.collect.contains(&berry)),
                )
            })
            .collect();
        values.extend([
            (OptionKey::KillNormalMobs, OptionValue::Bool(self.kill_normal_mobs)),
            (OptionKey::KillBerryCarriers, OptionValue::Bool(self.kill_berry_carriers)),
            (OptionKey::KillGiants, OptionValue::Bool(self.kill_giants)),
            (OptionKey::UpgradeGloves, OptionValue::Text(self.upgrade_gloves.clone())),
            (OptionKey::PurchaseGloves, OptionValue::Bool(self.purchase_gloves)),
            (OptionKey::Waypoints, OptionValue::Positions(self.waypoints.clone())),
        ]);
        values
    }
}

/// Harvest and upgrade mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MechanicsSpec {
    /// How long one harvest takes.
    #[serde(default = "default_harvest_duration_ms")]
    pub harvest_duration_ms: u64,
    /// Berries received per harvest.
    #[serde(default = "default_harvest_yield")]
    pub harvest_yield: u32,
    /// How long a harvested bush stays empty.
    #[serde(default = "default_bush_respawn_ms")]
    pub bush_respawn_ms: u64,
    /// Distance from which a bush can be harvested.
    #[serde(default = "default_harvest_range")]
    pub harvest_range: f32,
    /// Chance that one Power Dice 8 raises the glove level.
    #[serde(default = "default_upgrade_success_chance")]
    pub upgrade_success_chance: f64,
    /// How far the player sees bushes and monsters.
    #[serde(default = "default_view_range")]
    pub view_range: f32,
    /// Player damage dealt per attack, as an inclusive range.
    #[serde(default = "default_player_damage")]
    pub player_damage: (u32, u32),
}

impl Default for MechanicsSpec {
    fn default() -> Self {
        Self {
            harvest_duration_ms: default_harvest_duration_ms(),
            harvest_yield: default_harvest_yield(),
            bush_respawn_ms: default_bush_respawn_ms(),
            harvest_range: default_harvest_range(),
            upgrade_success_chance: default_upgrade_success_chance(),
            view_range: default_view_range(),
            player_damage: default_player_damage(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_max_ticks() -> u64 {
    3_000
}

const fn default_tick_ms() -> u64 {
    100
}

const fn default_player_speed() -> f32 {
    5.0
}

const fn default_player_health() -> u32 {
    500
}

const fn default_rank() -> MoverRank {
    MoverRank::Normal
}

const fn default_monster_health() -> u32 {
    100
}

fn default_upgrade_gloves() -> String {
    String::from("Disabled")
}

const fn default_harvest_duration_ms() -> u64 {
    2_000
}

const fn default_harvest_yield() -> u32 {
    1
}

const fn default_bush_respawn_ms() -> u64 {
    30_000
}

const fn default_harvest_range() -> f32 {
    2.5
}

const fn default_upgrade_success_chance() -> f64 {
    0.5
}

const fn default_view_range() -> f32 {
    40.0
}

const fn default_player_damage() -> (u32, u32) {
    (20, 40)
}

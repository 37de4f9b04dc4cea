//! Operator options read fresh from the host every tick.
//!
//! The host exposes its configuration widgets (checkboxes, combo boxes, the
//! waypoint list) as a key-value surface. [`ConfigSnapshot::read`] pulls
//! every option once at the start of a tick and applies the documented
//! defaults, so handlers never see a half-read configuration.

use std::collections::{BTreeMap, BTreeSet};

use berryfarmer_types::{BerryType, WorldPosition};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::host::OptionSource;

/// Identifies one operator option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKey {
    /// Collect toggle for one berry type. Default `false`.
    Collect(BerryType),
    /// Fight ordinary aggressive monsters. Default `false`.
    KillNormalMobs,
    /// Fight the carriers that spawn from harvested bushes. Default `false`.
    KillBerryCarriers,
    /// Fight giants, violets, and bosses. Default `false`.
    KillGiants,
    /// Glove upgrade target (`Disabled`, `+1` .. `+5`). Default `Disabled`.
    UpgradeGloves,
    /// Buy gloves from the vendor when none are owned. Default `false`.
    PurchaseGloves,
    /// Route waypoints. Default empty.
    Waypoints,
}

impl OptionKey {
    /// Stable string form, matching the widget labels used by the host.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collect(BerryType::Cloudberry) => "collect.cloudberry",
            Self::Collect(BerryType::Lightberry) => "collect.lightberry",
            Self::Collect(BerryType::Exoberry) => "collect.exoberry",
            Self::KillNormalMobs => "combat.kill_normal_mobs",
            Self::KillBerryCarriers => "combat.kill_berry_carriers",
            Self::KillGiants => "combat.kill_giants",
            Self::UpgradeGloves => "extra.upgrade_gloves",
            Self::PurchaseGloves => "extra.purchase_gloves",
            Self::Waypoints => "path.waypoints",
        }
    }
}

/// Current value of a host widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Checkbox.
    Bool(bool),
    /// Combo box selection.
    Text(String),
    /// Repeating list of position pickers.
    Positions(Vec<WorldPosition>),
}

/// How far the agent should upgrade its harvesting gloves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum UpgradeTarget {
    /// Never upgrade.
    #[default]
    Disabled,
    /// Upgrade until the gloves reach this level (1 through 5).
    Level(u8),
}

/// Highest upgrade level selectable in the combo box.
pub const MAX_UPGRADE_LEVEL: u8 = 5;

impl UpgradeTarget {
    /// Parse a combo box selection (`Disabled`, `+1` .. `+5`).
    ///
    /// Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("disabled") {
            return Some(Self::Disabled);
        }
        let level: u8 = value.strip_prefix('+').unwrap_or(value).parse().ok()?;
        (1..=MAX_UPGRADE_LEVEL)
            .contains(&level)
            .then_some(Self::Level(level))
    }

    /// The desired level, or `None` when upgrading is disabled.
    pub const fn level(self) -> Option<u8> {
        match self {
            Self::Disabled => None,
            Self::Level(level) => Some(level),
        }
    }
}

/// Combat toggles handed to the host's combat routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatOptions {
    /// Fight ordinary aggressive monsters.
    pub kill_normal_mobs: bool,
    /// Fight berry carriers.
    pub kill_berry_carriers: bool,
    /// Fight giant-class monsters.
    pub kill_giants: bool,
}

/// Every operator option, as read at the start of one tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Which berry types to collect.
    pub collect: BTreeMap<BerryType, bool>,
    /// Combat toggles.
    pub combat: CombatOptions,
    /// Glove upgrade target.
    pub upgrade_gloves: UpgradeTarget,
    /// Whether gloves may be bought automatically.
    pub purchase_gloves: bool,
    /// Route waypoints, flattened to `y = 0`.
    pub waypoints: Vec<WorldPosition>,
    /// Options that were present but unusable, replaced by their default.
    pub faults: Vec<OptionFault>,
}

/// An option the host reported with a value that could not be used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionFault {
    /// Which option.
    pub key: OptionKey,
    /// What the host returned.
    pub value: OptionValue,
}

impl ConfigSnapshot {
    /// Read every option from the host, applying defaults for missing or
    /// mistyped values.
    pub fn read(source: &(impl OptionSource + ?Sized)) -> Self {
        let mut faults = Vec::new();

        let collect = BerryType::ALL
            .into_iter()
            .map(|berry| (berry, read_bool(source, OptionKey::Collect(berry), &mut faults)))
            .collect();

        let upgrade_gloves = match source.option(OptionKey::UpgradeGloves) {
            None => UpgradeTarget::Disabled,
            Some(OptionValue::Text(text)) => UpgradeTarget::parse(&text).unwrap_or_else(|| {
                faults.push(OptionFault {
                    key: OptionKey::UpgradeGloves,
                    value: OptionValue::Text(text),
                });
                UpgradeTarget::Disabled
            }),
            Some(other) => {
                faults.push(OptionFault {
                    key: OptionKey::UpgradeGloves,
                    value: other,
                });
                UpgradeTarget::Disabled
            }
        };

        let waypoints = match source.option(OptionKey::Waypoints) {
            None => Vec::new(),
            Some(OptionValue::Positions(positions)) => {
                positions.into_iter().map(WorldPosition::flattened).collect()
            }
            Some(other) => {
                faults.push(OptionFault {
                    key: OptionKey::Waypoints,
                    value: other,
                });
                Vec::new()
            }
        };

        let combat = CombatOptions {
            kill_normal_mobs: read_bool(source, OptionKey::KillNormalMobs, &mut faults),
            kill_berry_carriers: read_bool(source, OptionKey::KillBerryCarriers, &mut faults),
            kill_giants: read_bool(source, OptionKey::KillGiants, &mut faults),
        };
        let purchase_gloves = read_bool(source, OptionKey::PurchaseGloves, &mut faults);

        Self {
            collect,
            combat,
            upgrade_gloves,
            purchase_gloves,
            waypoints,
            faults,
        }
    }

    /// Whether the given berry type is enabled for collection.
    pub fn collects(&self, berry: BerryType) -> bool {
        self.collect.get(&berry).copied().unwrap_or(false)
    }

    /// Whether at least one berry type is enabled.
    pub fn collects_any(&self) -> bool {
        self.collect.values().any(|enabled| *enabled)
    }
}

/// Read a checkbox, defaulting to `false`.
fn read_bool(
    source: &(impl OptionSource + ?Sized),
    key: OptionKey,
    faults: &mut Vec<OptionFault>,
) -> bool {
    match source.option(key) {
        None => false,
        Some(OptionValue::Bool(value)) => value,
        Some(value) => {
            faults.push(OptionFault { key, value });
            false
        }
    }
}

/// Warns about each faulty option once, until it is fixed.
#[derive(Debug, Default)]
pub struct OptionFaultLog {
    reported: BTreeSet<OptionKey>,
}

impl OptionFaultLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Warn about faults not reported yet and forget keys that are valid
    /// again. Returns how many warnings were logged.
    pub fn report(&mut self, faults: &[OptionFault]) -> usize {
        self.reported.retain(|key| faults.iter().any(|f| f.key == *key));

        let mut logged = 0_usize;
        for fault in faults {
            if self.reported.insert(fault.key) {
                warn!(
                    key = fault.key.as_str(),
                    value = ?fault.value,
                    "Option value unusable, using default"
                );
                logged = logged.saturating_add(1);
            }
        }
        logged
    }
}

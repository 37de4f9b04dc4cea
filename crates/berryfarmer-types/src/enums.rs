//! Enumeration types and game constants for the berry farming agent.

use serde::{Deserialize, Serialize};

use crate::ids::{ItemId, PropId};

// ---------------------------------------------------------------------------
// Game constants
// ---------------------------------------------------------------------------

/// Item id of "Harvesting Gloves", the tool required to collect berries.
pub const ITEM_HARVESTING_GLOVES: ItemId = ItemId(4004);

/// Item id of "Power Dice 8", the scroll used to upgrade gloves.
pub const ITEM_POWER_DICE_8: ItemId = ItemId(3231);

/// Animation state the host reports while the player is harvesting.
pub const ANIMATION_HARVESTING: u32 = 68;

/// Prop ids of the monsters that can spawn after a bush is collected.
pub const BERRY_CARRIER_PROPS: [PropId; 5] = [
    PropId(1900),
    PropId(1901),
    PropId(1902),
    PropId(1903),
    PropId(1904),
];

// ---------------------------------------------------------------------------
// Berries
// ---------------------------------------------------------------------------

/// A kind of berry the agent can collect.
///
/// Each kind grows on its own bush prop and yields its own inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BerryType {
    /// Found around Flaris, Saint Morning, and the Garden of Rhisis.
    Cloudberry,
    /// Found in Darkon 1 and 2.
    Lightberry,
    /// Found in Darkon 3 and Azria.
    Exoberry,
}

impl BerryType {
    /// Every berry type, in display order.
    pub const ALL: [Self; 3] = [Self::Cloudberry, Self::Lightberry, Self::Exoberry];

    /// Inventory item produced by harvesting this berry.
    pub const fn item_id(self) -> ItemId {
        match self {
            Self::Cloudberry => ItemId(3400),
            Self::Lightberry => ItemId(3401),
            Self::Exoberry => ItemId(3402),
        }
    }

    /// Prop id of the bush this berry grows on.
    pub const fn bush_prop(self) -> PropId {
        match self {
            Self::Cloudberry => PropId(47),
            Self::Lightberry => PropId(48),
            Self::Exoberry => PropId(49),
        }
    }

    /// Classify a harvestable entity by its prop id.
    ///
    /// Returns `None` for props that are not berry bushes.
    pub const fn from_bush_prop(prop: PropId) -> Option<Self> {
        match prop.0 {
            47 => Some(Self::Cloudberry),
            48 => Some(Self::Lightberry),
            49 => Some(Self::Exoberry),
            _ => None,
        }
    }

    /// Human-readable name used in intents and log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cloudberry => "Cloudberry",
            Self::Lightberry => "Lightberry",
            Self::Exoberry => "Exoberry",
        }
    }
}

impl core::fmt::Display for BerryType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Equipment, movers, UI
// ---------------------------------------------------------------------------

/// Equipment slot an item can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    /// Main hand. Harvesting gloves are worn here.
    PrimaryWeapon,
    /// Off hand.
    SecondaryWeapon,
    /// Any other armor or accessory slot.
    Other,
}

/// Strength class of a mover, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoverRank {
    /// Ordinary monster.
    Normal,
    /// Stronger variant of an ordinary monster.
    Captain,
    /// Giant monster.
    Giant,
    /// Violet (elite giant) monster.
    Violet,
    /// Boss monster.
    Boss,
}

impl MoverRank {
    /// Whether this rank falls in the "giant" combat class.
    pub const fn is_giant_class(self) -> bool {
        matches!(self, Self::Giant | Self::Violet | Self::Boss)
    }
}

/// Game UI windows the agent inspects or manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameWindow {
    /// Context menu opened by clicking an NPC.
    PlayerMenu,
    /// Vendor shop window.
    NpcShop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bush_props_round_trip_through_classification() {
        for berry in BerryType::ALL {
            assert_eq!(BerryType::from_bush_prop(berry.bush_prop()), Some(berry));
        }
    }

    #[test]
    fn unknown_prop_is_not_a_berry() {
        assert_eq!(BerryType::from_bush_prop(PropId(46)), None);
        assert_eq!(BerryType::from_bush_prop(PropId(1900)), None);
    }

    #[test]
    fn berry_items_are_distinct() {
        assert_eq!(BerryType::Cloudberry.item_id(), ItemId(3400));
        assert_eq!(BerryType::Lightberry.item_id(), ItemId(3401));
        assert_eq!(BerryType::Exoberry.item_id(), ItemId(3402));
    }

    #[test]
    fn giant_class_ranks() {
        assert!(MoverRank::Giant.is_giant_class());
        assert!(MoverRank::Violet.is_giant_class());
        assert!(MoverRank::Boss.is_giant_class());
        assert!(!MoverRank::Captain.is_giant_class());
        assert!(!MoverRank::Normal.is_giant_class());
    }
}

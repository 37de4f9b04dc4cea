//! Core value structs exchanged between the engine and its host.
//!
//! Everything here is a per-tick snapshot owned by the host; the engine
//! reads, ranks, and compares these values but never mutates host state
//! through them.

use serde::{Deserialize, Serialize};

use crate::enums::{BERRY_CARRIER_PROPS, EquipSlot, MoverRank};
use crate::ids::{ItemId, MoverId, PropId};

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A point in the game world. `y` is the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPosition {
    /// East-west coordinate.
    pub x: f32,
    /// Height.
    pub y: f32,
    /// North-south coordinate.
    pub z: f32,
}

impl WorldPosition {
    /// The origin. Used as the "no navigation target" marker.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a position from its three coordinates.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in all three axes.
    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt()
    }

    /// Distance on the horizontal plane, ignoring height.
    pub fn horizontal_distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx.hypot(dz)
    }

    /// Absolute height difference.
    pub fn height_difference(self, other: Self) -> f32 {
        (self.y - other.y).abs()
    }

    /// The same position projected onto `y = 0`.
    pub const fn flattened(self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    /// Whether this is exactly the origin.
    pub fn is_zero(self) -> bool {
        self.x.abs() < f32::EPSILON && self.y.abs() < f32::EPSILON && self.z.abs() < f32::EPSILON
    }
}

impl core::fmt::Display for WorldPosition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// One stack (or single piece of equipment) the player owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Item kind.
    pub item_id: ItemId,
    /// Upgrade level (`+N`). Zero for items that cannot be upgraded.
    #[serde(default)]
    pub upgrade_level: u8,
    /// Host slot used when issuing use-item or use-scroll on this item.
    pub slot: u32,
    /// Equipment slot the item is worn in, if any.
    #[serde(default)]
    pub equipped: Option<EquipSlot>,
    /// Stack size.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// An item currently worn by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedItem {
    /// Item kind.
    pub item_id: ItemId,
    /// Upgrade level of the worn piece.
    pub upgrade_level: u8,
    /// Slot the piece occupies.
    pub slot: EquipSlot,
}

// ---------------------------------------------------------------------------
// World entities
// ---------------------------------------------------------------------------

/// A harvestable entity visible to the host (e.g. a berry bush).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Host handle used to issue the collect command.
    pub id: MoverId,
    /// Game-data kind of the entity.
    pub prop: PropId,
    /// Position in the world.
    pub world_pos: WorldPosition,
    /// Projected screen position; `z` is the camera depth.
    pub screen_pos: WorldPosition,
}

impl Material {
    /// Camera depth of the entity, used as a "closest" proxy.
    pub const fn screen_depth(&self) -> f32 {
        self.screen_pos.z
    }
}

/// A live NPC or monster near the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    /// Runtime handle.
    pub id: MoverId,
    /// Game-data kind.
    pub prop: PropId,
    /// Current position.
    pub position: WorldPosition,
    /// Strength class.
    pub rank: MoverRank,
    /// Whether the mover is a non-hostile NPC (vendor, quest giver).
    pub is_npc: bool,
    /// Whether the mover attacks on sight.
    pub is_aggressive: bool,
}

impl Mover {
    /// Whether this is one of the monsters that spawn from harvested bushes.
    pub fn is_berry_carrier(&self) -> bool {
        BERRY_CARRIER_PROPS.contains(&self.prop)
    }
}

/// Game-data record of a named NPC and where it normally stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcInstance {
    /// Display name (e.g. `Pet Tamer`).
    pub name: String,
    /// Spawn position.
    pub position: WorldPosition,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn distance_uses_all_axes() {
        let a = WorldPosition::new(0.0, 0.0, 0.0);
        let b = WorldPosition::new(2.0, 3.0, 6.0);
        assert!((a.distance(b) - 7.0).abs() < 1e-5);
    }

    #[test]
    fn horizontal_distance_ignores_height() {
        let a = WorldPosition::new(0.0, 100.0, 0.0);
        let b = WorldPosition::new(3.0, -50.0, 4.0);
        assert!((a.horizontal_distance(b) - 5.0).abs() < 1e-5);
        assert!((a.height_difference(b) - 150.0).abs() < 1e-5);
    }

    #[test]
    fn flattened_drops_height() {
        let p = WorldPosition::new(1.0, 9.0, 2.0).flattened();
        assert_eq!(p, WorldPosition::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn zero_detection() {
        assert!(WorldPosition::ZERO.is_zero());
        assert!(!WorldPosition::new(0.0, 0.0, 0.5).is_zero());
    }

    #[test]
    fn inventory_item_defaults_from_json() {
        let item: InventoryItem =
            serde_json::from_str(r#"{"item_id": 4004, "slot": 3}"#).unwrap();
        assert_eq!(item.item_id, ItemId(4004));
        assert_eq!(item.upgrade_level, 0);
        assert_eq!(item.quantity, 1);
        assert!(item.equipped.is_none());
    }

    #[test]
    fn carriers_are_recognized_by_prop() {
        let mut mover = Mover {
            id: MoverId(9),
            prop: PropId(1903),
            position: WorldPosition::ZERO,
            rank: MoverRank::Normal,
            is_npc: false,
            is_aggressive: true,
        };
        assert!(mover.is_berry_carrier());
        mover.prop = PropId(20);
        assert!(!mover.is_berry_carrier());
    }
}

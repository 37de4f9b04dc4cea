//! Shared type definitions for the berry farming agent.
//!
//! This crate is the single source of truth for the values exchanged between
//! the decision engine and the bot host: positions, items, world entities,
//! and the game constants the engine relies on.
//!
//! # Modules
//!
//! - [`ids`] -- Numeric newtype identifiers (items, props, movers)
//! - [`enums`] -- Berry types, equipment slots, mover ranks, UI windows, constants
//! - [`structs`] -- Positions, inventory items, materials, movers, NPC records

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ANIMATION_HARVESTING, BERRY_CARRIER_PROPS, BerryType, EquipSlot, GameWindow,
    ITEM_HARVESTING_GLOVES, ITEM_POWER_DICE_8, MoverRank,
};
pub use ids::{ItemId, MoverId, PropId};
pub use structs::{EquippedItem, InventoryItem, Material, Mover, NpcInstance, WorldPosition};

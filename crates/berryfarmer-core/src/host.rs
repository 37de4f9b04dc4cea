//! Capabilities the bot host provides to the engine.
//!
//! The engine never talks to the game directly. Everything it can observe
//! or do goes through the narrow traits below, which lets each component be
//! exercised in isolation (navigation only needs a [`Navigator`], the
//! statistics display only needs a [`StatisticsSink`]) and lets tests and
//! the simulator stand in for the real platform.
//!
//! All queries are synchronous snapshots valid for the current tick only.

use berryfarmer_types::{
    EquippedItem, GameWindow, InventoryItem, ItemId, Material, Mover, MoverId, NpcInstance,
    WorldPosition,
};

use crate::combat::{CombatDecision, CombatPolicy};
use crate::error::HostError;
use crate::navigation::AbortPredicate;
use crate::options::{OptionKey, OptionValue};
use crate::statistics::Badge;

/// Read-only view of the player and the world around them.
pub trait WorldView {
    /// Monotonic host clock in milliseconds.
    fn now_ms(&self) -> u64;

    /// Current player position.
    fn player_position(&self) -> WorldPosition;

    /// Current player animation state id.
    fn player_animation(&self) -> u32;

    /// Whether the player is dead.
    fn is_dead(&self) -> bool;

    /// Every item the player owns, worn pieces included.
    fn inventory(&self) -> Vec<InventoryItem>;

    /// Items currently worn.
    fn equipment(&self) -> Vec<EquippedItem>;

    /// Harvestable entities currently visible.
    fn nearby_materials(&self) -> Vec<Material>;

    /// NPCs and monsters currently visible.
    fn movers_around(&self) -> Vec<Mover>;

    /// Look up a named NPC in the game data.
    fn find_npc(&self, name: &str) -> Option<NpcInstance>;

    /// Whether a UI window is open.
    fn is_window_open(&self, window: GameWindow) -> bool;
}

/// Movement surface.
pub trait Navigator {
    /// Whether a navigation is currently in flight.
    fn is_navigating(&self) -> bool;

    /// Start navigating to `target`.
    ///
    /// The host keeps `abort` and re-evaluates it while moving; once it
    /// returns `true` the host cancels the navigation.
    fn navigate_to(
        &mut self,
        target: WorldPosition,
        skip_pathfind: bool,
        abort: AbortPredicate,
    ) -> Result<(), HostError>;
}

/// Side-effecting commands other than movement.
pub trait HostActions {
    /// Use (equip, unequip, consume) the item in `slot`.
    fn use_item(&mut self, slot: u32, target: u32) -> Result<(), HostError>;

    /// Apply the scroll in `scroll_slot` to the item in `target_slot`.
    fn use_scroll(&mut self, target_slot: u32, scroll_slot: u32) -> Result<(), HostError>;

    /// Buy `quantity` of `item_id` from the vendor mover.
    fn buy_item(&mut self, vendor: MoverId, item_id: ItemId, quantity: u32)
    -> Result<(), HostError>;

    /// Click a mover (opens the NPC context menu).
    fn click_mover(&mut self, mover: MoverId) -> Result<(), HostError>;

    /// Click the 1-based option of the open player menu.
    fn click_menu_option(&mut self, option: u32) -> Result<(), HostError>;

    /// Close a window. Returns `true` if a window was actually closed.
    fn close_window(&mut self, window: GameWindow) -> Result<bool, HostError>;

    /// Start harvesting a material.
    fn collect_material(&mut self, material: &Material) -> Result<(), HostError>;

    /// Run the host's death routine (revive, return to town).
    fn handle_death(&mut self) -> Result<(), HostError>;

    /// Publish the agent's current intent to the operator UI.
    fn set_intent(&mut self, intent: &str);
}

/// The host's combat routine, steered by the engine's target policy.
pub trait CombatRoutine {
    /// Evaluate nearby threats and fight if the policy asks for it.
    fn handle_combat(&mut self, policy: CombatPolicy) -> Result<CombatDecision, HostError>;
}

/// Operator configuration widgets.
pub trait OptionSource {
    /// Current value of an option, or `None` if unset.
    fn option(&self, key: OptionKey) -> Option<OptionValue>;
}

/// Statistics badges shown to the operator.
pub trait StatisticsSink {
    /// Replace the text of a badge.
    fn set_badge(&mut self, badge: Badge, value: String);
}

/// Everything the tick arbiter needs from its host.
pub trait FarmerHost:
    WorldView + Navigator + HostActions + CombatRoutine + OptionSource + StatisticsSink
{
}

impl<T> FarmerHost for T where
    T: WorldView + Navigator + HostActions + CombatRoutine + OptionSource + StatisticsSink
{
}

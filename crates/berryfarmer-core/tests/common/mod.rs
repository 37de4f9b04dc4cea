//! Recording host shared by the integration tests.
//!
//! [`MockHost`] serves whatever world state the test put into it and logs
//! every command the engine issues, so tests can assert on exactly what was
//! asked of the host in each tick.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use berryfarmer_core::combat::{CombatDecision, CombatPolicy};
use berryfarmer_core::error::HostError;
use berryfarmer_core::host::{
    CombatRoutine, HostActions, Navigator, OptionSource, StatisticsSink, WorldView,
};
use berryfarmer_core::navigation::AbortPredicate;
use berryfarmer_core::options::{OptionKey, OptionValue};
use berryfarmer_core::statistics::Badge;
use berryfarmer_types::{
    BerryType, EquipSlot, EquippedItem, GameWindow, ITEM_HARVESTING_GLOVES, InventoryItem, ItemId,
    Material, Mover, MoverId, MoverRank, NpcInstance, WorldPosition,
};

/// A command the engine issued.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `navigate_to`.
    Navigate {
        /// Destination.
        target: WorldPosition,
        /// Straight-line movement requested.
        skip_pathfind: bool,
    },
    /// `use_item`.
    UseItem {
        /// Inventory slot.
        slot: u32,
    },
    /// `use_scroll`.
    UseScroll {
        /// Slot of the item being upgraded.
        target_slot: u32,
        /// Slot of the scroll.
        scroll_slot: u32,
    },
    /// `buy_item`.
    BuyItem {
        /// Vendor mover.
        vendor: MoverId,
        /// Item bought.
        item_id: ItemId,
    },
    /// `click_mover`.
    ClickMover(MoverId),
    /// `click_menu_option`.
    ClickMenuOption(u32),
    /// `close_window` that closed something.
    CloseWindow(GameWindow),
    /// `collect_material`.
    Collect(MoverId),
    /// `handle_death`.
    HandleDeath,
}

/// In-memory host with recorded commands.
#[derive(Debug, Default)]
pub struct MockHost {
    /// Host clock.
    pub now_ms: u64,
    /// Player position.
    pub position: WorldPosition,
    /// Player animation id.
    pub animation: u32,
    /// Whether the player is dead.
    pub dead: bool,
    /// Owned items, worn ones included.
    pub inventory: Vec<InventoryItem>,
    /// Worn items.
    pub equipment: Vec<EquippedItem>,
    /// Visible materials.
    pub materials: Vec<Material>,
    /// Visible movers.
    pub movers: Vec<Mover>,
    /// Game-data NPC records.
    pub npcs: Vec<NpcInstance>,
    /// Open windows.
    pub open_windows: Vec<GameWindow>,
    /// Whether a navigation is in flight.
    pub navigating: bool,
    /// What the combat routine reports.
    pub combat: Option<CombatDecision>,
    /// Policies the combat routine was given.
    pub combat_policies: Vec<CombatPolicy>,
    /// Operator options.
    pub options: HashMap<OptionKey, OptionValue>,
    /// Commands issued, in order.
    pub commands: Vec<Command>,
    /// Current badge texts.
    pub badges: BTreeMap<Badge, String>,
    /// Intents published, in order.
    pub intents: Vec<String>,
    /// Abort predicate of the latest navigation.
    pub last_abort: Option<AbortPredicate>,
    /// Make every `navigate_to` fail.
    pub fail_navigation: bool,
}

impl MockHost {
    /// A valid farming setup: Cloudberry enabled, a two-point route, the
    /// player at the origin wearing +0 gloves.
    pub fn farming() -> Self {
        let mut host = Self::default();
        host.set_option(OptionKey::Collect(BerryType::Cloudberry), OptionValue::Bool(true));
        host.set_waypoints(&[WorldPosition::ZERO, WorldPosition::new(20.0, 0.0, 0.0)]);
        host.give_gloves(0, 0, true);
        host
    }

    /// Set an operator option.
    pub fn set_option(&mut self, key: OptionKey, value: OptionValue) {
        self.options.insert(key, value);
    }

    /// Replace the route.
    pub fn set_waypoints(&mut self, waypoints: &[WorldPosition]) {
        self.set_option(OptionKey::Waypoints, OptionValue::Positions(waypoints.to_vec()));
    }

    /// Add a pair of gloves in `slot`, optionally worn.
    pub fn give_gloves(&mut self, slot: u32, level: u8, worn: bool) {
        self.inventory.push(InventoryItem {
            item_id: ITEM_HARVESTING_GLOVES,
            upgrade_level: level,
            slot,
            equipped: worn.then_some(EquipSlot::PrimaryWeapon),
            quantity: 1,
        });
        if worn {
            self.equipment.push(EquippedItem {
                item_id: ITEM_HARVESTING_GLOVES,
                upgrade_level: level,
                slot: EquipSlot::PrimaryWeapon,
            });
        }
    }

    /// Add a stack of items.
    pub fn give_item(&mut self, item_id: ItemId, slot: u32, quantity: u32) {
        self.inventory.push(InventoryItem {
            item_id,
            upgrade_level: 0,
            slot,
            equipped: None,
            quantity,
        });
    }

    /// Remove every pair of gloves.
    pub fn take_gloves(&mut self) {
        self.inventory.retain(|item| item.item_id != ITEM_HARVESTING_GLOVES);
        self.equipment.clear();
    }

    /// Add a visible bush of `berry` at `position` with the given screen
    /// depth.
    pub fn add_bush(&mut self, id: u64, berry: BerryType, position: WorldPosition, depth: f32) {
        self.materials.push(Material {
            id: MoverId(id),
            prop: berry.bush_prop(),
            world_pos: position,
            screen_pos: WorldPosition::new(0.0, 0.0, depth),
        });
    }

    /// Add the glove vendor both to game data and as a visible mover.
    pub fn add_vendor(&mut self, name: &str, id: u64, position: WorldPosition) {
        self.npcs.push(NpcInstance {
            name: name.to_owned(),
            position,
        });
        self.movers.push(Mover {
            id: MoverId(id),
            prop: berryfarmer_types::PropId(1),
            position,
            rank: MoverRank::Normal,
            is_npc: true,
            is_aggressive: false,
        });
    }

    /// Commands issued so far, then forget them.
    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Navigation commands issued so far.
    pub fn navigations(&self) -> Vec<WorldPosition> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::Navigate { target, .. } => Some(*target),
                _ => None,
            })
            .collect()
    }

    /// Advance the host clock.
    pub fn advance(&mut self, ms: u64) {
        self.now_ms = self.now_ms.saturating_add(ms);
    }
}

impl WorldView for MockHost {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn player_position(&self) -> WorldPosition {
        self.position
    }

    fn player_animation(&self) -> u32 {
        self.animation
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn inventory(&self) -> Vec<InventoryItem> {
        self.inventory.clone()
    }

    fn equipment(&self) -> Vec<EquippedItem> {
        self.equipment.clone()
    }

    fn nearby_materials(&self) -> Vec<Material> {
        self.materials.clone()
    }

    fn movers_around(&self) -> Vec<Mover> {
        self.movers.clone()
    }

    fn find_npc(&self, name: &str) -> Option<NpcInstance> {
        self.npcs.iter().find(|npc| npc.name == name).cloned()
    }

    fn is_window_open(&self, window: GameWindow) -> bool {
        self.open_windows.contains(&window)
    }
}

impl Navigator for MockHost {
    fn is_navigating(&self) -> bool {
        self.navigating
    }

    fn navigate_to(
        &mut self,
        target: WorldPosition,
        skip_pathfind: bool,
        abort: AbortPredicate,
    ) -> Result<(), HostError> {
        if self.fail_navigation {
            return Err(HostError::new("navigate_to", "no path"));
        }
        self.commands.push(Command::Navigate {
            target,
            skip_pathfind,
        });
        self.navigating = true;
        self.last_abort = Some(abort);
        Ok(())
    }
}

impl HostActions for MockHost {
    fn use_item(&mut self, slot: u32, _target: u32) -> Result<(), HostError> {
        self.commands.push(Command::UseItem { slot });
        Ok(())
    }

    fn use_scroll(&mut self, target_slot: u32, scroll_slot: u32) -> Result<(), HostError> {
        self.commands.push(Command::UseScroll {
            target_slot,
            scroll_slot,
        });
        Ok(())
    }

    fn buy_item(&mut self, vendor: MoverId, item_id: ItemId, _quantity: u32) -> Result<(), HostError> {
        self.commands.push(Command::BuyItem { vendor, item_id });
        Ok(())
    }

    fn click_mover(&mut self, mover: MoverId) -> Result<(), HostError> {
        self.commands.push(Command::ClickMover(mover));
        Ok(())
    }

    fn click_menu_option(&mut self, option: u32) -> Result<(), HostError> {
        self.commands.push(Command::ClickMenuOption(option));
        Ok(())
    }

    fn close_window(&mut self, window: GameWindow) -> Result<bool, HostError> {
        let was_open = self.open_windows.contains(&window);
        if was_open {
            self.open_windows.retain(|open| *open != window);
            self.commands.push(Command::CloseWindow(window));
        }
        Ok(was_open)
    }

    fn collect_material(&mut self, material: &Material) -> Result<(), HostError> {
        self.commands.push(Command::Collect(material.id));
        Ok(())
    }

    fn handle_death(&mut self) -> Result<(), HostError> {
        self.commands.push(Command::HandleDeath);
        Ok(())
    }

    fn set_intent(&mut self, intent: &str) {
        self.intents.push(intent.to_owned());
    }
}

impl CombatRoutine for MockHost {
    fn handle_combat(&mut self, policy: CombatPolicy) -> Result<CombatDecision, HostError> {
        self.combat_policies.push(policy);
        Ok(self.combat.unwrap_or(CombatDecision::Idle))
    }
}

impl OptionSource for MockHost {
    fn option(&self, key: OptionKey) -> Option<OptionValue> {
        self.options.get(&key).cloned()
    }
}

impl StatisticsSink for MockHost {
    fn set_badge(&mut self, badge: Badge, value: String) {
        self.badges.insert(badge, value);
    }
}

//! In-memory host that stands in for the bot platform.
//!
//! [`SimulatedHost`] implements every host trait over a small world built
//! from a [`Scenario`]. Time only moves when [`SimulatedHost::advance`] is
//! called: the player walks toward the navigation target (dropping it as
//! soon as the abort predicate fires), harvests finish, bushes respawn,
//! and adjacent aggressive monsters hit the player. System messages
//! produced along the way are returned to the caller, which forwards them
//! to the arbiter between ticks, the same way the real host does.

use std::collections::{BTreeMap, HashMap};

use berryfarmer_core::combat::{CombatDecision, CombatPolicy, Engagement};
use berryfarmer_core::error::HostError;
use berryfarmer_core::host::{
    CombatRoutine, HostActions, Navigator, OptionSource, StatisticsSink, WorldView,
};
use berryfarmer_core::messages::SystemMessage;
use berryfarmer_core::navigation::AbortPredicate;
use berryfarmer_core::options::{OptionKey, OptionValue};
use berryfarmer_core::statistics::Badge;
use berryfarmer_types::{
    ANIMATION_HARVESTING, BerryType, EquipSlot, EquippedItem, GameWindow, ITEM_HARVESTING_GLOVES,
    ITEM_POWER_DICE_8, InventoryItem, ItemId, Material, Mover, MoverId, MoverRank, NpcInstance,
    PropId, WorldPosition,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::scenario::{MechanicsSpec, Scenario, VendorSpec};

/// Distance from which NPCs can be clicked and monsters attacked.
const INTERACTION_RANGE: f32 = 3.0;

/// Distance at which an aggressive monster hits the player.
const MELEE_RANGE: f32 = 2.0;

/// Player-menu option that opens the shop.
const MENU_OPTION_TRADE: u32 = 1;

/// Idle animation id.
const ANIMATION_IDLE: u32 = 0;

/// Running totals of what happened in the simulated world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimCounters {
    /// Navigation commands accepted.
    pub navigations: u32,
    /// Navigations dropped because the abort predicate fired.
    pub aborted_navigations: u32,
    /// Harvests completed.
    pub harvests: u32,
    /// Harvest attempts on an empty bush.
    pub harvest_cooldowns: u32,
    /// Items bought.
    pub purchases: u32,
    /// Upgrade scrolls used.
    pub upgrade_attempts: u32,
    /// Upgrade scrolls that raised the level.
    pub upgrade_successes: u32,
    /// Monsters killed.
    pub kills: u32,
    /// Times the player died.
    pub deaths: u32,
}

#[derive(Debug, Clone, Copy)]
struct SimBush {
    material: Material,
    berry: BerryType,
    ready_at: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct SimMonster {
    mover: Mover,
    health: u32,
    damage_per_second: u32,
}

#[derive(Debug, Clone)]
struct ActiveNavigation {
    target: WorldPosition,
    abort: AbortPredicate,
}

#[derive(Debug, Clone, Copy)]
struct PendingHarvest {
    bush: MoverId,
    item_id: ItemId,
    done_at: u64,
}

/// A simulated player in a simulated world.
#[derive(Debug)]
pub struct SimulatedHost {
    rng: StdRng,
    mechanics: MechanicsSpec,
    now_ms: u64,
    spawn: WorldPosition,
    position: WorldPosition,
    speed: f32,
    max_health: u32,
    health: u32,
    dead: bool,
    animation: u32,
    inventory: Vec<InventoryItem>,
    bushes: Vec<SimBush>,
    vendors: Vec<VendorSpec>,
    monsters: Vec<SimMonster>,
    windows: Vec<GameWindow>,
    navigation: Option<ActiveNavigation>,
    harvest: Option<PendingHarvest>,
    outbox: Vec<String>,
    options: HashMap<OptionKey, OptionValue>,
    badges: BTreeMap<Badge, String>,
    intent: String,
    counters: SimCounters,
}

impl SimulatedHost {
    /// Build the world described by `scenario`.
    pub fn new(scenario: &Scenario) -> Self {
        let bushes = scenario
            .bushes
            .iter()
            .map(|spec| SimBush {
                material: Material {
                    id: MoverId(spec.id),
                    prop: spec.prop.unwrap_or_else(|| spec.berry.bush_prop()),
                    world_pos: spec.position,
                    screen_pos: WorldPosition::ZERO,
                },
                berry: spec.berry,
                ready_at: None,
            })
            .collect();

        let monsters = scenario
            .monsters
            .iter()
            .map(|spec| SimMonster {
                mover: Mover {
                    id: MoverId(spec.id),
                    prop: spec.prop,
                    position: spec.position,
                    rank: spec.rank,
                    is_npc: false,
                    is_aggressive: spec.aggressive,
                },
                health: spec.health,
                damage_per_second: spec.damage_per_second,
            })
            .collect();

        Self {
            rng: StdRng::seed_from_u64(scenario.seed),
            mechanics: scenario.mechanics,
            now_ms: 0,
            spawn: scenario.player.position,
            position: scenario.player.position,
            speed: scenario.player.speed,
            max_health: scenario.player.health,
            health: scenario.player.health,
            dead: false,
            animation: ANIMATION_IDLE,
            inventory: scenario.inventory.clone(),
            bushes,
            vendors: scenario.vendors.clone(),
            monsters,
            windows: Vec::new(),
            navigation: None,
            harvest: None,
            outbox: Vec::new(),
            options: scenario.options.to_values().into_iter().collect(),
            badges: BTreeMap::new(),
            intent: String::new(),
            counters: SimCounters::default(),
        }
    }

    /// Let `dt_ms` of simulated time pass. Returns the system message ids
    /// the game emitted, oldest first.
    pub fn advance(&mut self, dt_ms: u64) -> Vec<String> {
        self.now_ms = self.now_ms.saturating_add(dt_ms);

        if !self.dead {
            self.move_player(dt_ms);
            self.finish_harvest();
            self.apply_monster_damage(dt_ms);
        }
        self.respawn_bushes();

        std::mem::take(&mut self.outbox)
    }

    /// Change an operator option mid-session.
    pub fn set_option(&mut self, key: OptionKey, value: OptionValue) {
        self.options.insert(key, value);
    }

    /// What happened so far.
    pub const fn counters(&self) -> SimCounters {
        self.counters
    }

    /// Current badge texts.
    pub const fn badges(&self) -> &BTreeMap<Badge, String> {
        &self.badges
    }

    /// Latest intent published by the agent.
    pub fn intent(&self) -> &str {
        &self.intent
    }

    /// Berries of `berry` currently held.
    pub fn berry_count(&self, berry: BerryType) -> u32 {
        self.item_count(berry.item_id())
    }

    /// Total quantity of `item_id` held.
    pub fn item_count(&self, item_id: ItemId) -> u32 {
        self.inventory
            .iter()
            .filter(|item| item.item_id == item_id)
            .fold(0_u32, |sum, item| sum.saturating_add(item.quantity))
    }

    /// The glove pair currently worn, if any.
    pub fn worn_gloves(&self) -> Option<InventoryItem> {
        self.inventory
            .iter()
            .find(|item| {
                item.item_id == ITEM_HARVESTING_GLOVES
                    && item.equipped == Some(EquipSlot::PrimaryWeapon)
            })
            .copied()
    }

    /// Current hit points.
    pub const fn health(&self) -> u32 {
        self.health
    }

    fn move_player(&mut self, dt_ms: u64) {
        let Some(navigation) = self.navigation.as_ref() else {
            return;
        };

        if navigation.abort.should_abort() {
            debug!(target = %navigation.target, "Navigation aborted by agent");
            self.navigation = None;
            self.counters.aborted_navigations = self.counters.aborted_navigations.saturating_add(1);
            return;
        }

        let target = navigation.target;
        let step = self.speed * ms_as_secs(dt_ms);
        let remaining = self.position.distance(target);

        if remaining <= step {
            self.position = target;
            self.navigation = None;
        } else {
            let ratio = step / remaining;
            self.position = WorldPosition::new(
                (target.x - self.position.x).mul_add(ratio, self.position.x),
                (target.y - self.position.y).mul_add(ratio, self.position.y),
                (target.z - self.position.z).mul_add(ratio, self.position.z),
            );
        }

        if self.harvest.take().is_some() {
            self.animation = ANIMATION_IDLE;
        }
    }

    fn finish_harvest(&mut self) {
        let Some(pending) = self.harvest else {
            return;
        };
        if self.now_ms < pending.done_at {
            return;
        }

        self.harvest = None;
        self.animation = ANIMATION_IDLE;
        self.add_item(pending.item_id, self.mechanics.harvest_yield);

        let respawn_at = self.now_ms.saturating_add(self.mechanics.bush_respawn_ms);
        if let Some(bush) = self.bushes.iter_mut().find(|b| b.material.id == pending.bush) {
            bush.ready_at = Some(respawn_at);
        }

        self.counters.harvests = self.counters.harvests.saturating_add(1);
        self.emit(SystemMessage::HarvestReceived);
    }

    fn respawn_bushes(&mut self) {
        let now = self.now_ms;
        for bush in &mut self.bushes {
            if bush.ready_at.is_some_and(|at| at <= now) {
                bush.ready_at = None;
            }
        }
    }

    fn apply_monster_damage(&mut self, dt_ms: u64) {
        let position = self.position;
        let damage = self
            .monsters
            .iter()
            .filter(|m| m.mover.is_aggressive && m.mover.position.distance(position) <= MELEE_RANGE)
            .map(|m| u64::from(m.damage_per_second).saturating_mul(dt_ms) / 1000)
            .fold(0_u64, u64::saturating_add);

        let damage = u32::try_from(damage).unwrap_or(u32::MAX);
        self.health = self.health.saturating_sub(damage);

        if self.health == 0 {
            info!(position = %self.position, "Player died");
            self.dead = true;
            self.navigation = None;
            self.harvest = None;
            self.animation = ANIMATION_IDLE;
            self.windows.clear();
            self.counters.deaths = self.counters.deaths.saturating_add(1);
        }
    }

    fn emit(&mut self, message: SystemMessage) {
        if let Some(id) = message.id() {
            self.outbox.push(id.to_owned());
        }
    }

    fn add_item(&mut self, item_id: ItemId, quantity: u32) {
        let stackable = item_id != ITEM_HARVESTING_GLOVES;
        if stackable {
            if let Some(stack) = self.inventory.iter_mut().find(|i| i.item_id == item_id) {
                stack.quantity = stack.quantity.saturating_add(quantity);
                return;
            }
            let slot = self.free_slot();
            self.inventory.push(new_item(item_id, slot, quantity));
            return;
        }

        for _ in 0..quantity {
            let slot = self.free_slot();
            self.inventory.push(new_item(item_id, slot, 1));
        }
    }

    fn free_slot(&self) -> u32 {
        self.inventory
            .iter()
            .map(|item| item.slot.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    fn vendor(&self, id: MoverId) -> Option<&VendorSpec> {
        self.vendors.iter().find(|v| MoverId(v.id) == id)
    }

    fn flee_point(&self, threat: WorldPosition, distance: f32) -> WorldPosition {
        let dx = self.position.x - threat.x;
        let dz = self.position.z - threat.z;
        let length = dx.hypot(dz);
        let (ux, uz) = if length > f32::EPSILON {
            (dx / length, dz / length)
        } else {
            (1.0, 0.0)
        };
        WorldPosition::new(
            ux.mul_add(distance, threat.x),
            self.position.y,
            uz.mul_add(distance, threat.z),
        )
    }

    fn roll_damage(&mut self) -> u32 {
        let (a, b) = self.mechanics.player_damage;
        self.rng.random_range(a.min(b)..=a.max(b))
    }
}

impl WorldView for SimulatedHost {
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
        self.inventory
            .iter()
            .filter_map(|item| {
                item.equipped.map(|slot| EquippedItem {
                    item_id: item.item_id,
                    upgrade_level: item.upgrade_level,
                    slot,
                })
            })
            .collect()
    }

    fn nearby_materials(&self) -> Vec<Material> {
        // Screen depth is approximated by distance from the player.
        self.bushes
            .iter()
            .filter(|bush| bush.ready_at.is_none())
            .filter_map(|bush| {
                let depth = bush.material.world_pos.distance(self.position);
                (depth <= self.mechanics.view_range).then_some(Material {
                    screen_pos: WorldPosition::new(0.0, 0.0, depth),
                    ..bush.material
                })
            })
            .collect()
    }

    fn movers_around(&self) -> Vec<Mover> {
        let vendors = self.vendors.iter().map(|vendor| Mover {
            id: MoverId(vendor.id),
            prop: PropId(0),
            position: vendor.position,
            rank: MoverRank::Normal,
            is_npc: true,
            is_aggressive: false,
        });
        let monsters = self.monsters.iter().map(|m| m.mover);

        vendors
            .chain(monsters)
            .filter(|mover| mover.position.distance(self.position) <= self.mechanics.view_range)
            .collect()
    }

    fn find_npc(&self, name: &str) -> Option<NpcInstance> {
        self.vendors
            .iter()
            .find(|vendor| vendor.name == name)
            .map(|vendor| NpcInstance {
                name: vendor.name.clone(),
                position: vendor.position,
            })
    }

    fn is_window_open(&self, window: GameWindow) -> bool {
        self.windows.contains(&window)
    }
}

impl Navigator for SimulatedHost {
    fn is_navigating(&self) -> bool {
        self.navigation.is_some()
    }

    fn navigate_to(
        &mut self,
        target: WorldPosition,
        _skip_pathfind: bool,
        abort: AbortPredicate,
    ) -> Result<(), HostError> {
        if self.dead {
            return Err(HostError::new("navigate_to", "player is dead"));
        }
        self.navigation = Some(ActiveNavigation { target, abort });
        self.counters.navigations = self.counters.navigations.saturating_add(1);
        Ok(())
    }
}

impl HostActions for SimulatedHost {
    fn use_item(&mut self, slot: u32, _target: u32) -> Result<(), HostError> {
        let Some(index) = self.inventory.iter().position(|item| item.slot == slot) else {
            return Err(HostError::new("use_item", format!("no item in slot {slot}")));
        };

        let wearing = self
            .inventory
            .get(index)
            .is_some_and(|item| item.equipped.is_some());

        if !wearing {
            for item in &mut self.inventory {
                if item.equipped == Some(EquipSlot::PrimaryWeapon) {
                    item.equipped = None;
                }
            }
        }
        if let Some(item) = self.inventory.get_mut(index) {
            item.equipped = if wearing {
                None
            } else {
                Some(EquipSlot::PrimaryWeapon)
            };
            debug!(slot, item = %item.item_id, worn = !wearing, "Item used");
        }
        Ok(())
    }

    fn use_scroll(&mut self, target_slot: u32, scroll_slot: u32) -> Result<(), HostError> {
        let Some(scroll_index) = self
            .inventory
            .iter()
            .position(|i| i.slot == scroll_slot && i.item_id == ITEM_POWER_DICE_8 && i.quantity > 0)
        else {
            return Err(HostError::new("use_scroll", format!("no Power Dice 8 in slot {scroll_slot}")));
        };
        let Some(target_index) = self.inventory.iter().position(|i| i.slot == target_slot) else {
            return Err(HostError::new("use_scroll", format!("no item in slot {target_slot}")));
        };
        if self
            .inventory
            .get(target_index)
            .is_some_and(|i| i.equipped.is_some())
        {
            return Err(HostError::new("use_scroll", "cannot upgrade a worn item"));
        }

        if let Some(scroll) = self.inventory.get_mut(scroll_index) {
            scroll.quantity = scroll.quantity.saturating_sub(1);
        }
        self.counters.upgrade_attempts = self.counters.upgrade_attempts.saturating_add(1);

        let chance = self.mechanics.upgrade_success_chance.clamp(0.0, 1.0);
        let succeeded = self.rng.random_bool(chance);
        if succeeded {
            if let Some(target) = self.inventory.get_mut(target_index) {
                target.upgrade_level = target.upgrade_level.saturating_add(1);
                info!(slot = target_slot, level = target.upgrade_level, "Upgrade succeeded");
            }
            self.counters.upgrade_successes = self.counters.upgrade_successes.saturating_add(1);
            self.emit(SystemMessage::UpgradeSucceeded);
        } else {
            self.emit(SystemMessage::UpgradeFailed);
        }

        self.inventory.retain(|i| i.quantity > 0);
        Ok(())
    }

    fn buy_item(&mut self, vendor: MoverId, item_id: ItemId, quantity: u32) -> Result<(), HostError> {
        if !self.windows.contains(&GameWindow::NpcShop) {
            return Err(HostError::new("buy_item", "shop window is not open"));
        }
        let sells = self
            .vendor(vendor)
            .is_some_and(|spec| spec.sells.contains(&item_id));
        if !sells {
            return Err(HostError::new("buy_item", format!("vendor {vendor} does not sell item {item_id}")));
        }

        self.add_item(item_id, quantity);
        self.counters.purchases = self.counters.purchases.saturating_add(quantity);
        info!(%vendor, item = %item_id, quantity, "Item purchased");
        Ok(())
    }

    fn click_mover(&mut self, mover: MoverId) -> Result<(), HostError> {
        let Some(position) = self.vendor(mover).map(|v| v.position) else {
            return Err(HostError::new("click_mover", format!("mover {mover} has no menu")));
        };
        if position.distance(self.position) > INTERACTION_RANGE {
            return Err(HostError::new("click_mover", format!("mover {mover} is out of range")));
        }
        if !self.windows.contains(&GameWindow::PlayerMenu) {
            self.windows.push(GameWindow::PlayerMenu);
        }
        Ok(())
    }

    fn click_menu_option(&mut self, option: u32) -> Result<(), HostError> {
        if !self.windows.contains(&GameWindow::PlayerMenu) {
            return Err(HostError::new("click_menu_option", "player menu is not open"));
        }
        self.windows.retain(|w| *w != GameWindow::PlayerMenu);
        if option == MENU_OPTION_TRADE && !self.windows.contains(&GameWindow::NpcShop) {
            self.windows.push(GameWindow::NpcShop);
        }
        Ok(())
    }

    fn close_window(&mut self, window: GameWindow) -> Result<bool, HostError> {
        let was_open = self.windows.contains(&window);
        self.windows.retain(|w| *w != window);
        Ok(was_open)
    }

    fn collect_material(&mut self, material: &Material) -> Result<(), HostError> {
        if self.worn_gloves().is_none() {
            return Err(HostError::new("collect_material", "harvesting gloves are not equipped"));
        }
        if self.harvest.is_some() {
            return Ok(());
        }
        let Some(bush) = self.bushes.iter().find(|b| b.material.id == material.id).copied() else {
            return Err(HostError::new("collect_material", format!("unknown material {}", material.id)));
        };
        if bush.material.world_pos.horizontal_distance(self.position) > self.mechanics.harvest_range {
            return Err(HostError::new("collect_material", "material is out of reach"));
        }

        if bush.ready_at.is_some() {
            self.counters.harvest_cooldowns = self.counters.harvest_cooldowns.saturating_add(1);
            self.emit(SystemMessage::HarvestCooldown);
            return Ok(());
        }

        self.animation = ANIMATION_HARVESTING;
        self.harvest = Some(PendingHarvest {
            bush: bush.material.id,
            item_id: bush.berry.item_id(),
            done_at: self.now_ms.saturating_add(self.mechanics.harvest_duration_ms),
        });
        Ok(())
    }

    fn handle_death(&mut self) -> Result<(), HostError> {
        info!(spawn = %self.spawn, "Reviving player");
        self.dead = false;
        self.health = self.max_health;
        self.position = self.spawn;
        Ok(())
    }

    fn set_intent(&mut self, intent: &str) {
        if self.intent != intent {
            intent.clone_into(&mut self.intent);
        }
    }
}

impl CombatRoutine for SimulatedHost {
    fn handle_combat(&mut self, policy: CombatPolicy) -> Result<CombatDecision, HostError> {
        if self.dead {
            return Ok(CombatDecision::Idle);
        }

        let position = self.position;
        let view_range = self.mechanics.view_range;
        let in_view = |m: &&SimMonster| m.mover.position.distance(position) <= view_range;

        let target = self
            .monsters
            .iter()
            .filter(in_view)
            .filter(|m| policy.engagement(&m.mover) == Engagement::Fight)
            .filter(|m| {
                policy.is_desirable(&m.mover)
                    || (m.mover.is_aggressive
                        && m.mover.position.distance(position) <= MELEE_RANGE)
            })
            .min_by(|a, b| {
                a.mover
                    .position
                    .distance(position)
                    .total_cmp(&b.mover.position.distance(position))
            })
            .map(|m| (m.mover.id, m.mover.position));

        if let Some((id, at)) = target {
            if at.distance(position) > INTERACTION_RANGE {
                return Ok(CombatDecision::MoveTo(at));
            }
            let damage = self.roll_damage();
            if let Some(monster) = self.monsters.iter_mut().find(|m| m.mover.id == id) {
                monster.health = monster.health.saturating_sub(damage);
            }
            let killed = self.monsters.iter().any(|m| m.mover.id == id && m.health == 0);
            if killed {
                info!(monster = %id, "Monster killed");
                self.monsters.retain(|m| m.mover.id != id);
                self.counters.kills = self.counters.kills.saturating_add(1);
            }
            return Ok(CombatDecision::Engaged);
        }

        let threat = self
            .monsters
            .iter()
            .filter(in_view)
            .filter(|m| m.mover.is_aggressive)
            .find_map(|m| match policy.engagement(&m.mover) {
                Engagement::KeepDistance(d) if m.mover.position.distance(position) < d => {
                    Some((m.mover.position, d))
                }
                _ => None,
            });

        Ok(threat.map_or(CombatDecision::Idle, |(at, distance)| {
            CombatDecision::MoveTo(self.flee_point(at, distance))
        }))
    }
}

impl OptionSource for SimulatedHost {
    fn option(&self, key: OptionKey) -> Option<OptionValue> {
        self.options.get(&key).cloned()
    }
}

impl StatisticsSink for SimulatedHost {
    fn set_badge(&mut self, badge: Badge, value: String) {
        self.badges.insert(badge, value);
    }
}

const fn new_item(item_id: ItemId, slot: u32, quantity: u32) -> InventoryItem {
    InventoryItem {
        item_id,
        upgrade_level: 0,
        slot,
        equipped: None,
        quantity,
    }
}

// Tick steps are a few hundred milliseconds; f32 is exact far beyond that.
#[allow(clippy::cast_precision_loss)]
const fn ms_as_secs(ms: u64) -> f32 {
    ms as f32 / 1000.0
}

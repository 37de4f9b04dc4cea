//! Tick arbiter: the per-tick priority loop that drives the farmer.
//!
//! Every host tick runs through the same steps:
//!
//! 1. **Prepare** -- mark the tick as "no navigation yet", read the operator
//!    options, refresh the waypoint route.
//! 2. **Validate** -- refuse configurations that cannot work (no berry type
//!    selected, fewer than two waypoints).
//! 3. **Statistics** -- accumulate active runtime and refresh the operator
//!    display on its cooldown.
//! 4. **Arbitrate** -- offer the tick to each behaviour in [`Behaviour::PRIORITY`]
//!    order. The first one that acts ends the tick; later behaviours are not
//!    evaluated.
//! 5. **Finish** -- drop the committed navigation target if nobody moved.
//!
//! Travel is always able to act on a valid configuration, so a tick in which
//! nothing acts is reported as [`FarmerError::NoApplicableBehaviour`].

use berryfarmer_types::{
    ANIMATION_HARVESTING, BerryType, GameWindow, ITEM_HARVESTING_GLOVES, ITEM_POWER_DICE_8,
    WorldPosition,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::combat::{CombatDecision, CombatPolicy};
use crate::config::TuningConfig;
use crate::equipment;
use crate::error::FarmerError;
use crate::host::{FarmerHost, HostActions};
use crate::locator;
use crate::messages::{HarvestTimers, SystemMessage};
use crate::navigation::NavigationController;
use crate::options::{ConfigSnapshot, OptionFaultLog};
use crate::statistics::StatisticsTracker;
use crate::throttle::{
    ActionThrottle, KEY_COLLECT_BERRIES, KEY_COMPLAIN_MISSING_DICE, KEY_EQUIP_ITEM,
    KEY_PURCHASE_GLOVES, KEY_UI_INTERACTION, KEY_WARN_UNKNOWN_BUSH, KEY_WARN_VENDOR_MISSING,
};

/// Fewest waypoints a route may have.
pub const MIN_WAYPOINTS: usize = 2;

/// Player-menu option that opens a vendor's shop.
const TRADE_MENU_OPTION: u32 = 1;

/// A prioritized unit of decision logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behaviour {
    /// Revive and recover.
    Death,
    /// Fight or avoid monsters.
    Combat,
    /// Walk to the vendor and buy gloves.
    PurchaseGloves,
    /// Upgrade gloves with Power Dice 8.
    UpgradeGloves,
    /// Wear the best gloves.
    EquipGloves,
    /// Collect the closest enabled bush.
    Harvest,
    /// Follow the waypoint route.
    Travel,
}

impl Behaviour {
    /// Evaluation order, highest priority first.
    pub const PRIORITY: [Self; 7] = [
        Self::Death,
        Self::Combat,
        Self::PurchaseGloves,
        Self::UpgradeGloves,
        Self::EquipGloves,
        Self::Harvest,
        Self::Travel,
    ];

    /// Stable name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Death => "death",
            Self::Combat => "combat",
            Self::PurchaseGloves => "purchase_gloves",
            Self::UpgradeGloves => "upgrade_gloves",
            Self::EquipGloves => "equip_gloves",
            Self::Harvest => "harvest",
            Self::Travel => "travel",
        }
    }
}

impl core::fmt::Display for Behaviour {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickOutcome {
    /// 1-based tick number.
    pub tick: u64,
    /// The behaviour that acted.
    pub behaviour: Behaviour,
    /// Host clock at the start of the tick.
    pub now_ms: u64,
}

/// All state the farmer carries from one tick to the next.
#[derive(Debug)]
pub struct TickArbiter {
    tuning: TuningConfig,
    navigation: NavigationController,
    throttle: ActionThrottle,
    statistics: StatisticsTracker,
    timers: HarvestTimers,
    option_faults: OptionFaultLog,
    waypoints: Vec<WorldPosition>,
    waypoint_index: usize,
    tick: u64,
}

impl TickArbiter {
    /// Create an arbiter with the given tuning.
    pub fn new(tuning: TuningConfig) -> Self {
        Self {
            navigation: NavigationController::new(
                tuning.navigation_tolerance,
                tuning.direct_navigation_tolerance,
            ),
            throttle: ActionThrottle::new(),
            statistics: StatisticsTracker::new(
                tuning.pause_threshold_ms,
                tuning.statistics_interval_ms,
            ),
            timers: HarvestTimers::default(),
            option_faults: OptionFaultLog::new(),
            waypoints: Vec::new(),
            waypoint_index: 0,
            tick: 0,
            tuning,
        }
    }

    /// Run one tick against `host`.
    ///
    /// # Errors
    ///
    /// Returns a configuration fault ([`FarmerError::is_configuration_fault`])
    /// when the operator setup cannot work, or [`FarmerError::Host`] when a
    /// host command fails.
    pub fn run_tick<H>(&mut self, host: &mut H) -> Result<TickOutcome, FarmerError>
    where
        H: FarmerHost + ?Sized,
    {
        let tick = self.tick.checked_add(1).ok_or(FarmerError::TickOverflow)?;
        self.tick = tick;

        self.navigation.begin_tick();
        let now_ms = host.now_ms();
        let config = ConfigSnapshot::read(&*host);
        self.option_faults.report(&config.faults);
        self.waypoints.clone_from(&config.waypoints);

        let acted = self.arbitrate(now_ms, &config, host);
        self.navigation.end_tick();

        let behaviour = acted?.ok_or(FarmerError::NoApplicableBehaviour)?;
        debug!(tick, behaviour = behaviour.as_str(), now_ms, "Tick complete");
        Ok(TickOutcome {
            tick,
            behaviour,
            now_ms,
        })
    }

    /// Record a system message delivered by the host between ticks.
    pub fn on_system_message(&mut self, id: &str, now_ms: u64) -> SystemMessage {
        let message = SystemMessage::parse(id);
        self.timers.record(message, now_ms);
        message
    }

    /// Ticks run so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The route as read on the last tick.
    pub fn waypoints(&self) -> &[WorldPosition] {
        &self.waypoints
    }

    /// Raw waypoint counter (taken modulo the route length when used).
    pub const fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    /// Navigation state.
    pub const fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    /// Action cooldowns.
    pub const fn throttle(&self) -> &ActionThrottle {
        &self.throttle
    }

    /// Runtime and yield statistics.
    pub const fn statistics(&self) -> &StatisticsTracker {
        &self.statistics
    }

    /// Message and attempt timestamps.
    pub const fn timers(&self) -> &HarvestTimers {
        &self.timers
    }

    /// The tuning in use.
    pub const fn tuning(&self) -> &TuningConfig {
        &self.tuning
    }

    fn arbitrate<H>(
        &mut self,
        now_ms: u64,
        config: &ConfigSnapshot,
        host: &mut H,
    ) -> Result<Option<Behaviour>, FarmerError>
    where
        H: FarmerHost + ?Sized,
    {
        validate(config)?;

        self.statistics.track_runtime(now_ms);
        self.statistics
            .update_display(now_ms, &mut self.throttle, host);

        for behaviour in Behaviour::PRIORITY {
            if self.run_behaviour(behaviour, now_ms, config, host)? {
                return Ok(Some(behaviour));
            }
        }
        Ok(None)
    }

    fn run_behaviour<H>(
        &mut self,
        behaviour: Behaviour,
        now_ms: u64,
        config: &ConfigSnapshot,
        host: &mut H,
    ) -> Result<bool, FarmerError>
    where
        H: FarmerHost + ?Sized,
    {
        match behaviour {
            Behaviour::Death => handle_death(host),
            Behaviour::Combat => self.handle_combat(config, host),
            Behaviour::PurchaseGloves => self.handle_purchase_gloves(now_ms, config, host),
            Behaviour::UpgradeGloves => self.handle_upgrade_gloves(now_ms, config, host),
            Behaviour::EquipGloves => self.handle_equip_gloves(now_ms, config, host),
            Behaviour::Harvest => self.handle_harvest(now_ms, config, host),
            Behaviour::Travel => self.handle_travel(host),
        }
    }

    fn handle_combat<H>(&mut self, config: &ConfigSnapshot, host: &mut H) -> Result<bool, FarmerError>
    where
        H: FarmerHost + ?Sized,
    {
        let policy = CombatPolicy::new(config.combat);
        match host.handle_combat(policy)? {
            CombatDecision::Idle => Ok(false),
            CombatDecision::Engaged => Ok(true),
            CombatDecision::MoveTo(target) => {
                self.navigation.set_target(host, target, false)?;
                Ok(true)
            }
        }
    }

    fn handle_purchase_gloves<H>(
        &mut self,
        now_ms: u64,
        config: &ConfigSnapshot,
        host: &mut H,
    ) -> Result<bool, FarmerError>
    where
        H: FarmerHost + ?Sized,
    {
        let inventory = host.inventory();
        let gloves =
            equipment::best_owned(&inventory, ITEM_HARVESTING_GLOVES, config.purchase_gloves)?;

        if gloves.is_some() || !config.purchase_gloves {
            // Leave the shop once the purchase is done.
            return Ok(host.close_window(GameWindow::NpcShop)?);
        }

        let Some(npc) = host.find_npc(&self.tuning.glove_vendor) else {
            self.throttle.run_throttled(
                now_ms,
                KEY_WARN_VENDOR_MISSING,
                self.tuning.despam_interval_ms,
                || warn!(vendor = %self.tuning.glove_vendor, "Glove vendor not found in game data"),
            );
            return Ok(false);
        };

        let reach = self.tuning.vendor_reach_distance;
        if host.player_position().distance(npc.position) > reach {
            set_intent(
                host,
                &format!("Walking to \"{}\" to purchase \"Harvesting Gloves\".", npc.name),
            );
            self.navigation.set_target(host, npc.position, false)?;
            return Ok(true);
        }

        let Some(vendor) = host
            .movers_around()
            .into_iter()
            .find(|mover| mover.is_npc && mover.position.distance(npc.position) < reach)
        else {
            self.throttle.run_throttled(
                now_ms,
                KEY_WARN_VENDOR_MISSING,
                self.tuning.despam_interval_ms,
                || warn!(vendor = %npc.name, position = %npc.position, "Reached the glove vendor's position but the NPC is not here"),
            );
            return Ok(false);
        };

        if !host.is_window_open(GameWindow::NpcShop) {
            let menu_open = host.is_window_open(GameWindow::PlayerMenu);
            self.throttle
                .run_throttled(
                    now_ms,
                    KEY_UI_INTERACTION,
                    self.tuning.ui_interaction_interval_ms,
                    || {
                        if menu_open {
                            host.click_menu_option(TRADE_MENU_OPTION)
                        } else {
                            host.click_mover(vendor.id)
                        }
                    },
                )
                .transpose()?;
            return Ok(true);
        }

        let bought = self
            .throttle
            .run_throttled(
                now_ms,
                KEY_PURCHASE_GLOVES,
                self.tuning.purchase_interval_ms,
                || host.buy_item(vendor.id, ITEM_HARVESTING_GLOVES, 1),
            )
            .transpose()?;
        if bought.is_some() {
            info!(vendor = %vendor.id, "Purchasing Harvesting Gloves");
        }
        Ok(true)
    }

    fn handle_upgrade_gloves<H>(
        &mut self,
        now_ms: u64,
        config: &ConfigSnapshot,
        host: &mut H,
    ) -> Result<bool, FarmerError>
    where
        H: FarmerHost + ?Sized,
    {
        let Some(target_level) = config.upgrade_gloves.level() else {
            return Ok(false);
        };

        let inventory = host.inventory();
        let dice = equipment::find_item(&inventory, ITEM_POWER_DICE_8);
        let Some(scroll) = dice.stacks.first().filter(|_| dice.total > 0) else {
            self.throttle.run_throttled(
                now_ms,
                KEY_COMPLAIN_MISSING_DICE,
                self.tuning.missing_dice_complaint_ms,
                || warn!("Cannot upgrade Harvesting Gloves without Power Dice 8"),
            );
            return Ok(false);
        };

        let Some(gloves) =
            equipment::best_owned(&inventory, ITEM_HARVESTING_GLOVES, config.purchase_gloves)?
        else {
            return Ok(false);
        };

        if gloves.upgrade_level >= target_level {
            return Ok(false);
        }

        // Scrolls only apply to gloves in the bag.
        if equipment::is_equipped(&host.equipment(), &gloves) {
            self.throttle
                .run_throttled(now_ms, KEY_EQUIP_ITEM, self.tuning.equip_interval_ms, || {
                    host.use_item(gloves.slot, 0)
                })
                .transpose()?;
            return Ok(true);
        }

        set_intent(
            host,
            &format!(
                "Upgrading \"Harvesting Gloves\" from +{} to +{target_level}. ({} PD8 remaining)",
                gloves.upgrade_level, dice.total
            ),
        );

        if self.timers.upgrade_ready(now_ms, self.tuning.upgrade_retry_ms) {
            host.use_scroll(gloves.slot, scroll.slot)?;
            self.timers.last_upgrade_attempt_at = Some(now_ms);
            info!(
                from = gloves.upgrade_level,
                target = target_level,
                dice_remaining = dice.total,
                "Glove upgrade attempted"
            );
        }
        Ok(true)
    }

    fn handle_equip_gloves<H>(
        &mut self,
        now_ms: u64,
        config: &ConfigSnapshot,
        host: &mut H,
    ) -> Result<bool, FarmerError>
    where
        H: FarmerHost + ?Sized,
    {
        let inventory = host.inventory();
        let Some(gloves) =
            equipment::best_owned(&inventory, ITEM_HARVESTING_GLOVES, config.purchase_gloves)?
        else {
            return Ok(false);
        };

        if equipment::is_equipped(&host.equipment(), &gloves) {
            return Ok(false);
        }

        let intent = if gloves.upgrade_level > 0 {
            format!("Equipping \"Harvesting Gloves +{}\".", gloves.upgrade_level)
        } else {
            String::from("Equipping \"Harvesting Gloves\".")
        };
        set_intent(host, &intent);

        self.throttle
            .run_throttled(now_ms, KEY_EQUIP_ITEM, self.tuning.equip_interval_ms, || {
                host.use_item(gloves.slot, 0)
            })
            .transpose()?;
        Ok(true)
    }

    fn handle_harvest<H>(
        &mut self,
        now_ms: u64,
        config: &ConfigSnapshot,
        host: &mut H,
    ) -> Result<bool, FarmerError>
    where
        H: FarmerHost + ?Sized,
    {
        let nearby = locator::find_nearby(&host.nearby_materials(), config);
        if !nearby.unrecognized.is_empty() {
            self.throttle.run_throttled(
                now_ms,
                KEY_WARN_UNKNOWN_BUSH,
                self.tuning.despam_interval_ms,
                || warn!(props = ?nearby.unrecognized, "Ignoring materials of an unknown bush kind"),
            );
        }

        let Some(bush) = nearby.closest().copied() else {
            return Ok(false);
        };
        let label = BerryType::from_bush_prop(bush.prop).map_or("berry", BerryType::as_str);

        let player = host.player_position();
        let reach = self.tuning.harvest_reach_distance;
        let in_reach = bush.world_pos.horizontal_distance(player) < reach
            && bush.world_pos.height_difference(player) < reach * self.tuning.harvest_height_factor;

        if in_reach {
            set_intent(host, &format!("Collecting {label} bush."));

            let harvesting = host.player_animation() == ANIMATION_HARVESTING;
            if !harvesting && self.timers.harvest_settled(now_ms, self.tuning.harvest_backoff_ms) {
                self.throttle
                    .run_throttled(
                        now_ms,
                        KEY_COLLECT_BERRIES,
                        self.tuning.collect_interval_ms,
                        || host.collect_material(&bush),
                    )
                    .transpose()?;
            }
            return Ok(true);
        }

        set_intent(host, &format!("Navigating towards {label} bush."));
        self.navigation.set_target(host, bush.world_pos, false)?;
        Ok(true)
    }

    fn handle_travel<H>(&mut self, host: &mut H) -> Result<bool, FarmerError>
    where
        H: FarmerHost + ?Sized,
    {
        let current = self.waypoint_at(self.waypoint_index)?;

        let target = if current.horizontal_distance(host.player_position())
            < self.tuning.waypoint_reach_distance
        {
            self.waypoint_index = self.waypoint_index.wrapping_add(1);
            debug!(index = self.waypoint_index, "Waypoint reached");
            self.waypoint_at(self.waypoint_index)?
        } else {
            current
        };

        set_intent(host, "Navigating towards next waypoint.");
        self.navigation.set_target(host, target, false)?;
        Ok(true)
    }

    fn waypoint_at(&self, index: usize) -> Result<WorldPosition, FarmerError> {
        index
            .checked_rem(self.waypoints.len())
            .and_then(|i| self.waypoints.get(i))
            .copied()
            .ok_or(FarmerError::TooFewWaypoints {
                configured: self.waypoints.len(),
            })
    }
}

fn validate(config: &ConfigSnapshot) -> Result<(), FarmerError> {
    if !config.collects_any() {
        return Err(FarmerError::NoBerryTypeSelected);
    }
    if config.waypoints.len() < MIN_WAYPOINTS {
        return Err(FarmerError::TooFewWaypoints {
            configured: config.waypoints.len(),
        });
    }
    Ok(())
}

fn handle_death<H>(host: &mut H) -> Result<bool, FarmerError>
where
    H: FarmerHost + ?Sized,
{
    if !host.is_dead() {
        return Ok(false);
    }
    info!("Player is dead, running death routine");
    host.handle_death()?;
    Ok(true)
}

fn set_intent<H>(host: &mut H, intent: &str)
where
    H: HostActions + ?Sized,
{
    debug!(intent, "Player intent");
    host.set_intent(intent);
}

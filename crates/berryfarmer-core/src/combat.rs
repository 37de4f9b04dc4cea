//! Target policy for the host's combat routine.
//!
//! The engine does not fight. It tells the host which monsters are worth
//! engaging, which ones to keep away from, and which berry carriers it
//! actively wants dead (they drop berries). The host runs the fight and
//! reports back a [`CombatDecision`].

use berryfarmer_types::{Mover, WorldPosition};
use serde::{Deserialize, Serialize};

use crate::options::CombatOptions;

/// Distance kept from normal aggressive monsters and carriers when not
/// fighting them.
pub const SAFE_DISTANCE_NORMAL: f32 = 10.0;

/// Distance kept from giant-class monsters when not fighting them.
pub const SAFE_DISTANCE_GIANT: f32 = 20.0;

/// How the combat routine should treat one mover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Engagement {
    /// Attack it.
    Fight,
    /// Stay at least this far away.
    KeepDistance(f32),
    /// Not a concern.
    Ignore,
}

/// Combat toggles turned into per-mover rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatPolicy {
    options: CombatOptions,
}

impl CombatPolicy {
    /// Build a policy from the operator's combat toggles.
    pub const fn new(options: CombatOptions) -> Self {
        Self { options }
    }

    /// The toggles this policy was built from.
    pub const fn options(self) -> CombatOptions {
        self.options
    }

    /// Decide how to treat `mover`. Carriers follow their own toggle
    /// whatever their rank.
    pub fn engagement(self, mover: &Mover) -> Engagement {
        if mover.is_npc {
            return Engagement::Ignore;
        }

        if mover.is_berry_carrier() {
            return if self.options.kill_berry_carriers {
                Engagement::Fight
            } else {
                Engagement::KeepDistance(SAFE_DISTANCE_NORMAL)
            };
        }

        if mover.rank.is_giant_class() {
            return if self.options.kill_giants {
                Engagement::Fight
            } else {
                Engagement::KeepDistance(SAFE_DISTANCE_GIANT)
            };
        }

        match (self.options.kill_normal_mobs, mover.is_aggressive) {
            (true, _) => Engagement::Fight,
            (false, true) => Engagement::KeepDistance(SAFE_DISTANCE_NORMAL),
            (false, false) => Engagement::Ignore,
        }
    }

    /// Whether the routine should seek `mover` out instead of only reacting
    /// when attacked.
    pub fn is_desirable(self, mover: &Mover) -> bool {
        self.options.kill_berry_carriers && mover.is_berry_carrier()
    }
}

/// What the host's combat routine did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CombatDecision {
    /// Nothing to fight; later behaviours may act.
    Idle,
    /// The routine attacked or is mid-fight.
    Engaged,
    /// The routine wants the player moved (to a target or away from one).
    MoveTo(WorldPosition),
}

//! Navigation deduplication.
//!
//! Several behaviours want to move the player every tick toward a target
//! that rarely changes. Restarting the host's pathfinder ten times a second
//! would make the player stutter, so [`NavigationController`] only issues a
//! new navigate command when nothing is in flight or the target moved by
//! more than a tolerance.
//!
//! Each tick is bracketed by [`NavigationController::begin_tick`] and
//! [`NavigationController::end_tick`]. If no behaviour asked to move during
//! the tick, the committed target is cleared and the [`AbortPredicate`]
//! handed to the host starts reporting `true`, so the host cancels the
//! stale navigation instead of walking on after the agent lost interest.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use berryfarmer_types::WorldPosition;
use tracing::debug;

use crate::error::HostError;
use crate::host::Navigator;

/// Predicate the host evaluates to decide whether to cancel a navigation.
///
/// Pure: reading it never changes engine state.
#[derive(Debug, Clone)]
pub struct AbortPredicate {
    no_navigation_this_tick: Arc<AtomicBool>,
}

impl AbortPredicate {
    /// Whether the in-flight navigation should be cancelled.
    pub fn should_abort(&self) -> bool {
        self.no_navigation_this_tick.load(Ordering::Relaxed)
    }
}

/// Tracks the committed navigation target across ticks.
#[derive(Debug)]
pub struct NavigationController {
    target: WorldPosition,
    no_navigation_this_tick: Arc<AtomicBool>,
    tolerance: f32,
    direct_tolerance: f32,
}

impl NavigationController {
    /// Create a controller with the given re-target tolerances (the second
    /// applies when pathfinding is skipped).
    pub fn new(tolerance: f32, direct_tolerance: f32) -> Self {
        Self {
            target: WorldPosition::ZERO,
            no_navigation_this_tick: Arc::new(AtomicBool::new(true)),
            tolerance,
            direct_tolerance,
        }
    }

    /// Mark the start of a tick: nothing has asked to move yet.
    pub fn begin_tick(&self) {
        self.no_navigation_this_tick.store(true, Ordering::Relaxed);
    }

    /// Mark the end of a tick. Clears the committed target if no behaviour
    /// navigated during the tick.
    pub fn end_tick(&mut self) {
        if self.no_navigation_this_tick.load(Ordering::Relaxed) {
            self.target = WorldPosition::ZERO;
        }
    }

    /// Commit `target` as the desired destination.
    ///
    /// Returns `true` if a navigate command was issued, `false` if the
    /// in-flight navigation already heads close enough to `target`.
    pub fn set_target(
        &mut self,
        navigator: &mut (impl Navigator + ?Sized),
        target: WorldPosition,
        skip_pathfind: bool,
    ) -> Result<bool, HostError> {
        self.no_navigation_this_tick.store(false, Ordering::Relaxed);

        let tolerance = if skip_pathfind {
            self.direct_tolerance
        } else {
            self.tolerance
        };

        if navigator.is_navigating() && target.distance(self.target) < tolerance {
            return Ok(false);
        }

        debug!(%target, skip_pathfind, "Starting navigation");
        navigator.navigate_to(target, skip_pathfind, self.abort_predicate())?;
        self.target = target;
        Ok(true)
    }

    /// The currently committed target (`ZERO` when none).
    pub const fn target(&self) -> WorldPosition {
        self.target
    }

    /// Whether some behaviour navigated during the current tick.
    pub fn navigated_this_tick(&self) -> bool {
        !self.no_navigation_this_tick.load(Ordering::Relaxed)
    }

    /// A predicate sharing this controller's per-tick flag.
    pub fn abort_predicate(&self) -> AbortPredicate {
        AbortPredicate {
            no_navigation_this_tick: Arc::clone(&self.no_navigation_this_tick),
        }
    }
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new(1.5, 0.5)
    }
}

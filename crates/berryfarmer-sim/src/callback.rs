//! Tick callback that logs session progress.

use berryfarmer_core::host::WorldView;
use berryfarmer_core::{TickArbiter, TickOutcome};
use tracing::info;

use crate::host::SimulatedHost;
use crate::session::TickCallback;

/// Logs a progress line and the latest statistics every few ticks.
pub struct ProgressLogger {
    every: u64,
}

impl ProgressLogger {
    /// Log every `every` ticks (0 disables logging).
    pub const fn new(every: u64) -> Self {
        Self { every }
    }
}

impl TickCallback for ProgressLogger {
    fn on_tick(&mut self, outcome: &TickOutcome, arbiter: &TickArbiter, host: &SimulatedHost) {
        if outcome.tick.checked_rem(self.every) != Some(0) {
            return;
        }

        info!(
            tick = outcome.tick,
            behaviour = %outcome.behaviour,
            position = %host.player_position(),
            intent = host.intent(),
            harvests = host.counters().harvests,
            "Progress"
        );

        let Some(report) = arbiter.statistics().last_report() else {
            return;
        };
        for (berry, stat) in &report.yields {
            info!(
                runtime = report.runtime.as_str(),
                %berry,
                baseline = stat.baseline,
                gained = stat.gained,
                per_hour = stat.per_hour,
                nearby = report.nearby.get(berry).copied().unwrap_or(0),
                "Statistics"
            );
        }
    }
}

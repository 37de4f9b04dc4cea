//! Session loop that drives the arbiter against the simulated host.
//!
//! [`step`] is one host frame: run a tick, let simulated time pass, and
//! deliver the system messages the world produced. [`run_ticks`] chains
//! frames synchronously for tests, while [`run_session`] adds pacing on a
//! `tokio` interval, a stop flag, and the session boundaries from the
//! scenario.
//!
//! A configuration fault ends the session the way the bot platform stops
//! a misconfigured bot. Host command failures are errors.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use berryfarmer_core::host::WorldView;
use berryfarmer_core::{FarmerError, TickArbiter, TickOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::host::{SimCounters, SimulatedHost};
use crate::scenario::SessionSpec;

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEndReason {
    /// The configured tick budget was used up.
    MaxTicksReached,
    /// The stop flag was raised.
    StopRequested,
    /// The engine reported a configuration fault.
    ConfigurationFault {
        /// Rendered fault.
        message: String,
    },
}

/// Summary of a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    /// Why the session ended.
    pub end_reason: SessionEndReason,
    /// Ticks in which a behaviour acted.
    pub total_ticks: u64,
    /// The last successful tick, if any.
    pub final_outcome: Option<TickOutcome>,
    /// How often each behaviour acted.
    pub behaviours: BTreeMap<String, u64>,
    /// World counters at the end.
    pub counters: SimCounters,
    /// Simulated time that passed.
    pub simulated_ms: u64,
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end.
    pub ended_at: DateTime<Utc>,
}

/// Callback invoked after each successful tick.
pub trait TickCallback: Send {
    /// Called after a tick and the frame that followed it.
    fn on_tick(&mut self, outcome: &TickOutcome, arbiter: &TickArbiter, host: &SimulatedHost);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _outcome: &TickOutcome, _arbiter: &TickArbiter, _host: &SimulatedHost) {}
}

/// Run one tick, then advance the world by `tick_ms` and deliver its
/// system messages. Time passes even when the tick fails.
///
/// # Errors
///
/// Returns whatever [`TickArbiter::run_tick`] returned.
pub fn step(
    arbiter: &mut TickArbiter,
    host: &mut SimulatedHost,
    tick_ms: u64,
) -> Result<TickOutcome, FarmerError> {
    let result = arbiter.run_tick(host);

    let messages = host.advance(tick_ms);
    let now_ms = host.now_ms();
    for id in &messages {
        let message = arbiter.on_system_message(id, now_ms);
        debug!(id = id.as_str(), ?message, now_ms, "System message delivered");
    }

    result
}

/// Run `ticks` frames back to back.
///
/// # Errors
///
/// Stops at the first failing tick and returns its error.
pub fn run_ticks(
    arbiter: &mut TickArbiter,
    host: &mut SimulatedHost,
    ticks: u64,
    tick_ms: u64,
) -> Result<Vec<TickOutcome>, FarmerError> {
    (0..ticks).map(|_| step(arbiter, host, tick_ms)).collect()
}

/// Run a paced session until a boundary is hit.
///
/// # Errors
///
/// Returns [`SimError::Farmer`] if a host command fails. Configuration
/// faults end the session normally with
/// [`SessionEndReason::ConfigurationFault`].
pub async fn run_session(
    arbiter: &mut TickArbiter,
    host: &mut SimulatedHost,
    spec: SessionSpec,
    stop: &AtomicBool,
    callback: &mut dyn TickCallback,
) -> Result<SessionResult, SimError> {
    let started_at = Utc::now();
    let start_ms = host.now_ms();
    let mut final_outcome: Option<TickOutcome> = None;
    let mut total_ticks: u64 = 0;
    let mut behaviours: BTreeMap<String, u64> = BTreeMap::new();

    let mut pacing = (spec.real_interval_ms > 0).then(|| {
        let mut interval = tokio::time::interval(Duration::from_millis(spec.real_interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    info!(
        max_ticks = spec.max_ticks,
        tick_ms = spec.tick_ms,
        real_interval_ms = spec.real_interval_ms,
        "Session starting"
    );

    let end_reason = loop {
        if stop.load(Ordering::Relaxed) {
            info!("Stop requested");
            break SessionEndReason::StopRequested;
        }

        if spec.max_ticks > 0 && total_ticks >= spec.max_ticks {
            info!(max_ticks = spec.max_ticks, "Tick limit reached");
            break SessionEndReason::MaxTicksReached;
        }

        match pacing.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => tokio::task::yield_now().await,
        }

        match step(arbiter, host, spec.tick_ms) {
            Ok(outcome) => {
                total_ticks = total_ticks.saturating_add(1);
                let count = behaviours.entry(outcome.behaviour.as_str().to_owned()).or_insert(0);
                *count = count.saturating_add(1);

                callback.on_tick(&outcome, arbiter, host);
                final_outcome = Some(outcome);
            }
            Err(e) if e.is_configuration_fault() => {
                warn!(error = %e, tick = arbiter.tick(), "Farmer halted");
                break SessionEndReason::ConfigurationFault {
                    message: e.to_string(),
                };
            }
            Err(e) => return Err(e.into()),
        }
    };

    Ok(SessionResult {
        end_reason,
        total_ticks,
        final_outcome,
        behaviours,
        counters: host.counters(),
        simulated_ms: host.now_ms().saturating_sub(start_ms),
        started_at,
        ended_at: Utc::now(),
    })
}

/// Log how a session ended.
pub fn log_session_end(result: &SessionResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_outcome.as_ref().map(|o| o.tick),
        simulated_ms = result.simulated_ms,
        harvests = result.counters.harvests,
        purchases = result.counters.purchases,
        upgrade_attempts = result.counters.upgrade_attempts,
        kills = result.counters.kills,
        deaths = result.counters.deaths,
        "Session ended"
    );
}

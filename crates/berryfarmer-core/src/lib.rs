//! Tick-driven decision engine for the berry farming agent.
//!
//! The host bot platform calls [`TickArbiter::run_tick`] roughly ten times
//! per second. Each tick the arbiter reads the operator options, checks the
//! configuration, refreshes statistics, and lets exactly one behaviour act:
//! survive death, handle combat, buy, upgrade, or equip the harvesting
//! gloves, harvest the closest berry bush, or walk the waypoint route.
//!
//! # Modules
//!
//! - [`arbiter`] -- The per-tick priority loop and the behaviour handlers.
//! - [`combat`] -- Target policy handed to the host's combat routine.
//! - [`config`] -- Tuning loaded from `berryfarmer.yaml`.
//! - [`equipment`] -- Glove ownership and equip checks.
//! - [`error`] -- [`FarmerError`] and [`HostError`].
//! - [`host`] -- Traits the host platform implements.
//! - [`locator`] -- Nearby bush classification and ranking.
//! - [`messages`] -- System message parsing and timestamps.
//! - [`navigation`] -- Navigation target deduplication and abort predicate.
//! - [`options`] -- Operator options read every tick.
//! - [`statistics`] -- Runtime and yield display.
//! - [`throttle`] -- Per-key cooldowns for host commands.
//!
//! [`TickArbiter::run_tick`]: arbiter::TickArbiter::run_tick
//! [`FarmerError`]: error::FarmerError
//! [`HostError`]: error::HostError

pub mod arbiter;
pub mod combat;
pub mod config;
pub mod equipment;
pub mod error;
pub mod host;
pub mod locator;
pub mod messages;
pub mod navigation;
pub mod options;
pub mod statistics;
pub mod throttle;

pub use arbiter::{Behaviour, TickArbiter, TickOutcome};
pub use error::{FarmerError, HostError};
pub use host::FarmerHost;

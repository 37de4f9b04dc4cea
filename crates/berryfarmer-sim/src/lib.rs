//! Simulated host and session loop for the berry farming agent.
//!
//! Runs the decision engine from `berryfarmer-core` against an in-memory
//! world instead of a live game client, so whole farming sessions can be
//! replayed deterministically from a YAML scenario.
//!
//! # Modules
//!
//! - [`callback`] -- Progress logging after each tick.
//! - [`error`] -- [`SimError`](error::SimError).
//! - [`host`] -- [`SimulatedHost`](host::SimulatedHost), the in-memory world.
//! - [`scenario`] -- Scenario files.
//! - [`session`] -- Tick loop and session result.

pub mod callback;
pub mod error;
pub mod host;
pub mod scenario;
pub mod session;

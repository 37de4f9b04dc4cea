//! Error types for the simulator.
//!
//! [`SimError`] wraps every failure mode of a simulated session so the
//! binary can propagate them with `?`.

use berryfarmer_core::FarmerError;
use berryfarmer_core::config::ConfigError;

use crate::scenario::ScenarioError;

/// Top-level error for a simulated session.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Scenario loading failed.
    #[error("scenario error: {source}")]
    Scenario {
        /// The underlying scenario error.
        #[from]
        source: ScenarioError,
    },

    /// The engine reported a fault.
    #[error("farmer error: {source}")]
    Farmer {
        /// The underlying engine error.
        #[from]
        source: FarmerError,
    },
}

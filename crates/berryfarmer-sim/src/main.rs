//! Simulator binary for the berry farming agent.
//!
//! Runs the decision engine against an in-memory world and logs what the
//! agent did.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `berryfarmer.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the scenario named by `BERRYFARMER_SCENARIO`, or the built-in one
//! 4. Build the simulated host and the tick arbiter
//! 5. Run the session until its tick budget is used or Ctrl-C is pressed
//! 6. Log the result

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use berryfarmer_core::TickArbiter;
use berryfarmer_core::config::{FarmerConfig, LoggingConfig};
use berryfarmer_sim::callback::ProgressLogger;
use berryfarmer_sim::error::SimError;
use berryfarmer_sim::host::SimulatedHost;
use berryfarmer_sim::scenario::Scenario;
use berryfarmer_sim::session;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable naming a scenario file.
const SCENARIO_ENV: &str = "BERRYFARMER_SCENARIO";

/// Ticks between progress lines.
const PROGRESS_EVERY: u64 = 100;

/// Application entry point for the simulator.
///
/// # Errors
///
/// Returns an error if configuration or scenario loading fails, or if the
/// simulated host rejects a command.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("berryfarmer-sim starting");
    info!(
        glove_vendor = config.tuning.glove_vendor,
        harvest_reach_distance = config.tuning.harvest_reach_distance,
        waypoint_reach_distance = config.tuning.waypoint_reach_distance,
        "Configuration loaded"
    );

    // 3. Load the scenario.
    let scenario = load_scenario()?;
    info!(
        seed = scenario.seed,
        bushes = scenario.bushes.len(),
        vendors = scenario.vendors.len(),
        monsters = scenario.monsters.len(),
        waypoints = scenario.options.waypoints.len(),
        "Scenario loaded"
    );

    // 4. Build the world and the engine.
    let mut host = SimulatedHost::new(&scenario);
    let mut arbiter = TickArbiter::new(config.tuning);

    // 5. Run until done or interrupted.
    let stop = Arc::new(AtomicBool::new(false));
    let ctrl_c_stop = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_stop.store(true, Ordering::Relaxed);
        }
    });

    let mut callback = ProgressLogger::new(PROGRESS_EVERY);
    let result =
        session::run_session(&mut arbiter, &mut host, scenario.session, &stop, &mut callback)
            .await?;

    // 6. Log the result.
    session::log_session_end(&result);
    if let Some(report) = arbiter.statistics().last_report() {
        for (berry, stat) in &report.yields {
            info!(
                %berry,
                runtime = report.runtime.as_str(),
                collected = stat.display(),
                "Final yield"
            );
        }
    }
    info!(summary = %serde_json::to_string(&result)?, "Session summary");

    Ok(())
}

/// Load configuration from `berryfarmer.yaml`, or defaults if absent.
fn load_config() -> Result<FarmerConfig, SimError> {
    let config_path = Path::new("berryfarmer.yaml");
    if config_path.exists() {
        Ok(FarmerConfig::from_file(config_path)?)
    } else {
        Ok(FarmerConfig::default())
    }
}

/// Install the `tracing` subscriber. `RUST_LOG` overrides the configured
/// level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load the scenario named by [`SCENARIO_ENV`], or the built-in one.
fn load_scenario() -> Result<Scenario, SimError> {
    match std::env::var_os(SCENARIO_ENV) {
        Some(path) => {
            info!(path = %Path::new(&path).display(), "Loading scenario file");
            Ok(Scenario::from_file(Path::new(&path))?)
        }
        None => Ok(Scenario::builtin()?),
    }
}

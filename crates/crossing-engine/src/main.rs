//! Controller binary for the crossing.
//!
//! Wires the configuration, the scripted stimulus, and the run loop
//! together and drives the controller until the tick limit is reached or
//! the process is interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `CROSSING_CONFIG` or `crossing-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the controller context from the timing section
//! 4. Build the scripted stimulus
//! 5. Create run control and install the Ctrl-C handler
//! 6. Run the controller
//! 7. Log the result

mod error;
mod trace_callback;

use std::path::PathBuf;
use std::sync::Arc;

use crossing_core::config::CrossingConfig;
use crossing_core::runner::{self, RunControl};
use crossing_core::stimulus::ScriptedStimulus;
use crossing_core::tick::ControllerContext;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::trace_callback::OutputTraceCallback;

/// Environment variable that overrides the configuration file path.
const CONFIG_PATH_VAR: &str = "CROSSING_CONFIG";

/// Configuration file looked up in the working directory by default.
const DEFAULT_CONFIG_PATH: &str = "crossing-config.yaml";

/// Application entry point for the controller.
///
/// # Errors
///
/// Returns an error if configuration loading or logging setup fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging. `RUST_LOG` wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .try_init()
        .map_err(|e| EngineError::Logging {
            message: format!("{e}"),
        })?;

    info!("crossing-engine starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }

    // 3. Build the controller.
    let mut ctx = ControllerContext::new(&config.controller)?;
    let durations = ctx.durations();
    info!(
        ticks_per_half_unit = durations.half(),
        three_units = durations.three(),
        eight_units = durations.eight(),
        "Controller initialized"
    );

    // 4. Build the stimulus.
    let mut stimulus = ScriptedStimulus::from_config(&config.stimulus)?;
    info!(
        windows = stimulus.len(),
        last_scripted_tick = stimulus.last_scripted_tick(),
        "Stimulus script loaded"
    );

    // 5. Run control and Ctrl-C handler.
    let control = Arc::new(RunControl::new(&config.run));
    if control.max_ticks() == 0 {
        info!("No tick limit configured, running until interrupted");
    }
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping after the current tick");
                    control.request_stop();
                }
                Err(e) => {
                    warn!(error = %e, "failed to listen for Ctrl-C, interrupt disabled");
                }
            }
        });
    }

    // 6. Run.
    let mut callback = OutputTraceCallback::new(&ctx);
    let result = runner::run_controller(&mut ctx, &mut stimulus, &control, &mut callback).await;

    // 7. Log results.
    runner::log_run_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        output_changes = callback.changes(),
        "crossing-engine shutdown complete"
    );

    Ok(())
}

/// Load the configuration file, falling back to defaults when it is absent.
///
/// Returns the path that was read, or `None` when defaults are used.
fn load_config() -> Result<(CrossingConfig, Option<PathBuf>), EngineError> {
    let config_path = std::env::var_os(CONFIG_PATH_VAR)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = CrossingConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        Ok((CrossingConfig::default(), None))
    }
}

//! Configuration loading and typed config structures for the crossing controller.
//!
//! The canonical configuration lives in `crossing-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//!
//! Every section is optional. An empty file yields the accelerated test
//! configuration: one tick per half time-unit, an unbounded run paced as
//! fast as possible, and no scripted stimulus.

use std::path::Path;

use crossing_types::LineLevel;
use serde::Deserialize;

/// Ticks per half time-unit for a 50 MHz tick source (0.5 s).
pub const PRODUCTION_TICKS_PER_HALF_UNIT: u64 = 25_000_000;

/// Ticks per half time-unit for accelerated simulation and tests.
pub const ACCELERATED_TICKS_PER_HALF_UNIT: u64 = 1;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable controller.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `crossing-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CrossingConfig {
    /// Controller timing.
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Run bounds and pacing.
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Scripted input windows.
    #[serde(default)]
    pub stimulus: StimulusConfig,
}

impl CrossingConfig {
    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidConfig`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::InvalidConfig`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects a completely empty document for a struct.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] on the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::timing::PhaseDurations::from_config(&self.controller)?;
        self.stimulus.validate()
    }
}

/// Controller timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ControllerConfig {
    /// Ticks representing half a time-unit; every phase duration derives
    /// from this value.
    #[serde(default = "default_ticks_per_half_unit")]
    pub ticks_per_half_unit: u64,
}

impl ControllerConfig {
    /// Real-world timing for a 50 MHz tick source.
    pub const fn production() -> Self {
        Self {
            ticks_per_half_unit: PRODUCTION_TICKS_PER_HALF_UNIT,
        }
    }

    /// One tick per half time-unit.
    pub const fn accelerated() -> Self {
        Self {
            ticks_per_half_unit: ACCELERATED_TICKS_PER_HALF_UNIT,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::accelerated()
    }
}

/// Run bounds and pacing.
///
/// A value of 0 for `max_ticks` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Number of ticks after which the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Real-time milliseconds between ticks (0 = no pacing).
    #[serde(default)]
    pub tick_interval_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Scripted stimulus configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StimulusConfig {
    /// Input windows applied on top of an idle baseline. Later events win
    /// where windows overlap.
    #[serde(default)]
    pub events: Vec<StimulusEvent>,
}

impl StimulusConfig {
    /// Reject windows that end before they start.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] naming the first bad event.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, event) in self.events.iter().enumerate() {
            if event.until_tick < event.from_tick {
                return Err(ConfigError::InvalidConfig {
                    reason: format!(
                        "stimulus event {index}: until_tick {} is before from_tick {}",
                        event.until_tick, event.from_tick
                    ),
                });
            }
        }
        Ok(())
    }
}

/// One scripted input window.
///
/// The window covers ticks `from_tick..until_tick` (half-open), numbered
/// from 1 for the first tick after (re)initialization. Each override is a
/// raw line level (`low`, `high_impedance`, `z`, `1`, ...) that goes through
/// input classification like a sampled pin. Inputs left as `None` keep
/// whatever the baseline or an earlier event supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StimulusEvent {
    /// First tick the window applies to.
    pub from_tick: u64,
    /// First tick after the window.
    pub until_tick: u64,
    /// Override for the main-approach vehicle sensor.
    #[serde(default)]
    pub sensor_main: Option<LineLevel>,
    /// Override for the main pedestrian call.
    #[serde(default)]
    pub main_walk_call: Option<LineLevel>,
    /// Override for the side pedestrian call.
    #[serde(default)]
    pub side_walk_call: Option<LineLevel>,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_ticks_per_half_unit() -> u64 {
    ACCELERATED_TICKS_PER_HALF_UNIT
}

fn default_log_level() -> String {
    "info".to_owned()
}

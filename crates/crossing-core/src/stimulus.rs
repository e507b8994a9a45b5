//! Stimulus source trait and its idle and scripted implementations.
//!
//! The runner asks a [`StimulusSource`] for the classified inputs of every
//! tick before advancing the controller. Where those inputs come from is
//! outside the controller: a board's input pins, a test bench, or a script
//! loaded from configuration.

use crossing_types::{LineLevel, TickInputs};

use crate::config::{ConfigError, StimulusConfig, StimulusEvent};
use crate::monitor;

/// A source of per-tick inputs.
pub trait StimulusSource: Send {
    /// Inputs for the tick numbered `tick` (the first tick after
    /// (re)initialization is tick 1).
    fn inputs_for(&mut self, tick: u64) -> TickInputs;
}

/// Holds every line low.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleStimulus;

impl StimulusSource for IdleStimulus {
    fn inputs_for(&mut self, _tick: u64) -> TickInputs {
        TickInputs::idle()
    }
}

/// Replays input windows from configuration on top of an idle baseline.
///
/// Windows script raw line levels; each tick's lines are classified by the
/// input monitor, so a floating or uninitialized line reaches the
/// controller as [`InputClass::Unknown`].
///
/// [`InputClass::Unknown`]: crossing_types::InputClass::Unknown
#[derive(Debug, Clone, Default)]
pub struct ScriptedStimulus {
    events: Vec<StimulusEvent>,
}

impl ScriptedStimulus {
    /// Build a script from explicit events.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] if any window ends before it
    /// starts.
    pub fn new(events: Vec<StimulusEvent>) -> Result<Self, ConfigError> {
        let config = StimulusConfig { events };
        config.validate()?;
        Ok(Self {
            events: config.events,
        })
    }

    /// Build a script from the stimulus section of the configuration.
    ///
    /// # Errors
    ///
    /// See [`ScriptedStimulus::new`].
    pub fn from_config(config: &StimulusConfig) -> Result<Self, ConfigError> {
        Self::new(config.events.clone())
    }

    /// Number of scripted windows.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the script has no windows.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Raw levels of the sensor, main call, and side call lines on `tick`.
    ///
    /// Lines no window covers are driven low.
    pub fn lines_for(&self, tick: u64) -> (LineLevel, LineLevel, LineLevel) {
        self.events
            .iter()
            .filter(|event| (event.from_tick..event.until_tick).contains(&tick))
            .fold(
                (LineLevel::Low, LineLevel::Low, LineLevel::Low),
                |(sensor, main, side), event| {
                    (
                        event.sensor_main.unwrap_or(sensor),
                        event.main_walk_call.unwrap_or(main),
                        event.side_walk_call.unwrap_or(side),
                    )
                },
            )
    }

    /// Last tick covered by any window, if there are windows.
    pub fn last_scripted_tick(&self) -> Option<u64> {
        self.events
            .iter()
            .map(|event| event.until_tick.saturating_sub(1))
            .max()
    }
}

impl StimulusSource for ScriptedStimulus {
    fn inputs_for(&mut self, tick: u64) -> TickInputs {
        let (sensor_main, main_walk_call, side_walk_call) = self.lines_for(tick);
        monitor::classify_lines(sensor_main, main_walk_call, side_walk_call)
    }
}

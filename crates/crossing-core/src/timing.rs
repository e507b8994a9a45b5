//! Phase durations and the per-state tick counter.
//!
//! Every duration derives from a single configured value, the number of
//! ticks in half a time-unit:
//!
//! | unit    | ticks          |
//! |---------|----------------|
//! | `half`  | `ticks_per_half_unit` |
//! | `one`   | `2 * half`     |
//! | `two`   | `2 * one`      |
//! | `three` | `3 * one`      |
//! | `five`  | `5 * one`      |
//! | `eight` | `8 * one`      |
//!
//! The counter restarts at 0 on entry to a state and raises "phase
//! complete" on the tick it is found equal to the state's duration, so a
//! state is held for `duration + 1` committed ticks.

use crossing_types::SignalState;

use crate::config::{ConfigError, ControllerConfig};

/// Derived durations, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDurations {
    half: u64,
    one: u64,
    two: u64,
    three: u64,
    five: u64,
    eight: u64,
}

impl PhaseDurations {
    /// Derive all durations from the number of ticks per half time-unit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] if `ticks_per_half_unit` is
    /// zero or the longest duration does not fit in a `u64`.
    pub fn new(ticks_per_half_unit: u64) -> Result<Self, ConfigError> {
        if ticks_per_half_unit == 0 {
            return Err(ConfigError::InvalidConfig {
                reason: "ticks_per_half_unit must be at least 1".to_owned(),
            });
        }

        let one = scale(ticks_per_half_unit, 2)?;
        Ok(Self {
            half: ticks_per_half_unit,
            one,
            two: scale(one, 2)?,
            three: scale(one, 3)?,
            five: scale(one, 5)?,
            eight: scale(one, 8)?,
        })
    }

    /// Derive durations from the controller section of the configuration.
    ///
    /// # Errors
    ///
    /// See [`PhaseDurations::new`].
    pub fn from_config(config: &ControllerConfig) -> Result<Self, ConfigError> {
        Self::new(config.ticks_per_half_unit)
    }

    /// Half a time-unit; also the blink toggle interval.
    pub const fn half(&self) -> u64 {
        self.half
    }

    /// One time-unit.
    pub const fn one(&self) -> u64 {
        self.one
    }

    /// Two time-units.
    pub const fn two(&self) -> u64 {
        self.two
    }

    /// Three time-units.
    pub const fn three(&self) -> u64 {
        self.three
    }

    /// Five time-units.
    pub const fn five(&self) -> u64 {
        self.five
    }

    /// Eight time-units; the longest configured duration.
    pub const fn eight(&self) -> u64 {
        self.eight
    }

    /// Configured duration of a state.
    pub const fn duration(&self, state: SignalState) -> u64 {
        match state {
            SignalState::MainGreen1 | SignalState::SideGreen1 => self.eight,
            SignalState::MainGreenExtended => self.five,
            SignalState::MainGreen2
            | SignalState::MainYellow
            | SignalState::SideGreen2
            | SignalState::SideYellow => self.two,
            SignalState::MainRed | SignalState::SideRed => self.three,
        }
    }

    /// Number of committed ticks a state is held before it hands over.
    pub const fn dwell_ticks(&self, state: SignalState) -> u64 {
        self.duration(state).saturating_add(1)
    }

    /// Ticks a request latch must spend under its clearing condition before
    /// it drops.
    pub const fn latch_clear_ticks(&self) -> u64 {
        self.two.saturating_sub(1)
    }
}

fn scale(base: u64, factor: u64) -> Result<u64, ConfigError> {
    base.checked_mul(factor)
        .ok_or_else(|| ConfigError::InvalidConfig {
            reason: format!("ticks_per_half_unit too large: {base} * {factor} overflows"),
        })
}

/// Result of one timing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTiming {
    /// Tick count to commit.
    pub phase_ticks: u64,
    /// Whether the current state's duration has elapsed on this tick.
    pub phase_complete: bool,
}

/// Advance the per-state counter by one tick.
///
/// When the counter already equals the state's duration the phase is
/// complete and the counter restarts at 0, to be committed together with
/// the state change. Otherwise the counter increments.
pub const fn step_phase_timer(
    durations: &PhaseDurations,
    state: SignalState,
    phase_ticks: u64,
) -> PhaseTiming {
    if phase_ticks >= durations.duration(state) {
        PhaseTiming {
            phase_ticks: 0,
            phase_complete: true,
        }
    } else {
        PhaseTiming {
            phase_ticks: phase_ticks.saturating_add(1),
            phase_complete: false,
        }
    }
}

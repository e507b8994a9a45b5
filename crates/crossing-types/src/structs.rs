//! Per-tick input, output, and summary structs.

use serde::{Deserialize, Serialize};

use crate::enums::{InputClass, LightColor, SignalState};

/// The three classified inputs sampled on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickInputs {
    /// Vehicle-presence sensor on the main approach.
    #[serde(default)]
    pub sensor_main: InputClass,
    /// Pedestrian call button for crossing alongside the main approach.
    #[serde(default)]
    pub main_walk_call: InputClass,
    /// Pedestrian call button for crossing alongside the side approach.
    #[serde(default)]
    pub side_walk_call: InputClass,
}

impl TickInputs {
    /// All three lines low: no vehicle, no calls.
    pub const fn idle() -> Self {
        Self {
            sensor_main: InputClass::Low,
            main_walk_call: InputClass::Low,
            side_walk_call: InputClass::Low,
        }
    }
}

/// The eight output lines driven after each tick's commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalOutputs {
    /// Main approach red lamp.
    pub main_red: bool,
    /// Main approach yellow lamp.
    pub main_yellow: bool,
    /// Main approach green lamp.
    pub main_green: bool,
    /// Side approach red lamp.
    pub side_red: bool,
    /// Side approach yellow lamp.
    pub side_yellow: bool,
    /// Side approach green lamp.
    pub side_green: bool,
    /// Walk indicator for pedestrians crossing alongside the main approach.
    pub main_walk: bool,
    /// Walk indicator for pedestrians crossing alongside the side approach.
    pub side_walk: bool,
}

impl SignalOutputs {
    /// Both approaches red, no walk indicators.
    pub const fn fail_safe() -> Self {
        Self {
            main_red: true,
            main_yellow: false,
            main_green: false,
            side_red: true,
            side_yellow: false,
            side_green: false,
            main_walk: false,
            side_walk: false,
        }
    }

    /// Build outputs from one aspect per approach plus the walk lines.
    pub const fn from_aspects(
        main: LightColor,
        side: LightColor,
        main_walk: bool,
        side_walk: bool,
    ) -> Self {
        Self {
            main_red: matches!(main, LightColor::Red),
            main_yellow: matches!(main, LightColor::Yellow),
            main_green: matches!(main, LightColor::Green),
            side_red: matches!(side, LightColor::Red),
            side_yellow: matches!(side, LightColor::Yellow),
            side_green: matches!(side, LightColor::Green),
            main_walk,
            side_walk,
        }
    }

    /// Pack the outputs into a byte, bit 0 = `main_red` through
    /// bit 7 = `side_walk` in field order.
    pub fn to_bits(self) -> u8 {
        [
            self.main_red,
            self.main_yellow,
            self.main_green,
            self.side_red,
            self.side_yellow,
            self.side_green,
            self.main_walk,
            self.side_walk,
        ]
        .iter()
        .rev()
        .fold(0_u8, |acc, &on| acc.wrapping_shl(1) | u8::from(on))
    }
}

/// A committed change of the state register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// State before the commit.
    pub from: SignalState,
    /// State after the commit.
    pub to: SignalState,
}

/// Everything observable after one tick's commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    /// Number of ticks applied since (re)initialization, including this one.
    pub tick: u64,
    /// Committed state.
    pub state: SignalState,
    /// Committed tick count within the state.
    pub phase_ticks: u64,
    /// Set when this tick changed the state register.
    pub transition: Option<PhaseTransition>,
    /// Committed main request latch.
    pub main_latch: bool,
    /// Committed side request latch.
    pub side_latch: bool,
    /// Committed blink flag.
    pub blink: bool,
    /// Whether any input was unknown on this tick.
    pub input_fault: bool,
    /// Composed output lines.
    pub outputs: SignalOutputs,
}

//! Blink generator for the pedestrian walk indicators.
//!
//! Runs only in the closing sub-phases (second green half and yellow of
//! either approach). Anywhere else the flag is held low and the counter
//! cleared on every tick.

use crossing_types::SignalState;

/// Blink flag register and its half-period counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlinkGenerator {
    on: bool,
    count: u64,
}

impl BlinkGenerator {
    /// A stopped generator: flag low, counter zero.
    pub const fn new() -> Self {
        Self { on: false, count: 0 }
    }

    /// Current blink flag.
    pub const fn is_on(self) -> bool {
        self.on
    }

    /// Ticks since the last toggle.
    pub const fn count(self) -> u64 {
        self.count
    }

    /// Compute the register value for the next tick.
    ///
    /// Inside a blink phase the counter advances and the flag toggles each
    /// time it reaches `half`, giving a period of `2 * half` ticks.
    pub const fn on_tick(self, state: SignalState, half: u64) -> Self {
        if !state.is_blink_phase() {
            return Self::new();
        }

        let count = self.count.saturating_add(1);
        if count >= half {
            Self {
                on: !self.on,
                count: 0,
            }
        } else {
            Self { on: self.on, count }
        }
    }
}

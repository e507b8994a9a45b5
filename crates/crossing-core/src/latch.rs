//! Pedestrian request latches.
//!
//! A latch turns a momentary call into a held request. It is set the tick a
//! call is seen high and is only released while the controller sits in the
//! opposing approach's yellow state, after `two - 1` ticks under that
//! condition.
//!
//! The clear counter is never reset when the clearing window ends early. If
//! a call re-arms the latch partway through a yellow phase, the next yellow
//! phase resumes counting from where the previous one stopped, so the
//! release can come sooner than `two - 1` ticks into that window.

use crossing_types::{Approach, InputClass, SignalState};

/// One pedestrian request register and its clear counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestLatch {
    latched: bool,
    clear_count: u64,
}

impl RequestLatch {
    /// An empty latch with a zeroed clear counter.
    pub const fn new() -> Self {
        Self {
            latched: false,
            clear_count: 0,
        }
    }

    /// Build a latch with an explicit register value (useful for tests and
    /// state restoration).
    pub const fn from_parts(latched: bool, clear_count: u64) -> Self {
        Self {
            latched,
            clear_count,
        }
    }

    /// Whether a request is pending.
    pub const fn is_latched(self) -> bool {
        self.latched
    }

    /// Ticks accumulated under the clearing condition.
    pub const fn clear_count(self) -> u64 {
        self.clear_count
    }

    /// Compute the register value for the next tick.
    ///
    /// A high call sets the latch and leaves the counter alone. Otherwise,
    /// while `clear_condition` holds the counter advances and the latch
    /// drops once it reaches `clear_after`. With neither, nothing changes.
    pub const fn on_tick(self, call: InputClass, clear_condition: bool, clear_after: u64) -> Self {
        if call.is_high() {
            return Self {
                latched: true,
                clear_count: self.clear_count,
            };
        }

        if !clear_condition {
            return self;
        }

        let count = self.clear_count.saturating_add(1);
        if count >= clear_after {
            Self {
                latched: false,
                clear_count: 0,
            }
        } else {
            Self {
                latched: self.latched,
                clear_count: count,
            }
        }
    }
}

/// Whether the latch belonging to `approach` may clear in `state`.
///
/// Requests for one approach are served while the other approach runs, so
/// they are released during the other approach's yellow.
pub fn clear_condition(approach: Approach, state: SignalState) -> bool {
    state == approach.opposite().yellow_state()
}

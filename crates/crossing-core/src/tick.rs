//! Tick cycle: the single entry point that advances the controller.
//!
//! Each tick runs in two phases:
//!
//! 1. **Compute** -- take an immutable snapshot of the committed registers
//!    and evaluate every component against it: phase timer, next-state
//!    function, both request latches, and the blink generator. No component
//!    sees a value another component produced on this tick.
//!
//! 2. **Commit** -- replace all registers at once with the computed values,
//!    then compose the outputs from the committed registers and this tick's
//!    input fault flag.
//!
//! An input fault only changes the composed outputs. Timing, transitions,
//! latches, and blink keep advancing underneath so that the correct outputs
//! return on the first tick whose inputs are all valid.

use crossing_types::{
    Approach, PhaseTransition, SignalOutputs, SignalState, TickInputs, TickSummary,
};
use tracing::debug;

use crate::blink::BlinkGenerator;
use crate::config::{ConfigError, ControllerConfig};
use crate::latch::{self, RequestLatch};
use crate::monitor;
use crate::output;
use crate::timing::{self, PhaseDurations};
use crate::transition;

/// Every clocked register of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    /// State register, written only by the transition engine.
    pub state: SignalState,
    /// Ticks spent in `state`, owned by the timing service.
    pub phase_ticks: u64,
    /// Pending request for pedestrians crossing alongside the main approach.
    pub main_latch: RequestLatch,
    /// Pending request for pedestrians crossing alongside the side approach.
    pub side_latch: RequestLatch,
    /// Walk indicator flasher.
    pub blink: BlinkGenerator,
}

impl Registers {
    /// Power-up values: `MainRed`, zero counters, all flags low.
    pub const fn initial() -> Self {
        Self {
            state: SignalState::MainRed,
            phase_ticks: 0,
            main_latch: RequestLatch::new(),
            side_latch: RequestLatch::new(),
            blink: BlinkGenerator::new(),
        }
    }
}

/// The owned controller context passed through the tick cycle.
///
/// Holds the timing configuration, the committed registers, and the fault
/// flag evaluated on the most recent tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerContext {
    durations: PhaseDurations,
    registers: Registers,
    tick: u64,
    input_fault: bool,
}

impl ControllerContext {
    /// Create a controller in its power-up state.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] if the timing configuration
    /// is unusable.
    pub fn new(config: &ControllerConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_durations(PhaseDurations::from_config(config)?))
    }

    /// Create a controller from already validated durations.
    pub const fn with_durations(durations: PhaseDurations) -> Self {
        Self {
            durations,
            registers: Registers::initial(),
            tick: 0,
            input_fault: false,
        }
    }

    /// Return every register, counters, latches, and flags, to power-up values.
    pub const fn reset(&mut self) {
        self.registers = Registers::initial();
        self.tick = 0;
        self.input_fault = false;
    }

    /// Derived phase durations.
    pub const fn durations(&self) -> &PhaseDurations {
        &self.durations
    }

    /// Committed registers.
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Ticks applied since (re)initialization.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Committed state.
    pub const fn state(&self) -> SignalState {
        self.registers.state
    }

    /// Committed tick count within the current state.
    pub const fn phase_ticks(&self) -> u64 {
        self.registers.phase_ticks
    }

    /// Whether a main pedestrian request is pending.
    pub const fn main_latch(&self) -> bool {
        self.registers.main_latch.is_latched()
    }

    /// Whether a side pedestrian request is pending.
    pub const fn side_latch(&self) -> bool {
        self.registers.side_latch.is_latched()
    }

    /// Committed blink flag.
    pub const fn blink(&self) -> bool {
        self.registers.blink.is_on()
    }

    /// Whether any input was unknown on the most recent tick.
    pub const fn input_fault(&self) -> bool {
        self.input_fault
    }

    /// Output lines for the committed registers.
    pub const fn outputs(&self) -> SignalOutputs {
        output::compose(
            self.registers.state,
            self.registers.main_latch.is_latched(),
            self.registers.side_latch.is_latched(),
            self.registers.blink.is_on(),
            self.input_fault,
        )
    }
}

/// Compute the next value of every register from a snapshot.
///
/// This is the pure half of the tick: it reads only `snapshot` and `inputs`
/// and returns a fresh register set.
pub fn compute_next(
    durations: &PhaseDurations,
    snapshot: &Registers,
    inputs: TickInputs,
) -> Registers {
    let timing = timing::step_phase_timer(durations, snapshot.state, snapshot.phase_ticks);

    let state = if timing.phase_complete {
        transition::next_state(
            snapshot.state,
            inputs.sensor_main,
            snapshot.main_latch.is_latched(),
            snapshot.side_latch.is_latched(),
        )
    } else {
        snapshot.state
    };

    let clear_after = durations.latch_clear_ticks();
    let main_latch = snapshot.main_latch.on_tick(
        inputs.main_walk_call,
        latch::clear_condition(Approach::Main, snapshot.state),
        clear_after,
    );
    let side_latch = snapshot.side_latch.on_tick(
        inputs.side_walk_call,
        latch::clear_condition(Approach::Side, snapshot.state),
        clear_after,
    );

    let blink = snapshot.blink.on_tick(snapshot.state, durations.half());

    Registers {
        state,
        phase_ticks: timing.phase_ticks,
        main_latch,
        side_latch,
        blink,
    }
}

/// Advance the controller by one tick.
///
/// This is the main entry point for driving the controller. It evaluates
/// every component against the previously committed registers, commits the
/// results together, and returns a summary of the committed tick.
pub fn advance_tick(ctx: &mut ControllerContext, inputs: TickInputs) -> TickSummary {
    // --- Compute ---
    let snapshot = ctx.registers;
    let next = compute_next(&ctx.durations, &snapshot, inputs);
    let input_fault = monitor::input_fault(inputs);

    // --- Commit ---
    ctx.registers = next;
    ctx.input_fault = input_fault;
    ctx.tick = ctx.tick.saturating_add(1);

    let transition = (snapshot.state != next.state).then_some(PhaseTransition {
        from: snapshot.state,
        to: next.state,
    });
    if let Some(change) = transition {
        debug!(tick = ctx.tick, from = ?change.from, to = ?change.to, "Phase transition");
    }

    TickSummary {
        tick: ctx.tick,
        state: next.state,
        phase_ticks: next.phase_ticks,
        transition,
        main_latch: next.main_latch.is_latched(),
        side_latch: next.side_latch.is_latched(),
        blink: next.blink.is_on(),
        input_fault,
        outputs: ctx.outputs(),
    }
}

//! Tick callback that traces the output lines.
//!
//! Logs every change of the eight output lines at `debug` and, when
//! `trace` is enabled for this target, the full tick summary as a JSON
//! line.

use crossing_core::runner::TickCallback;
use crossing_core::tick::ControllerContext;
use crossing_types::{SignalOutputs, TickSummary};
use tracing::{debug, enabled, trace, warn, Level};

/// Callback that reports output line changes.
#[derive(Debug)]
pub struct OutputTraceCallback {
    last_outputs: SignalOutputs,
    changes: u64,
}

impl OutputTraceCallback {
    /// Create a callback seeded with the controller's current outputs, so the
    /// power-up aspect is not reported as a change.
    pub const fn new(ctx: &ControllerContext) -> Self {
        Self {
            last_outputs: ctx.outputs(),
            changes: 0,
        }
    }

    /// Number of ticks on which at least one output line changed.
    pub const fn changes(&self) -> u64 {
        self.changes
    }
}

impl TickCallback for OutputTraceCallback {
    fn on_tick(&mut self, summary: &TickSummary, _ctx: &ControllerContext) {
        if summary.outputs != self.last_outputs {
            self.changes = self.changes.saturating_add(1);
            debug!(
                tick = summary.tick,
                state = ?summary.state,
                before = %format!("{:08b}", self.last_outputs.to_bits()),
                after = %format!("{:08b}", summary.outputs.to_bits()),
                "Output lines changed"
            );
            self.last_outputs = summary.outputs;
        }

        if enabled!(Level::TRACE) {
            match serde_json::to_string(summary) {
                Ok(line) => trace!(tick = summary.tick, summary = %line, "Tick"),
                Err(e) => warn!(error = %e, "failed to serialize tick summary"),
            }
        }
    }
}

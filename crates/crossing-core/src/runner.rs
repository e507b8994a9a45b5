//! Controller run loop with stop control.
//!
//! This module provides [`run_controller`], the top-level async function
//! that acts as the tick source for a [`ControllerContext`]:
//!
//! - **Bounded run**: stop after `max_ticks`
//! - **Pacing**: sleep `tick_interval_ms` between ticks
//! - **Clean stop**: an external stop request ends the loop between ticks
//! - **Observation**: a [`TickCallback`] sees every committed tick
//!
//! The runner wraps the single-tick [`advance_tick`] function and adds the
//! control plane around it.
//!
//! [`advance_tick`]: crate::tick::advance_tick

use std::sync::atomic::{AtomicBool, Ordering};

use crossing_types::TickSummary;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::stimulus::StimulusSource;
use crate::tick::{self, ControllerContext};

/// Reason why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// A stop was requested through [`RunControl::request_stop`].
    StopRequested,
}

/// Shared run control state.
///
/// Shared between the run loop and whoever may stop it (a signal handler,
/// a callback). The stop flag is atomic so it can be raised through an
/// `Arc` while the loop runs.
#[derive(Debug)]
pub struct RunControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Pacing interval in milliseconds (0 = no pacing).
    tick_interval_ms: u64,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,
}

impl RunControl {
    /// Create run control from the run section of the configuration.
    pub const fn new(config: &RunConfig) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: config.tick_interval_ms,
            max_ticks: config.max_ticks,
        }
    }

    /// Ask the run loop to stop before its next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Pacing interval between ticks.
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Configured tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether `total_ticks` has reached the configured limit.
    pub const fn tick_limit_reached(&self, total_ticks: u64) -> bool {
        self.max_ticks > 0 && total_ticks >= self.max_ticks
    }
}

/// Result of a controller run.
#[derive(Debug)]
pub struct RunResult {
    /// The reason the run ended.
    pub end_reason: RunEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed by this run.
    pub total_ticks: u64,
}

/// Callback invoked after each tick commits.
pub trait TickCallback: Send {
    /// Called with the summary of the tick that just committed.
    fn on_tick(&mut self, summary: &TickSummary, ctx: &ControllerContext);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _ctx: &ControllerContext) {}
}

/// Collects every tick summary of a run.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    /// Summaries in tick order.
    pub summaries: Vec<TickSummary>,
}

impl TickCallback for TraceRecorder {
    fn on_tick(&mut self, summary: &TickSummary, _ctx: &ControllerContext) {
        self.summaries.push(*summary);
    }
}

/// Drive the controller until the tick limit or a stop request.
///
/// Each iteration checks for a stop request, fetches the inputs for the
/// next tick from `stimulus`, advances the controller, notifies
/// `callback`, and sleeps for the configured tick interval.
pub async fn run_controller(
    ctx: &mut ControllerContext,
    stimulus: &mut dyn StimulusSource,
    control: &RunControl,
    callback: &mut dyn TickCallback,
) -> RunResult {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut fault_active = ctx.input_fault();

    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        ticks_per_half_unit = ctx.durations().half(),
        state = ?ctx.state(),
        "Controller run starting"
    );

    loop {
        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!(total_ticks, "Stop requested");
            return RunResult {
                end_reason: RunEndReason::StopRequested,
                final_summary: last_summary,
                total_ticks,
            };
        }

        // --- Execute tick ---
        let inputs = stimulus.inputs_for(ctx.tick().saturating_add(1));
        let summary = tick::advance_tick(ctx, inputs);
        total_ticks = total_ticks.saturating_add(1);

        if let Some(change) = summary.transition {
            info!(tick = summary.tick, from = ?change.from, to = ?change.to, "Phase change");
        }
        if summary.input_fault != fault_active {
            fault_active = summary.input_fault;
            if fault_active {
                warn!(tick = summary.tick, ?inputs, "Invalid input, fail-safe output engaged");
            } else {
                warn!(tick = summary.tick, "Inputs valid again, fail-safe output released");
            }
        }

        // --- Notify callback ---
        callback.on_tick(&summary, ctx);

        // --- Check tick limit (after tick) ---
        if control.tick_limit_reached(total_ticks) {
            info!(
                tick = summary.tick,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            return RunResult {
                end_reason: RunEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            };
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Log the end of a run.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_state = ?result.final_summary.as_ref().map(|s| s.state),
        "Controller run ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            state = ?summary.state,
            main_latch = summary.main_latch,
            side_latch = summary.side_latch,
            output_bits = summary.outputs.to_bits(),
            "Final tick summary"
        );
    } else {
        warn!("Controller run ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use crossing_types::{LineLevel, SignalOutputs, SignalState};

    use super::*;
    use crate::config::{ControllerConfig, CrossingConfig, StimulusEvent};
    use crate::stimulus::{IdleStimulus, ScriptedStimulus};

    fn make_context() -> ControllerContext {
        ControllerContext::new(&ControllerConfig::accelerated()).unwrap()
    }

    fn bounds(max_ticks: u64) -> RunConfig {
        RunConfig {
            max_ticks,
            tick_interval_ms: 0,
        }
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut ctx = make_context();
        let control = RunControl::new(&bounds(5));
        let mut cb = NoOpCallback;

        let result = run_controller(&mut ctx, &mut IdleStimulus, &control, &mut cb).await;

        assert_eq!(result.end_reason, RunEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(ctx.tick(), 5);
        assert_eq!(result.final_summary.map(|s| s.tick), Some(5));
    }

    #[tokio::test]
    async fn stop_before_first_tick() {
        let mut ctx = make_context();
        let control = RunControl::new(&bounds(0));
        control.request_stop();
        let mut cb = NoOpCallback;

        let result = run_controller(&mut ctx, &mut IdleStimulus, &control, &mut cb).await;

        assert_eq!(result.end_reason, RunEndReason::StopRequested);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn callback_can_stop_an_unbounded_run() {
        struct StopAfter {
            control: Arc<RunControl>,
            remaining: u64,
        }
        impl TickCallback for StopAfter {
            fn on_tick(&mut self, _summary: &TickSummary, _ctx: &ControllerContext) {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.control.request_stop();
                }
            }
        }

        let mut ctx = make_context();
        let control = Arc::new(RunControl::new(&bounds(0)));
        let mut cb = StopAfter {
            control: Arc::clone(&control),
            remaining: 12,
        };

        let result = run_controller(&mut ctx, &mut IdleStimulus, &control, &mut cb).await;

        assert_eq!(result.end_reason, RunEndReason::StopRequested);
        assert_eq!(result.total_ticks, 12);
        assert_eq!(result.final_summary.map(|s| s.tick), Some(12));
    }

    #[tokio::test]
    async fn scripted_stimulus_is_indexed_by_tick_number() {
        let mut ctx = make_context();
        let control = RunControl::new(&bounds(3));
        let mut script = ScriptedStimulus::new(vec![StimulusEvent {
            from_tick: 2,
            until_tick: 3,
            sensor_main: None,
            main_walk_call: Some(LineLevel::High),
            side_walk_call: None,
        }])
        .unwrap();
        let mut trace = TraceRecorder::default();

        let _ = run_controller(&mut ctx, &mut script, &control, &mut trace).await;

        let latched: Vec<bool> = trace.summaries.iter().map(|s| s.main_latch).collect();
        assert_eq!(latched, vec![false, true, true]);
        assert!(trace.summaries.iter().all(|s| s.state == SignalState::MainRed));
    }

    #[tokio::test]
    async fn resumed_context_keeps_counting_ticks() {
        let mut ctx = make_context();
        let control = RunControl::new(&bounds(4));
        let mut cb = NoOpCallback;

        let _ = run_controller(&mut ctx, &mut IdleStimulus, &control, &mut cb).await;
        let result = run_controller(&mut ctx, &mut IdleStimulus, &control, &mut cb).await;

        assert_eq!(result.total_ticks, 4);
        assert_eq!(ctx.tick(), 8);
        // MainRed holds for 7 ticks, so tick 7 moved on to SideGreen1.
        assert_eq!(ctx.state(), SignalState::SideGreen1);
    }

    #[tokio::test]
    async fn floating_line_forces_fail_safe_through_the_run_loop() {
        let config = CrossingConfig::parse(
            r"
run:
  max_ticks: 12
stimulus:
  events:
    - from_tick: 9
      until_tick: 11
      side_walk_call: z
    - from_tick: 11
      until_tick: 12
      sensor_main: u
",
        )
        .unwrap();
        let mut ctx = make_context();
        let control = RunControl::new(&config.run);
        let mut script = ScriptedStimulus::from_config(&config.stimulus).unwrap();
        let mut trace = TraceRecorder::default();

        let result = run_controller(&mut ctx, &mut script, &control, &mut trace).await;

        assert_eq!(result.total_ticks, 12);
        for summary in &trace.summaries {
            let faulted = (9..12).contains(&summary.tick);
            assert_eq!(summary.input_fault, faulted, "tick {}", summary.tick);
            if faulted {
                assert_eq!(summary.outputs, SignalOutputs::fail_safe());
            }
        }
        // Tick 12 is back to the side green that started on tick 7.
        let last = result.final_summary.unwrap();
        assert_eq!(last.state, SignalState::SideGreen1);
        assert!(last.outputs.side_green);
    }

    #[test]
    fn run_control_reflects_run_config() {
        let control = RunControl::new(&RunConfig {
            max_ticks: 3,
            tick_interval_ms: 1000,
        });
        assert_eq!(control.tick_interval_ms(), 1000);
        assert_eq!(control.max_ticks(), 3);
        assert!(!control.tick_limit_reached(2));
        assert!(control.tick_limit_reached(3));
        assert!(!control.is_stop_requested());
        control.request_stop();
        assert!(control.is_stop_requested());
    }
}

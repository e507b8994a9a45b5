//! End-to-end tests of the controller's tick cycle.
//!
//! Each test drives a [`ControllerContext`] through `advance_tick` exactly
//! as the runner does and checks the committed summaries.

#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing
)]

use crossing_core::config::ControllerConfig;
use crossing_core::tick::{ControllerContext, advance_tick};
use crossing_types::{InputClass, SignalState, TickInputs, TickSummary};

fn controller(ticks_per_half_unit: u64) -> ControllerContext {
    ControllerContext::new(&ControllerConfig {
        ticks_per_half_unit,
    })
    .unwrap()
}

/// Run-length encode the committed state, counting the power-up state as
/// the first observation.
fn run_lengths(
    ctx: &mut ControllerContext,
    ticks: u64,
    inputs: TickInputs,
) -> Vec<(SignalState, u64)> {
    let mut runs: Vec<(SignalState, u64)> = vec![(ctx.state(), 1)];
    for _ in 0..ticks {
        let summary = advance_tick(ctx, inputs);
        match runs.last_mut() {
            Some((state, len)) if *state == summary.state => *len += 1,
            _ => runs.push((summary.state, 1)),
        }
    }
    runs
}

fn level(high: bool) -> InputClass {
    if high {
        InputClass::High
    } else {
        InputClass::Low
    }
}

fn lamps_lit(red: bool, yellow: bool, green: bool) -> usize {
    [red, yellow, green].into_iter().filter(|on| *on).count()
}

const CYCLE: [SignalState; 8] = [
    SignalState::MainRed,
    SignalState::SideGreen1,
    SignalState::SideGreen2,
    SignalState::SideYellow,
    SignalState::SideRed,
    SignalState::MainGreen1,
    SignalState::MainGreen2,
    SignalState::MainYellow,
];

#[test]
fn one_lamp_per_approach_on_every_valid_tick() {
    let mut ctx = controller(1);
    for tick in 1..=600_u64 {
        let inputs = TickInputs {
            sensor_main: level(tick % 50 < 30),
            main_walk_call: level(tick % 37 == 0),
            side_walk_call: level(tick % 23 == 0),
        };
        let out = advance_tick(&mut ctx, inputs).outputs;
        assert_eq!(lamps_lit(out.main_red, out.main_yellow, out.main_green), 1, "tick {tick}");
        assert_eq!(lamps_lit(out.side_red, out.side_yellow, out.side_green), 1, "tick {tick}");
    }
}

#[test]
fn idle_cycle_visits_states_with_configured_dwell() {
    for half in [1, 3] {
        let mut ctx = controller(half);
        let durations = *ctx.durations();
        let cycle_ticks: u64 = CYCLE.iter().map(|s| durations.dwell_ticks(*s)).sum();

        let runs = run_lengths(&mut ctx, cycle_ticks + 2, TickInputs::idle());

        let expected: Vec<(SignalState, u64)> = CYCLE
            .iter()
            .map(|s| (*s, durations.dwell_ticks(*s)))
            .collect();
        assert_eq!(runs.get(..8).unwrap(), expected.as_slice(), "half = {half}");
        assert_eq!(runs.get(8).map(|r| r.0), Some(SignalState::MainRed));
    }
}

#[test]
fn main_green_one_lasts_eight_units() {
    let mut ctx = controller(1);
    let runs = run_lengths(&mut ctx, 80, TickInputs::idle());
    let green = runs
        .iter()
        .find(|(state, _)| *state == SignalState::MainGreen1)
        .unwrap();
    // Counter climbs 0..=16 before the hand-over commits.
    assert_eq!(green.1, ctx.durations().eight() + 1);
}

#[test]
fn sensor_routes_main_green_through_extension() {
    let mut ctx = controller(1);
    let inputs = TickInputs {
        sensor_main: InputClass::High,
        ..TickInputs::idle()
    };
    let runs = run_lengths(&mut ctx, 90, inputs);
    let states: Vec<SignalState> = runs.iter().map(|r| r.0).collect();

    let position = states
        .iter()
        .position(|s| *s == SignalState::MainGreen1)
        .unwrap();
    assert_eq!(
        states.get(position..position + 4).unwrap(),
        &[
            SignalState::MainGreen1,
            SignalState::MainGreenExtended,
            SignalState::MainGreen2,
            SignalState::MainYellow,
        ]
    );
    let extended = runs.get(position + 1).unwrap();
    assert_eq!(extended.1, ctx.durations().five() + 1);
}

#[test]
fn sensor_outside_main_green_one_has_no_effect() {
    let mut idle = controller(1);
    let mut sensed = controller(1);
    for tick in 1..=150_u64 {
        // MainGreen1 runs ticks 41..=57 and hands over on tick 58, the only
        // tick the sensor is sampled in this window. Keep it low there.
        let sensor = level(!(55..=60).contains(&tick));
        let a = advance_tick(&mut idle, TickInputs::idle());
        let b = advance_tick(
            &mut sensed,
            TickInputs {
                sensor_main: sensor,
                ..TickInputs::idle()
            },
        );
        // The cycle is 68 ticks, so the next hand-over is on tick 126.
        if tick < 126 {
            assert_eq!(a.state, b.state, "tick {tick}");
            assert_eq!(a.outputs, b.outputs, "tick {tick}");
        }
    }
}

#[test]
fn call_is_held_until_served_and_cleared() {
    let mut ctx = controller(1);
    let press = TickInputs {
        main_walk_call: InputClass::High,
        ..TickInputs::idle()
    };

    let first = advance_tick(&mut ctx, press);
    assert!(first.main_latch, "latched on the tick the call is seen");

    let mut summaries: Vec<TickSummary> = vec![first];
    for _ in 0..60 {
        summaries.push(advance_tick(&mut ctx, TickInputs::idle()));
    }

    // MainRed -> SideGreen1 on tick 7, SideGreen2 on 24, SideYellow on 29.
    // Three ticks under the clearing condition (30, 31, 32) release it.
    let dropped = summaries.iter().find(|s| !s.main_latch).unwrap();
    assert_eq!(dropped.tick, 32);
    assert_eq!(dropped.state, SignalState::SideYellow);
    assert!(summaries.iter().take_while(|s| s.tick < 32).all(|s| s.main_latch));

    // Steady walk in the first side green.
    assert!(
        summaries
            .iter()
            .filter(|s| s.state == SignalState::SideGreen1)
            .all(|s| s.outputs.main_walk)
    );

    // Served request stays cleared.
    assert!(summaries.iter().skip_while(|s| s.tick < 32).all(|s| !s.main_latch));
}

#[test]
fn partial_clear_count_shortens_the_next_release() {
    let mut ctx = controller(1);
    let clear_after = ctx.durations().latch_clear_ticks();
    let mut summaries: Vec<TickSummary> = Vec::new();

    for tick in 1..=120_u64 {
        // Latch on tick 1. The first SideYellow is committed on ticks
        // 29..=33, so the clearing condition holds on ticks 30..=34. Two
        // ticks count, then the call is held for the rest of the window.
        let inputs = TickInputs {
            main_walk_call: level(tick == 1 || (32..=34).contains(&tick)),
            ..TickInputs::idle()
        };
        summaries.push(advance_tick(&mut ctx, inputs));
    }

    let yellow_entries: Vec<u64> = summaries
        .iter()
        .filter(|s| s.transition.map(|t| t.to) == Some(SignalState::SideYellow))
        .map(|s| s.tick)
        .collect();
    assert_eq!(yellow_entries[0], 29);
    assert!(
        summaries
            .iter()
            .filter(|s| s.tick <= yellow_entries[1])
            .all(|s| s.main_latch),
        "request survives the first yellow"
    );

    // The leftover count of two completes on the first tick of the next
    // window instead of after `clear_after` ticks.
    let second = yellow_entries[1];
    let dropped = summaries.iter().find(|s| !s.main_latch).unwrap();
    assert_eq!(dropped.tick, second + 1);
    assert!(dropped.tick < second + clear_after);
}

#[test]
fn unknown_input_forces_fail_safe_without_disturbing_registers() {
    let mut reference = controller(1);
    let mut faulted = controller(1);
    let windows = [
        (5_u64, 12_u64, 0_usize),
        (40, 44, 1),
        (60, 61, 2),
    ];

    for tick in 1..=120_u64 {
        let mut inputs = TickInputs::idle();
        let window = windows.iter().find(|(from, until, _)| (*from..*until).contains(&tick));
        if let Some((_, _, line)) = window {
            match line {
                0 => inputs.sensor_main = InputClass::Unknown,
                1 => inputs.main_walk_call = InputClass::Unknown,
                _ => inputs.side_walk_call = InputClass::Unknown,
            }
        }

        let expected = advance_tick(&mut reference, TickInputs::idle());
        let actual = advance_tick(&mut faulted, inputs);

        assert_eq!(faulted.registers(), reference.registers(), "tick {tick}");
        if window.is_some() {
            assert!(actual.input_fault);
            assert_eq!(actual.outputs, crossing_types::SignalOutputs::fail_safe());
        } else {
            assert!(!actual.input_fault);
            assert_eq!(actual.outputs, expected.outputs, "tick {tick}");
        }
    }
}

#[test]
fn fail_safe_clears_on_first_valid_tick() {
    let mut ctx = controller(1);
    for _ in 0..10 {
        let _ = advance_tick(&mut ctx, TickInputs::idle());
    }
    let fault = TickInputs {
        side_walk_call: InputClass::Unknown,
        ..TickInputs::idle()
    };
    let during = advance_tick(&mut ctx, fault);
    assert!(!during.outputs.side_green);

    let after = advance_tick(&mut ctx, TickInputs::idle());
    assert!(!after.input_fault);
    assert_eq!(after.state, SignalState::SideGreen1);
    assert!(after.outputs.side_green);
}

#[test]
fn blink_runs_only_in_closing_phases_with_period_two_half() {
    let half = 2;
    let mut ctx = controller(half);
    let calls = TickInputs {
        main_walk_call: InputClass::High,
        side_walk_call: InputClass::High,
        ..TickInputs::idle()
    };

    let mut prev_state = ctx.state();
    let mut position = 0_u64;
    let mut toggles_seen = 0_u32;
    for tick in 1..=400_u64 {
        // Keep both requests pending so the walk lines follow the flasher.
        let inputs = if tick % 100 == 1 {
            calls
        } else {
            TickInputs::idle()
        };
        let summary = advance_tick(&mut ctx, inputs);

        if prev_state.is_blink_phase() {
            position += 1;
            let expected = (position / half) % 2 == 1;
            assert_eq!(summary.blink, expected, "tick {tick}");
            if position % half == 0 {
                toggles_seen += 1;
            }
        } else {
            position = 0;
            assert!(!summary.blink, "tick {tick}: flag held low outside blink phases");
        }

        let out = summary.outputs;
        match summary.state {
            SignalState::MainGreen2 | SignalState::MainYellow => {
                assert_eq!(out.side_walk, summary.side_latch && summary.blink);
            }
            SignalState::SideGreen2 | SignalState::SideYellow => {
                assert_eq!(out.main_walk, summary.main_latch && summary.blink);
            }
            _ => {}
        }
        prev_state = summary.state;
    }
    assert!(toggles_seen > 0);
}

#[test]
fn reset_returns_to_power_up_cycle() {
    let mut ctx = controller(1);
    let _ = run_lengths(&mut ctx, 45, TickInputs::idle());
    ctx.reset();
    let fresh = controller(1);
    assert_eq!(ctx, fresh);
    assert_eq!(ctx.outputs(), fresh.outputs());
}

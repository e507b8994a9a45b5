//! Input validity monitor.
//!
//! Purely combinational: the fault flag is recomputed from the current
//! inputs on every tick and has no memory of earlier ticks.

use crossing_types::{InputClass, LineLevel, TickInputs};

/// Classify one raw input line.
pub const fn classify(raw: LineLevel) -> InputClass {
    raw.classify()
}

/// Classify the three raw lines sampled on one tick.
pub const fn classify_lines(
    sensor_main: LineLevel,
    main_walk_call: LineLevel,
    side_walk_call: LineLevel,
) -> TickInputs {
    TickInputs {
        sensor_main: classify(sensor_main),
        main_walk_call: classify(main_walk_call),
        side_walk_call: classify(side_walk_call),
    }
}

/// Whether any input is in an undefined condition.
pub const fn input_fault(inputs: TickInputs) -> bool {
    inputs.sensor_main.is_unknown()
        || inputs.main_walk_call.is_unknown()
        || inputs.side_walk_call.is_unknown()
}

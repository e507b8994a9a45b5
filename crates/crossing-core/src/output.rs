//! Output composer.
//!
//! Maps the committed registers and the current fault flag to the eight
//! output lines. Raw inputs never reach this function directly.

use crossing_types::{LightColor, SignalOutputs, SignalState};

/// How a walk indicator is driven in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Off,
    Steady,
    Flashing,
}

impl Walk {
    const fn drive(self, latched: bool, blink: bool) -> bool {
        match self {
            Self::Off => false,
            Self::Steady => latched,
            Self::Flashing => latched && blink,
        }
    }
}

/// Aspects and walk modes for each state: (main, side, main walk, side walk).
const fn aspects(state: SignalState) -> (LightColor, LightColor, Walk, Walk) {
    match state {
        SignalState::MainGreen1 | SignalState::MainGreenExtended => {
            (LightColor::Green, LightColor::Red, Walk::Off, Walk::Steady)
        }
        SignalState::MainGreen2 => (LightColor::Green, LightColor::Red, Walk::Off, Walk::Flashing),
        SignalState::MainYellow => (LightColor::Yellow, LightColor::Red, Walk::Off, Walk::Flashing),
        SignalState::SideGreen1 => (LightColor::Red, LightColor::Green, Walk::Steady, Walk::Off),
        SignalState::SideGreen2 => (LightColor::Red, LightColor::Green, Walk::Flashing, Walk::Off),
        SignalState::SideYellow => (LightColor::Red, LightColor::Yellow, Walk::Flashing, Walk::Off),
        SignalState::MainRed | SignalState::SideRed => {
            (LightColor::Red, LightColor::Red, Walk::Off, Walk::Off)
        }
    }
}

/// Compose the output lines.
///
/// An input fault overrides everything with [`SignalOutputs::fail_safe`].
pub const fn compose(
    state: SignalState,
    main_latch: bool,
    side_latch: bool,
    blink: bool,
    input_fault: bool,
) -> SignalOutputs {
    if input_fault {
        return SignalOutputs::fail_safe();
    }

    let (main, side, main_walk, side_walk) = aspects(state);
    SignalOutputs::from_aspects(
        main,
        side,
        main_walk.drive(main_latch, blink),
        side_walk.drive(side_latch, blink),
    )
}

//! Next-state function of the crossing controller.
//!
//! The function is evaluated every tick but its result is only committed
//! when the timing service reports the current phase complete. It reads the
//! request latches as committed on the previous tick and the vehicle sensor
//! as sampled on this tick.

use crossing_types::{InputClass, SignalState};

/// Successor of `state` once its phase has completed.
///
/// The two red states insert an extra red-red phase for the opposite
/// approach when only the opposite approach has a pending request: from
/// `SideRed` with only the main request latched the controller goes to
/// `MainRed` rather than `MainGreen1`, and symmetrically from `MainRed`.
pub const fn next_state(
    state: SignalState,
    sensor_main: InputClass,
    main_latch: bool,
    side_latch: bool,
) -> SignalState {
    match state {
        SignalState::SideRed => {
            if main_latch && !side_latch {
                SignalState::MainRed
            } else {
                SignalState::MainGreen1
            }
        }
        SignalState::MainRed => {
            if side_latch && !main_latch {
                SignalState::SideRed
            } else {
                SignalState::SideGreen1
            }
        }
        SignalState::MainGreen1 => {
            if sensor_main.is_high() {
                SignalState::MainGreenExtended
            } else {
                SignalState::MainGreen2
            }
        }
        SignalState::MainGreenExtended => SignalState::MainGreen2,
        SignalState::MainGreen2 => SignalState::MainYellow,
        SignalState::MainYellow => SignalState::MainRed,
        SignalState::SideGreen1 => SignalState::SideGreen2,
        SignalState::SideGreen2 => SignalState::SideYellow,
        SignalState::SideYellow => SignalState::SideRed,
    }
}

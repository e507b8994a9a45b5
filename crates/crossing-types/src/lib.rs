//! Shared type definitions for the crossing controller.
//!
//! This crate is the single source of truth for the values that flow in and
//! out of the controller core: the nine signal states, the classified input
//! levels, and the eight output lines.
//!
//! # Modules
//!
//! - [`enums`] -- Signal states, approaches, input classes, and raw line levels
//! - [`structs`] -- Per-tick inputs, composed outputs, and tick summaries

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Approach, InputClass, LightColor, LineLevel, SignalState};
pub use structs::{PhaseTransition, SignalOutputs, TickInputs, TickSummary};

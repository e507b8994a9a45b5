//! Synchronous controller for a two-approach crossing.
//!
//! This crate owns the controller's state machine and its clocked
//! sub-mechanisms, which all advance together on every tick:
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `crossing-config.yaml` into
//!   strongly-typed structs.
//! - [`timing`] -- Derived phase durations and the per-state tick counter.
//! - [`transition`] -- The pure next-state function.
//! - [`latch`] -- Pedestrian request latches with delayed clearing.
//! - [`blink`] -- Walk indicator flasher.
//! - [`monitor`] -- Input classification and the fault flag.
//! - [`output`] -- Output composer, including the fail-safe override.
//! - [`tick`] -- The compute-then-commit tick cycle over an owned
//!   [`ControllerContext`].
//! - [`stimulus`] -- [`StimulusSource`] trait with idle and scripted sources.
//! - [`runner`] -- Async run loop with stop control.
//!
//! [`ControllerContext`]: tick::ControllerContext
//! [`StimulusSource`]: stimulus::StimulusSource

pub mod blink;
pub mod config;
pub mod latch;
pub mod monitor;
pub mod output;
pub mod runner;
pub mod stimulus;
pub mod tick;
pub mod timing;
pub mod transition;

//! Swimwatch - swimmer dwell-time monitoring simulation
//!
//! Swimmers wander a rectangular area split into a fixed grid. Anyone who
//! stays in one cell longer than the alert threshold is flagged and frozen
//! until the alert is dismissed.

pub mod command;
pub mod core;
pub mod ecs;
pub mod entity;
pub mod simulation;
pub mod spatial;

pub use crate::command::Command;
pub use crate::core::{ClearPolicy, Result, SimError, SimulationConfig, VerticalOrigin};
pub use crate::ecs::World;

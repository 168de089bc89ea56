//! Host commands deferred to the next tick boundary
//!
//! Command -> CommandQueue -> CommandExecutor -> CommandResult

pub mod executor;

pub use executor::{CommandExecutor, CommandOutcome, CommandResult};

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::types::{AlertId, EntityId, Vec2};

/// A user-triggered change to the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Spawn(Option<Vec2>),
    Remove(EntityId),
    RemoveNewest,
    Reset,
    SetSpeedFactor(f32),
    DismissAlert(AlertId),
    ClearAlerts,
    Resize { width: f32, height: f32 },
}

/// FIFO of commands waiting for the next tick
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

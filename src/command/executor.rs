//! Command execution - applies host commands to the world

use crate::command::Command;
use crate::core::error::{Result, SimError};
use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::simulation::alert::Dismissal;

/// Applies commands to a world, one at a time
pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute a single command immediately
    pub fn execute(world: &mut World, command: &Command) -> Result<CommandOutcome> {
        match command {
            Command::Spawn(position) => world.spawn(*position).map(CommandOutcome::Spawned),
            Command::Remove(id) => world.remove(*id).map(|s| CommandOutcome::Removed(s.id)),
            Command::RemoveNewest => Ok(CommandOutcome::RemovedNewest(
                world.remove_newest().map(|s| s.id),
            )),
            Command::Reset => {
                world.reset();
                Ok(CommandOutcome::Reset)
            }
            Command::SetSpeedFactor(factor) => world
                .set_speed_factor(*factor)
                .map(|_| CommandOutcome::SpeedFactorSet(*factor)),
            Command::DismissAlert(id) => world.dismiss_alert(*id).map(CommandOutcome::Dismissed),
            Command::ClearAlerts => Ok(CommandOutcome::AlertsCleared(world.clear_alerts())),
            Command::Resize { width, height } => {
                world.resize(*width, *height).map(|_| CommandOutcome::Resized)
            }
        }
    }

    /// Run every queued command in submission order
    pub fn drain(world: &mut World) -> Vec<CommandResult> {
        let mut results = Vec::with_capacity(world.commands.len());
        while let Some(command) = world.commands.pop() {
            let outcome = Self::execute(world, &command);
            if let Err(e) = &outcome {
                tracing::debug!("Command {:?} failed: {}", command, e);
            }
            results.push(CommandResult { command, outcome });
        }
        results
    }
}

/// What a successful command did
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Spawned(EntityId),
    Removed(EntityId),
    RemovedNewest(Option<EntityId>),
    Reset,
    SpeedFactorSet(f32),
    Dismissed(Dismissal),
    AlertsCleared(Vec<Dismissal>),
    Resized,
}

/// Result of executing a queued command
#[derive(Debug)]
pub struct CommandResult {
    pub command: Command,
    pub outcome: std::result::Result<CommandOutcome, SimError>,
}

impl CommandResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::{AlertId, Vec2};

    fn world() -> World {
        World::new(SimulationConfig {
            initial_population: 0,
            max_population: 2,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_execute_spawn_and_remove() {
        let mut world = world();
        let outcome =
            CommandExecutor::execute(&mut world, &Command::Spawn(Some(Vec2::new(50.0, 50.0))))
                .unwrap();
        let CommandOutcome::Spawned(id) = outcome else {
            panic!("expected spawn");
        };
        assert_eq!(
            CommandExecutor::execute(&mut world, &Command::Remove(id)).unwrap(),
            CommandOutcome::Removed(id)
        );
    }

    #[test]
    fn test_drain_preserves_order_and_reports_failures() {
        let mut world = world();
        world.submit(Command::Spawn(None));
        world.submit(Command::Spawn(None));
        world.submit(Command::Spawn(None));
        world.submit(Command::DismissAlert(AlertId(7)));

        let results = CommandExecutor::drain(&mut world);
        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok() && results[1].is_ok());
        assert!(matches!(
            results[2].outcome,
            Err(SimError::MaxPopulationReached { max: 2 })
        ));
        assert!(matches!(results[3].outcome, Err(SimError::AlertNotFound(AlertId(7)))));
        assert!(world.commands.is_empty());
    }
}

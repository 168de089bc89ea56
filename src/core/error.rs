use thiserror::Error;

use crate::core::types::{AlertId, EntityId};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Max population reached ({max})")]
    MaxPopulationReached { max: usize },

    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Alert not found: {0}")]
    AlertNotFound(AlertId),

    #[error("Invalid bounds {width}x{height} for margin {margin}")]
    InvalidBounds { width: f32, height: f32, margin: f32 },

    #[error("Invalid position ({x}, {y})")]
    InvalidPosition { x: f32, y: f32 },

    #[error("Speed factor must be positive, got {0}")]
    InvalidSpeedFactor(f32),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl SimError {
    /// True for errors that refer to an id that no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntityNotFound(_) | Self::AlertNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

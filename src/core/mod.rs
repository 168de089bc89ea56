pub mod config;
pub mod error;
pub mod types;

pub use config::{ClearPolicy, SimulationConfig, VerticalOrigin};
pub use error::{Result, SimError};

pub mod swimmer;

pub use swimmer::{AlertStatus, MotionStatus, Swimmer, SwimmerPool};

pub mod alert;
pub mod clock;
pub mod dwell;
pub mod log;
pub mod motion;
pub mod tick;

pub use alert::{Alert, AlertCause, AlertLog, Dismissal};
pub use clock::{Periodic, Scheduler};
pub use log::{StatusLine, StatusLog};
pub use tick::{run_simulation_tick, MovedSwimmer, TickReport};

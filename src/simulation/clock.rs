//! Host-driven scheduling of the periodic activities
//!
//! Nothing here runs on its own: the host calls `run_simulation_tick` with
//! its clock, and the scheduler decides which periodic activities are due.

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::Millis;

/// Fixed-interval timer anchored at the first time it is polled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Periodic {
    pub interval: Millis,
    next_due: Option<Millis>,
}

impl Periodic {
    pub fn new(interval: Millis) -> Self {
        Self {
            interval: interval.max(1),
            next_due: None,
        }
    }

    /// True if the timer fired at `now`
    ///
    /// Fires at most once per poll. After a long gap the schedule skips
    /// ahead instead of firing a burst of catch-up events.
    pub fn poll(&mut self, now: Millis) -> bool {
        match self.next_due {
            None => {
                self.next_due = Some(now + self.interval);
                false
            }
            Some(due) if now >= due => {
                let behind = (now - due) / self.interval;
                self.next_due = Some(due + (behind + 1) * self.interval);
                true
            }
            Some(_) => false,
        }
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.next_due
    }

    pub fn reset(&mut self) {
        self.next_due = None;
    }
}

/// Which periodic activities fire on this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Due {
    pub motion: bool,
    pub status_log: bool,
    pub anomaly_scan: bool,
}

/// The three periodic activities, each independently switchable
#[derive(Debug, Clone)]
pub struct Scheduler {
    motion_enabled: bool,
    status_log: Option<Periodic>,
    anomaly_scan: Option<Periodic>,
    last_tick: Option<Millis>,
}

impl Scheduler {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            motion_enabled: true,
            status_log: Some(Periodic::new(config.status_log_interval_ms)),
            anomaly_scan: config.anomaly_scan_interval_ms.map(Periodic::new),
            last_tick: None,
        }
    }

    /// Work out what is due at `now` and advance the timers
    pub fn due(&mut self, now: Millis) -> Due {
        self.last_tick = Some(now);
        Due {
            motion: self.motion_enabled,
            status_log: self.status_log.as_mut().map_or(false, |t| t.poll(now)),
            anomaly_scan: self.anomaly_scan.as_mut().map_or(false, |t| t.poll(now)),
        }
    }

    /// `now` of the most recent tick
    pub fn last_tick(&self) -> Option<Millis> {
        self.last_tick
    }

    pub fn set_motion_enabled(&mut self, enabled: bool) {
        self.motion_enabled = enabled;
    }

    pub fn set_status_log_interval(&mut self, interval: Option<Millis>) {
        self.status_log = interval.map(Periodic::new);
    }

    pub fn set_anomaly_scan_interval(&mut self, interval: Option<Millis>) {
        self.anomaly_scan = interval.map(Periodic::new);
    }

    /// Re-anchor every timer at the next tick
    pub fn reset(&mut self) {
        if let Some(t) = self.status_log.as_mut() {
            t.reset();
        }
        if let Some(t) = self.anomaly_scan.as_mut() {
            t.reset();
        }
    }
}

//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, SimError};
use crate::core::types::{Bounds, Millis};

/// Which edge of the area the vertical coordinate is measured from
///
/// Row 0 of the grid is always the topmost display row. When `y` grows
/// upward from the bottom edge the row index has to be inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalOrigin {
    /// `y = 0` is the bottom edge, `y` grows upward
    #[default]
    Bottom,
    /// `y = 0` is the top edge, `y` grows downward (screen convention)
    Top,
}

/// What happens to a swimmer when its alert is dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearPolicy {
    /// Same swimmer resumes moving with a fresh random heading
    #[default]
    Resume,
    /// Swimmer is removed and a new one spawns near its last position
    Replace,
}

/// Configuration for the simulation systems
///
/// Every field has a default, so a TOML file only needs the values it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === AREA & GRID ===
    /// Initial area width (units, usually pixels)
    pub width: f32,

    /// Initial area height
    pub height: f32,

    /// Number of grid rows (row 0 is the top row)
    pub rows: u32,

    /// Number of grid columns (column 0 is the left column)
    pub cols: u32,

    /// Distance swimmers keep from every edge
    ///
    /// Positions are clamped into `[margin, bound - margin]` after every update.
    /// The area must be wider and taller than `2 * margin`.
    pub margin: f32,

    /// Vertical coordinate convention for positions
    pub vertical_origin: VerticalOrigin,

    // === POPULATION ===
    /// Hard cap on live swimmers; spawns beyond it are rejected
    pub max_population: usize,

    /// Swimmers spawned at startup and after every reset
    pub initial_population: usize,

    // === ALERTS ===
    /// Continuous dwell in one cell that raises an alert (ms)
    ///
    /// The comparison is strict: dwell must *exceed* the threshold.
    pub alert_threshold_ms: Millis,

    /// Per-tick probability that a normal swimmer raises a spontaneous alert
    ///
    /// 0.0 disables spontaneous alerts entirely.
    pub spontaneous_alert_chance: f64,

    /// Interval of the anomaly scan, `None` disables it
    ///
    /// Each scan flags one random normal swimmer with probability `anomaly_chance`.
    pub anomaly_scan_interval_ms: Option<Millis>,

    /// Probability that an anomaly scan flags someone
    pub anomaly_chance: f64,

    /// How a dismissed alert is resolved
    pub clear_policy: ClearPolicy,

    /// Whether a cell change clears an outstanding alert
    ///
    /// Alerted swimmers are frozen, so this only matters when a resize
    /// re-clamps a frozen swimmer into a different cell.
    pub clear_alert_on_cell_change: bool,

    /// Max distance of a replacement swimmer from the one it replaces
    pub respawn_radius: f32,

    // === MOTION ===
    /// Lower bound of a randomly drawn base speed (units/s)
    pub speed_min: f32,

    /// Upper bound of a randomly drawn base speed (units/s)
    pub speed_max: f32,

    /// Global multiplier applied to every drawn speed
    ///
    /// Changing it at runtime only affects draws made afterwards.
    pub speed_factor: f32,

    /// How often each swimmer redraws its speed (ms)
    pub speed_redraw_interval_ms: Millis,

    /// Shortest stretch of movement before pausing (ms)
    pub move_duration_min_ms: Millis,

    /// Longest stretch of movement before pausing (ms)
    pub move_duration_max_ms: Millis,

    /// Shortest pause (ms)
    pub pause_duration_min_ms: Millis,

    /// Longest pause (ms)
    pub pause_duration_max_ms: Millis,

    /// Per-tick probability of a small random heading change
    pub wander_chance: f64,

    /// Max magnitude of a wander heading change (radians)
    pub wander_max_delta: f32,

    /// Max random angle added on a wall bounce (radians)
    ///
    /// Keeps a swimmer from sliding along a wall forever at a grazing angle.
    pub reflect_jitter: f32,

    // === LOGGING ===
    /// Interval between realtime status lines (ms)
    pub status_log_interval_ms: Millis,

    /// Max retained status lines; oldest are evicted first
    pub max_log_entries: usize,

    // === DETERMINISM ===
    /// Seed for the simulation RNG
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Area
            width: 400.0,
            height: 300.0,
            rows: 4,
            cols: 2,
            margin: 20.0,
            vertical_origin: VerticalOrigin::Bottom,

            // Population
            max_population: 10,
            initial_population: 1,

            // Alerts
            alert_threshold_ms: 10_000,
            spontaneous_alert_chance: 0.0,
            anomaly_scan_interval_ms: None,
            anomaly_chance: 0.5,
            clear_policy: ClearPolicy::Resume,
            clear_alert_on_cell_change: true,
            respawn_radius: 10.0,

            // Motion
            speed_min: 20.0,
            speed_max: 60.0,
            speed_factor: 1.5,
            speed_redraw_interval_ms: 10_000,
            move_duration_min_ms: 3_000,
            move_duration_max_ms: 8_000,
            pause_duration_min_ms: 1_000,
            pause_duration_max_ms: 3_000,
            wander_chance: 0.05,
            wander_max_delta: 0.25,
            reflect_jitter: 0.1,

            // Logging
            status_log_interval_ms: 5_000,
            max_log_entries: 20,

            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial area bounds
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.margin < 0.0 || !self.margin.is_finite() {
            return Err(format!("margin ({}) must be a non-negative number", self.margin));
        }

        if !self.bounds().fits_margin(self.margin) {
            return Err(format!(
                "area {}x{} is too small for margin {}",
                self.width, self.height, self.margin
            ));
        }

        if self.rows == 0 || self.cols == 0 {
            return Err("grid must have at least one row and one column".into());
        }

        // Column labels are single letters
        if self.cols > 26 {
            return Err(format!("cols ({}) must be <= 26", self.cols));
        }

        if self.initial_population > self.max_population {
            return Err(format!(
                "initial_population ({}) exceeds max_population ({})",
                self.initial_population, self.max_population
            ));
        }

        for (name, v) in [
            ("speed_min", self.speed_min),
            ("speed_max", self.speed_max),
            ("wander_max_delta", self.wander_max_delta),
            ("reflect_jitter", self.reflect_jitter),
            ("respawn_radius", self.respawn_radius),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(format!("{} ({}) must be a non-negative number", name, v));
            }
        }

        if self.speed_min > self.speed_max {
            return Err(format!(
                "speed range [{}, {}] is invalid",
                self.speed_min, self.speed_max
            ));
        }

        if self.speed_factor <= 0.0 || !self.speed_factor.is_finite() {
            return Err(format!("speed_factor ({}) must be positive", self.speed_factor));
        }

        if self.move_duration_min_ms > self.move_duration_max_ms
            || self.pause_duration_min_ms > self.pause_duration_max_ms
        {
            return Err("duration ranges must have min <= max".into());
        }

        for (name, p) in [
            ("spontaneous_alert_chance", self.spontaneous_alert_chance),
            ("anomaly_chance", self.anomaly_chance),
            ("wander_chance", self.wander_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{} ({}) must be within [0, 1]", name, p));
            }
        }

        if self.status_log_interval_ms == 0 || self.anomaly_scan_interval_ms == Some(0) {
            return Err("periodic intervals must be non-zero".into());
        }

        if self.max_log_entries == 0 {
            return Err("max_log_entries must be at least 1".into());
        }

        Ok(())
    }

    /// Load a config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate a config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate().map_err(SimError::InvalidConfig)?;
        Ok(config)
    }
}

//! Gameplay tunables
//!
//! One `Config` lives inside the running game. Slider input mutates it in
//! place; the simulation reads it fresh every frame.

use serde::{Deserialize, Serialize};

/// Live gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Downward acceleration per frame while airborne
    pub gravity: f32,
    /// Scroll speed added per frame
    pub speed_increment: f32,
    /// Minimum wall-clock gap between obstacle spawns (ms)
    pub obstacle_frequency_ms: u32,
    /// Scroll speed at the start of a run
    pub initial_speed: f32,
    /// Scroll speed cap
    pub max_speed: f32,
    /// Vertical velocity applied on jump (negative = up)
    pub jump_force: f32,
    /// Height of the ground strip below the ground line
    pub ground_height: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gravity: 0.6,
            speed_increment: 0.004,
            obstacle_frequency_ms: 1500,
            initial_speed: 6.0,
            max_speed: 16.0,
            jump_force: -12.0,
            ground_height: 30.0,
        }
    }
}

/// The four tunables exposed as sliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tunable {
    Gravity,
    SpeedIncrement,
    ObstacleFrequency,
    InitialSpeed,
}

impl Tunable {
    pub const ALL: [Tunable; 4] = [
        Tunable::Gravity,
        Tunable::SpeedIncrement,
        Tunable::ObstacleFrequency,
        Tunable::InitialSpeed,
    ];

    /// Slider range (min, max)
    pub fn range(&self) -> (f64, f64) {
        match self {
            Tunable::Gravity => (0.2, 1.5),
            Tunable::SpeedIncrement => (0.0, 0.02),
            Tunable::ObstacleFrequency => (500.0, 4000.0),
            Tunable::InitialSpeed => (2.0, 12.0),
        }
    }

    /// Slider step
    pub fn step(&self) -> f64 {
        match self {
            Tunable::Gravity => 0.1,
            Tunable::SpeedIncrement => 0.001,
            Tunable::ObstacleFrequency => 100.0,
            Tunable::InitialSpeed => 1.0,
        }
    }

    /// DOM id fragment: `<engine>_<slider_id>Slider` / `<engine>_<slider_id>Value`
    pub fn slider_id(&self) -> &'static str {
        match self {
            Tunable::Gravity => "gravity",
            Tunable::SpeedIncrement => "speed",
            Tunable::ObstacleFrequency => "obstacle",
            Tunable::InitialSpeed => "initSpeed",
        }
    }

    /// Decimal places matching the slider step
    pub fn decimals(&self) -> usize {
        match self {
            Tunable::Gravity => 1,
            Tunable::SpeedIncrement => 3,
            Tunable::ObstacleFrequency | Tunable::InitialSpeed => 0,
        }
    }

    /// Label text shown next to the slider
    pub fn format_value(&self, value: f64) -> String {
        let text = format!("{:.*}", self.decimals(), value);
        match self {
            Tunable::ObstacleFrequency => format!("{}ms", text),
            _ => text,
        }
    }
}

impl Config {
    /// Apply a slider value. Out-of-range values are clamped, non-finite
    /// values are rejected and leave the config untouched.
    pub fn set_tunable(&mut self, tunable: Tunable, value: f64) -> bool {
        if !value.is_finite() {
            log::warn!("Ignoring non-finite value for {:?}", tunable);
            return false;
        }
        let (min, max) = tunable.range();
        let value = value.clamp(min, max);
        match tunable {
            Tunable::Gravity => self.gravity = value as f32,
            Tunable::SpeedIncrement => self.speed_increment = value as f32,
            Tunable::ObstacleFrequency => self.obstacle_frequency_ms = value.round() as u32,
            Tunable::InitialSpeed => self.initial_speed = value as f32,
        }
        log::debug!("{:?} set to {}", tunable, value);
        true
    }

    /// Current value of a slider-backed tunable
    pub fn tunable(&self, tunable: Tunable) -> f64 {
        match tunable {
            Tunable::Gravity => self.gravity as f64,
            Tunable::SpeedIncrement => self.speed_increment as f64,
            Tunable::ObstacleFrequency => self.obstacle_frequency_ms as f64,
            Tunable::InitialSpeed => self.initial_speed as f64,
        }
    }

    /// Subset of the config reported with each run
    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            gravity: self.gravity,
            speed_increment: self.speed_increment,
            obstacle_frequency: self.obstacle_frequency_ms,
            initial_speed: self.initial_speed,
        }
    }
}

/// Settings embedded in the results payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub gravity: f32,
    pub speed_increment: f32,
    pub obstacle_frequency: u32,
    pub initial_speed: f32,
}

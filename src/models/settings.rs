use super::SimulationKey;
use crate::validation;
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One snapshot of the activity settings, read once per cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivitySettings {
    pub interval_seconds: u32,
    pub mouse_movement_enabled: bool,
    pub mouse_movement_distance: i32,
    pub keyboard_simulation_enabled: bool,
    pub simulation_key: SimulationKey,
    pub key_press_duration_ms: u32,
}

impl Default for ActivitySettings {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
            mouse_movement_enabled: true,
            mouse_movement_distance: 1,
            keyboard_simulation_enabled: true,
            simulation_key: SimulationKey::Shift,
            key_press_duration_ms: 100,
        }
    }
}

impl ActivitySettings {
    /// Interval between cycles. Never zero.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_seconds.max(1)))
    }

    pub fn key_press_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.key_press_duration_ms))
    }

    /// Replace every out-of-range field with its default, logging each one.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if let Err(e) = validation::validate_interval_seconds(self.interval_seconds) {
            warn!("{e}, using {}", defaults.interval_seconds);
            self.interval_seconds = defaults.interval_seconds;
        }
        if let Err(e) = validation::validate_mouse_distance(self.mouse_movement_distance) {
            warn!("{e}, using {}", defaults.mouse_movement_distance);
            self.mouse_movement_distance = defaults.mouse_movement_distance;
        }
        if let Err(e) = validation::validate_key_press_duration(self.key_press_duration_ms) {
            warn!("{e}, using {}", defaults.key_press_duration_ms);
            self.key_press_duration_ms = defaults.key_press_duration_ms;
        }

        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default log filter for the binary when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Everything stored in the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub activity: ActivitySettings,
    pub logging: LoggingSettings,
}

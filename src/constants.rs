// src/constants.rs

use std::time::Duration;

/// Longest accepted activity interval in seconds (24 hours)
pub const MAX_INTERVAL_SECS: u32 = 24 * 60 * 60;

/// Largest pointer nudge in pixels, in either direction
pub const MAX_MOUSE_DISTANCE: i32 = 500;

/// Longest accepted key hold in milliseconds
pub const MAX_KEY_PRESS_MS: u32 = 5000;

/// Pause after each pointer move so the session registers it
pub const POINTER_SETTLE: Duration = Duration::from_millis(250);

/// Granularity at which the interval wait observes a stop request
pub const DEFAULT_WAIT_UNIT: Duration = Duration::from_secs(1);

/// How long `stop()` blocks waiting for the worker to exit
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Name given to the worker thread
pub const WORKER_THREAD_NAME: &str = "activity-simulator";

/// Config file name inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "antiidle-config.json";

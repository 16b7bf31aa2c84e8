use crate::constants::{MAX_INTERVAL_SECS, MAX_KEY_PRESS_MS, MAX_MOUSE_DISTANCE};
use crate::error::AppError;
use crate::models::ActivitySettings;

/// Validate the interval between activity cycles.
pub fn validate_interval_seconds(interval_seconds: u32) -> Result<(), AppError> {
    if interval_seconds == 0 {
        return Err(AppError::InvalidInput {
            field: "interval_seconds",
            reason: "must be positive".into(),
        });
    }
    if interval_seconds > MAX_INTERVAL_SECS {
        return Err(AppError::InvalidInput {
            field: "interval_seconds",
            reason: format!("cannot exceed {MAX_INTERVAL_SECS} seconds"),
        });
    }
    Ok(())
}

/// Validate the pointer nudge distance in pixels.
pub fn validate_mouse_distance(distance: i32) -> Result<(), AppError> {
    if distance.unsigned_abs() > MAX_MOUSE_DISTANCE.unsigned_abs() {
        return Err(AppError::InvalidInput {
            field: "mouse_movement_distance",
            reason: format!("must be within ±{MAX_MOUSE_DISTANCE} pixels"),
        });
    }
    Ok(())
}

/// Validate how long the simulated key is held.
pub fn validate_key_press_duration(duration_ms: u32) -> Result<(), AppError> {
    if duration_ms > MAX_KEY_PRESS_MS {
        return Err(AppError::InvalidInput {
            field: "key_press_duration_ms",
            reason: format!("cannot exceed {MAX_KEY_PRESS_MS} ms"),
        });
    }
    Ok(())
}

pub fn validate_activity_settings(settings: &ActivitySettings) -> Result<(), AppError> {
    validate_interval_seconds(settings.interval_seconds)?;
    validate_mouse_distance(settings.mouse_movement_distance)?;
    validate_key_press_duration(settings.key_press_duration_ms)
}

/// Validate a log filter directive from the config file.
pub fn validate_log_level(level: &str) -> Result<(), AppError> {
    if level.trim().is_empty() {
        return Err(AppError::InvalidInput {
            field: "log_level",
            reason: "cannot be empty".into(),
        });
    }
    Ok(())
}

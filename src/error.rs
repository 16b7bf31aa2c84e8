use thiserror::Error;

/// Configuration and validation errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of the platform input-injection capability.
///
/// Returned from a constructor this is an initialization failure; returned from
/// an individual operation during a cycle it is recoverable.
#[derive(Debug, Error)]
pub enum InjectorError {
    #[error("Input injection unavailable: {0}")]
    Unavailable(String),

    #[error("Input injection is not supported on this platform")]
    Unsupported,

    #[error("Key {0} has no mapping on this keyboard")]
    UnmappedKey(&'static str),

    #[error("Pointer offset {0} is out of range")]
    OutOfRange(i32),

    #[error("Input protocol error: {0}")]
    Protocol(String),
}

/// Errors surfaced by [`crate::simulator::ActivitySimulator`]
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Failed to initialize input simulation: {0}")]
    Initialization(#[from] InjectorError),

    #[error("Previous worker has not exited yet")]
    WorkerStillExiting,

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(std::io::Error),
}

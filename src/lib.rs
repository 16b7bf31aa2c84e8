pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod platform;
pub mod simulator;
#[cfg(test)]
mod test_utils;
pub mod validation;

pub use config::{ConfigStore, OverlaySettings, SettingsOverrides, SettingsSource, SharedSettings};
pub use error::{AppError, InjectorError, SimulatorError};
pub use models::{ActivitySettings, ActivityStats, AppConfig, SimulationKey, SimulationState};
pub use platform::InputInjector;
pub use simulator::{ActivitySimulator, SimulatorConfig, StopOutcome};

use log::warn;
use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering from poisoning if necessary
pub(crate) fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

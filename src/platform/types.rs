use crate::error::InjectorError;
use crate::models::SimulationKey;
use std::thread;
use std::time::Duration;

/// OS-level capability to synthesize pointer and keyboard events.
///
/// Every operation may fail; the simulator treats those failures as
/// recoverable and carries on with the next step.
pub trait InputInjector: Send + Sync {
    fn pointer_position(&self) -> Result<(i32, i32), InjectorError>;

    /// Move the pointer relative to its current position.
    fn move_pointer(&self, dx: i32, dy: i32) -> Result<(), InjectorError>;

    fn key_down(&self, key: SimulationKey) -> Result<(), InjectorError>;

    fn key_up(&self, key: SimulationKey) -> Result<(), InjectorError>;

    fn pause(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

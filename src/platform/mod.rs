pub mod types;

pub use types::InputInjector;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "macos")]
pub use macos::MacOSInjector as NativeInjector;

#[cfg(target_os = "linux")]
pub use linux::LinuxInjector as NativeInjector;

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
use crate::{error::InjectorError, models::SimulationKey};

// Other platforms cannot inject input; construction fails up front
#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub struct NativeInjector;

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
impl NativeInjector {
    pub fn new() -> Result<Self, InjectorError> {
        Err(InjectorError::Unsupported)
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
impl InputInjector for NativeInjector {
    fn pointer_position(&self) -> Result<(i32, i32), InjectorError> {
        Err(InjectorError::Unsupported)
    }

    fn move_pointer(&self, _dx: i32, _dy: i32) -> Result<(), InjectorError> {
        Err(InjectorError::Unsupported)
    }

    fn key_down(&self, _key: SimulationKey) -> Result<(), InjectorError> {
        Err(InjectorError::Unsupported)
    }

    fn key_up(&self, _key: SimulationKey) -> Result<(), InjectorError> {
        Err(InjectorError::Unsupported)
    }
}

pub mod store;

pub use store::ConfigStore;

use crate::models::{ActivitySettings, SimulationKey};
use std::sync::{Arc, PoisonError, RwLock};

/// Supplies the settings for each activity cycle.
///
/// Implementations must return a consistent snapshot: all fields read under one
/// lock, never torn across a concurrent update.
pub trait SettingsSource: Send + Sync {
    fn current_settings(&self) -> ActivitySettings;
}

/// In-memory settings that can be changed while a simulator is running.
#[derive(Debug, Default)]
pub struct SharedSettings {
    inner: RwLock<ActivitySettings>,
}

impl SharedSettings {
    pub fn new(settings: ActivitySettings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    pub fn get(&self) -> ActivitySettings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, settings: ActivitySettings) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }

    /// Apply `f` to the settings under a single write lock.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut ActivitySettings),
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

impl SettingsSource for SharedSettings {
    fn current_settings(&self) -> ActivitySettings {
        self.get()
    }
}

/// Values that replace the corresponding fields of every snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub interval_seconds: Option<u32>,
    pub simulation_key: Option<SimulationKey>,
    pub mouse_movement_enabled: Option<bool>,
    pub keyboard_simulation_enabled: Option<bool>,
}

impl SettingsOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, mut settings: ActivitySettings) -> ActivitySettings {
        if let Some(interval) = self.interval_seconds {
            settings.interval_seconds = interval;
        }
        if let Some(key) = self.simulation_key {
            settings.simulation_key = key;
        }
        if let Some(enabled) = self.mouse_movement_enabled {
            settings.mouse_movement_enabled = enabled;
        }
        if let Some(enabled) = self.keyboard_simulation_enabled {
            settings.keyboard_simulation_enabled = enabled;
        }
        settings
    }
}

/// A source whose snapshots are the base source's with overrides applied.
///
/// The base is still consulted on every call, so edits to it show up in the
/// next cycle for any field that is not overridden.
pub struct OverlaySettings {
    base: Arc<dyn SettingsSource>,
    overrides: SettingsOverrides,
}

impl OverlaySettings {
    pub fn new(base: Arc<dyn SettingsSource>, overrides: SettingsOverrides) -> Self {
        Self { base, overrides }
    }
}

impl SettingsSource for OverlaySettings {
    fn current_settings(&self) -> ActivitySettings {
        self.overrides.apply(self.base.current_settings())
    }
}

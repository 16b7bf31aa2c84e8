//! Shared test doubles for AntiIdle.
//!
//! `RecordingInjector` stands in for the platform injector and records every
//! event instead of touching the real display. `RecordingSettings` records who
//! asked for settings and how often.

#![cfg(test)]

use crate::config::{SettingsSource, SharedSettings};
use crate::error::InjectorError;
use crate::models::{ActivitySettings, SimulationKey};
use crate::platform::InputInjector;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedEvent {
    Move(i32, i32),
    KeyDown(SimulationKey),
    KeyUp(SimulationKey),
    Pause(Duration),
}

#[derive(Default)]
struct PointerState {
    position: (i32, i32),
    bounds: Option<(i32, i32)>,
    events: Vec<InjectedEvent>,
}

/// Injector double. Pauses are recorded but do not sleep.
#[derive(Default)]
pub struct RecordingInjector {
    state: Mutex<PointerState>,
    fail_mouse: AtomicBool,
    fail_keyboard: AtomicBool,
    panic_on_move: AtomicBool,
    key_down_stall: Mutex<Duration>,
    key_down_entered: AtomicBool,
}

impl RecordingInjector {
    pub fn at(x: i32, y: i32) -> Self {
        let injector = Self::default();
        injector.state.lock().unwrap().position = (x, y);
        injector
    }

    /// Clamp the pointer to a `width` x `height` screen.
    pub fn with_bounds(self, width: i32, height: i32) -> Self {
        self.state.lock().unwrap().bounds = Some((width, height));
        self
    }

    pub fn fail_mouse(&self, fail: bool) {
        self.fail_mouse.store(fail, Ordering::SeqCst);
    }

    pub fn fail_keyboard(&self, fail: bool) {
        self.fail_keyboard.store(fail, Ordering::SeqCst);
    }

    pub fn panic_on_move(&self, panic: bool) {
        self.panic_on_move.store(panic, Ordering::SeqCst);
    }

    /// Make every `key_down` really block for `stall`.
    pub fn stall_key_down(&self, stall: Duration) {
        *self.key_down_stall.lock().unwrap() = stall;
    }

    pub fn key_down_entered(&self) -> bool {
        self.key_down_entered.load(Ordering::SeqCst)
    }

    pub fn position(&self) -> (i32, i32) {
        self.state.lock().unwrap().position
    }

    pub fn events(&self) -> Vec<InjectedEvent> {
        self.state.lock().unwrap().events.clone()
    }

    fn count(&self, pred: impl Fn(&InjectedEvent) -> bool) -> usize {
        self.state.lock().unwrap().events.iter().filter(|e| pred(e)).count()
    }

    pub fn moves(&self) -> usize {
        self.count(|e| matches!(e, InjectedEvent::Move(..)))
    }

    /// Completed nudge-and-return pairs.
    pub fn mouse_cycles(&self) -> usize {
        self.moves() / 2
    }

    pub fn key_downs(&self) -> usize {
        self.count(|e| matches!(e, InjectedEvent::KeyDown(_)))
    }

    pub fn keys_pressed(&self) -> Vec<SimulationKey> {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .filter_map(|e| {
                if let InjectedEvent::KeyDown(key) = e {
                    Some(*key)
                } else {
                    None
                }
            })
            .collect()
    }

    fn record(&self, event: InjectedEvent) {
        self.state.lock().unwrap().events.push(event);
    }
}

impl InputInjector for RecordingInjector {
    fn pointer_position(&self) -> Result<(i32, i32), InjectorError> {
        if self.fail_mouse.load(Ordering::SeqCst) {
            return Err(InjectorError::Unavailable("pointer device gone".into()));
        }
        Ok(self.position())
    }

    fn move_pointer(&self, dx: i32, dy: i32) -> Result<(), InjectorError> {
        if self.panic_on_move.load(Ordering::SeqCst) {
            panic!("injector exploded");
        }
        if self.fail_mouse.load(Ordering::SeqCst) {
            return Err(InjectorError::Unavailable("pointer device gone".into()));
        }

        let mut state = self.state.lock().unwrap();
        let (mut x, mut y) = (state.position.0 + dx, state.position.1 + dy);
        if let Some((width, height)) = state.bounds {
            x = x.clamp(0, width - 1);
            y = y.clamp(0, height - 1);
        }
        state.position = (x, y);
        state.events.push(InjectedEvent::Move(dx, dy));
        Ok(())
    }

    fn key_down(&self, key: SimulationKey) -> Result<(), InjectorError> {
        self.key_down_entered.store(true, Ordering::SeqCst);
        let stall = *self.key_down_stall.lock().unwrap();
        if !stall.is_zero() {
            thread::sleep(stall);
        }
        if self.fail_keyboard.load(Ordering::SeqCst) {
            return Err(InjectorError::UnmappedKey(key.name()));
        }
        self.record(InjectedEvent::KeyDown(key));
        Ok(())
    }

    fn key_up(&self, key: SimulationKey) -> Result<(), InjectorError> {
        if self.fail_keyboard.load(Ordering::SeqCst) {
            return Err(InjectorError::UnmappedKey(key.name()));
        }
        self.record(InjectedEvent::KeyUp(key));
        Ok(())
    }

    fn pause(&self, duration: Duration) {
        self.record(InjectedEvent::Pause(duration));
    }
}

/// Settings source that records each fetch and the fetching thread.
#[derive(Default)]
pub struct RecordingSettings {
    settings: SharedSettings,
    fetches: AtomicUsize,
    callers: Mutex<HashSet<ThreadId>>,
    panic_on_fetch: AtomicBool,
}

impl RecordingSettings {
    pub fn new(settings: ActivitySettings) -> Self {
        Self {
            settings: SharedSettings::new(settings),
            ..Self::default()
        }
    }

    pub fn update<F: FnOnce(&mut ActivitySettings)>(&self, f: F) {
        self.settings.update(f);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn distinct_callers(&self) -> usize {
        self.callers.lock().unwrap().len()
    }

    pub fn panic_on_fetch(&self, panic: bool) {
        self.panic_on_fetch.store(panic, Ordering::SeqCst);
    }
}

impl SettingsSource for RecordingSettings {
    fn current_settings(&self) -> ActivitySettings {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.callers.lock().unwrap().insert(thread::current().id());
        if self.panic_on_fetch.load(Ordering::SeqCst) {
            panic!("settings source exploded");
        }
        self.settings.get()
    }
}

/// Settings for fast tests: one-second interval, instant key tap.
pub fn quick_settings(mouse: bool, keyboard: bool) -> ActivitySettings {
    ActivitySettings {
        interval_seconds: 1,
        mouse_movement_enabled: mouse,
        keyboard_simulation_enabled: keyboard,
        key_press_duration_ms: 0,
        ..ActivitySettings::default()
    }
}

/// Poll `condition` every 10ms until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

use crate::constants::POINTER_SETTLE;
use crate::error::InjectorError;
use crate::models::{ActivitySettings, SimulationKey};
use crate::platform::InputInjector;
use log::{debug, warn};
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Skipped,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub mouse: StepOutcome,
    pub keyboard: StepOutcome,
}

impl CycleReport {
    pub fn failed_steps(&self) -> u64 {
        u64::from(self.mouse == StepOutcome::Failed)
            + u64::from(self.keyboard == StepOutcome::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// Run one activity cycle. Each step is best-effort: a failing step is logged
/// and reported, and the other step still runs.
pub fn perform_cycle(injector: &dyn InputInjector, settings: &ActivitySettings) -> CycleReport {
    let mouse = if settings.mouse_movement_enabled {
        run_step("mouse movement", || {
            nudge_pointer(injector, settings.mouse_movement_distance)
        })
    } else {
        StepOutcome::Skipped
    };

    let keyboard = if settings.keyboard_simulation_enabled {
        run_step("key press", || {
            tap_key(
                injector,
                settings.simulation_key,
                settings.key_press_duration(),
            )
        })
    } else {
        StepOutcome::Skipped
    };

    let report = CycleReport { mouse, keyboard };
    debug!("Activity cycle completed: {report:?}");
    report
}

fn run_step<F>(name: &str, step: F) -> StepOutcome
where
    F: FnOnce() -> Result<(), InjectorError>,
{
    match step() {
        Ok(()) => StepOutcome::Completed,
        Err(e) => {
            warn!("Failed to simulate {name}: {e}");
            StepOutcome::Failed
        }
    }
}

/// Move the pointer `distance` pixels along x, then back to where it was.
pub fn nudge_pointer(injector: &dyn InputInjector, distance: i32) -> Result<(), InjectorError> {
    let (x, y) = injector.pointer_position()?;

    injector.move_pointer(distance, 0)?;
    injector.pause(POINTER_SETTLE);

    // The server may have clamped the move at a screen edge
    let (back_x, back_y) = match injector.pointer_position() {
        Ok((moved_x, moved_y)) => (x.saturating_sub(moved_x), y.saturating_sub(moved_y)),
        Err(e) => {
            debug!("Could not re-read pointer position ({e}), reversing the nudge");
            (distance.saturating_neg(), 0)
        }
    };
    injector.move_pointer(back_x, back_y)?;
    injector.pause(POINTER_SETTLE);

    debug!("Mouse movement simulated at position ({x}, {y})");
    Ok(())
}

/// Press `key`, hold it for `hold`, release it.
pub fn tap_key(
    injector: &dyn InputInjector,
    key: SimulationKey,
    hold: Duration,
) -> Result<(), InjectorError> {
    injector.key_down(key)?;
    injector.pause(hold);
    injector.key_up(key)?;

    debug!("Key press simulated: {key} (duration: {}ms)", hold.as_millis());
    Ok(())
}

/// True once `stop` has signalled, or the simulator side of the channel is gone.
pub fn cancellation_requested(cancel: &Receiver<()>) -> bool {
    match cancel.try_recv() {
        Ok(()) | Err(TryRecvError::Disconnected) => true,
        Err(TryRecvError::Empty) => false,
    }
}

/// Wait `interval`, in slices of at most `unit`, returning early on cancellation.
///
/// A stop request wakes the receiver immediately, so cancellation is honoured
/// no later than the end of the current slice.
pub fn wait_interval(cancel: &Receiver<()>, interval: Duration, unit: Duration) -> WaitOutcome {
    let unit = unit.max(Duration::from_millis(1));
    let deadline = Instant::now() + interval;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return WaitOutcome::Elapsed;
        }

        match cancel.recv_timeout(remaining.min(unit)) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return WaitOutcome::Cancelled,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

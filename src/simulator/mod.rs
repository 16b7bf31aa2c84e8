//! The background activity worker and its lifecycle.
//!
//! `start` and `stop` are serialized by the worker-slot mutex, so at most one
//! worker thread exists per simulator. `is_running`, `state` and `stats` only
//! read atomics and never wait on that mutex, even while `stop` is blocked
//! waiting for the worker to exit.

pub mod activity;

use crate::config::SettingsSource;
use crate::constants::{DEFAULT_STOP_TIMEOUT, DEFAULT_WAIT_UNIT, WORKER_THREAD_NAME};
use crate::error::SimulatorError;
use crate::models::{ActivityStats, SimulationState};
use crate::platform::{InputInjector, NativeInjector};
use crate::safe_lock;
use activity::{cancellation_requested, perform_cycle, wait_interval, CycleReport, WaitOutcome};
use log::{error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Marks an unset timestamp in [`SharedState`]
const NO_TIMESTAMP: i64 = i64::MIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Granularity of the interval wait
    pub wait_unit: Duration,
    /// Upper bound on how long `stop` blocks
    pub stop_timeout: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            wait_unit: DEFAULT_WAIT_UNIT,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}

/// What a call to [`ActivitySimulator::stop`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    AlreadyStopped,
    Stopped,
    /// The worker was told to stop but had not exited when the timeout
    /// elapsed. It finishes its in-flight step and then exits on its own.
    TimedOut,
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn load_timestamp(cell: &AtomicI64) -> Option<i64> {
    match cell.load(Ordering::SeqCst) {
        NO_TIMESTAMP => None,
        ts => Some(ts),
    }
}

/// State shared between callers and the worker.
struct SharedState {
    running: AtomicBool,
    started_at: AtomicI64,
    cycles: AtomicU64,
    failed_steps: AtomicU64,
    last_cycle_at: AtomicI64,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            running: AtomicBool::new(false),
            started_at: AtomicI64::new(NO_TIMESTAMP),
            cycles: AtomicU64::new(0),
            failed_steps: AtomicU64::new(0),
            last_cycle_at: AtomicI64::new(NO_TIMESTAMP),
        }
    }
}

impl SharedState {
    fn begin_run(&self) {
        self.cycles.store(0, Ordering::SeqCst);
        self.failed_steps.store(0, Ordering::SeqCst);
        self.last_cycle_at.store(NO_TIMESTAMP, Ordering::SeqCst);
        self.started_at.store(current_timestamp(), Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
    }

    /// Returns whether the state was `Running` before the call.
    fn end_run(&self) -> bool {
        self.started_at.store(NO_TIMESTAMP, Ordering::SeqCst);
        self.running.swap(false, Ordering::SeqCst)
    }

    fn record_cycle(&self, report: &CycleReport) {
        self.cycles.fetch_add(1, Ordering::SeqCst);
        self.failed_steps
            .fetch_add(report.failed_steps(), Ordering::SeqCst);
        self.last_cycle_at
            .store(current_timestamp(), Ordering::SeqCst);
    }

    fn snapshot(&self) -> ActivityStats {
        ActivityStats {
            running: self.running.load(Ordering::SeqCst),
            started_at: load_timestamp(&self.started_at),
            cycles_completed: self.cycles.load(Ordering::SeqCst),
            failed_steps: self.failed_steps.load(Ordering::SeqCst),
            last_cycle_at: load_timestamp(&self.last_cycle_at),
        }
    }
}

/// Handle to the live worker. Never leaves the simulator.
struct Worker {
    handle: JoinHandle<()>,
    /// `None` once a stop has been signalled
    cancel: Option<Sender<()>>,
    /// Disconnects when the worker thread exits
    exited: Receiver<()>,
}

impl Worker {
    fn join(self) {
        if self.handle.join().is_err() {
            error!("Activity worker thread panicked outside the simulation loop");
        }
    }
}

/// Everything the worker thread owns.
struct WorkerContext {
    settings: Arc<dyn SettingsSource>,
    injector: Arc<dyn InputInjector>,
    shared: Arc<SharedState>,
    wait_unit: Duration,
    cancel: Receiver<()>,
    _exited: Sender<()>,
}

impl WorkerContext {
    fn run(self) {
        info!("Starting activity simulation loop");

        match panic::catch_unwind(AssertUnwindSafe(|| self.run_cycles())) {
            Ok(()) => info!("Activity simulation loop ended"),
            Err(payload) => {
                error!(
                    "Activity worker failed, simulation stopped: {}",
                    panic_message(payload.as_ref())
                );
                self.shared.end_run();
            }
        }
    }

    fn run_cycles(&self) {
        while !cancellation_requested(&self.cancel) {
            let settings = self.settings.current_settings();
            let report = perform_cycle(self.injector.as_ref(), &settings);
            self.shared.record_cycle(&report);

            if wait_interval(&self.cancel, settings.interval(), self.wait_unit)
                == WaitOutcome::Cancelled
            {
                break;
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Periodically injects input so the session is not considered idle.
pub struct ActivitySimulator {
    settings: Arc<dyn SettingsSource>,
    injector: Arc<dyn InputInjector>,
    config: SimulatorConfig,
    shared: Arc<SharedState>,
    worker: Mutex<Option<Worker>>,
}

impl ActivitySimulator {
    pub fn new(settings: Arc<dyn SettingsSource>, injector: Arc<dyn InputInjector>) -> Self {
        Self::with_config(settings, injector, SimulatorConfig::default())
    }

    pub fn with_config(
        settings: Arc<dyn SettingsSource>,
        injector: Arc<dyn InputInjector>,
        config: SimulatorConfig,
    ) -> Self {
        Self {
            settings,
            injector,
            config,
            shared: Arc::new(SharedState::default()),
            worker: Mutex::new(None),
        }
    }

    /// Build a simulator on the platform's input injector.
    ///
    /// Fails when input cannot be injected at all (no display, no XTEST,
    /// unsupported OS); such a simulator could never be started.
    pub fn native(settings: Arc<dyn SettingsSource>) -> Result<Self, SimulatorError> {
        let injector = NativeInjector::new()?;
        info!("Input injector initialized");
        Ok(Self::new(settings, Arc::new(injector)))
    }

    /// Spawn the worker. Does nothing if already running.
    ///
    /// Returns without waiting for the first cycle.
    pub fn start(&self) -> Result<(), SimulatorError> {
        let mut slot = safe_lock(&self.worker, "Simulator worker");

        if let Some(worker) = slot.take() {
            if self.shared.running.load(Ordering::SeqCst) {
                *slot = Some(worker);
                warn!("Activity simulation is already running");
                return Ok(());
            }
            if worker.cancel.is_none() && !worker.handle.is_finished() {
                *slot = Some(worker);
                warn!("Previous activity worker is still finishing its last step");
                return Err(SimulatorError::WorkerStillExiting);
            }
            // Finished, or failed and about to finish
            worker.join();
        }

        let (cancel_tx, cancel_rx) = mpsc::channel();
        let (exited_tx, exited_rx) = mpsc::channel();
        let context = WorkerContext {
            settings: Arc::clone(&self.settings),
            injector: Arc::clone(&self.injector),
            shared: Arc::clone(&self.shared),
            wait_unit: self.config.wait_unit,
            cancel: cancel_rx,
            _exited: exited_tx,
        };

        self.shared.begin_run();
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || context.run())
            .map_err(|e| {
                self.shared.end_run();
                error!("Failed to spawn activity worker: {e}");
                SimulatorError::Spawn(e)
            })?;

        *slot = Some(Worker {
            handle,
            cancel: Some(cancel_tx),
            exited: exited_rx,
        });
        info!("Activity simulation started");
        Ok(())
    }

    /// Signal the worker to stop and wait up to the stop timeout for it to exit.
    ///
    /// After `Stopped` no further cycles begin. After `TimedOut` the worker
    /// may still finish the step it was in.
    pub fn stop(&self) -> StopOutcome {
        let mut slot = safe_lock(&self.worker, "Simulator worker");

        let Some(mut worker) = slot.take() else {
            info!("Activity simulation is not running");
            return StopOutcome::AlreadyStopped;
        };

        let Some(cancel) = worker.cancel.take() else {
            // Left over from an earlier timed-out stop
            if worker.handle.is_finished() {
                worker.join();
            } else {
                *slot = Some(worker);
            }
            info!("Activity simulation is not running");
            return StopOutcome::AlreadyStopped;
        };

        if cancel.send(()).is_err() {
            info!("Activity worker had already exited");
        }
        drop(cancel);
        let was_running = self.shared.end_run();

        match worker.exited.recv_timeout(self.config.stop_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                worker.join();
                if was_running {
                    info!("Activity simulation stopped");
                    StopOutcome::Stopped
                } else {
                    info!("Activity simulation is not running");
                    StopOutcome::AlreadyStopped
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Activity worker did not exit within {}ms, it will stop after its current step",
                    self.config.stop_timeout.as_millis()
                );
                *slot = Some(worker);
                StopOutcome::TimedOut
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SimulationState {
        if self.is_running() {
            SimulationState::Running
        } else {
            SimulationState::Stopped
        }
    }

    pub fn stats(&self) -> ActivityStats {
        self.shared.snapshot()
    }
}

impl Drop for ActivitySimulator {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}

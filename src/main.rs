use anyhow::{Context, Result};
use antiidle_lib::{
    validation, ActivitySimulator, ConfigStore, OverlaySettings, SettingsOverrides,
    SettingsSource, SimulationKey, StopOutcome,
};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// Keep this machine from going idle by injecting small input events
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between activity cycles
    #[arg(short, long, value_parser = parse_interval)]
    interval: Option<u32>,

    /// Key to tap, e.g. SHIFT, F15, SCROLL_LOCK
    #[arg(short, long, value_parser = parse_key)]
    key: Option<SimulationKey>,

    /// Do not move the pointer
    #[arg(long)]
    no_mouse: bool,

    /// Do not tap a key
    #[arg(long)]
    no_keyboard: bool,

    /// Run for this many seconds, then stop and exit
    #[arg(short, long)]
    duration: Option<u64>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            interval_seconds: self.interval,
            simulation_key: self.key,
            mouse_movement_enabled: self.no_mouse.then_some(false),
            keyboard_simulation_enabled: self.no_keyboard.then_some(false),
        }
    }
}

fn parse_interval(value: &str) -> Result<u32, String> {
    let secs: u32 = value.parse().map_err(|e| format!("{e}"))?;
    validation::validate_interval_seconds(secs).map_err(|e| e.to_string())?;
    Ok(secs)
}

fn parse_key(value: &str) -> Result<SimulationKey, String> {
    value.parse().map_err(|e: antiidle_lib::models::UnknownKey| e.to_string())
}

fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Start,
    Stop,
    Status,
    Reload,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "status" => Self::Status,
            "reload" => Self::Reload,
            "quit" | "exit" | "q" => Self::Quit,
            "" => Self::Empty,
            other => Self::Unknown(other.to_string()),
        }
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn print_status(out: &mut impl Write, simulator: &ActivitySimulator) -> Result<()> {
    let stats = simulator.stats();
    match stats.uptime_secs(now_secs()) {
        Some(uptime) => writeln!(
            out,
            "running for {uptime}s, {} cycles, {} failed steps",
            stats.cycles_completed, stats.failed_steps
        )?,
        None => writeln!(out, "stopped")?,
    }
    Ok(())
}

/// Read commands from stdin until `quit` or end of input.
fn run_console(
    simulator: &ActivitySimulator,
    store: &ConfigStore,
    source: &dyn SettingsSource,
) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout();
    writeln!(out, "Commands: start, stop, status, reload, quit")?;

    for line in stdin.lock().lines() {
        match Command::parse(&line?) {
            Command::Start => match simulator.start() {
                Ok(()) => writeln!(out, "started")?,
                Err(e) => writeln!(out, "cannot start: {e}")?,
            },
            Command::Stop => match simulator.stop() {
                StopOutcome::Stopped | StopOutcome::AlreadyStopped => writeln!(out, "stopped")?,
                StopOutcome::TimedOut => {
                    writeln!(out, "stopping, the current step is still finishing")?;
                }
            },
            Command::Status => print_status(&mut out, simulator)?,
            Command::Reload => {
                store.reload();
                let settings = source.current_settings();
                writeln!(
                    out,
                    "reloaded {}: every {}s, mouse {}, key {} {}",
                    store.path().display(),
                    settings.interval_seconds,
                    settings.mouse_movement_enabled,
                    settings.simulation_key,
                    settings.keyboard_simulation_enabled
                )?;
            }
            Command::Quit => break,
            Command::Empty => {}
            Command::Unknown(other) => writeln!(out, "unknown command '{other}'")?,
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => ConfigStore::default_path().context("Failed to locate configuration")?,
    };
    let level = ConfigStore::peek_log_level(&config_path).unwrap_or_else(|| "info".to_string());
    init_logging(&level);

    let store = Arc::new(ConfigStore::open(config_path));
    let overrides = cli.overrides();
    let source: Arc<dyn SettingsSource> = if overrides.is_empty() {
        Arc::clone(&store) as Arc<dyn SettingsSource>
    } else {
        Arc::new(OverlaySettings::new(
            Arc::clone(&store) as Arc<dyn SettingsSource>,
            overrides,
        ))
    };

    if cli.print_config {
        let mut config = store.config();
        config.activity = source.current_settings();
        writeln!(io::stdout(), "{}", serde_json::to_string_pretty(&config)?)?;
        return Ok(());
    }

    let simulator = ActivitySimulator::native(Arc::clone(&source))
        .context("Failed to initialize AntiIdle")?;
    simulator.start()?;

    match cli.duration {
        Some(secs) => thread::sleep(Duration::from_secs(secs)),
        None => run_console(&simulator, &store, source.as_ref())?,
    }

    simulator.stop();
    Ok(())
}

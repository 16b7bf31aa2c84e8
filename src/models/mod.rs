pub mod key;
pub mod settings;
pub mod stats;

pub use key::{SimulationKey, UnknownKey};
pub use settings::{ActivitySettings, AppConfig, LoggingSettings};
pub use stats::{ActivityStats, SimulationState};

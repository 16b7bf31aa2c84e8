use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key tapped during a keyboard activity step.
///
/// Parsed case-insensitively from the config file. Unknown names fall back to
/// [`SimulationKey::Shift`] when settings are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SimulationKey {
    #[default]
    Shift,
    Control,
    Alt,
    Meta,
    CapsLock,
    NumLock,
    ScrollLock,
    Space,
    Enter,
    Tab,
    Escape,
    Pause,
    Insert,
    Home,
    End,
    Left,
    Right,
    Up,
    Down,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,
}

const FUNCTION_KEYS: [SimulationKey; 24] = [
    SimulationKey::F1,
    SimulationKey::F2,
    SimulationKey::F3,
    SimulationKey::F4,
    SimulationKey::F5,
    SimulationKey::F6,
    SimulationKey::F7,
    SimulationKey::F8,
    SimulationKey::F9,
    SimulationKey::F10,
    SimulationKey::F11,
    SimulationKey::F12,
    SimulationKey::F13,
    SimulationKey::F14,
    SimulationKey::F15,
    SimulationKey::F16,
    SimulationKey::F17,
    SimulationKey::F18,
    SimulationKey::F19,
    SimulationKey::F20,
    SimulationKey::F21,
    SimulationKey::F22,
    SimulationKey::F23,
    SimulationKey::F24,
];

/// Returned when a key name is not in the supported set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key name '{}'", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl SimulationKey {
    /// Canonical upper-case name, as written to the config file.
    pub fn name(self) -> &'static str {
        match self {
            Self::Shift => "SHIFT",
            Self::Control => "CONTROL",
            Self::Alt => "ALT",
            Self::Meta => "META",
            Self::CapsLock => "CAPS_LOCK",
            Self::NumLock => "NUM_LOCK",
            Self::ScrollLock => "SCROLL_LOCK",
            Self::Space => "SPACE",
            Self::Enter => "ENTER",
            Self::Tab => "TAB",
            Self::Escape => "ESCAPE",
            Self::Pause => "PAUSE",
            Self::Insert => "INSERT",
            Self::Home => "HOME",
            Self::End => "END",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::F3 => "F3",
            Self::F4 => "F4",
            Self::F5 => "F5",
            Self::F6 => "F6",
            Self::F7 => "F7",
            Self::F8 => "F8",
            Self::F9 => "F9",
            Self::F10 => "F10",
            Self::F11 => "F11",
            Self::F12 => "F12",
            Self::F13 => "F13",
            Self::F14 => "F14",
            Self::F15 => "F15",
            Self::F16 => "F16",
            Self::F17 => "F17",
            Self::F18 => "F18",
            Self::F19 => "F19",
            Self::F20 => "F20",
            Self::F21 => "F21",
            Self::F22 => "F22",
            Self::F23 => "F23",
            Self::F24 => "F24",
        }
    }

    /// Parse a key name, substituting the default for anything unrecognized.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|e: UnknownKey| {
            let fallback = Self::default();
            warn!("{e}, using {}", fallback.name());
            fallback
        })
    }
}

impl FromStr for SimulationKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        let key = match normalized.as_str() {
            "SHIFT" => Self::Shift,
            "CONTROL" | "CTRL" => Self::Control,
            "ALT" | "OPTION" => Self::Alt,
            "META" | "SUPER" | "WINDOWS" | "COMMAND" | "CMD" => Self::Meta,
            "CAPS_LOCK" | "CAPSLOCK" => Self::CapsLock,
            "NUM_LOCK" | "NUMLOCK" => Self::NumLock,
            "SCROLL_LOCK" | "SCROLLLOCK" => Self::ScrollLock,
            "SPACE" => Self::Space,
            "ENTER" | "RETURN" => Self::Enter,
            "TAB" => Self::Tab,
            "ESCAPE" | "ESC" => Self::Escape,
            "PAUSE" => Self::Pause,
            "INSERT" => Self::Insert,
            "HOME" => Self::Home,
            "END" => Self::End,
            "LEFT" => Self::Left,
            "RIGHT" => Self::Right,
            "UP" => Self::Up,
            "DOWN" => Self::Down,
            other => {
                let number = other
                    .strip_prefix('F')
                    .and_then(|n| n.parse::<usize>().ok())
                    .and_then(|n| n.checked_sub(1));
                return number
                    .and_then(|idx| FUNCTION_KEYS.get(idx).copied())
                    .ok_or_else(|| UnknownKey(s.to_string()));
            }
        };
        Ok(key)
    }
}

impl From<String> for SimulationKey {
    fn from(name: String) -> Self {
        Self::from_name_or_default(&name)
    }
}

impl From<SimulationKey> for String {
    fn from(key: SimulationKey) -> Self {
        key.name().to_string()
    }
}

impl fmt::Display for SimulationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

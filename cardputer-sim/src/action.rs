//! Logical actions a keypad key can be bound to.
//!
//! [`KeyAction`] is a closed set; the persisted key map stores the
//! SCREAMING_SNAKE names (`"RPM_UP"`, `"NEXT_MODE"`, ...).
//!
//! # Parsing syntax
//!
//! ```text
//! RPM_UP      → RpmUp
//! rpm-up      → RpmUp        (case and separator insensitive)
//! NEXT_MODE   → NextMode
//! NONE        → None
//! ```

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a mapped key does when pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyAction {
    /// Bound but inert; dispatch falls through as if unmapped
    None,
    RpmUp,
    RpmDown,
    SpdUp,
    SpdDown,
    ToggleMil,
    ToggleBle,
    NextMode,
    PrevMode,
}

impl KeyAction {
    /// Every action, in display order
    pub const ALL: &'static [KeyAction] = &[
        KeyAction::None,
        KeyAction::RpmUp,
        KeyAction::RpmDown,
        KeyAction::SpdUp,
        KeyAction::SpdDown,
        KeyAction::ToggleMil,
        KeyAction::ToggleBle,
        KeyAction::NextMode,
        KeyAction::PrevMode,
    ];

    /// Wire/persisted name
    pub fn name(&self) -> &'static str {
        match self {
            KeyAction::None => "NONE",
            KeyAction::RpmUp => "RPM_UP",
            KeyAction::RpmDown => "RPM_DOWN",
            KeyAction::SpdUp => "SPD_UP",
            KeyAction::SpdDown => "SPD_DOWN",
            KeyAction::ToggleMil => "TOGGLE_MIL",
            KeyAction::ToggleBle => "TOGGLE_BLE",
            KeyAction::NextMode => "NEXT_MODE",
            KeyAction::PrevMode => "PREV_MODE",
        }
    }

    /// One-line description for help and the key mapper screen
    pub fn description(&self) -> &'static str {
        match self {
            KeyAction::None => "No action",
            KeyAction::RpmUp => "RPM +250",
            KeyAction::RpmDown => "RPM -250",
            KeyAction::SpdUp => "Speed +10",
            KeyAction::SpdDown => "Speed -10",
            KeyAction::ToggleMil => "Toggle MIL / misfire code",
            KeyAction::ToggleBle => "Toggle BLE advertising",
            KeyAction::NextMode => "Next screen",
            KeyAction::PrevMode => "Previous screen",
        }
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for KeyAction {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        KeyAction::ALL
            .iter()
            .copied()
            .find(|a| a.name() == normalized)
            .ok_or_else(|| SimError::UnknownAction(s.to_string()))
    }
}

//! Screen modes and the active-screen controller

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Screens of the handheld, in cycling order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Dashboard,
    Terminal,
    Settings,
    DtcManager,
    KeyMapper,
    SdManager,
}

impl Mode {
    /// Declared order; NEXT_MODE walks this and wraps
    pub const ALL: &'static [Mode] = &[
        Mode::Dashboard,
        Mode::Terminal,
        Mode::Settings,
        Mode::DtcManager,
        Mode::KeyMapper,
        Mode::SdManager,
    ];

    /// Position in [`Mode::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Mode::Dashboard => 0,
            Mode::Terminal => 1,
            Mode::Settings => 2,
            Mode::DtcManager => 3,
            Mode::KeyMapper => 4,
            Mode::SdManager => 5,
        }
    }

    /// Following screen, wrapping from last to first
    pub fn next(&self) -> Mode {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Preceding screen, wrapping from first to last
    pub fn prev(&self) -> Mode {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Status-bar name, as shown on the LCD
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Dashboard => "DASHBOARD",
            Mode::Terminal => "TERMINAL",
            Mode::Settings => "SETTINGS",
            Mode::DtcManager => "DTC_MANAGER",
            Mode::KeyMapper => "KEY_MAPPER",
            Mode::SdManager => "SD_MANAGER",
        }
    }

    /// Tab title
    pub fn title(&self) -> &'static str {
        match self {
            Mode::Dashboard => "Dashboard",
            Mode::Terminal => "Terminal",
            Mode::Settings => "Settings",
            Mode::DtcManager => "DTC",
            Mode::KeyMapper => "Keys",
            Mode::SdManager => "SD Card",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Mode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Mode::ALL
            .iter()
            .copied()
            .find(|m| m.name() == normalized)
            .ok_or_else(|| SimError::UnknownMode(s.to_string()))
    }
}

/// Which screen is showing and which row is selected on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeController {
    current: Mode,
    selected_index: usize,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(Mode::Dashboard)
    }
}

impl ModeController {
    pub fn new(mode: Mode) -> Self {
        Self {
            current: mode,
            selected_index: 0,
        }
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    /// Selected row; may exceed the displayed list length, in which case
    /// nothing renders as selected.
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// Cycle forward to the next screen
    pub fn advance(&mut self) {
        self.set_mode(self.current.next());
    }

    /// Cycle back to the previous screen
    pub fn retreat(&mut self) {
        self.set_mode(self.current.prev());
    }

    /// Jump straight to `mode`
    pub fn set_mode(&mut self, mode: Mode) {
        self.current = mode;
        self.selected_index = 0;
    }

    /// Move the selection, flooring at 0 (no upper bound)
    pub fn move_selection(&mut self, delta: isize) {
        self.selected_index = self.selected_index.saturating_add_signed(delta);
    }
}

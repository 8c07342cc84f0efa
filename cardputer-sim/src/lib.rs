//! Cardputer ECU simulator core
//!
//! Pure state model for the handheld OBD simulator: sensor state, screen
//! modes, keypad bindings, key dispatch and archived vehicle profiles.
//! Nothing here touches the filesystem, the network or the terminal.

pub mod action;
pub mod dispatch;
pub mod elm;
pub mod error;
pub mod keymap;
pub mod mode;
pub mod profile;
pub mod session;
pub mod state;

pub use action::KeyAction;
pub use dispatch::{dispatch, key_handler, Effect, Input, KeyHandler, Transition};
pub use error::SimError;
pub use keymap::{is_layout_key, KeyMapping, ADVANCE_KEY, DOWN_KEYS, KEYPAD_ROWS, UP_KEYS};
pub use mode::{Mode, ModeController};
pub use profile::{ProfileStore, VehicleProfile};
pub use session::Session;
pub use state::{
    dtc_description, Control, EcuState, DTC_MISFIRE, DTC_NONE, RPM_MAX, RPM_STEP, SPEED_MAX,
    SPEED_STEP,
};

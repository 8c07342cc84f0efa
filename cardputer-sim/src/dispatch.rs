//! Input dispatch: key presses and host controls → state transitions
//!
//! [`dispatch`] is pure: it reads the current screen, ECU state and key map
//! and returns the next [`Transition`]. Keypad handling is looked up per
//! screen through [`key_handler`], so a screen that repurposes the keys
//! (the key mapper) shadows the mapping table completely.
//!
//! Keypad precedence outside the key mapper:
//! 1. bound action from the [`KeyMapping`]
//! 2. `TAB` still advances the screen when no binding handled it
//! 3. everything else is ignored

use crate::action::KeyAction;
use crate::keymap::{KeyMapping, ADVANCE_KEY, DOWN_KEYS, UP_KEYS};
use crate::mode::{Mode, ModeController};
use crate::profile::{ProfileStore, VehicleProfile};
use crate::state::{Control, EcuState};

/// One input event
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// A keypad key by legend (`"TAB"`, `"ENT"`, `";"`, ...)
    Key(String),
    /// Host-side list navigation
    MoveSelection(isize),
    /// Direct numeric edit
    SetControl(Control, f64),
    /// Slider-style numeric edit by whole steps
    NudgeControl(Control, i32),
    /// Archive the current state
    SaveProfile,
    /// Replace the current state with a profile's snapshot
    LoadProfile(VehicleProfile),
}

impl Input {
    pub fn key(key: impl Into<String>) -> Self {
        Input::Key(key.into())
    }
}

/// Side effect the caller must perform after installing a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Append the (new) ECU state to the profile store
    SaveProfile,
}

/// Result of dispatching one input
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub modes: ModeController,
    pub ecu: EcuState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn unchanged(modes: &ModeController, ecu: &EcuState) -> Self {
        Self {
            modes: *modes,
            ecu: ecu.clone(),
            effect: None,
        }
    }
}

/// Keypad handler for one screen
pub type KeyHandler = fn(&mut ModeController, &mut EcuState, &KeyMapping, &str);

/// Keypad handler table
pub fn key_handler(mode: Mode) -> KeyHandler {
    match mode {
        Mode::KeyMapper => key_mapper_keys,
        Mode::Dashboard
        | Mode::Terminal
        | Mode::Settings
        | Mode::DtcManager
        | Mode::SdManager => mapped_keys,
    }
}

/// Compute the transition for `input`. Total: unknown keys are no-ops.
pub fn dispatch(
    modes: &ModeController,
    ecu: &EcuState,
    keymap: &KeyMapping,
    input: &Input,
) -> Transition {
    let mut next = Transition::unchanged(modes, ecu);

    match input {
        Input::Key(key) => {
            let handler = key_handler(modes.current());
            handler(&mut next.modes, &mut next.ecu, keymap, key);
        }
        Input::MoveSelection(delta) => next.modes.move_selection(*delta),
        Input::SetControl(control, value) => next.ecu.set_control(*control, *value),
        Input::NudgeControl(control, steps) => next.ecu.nudge_control(*control, *steps),
        Input::SaveProfile => next.effect = Some(Effect::SaveProfile),
        Input::LoadProfile(profile) => next.ecu = ProfileStore::load(profile),
    }

    next
}

/// Key mapper screen: keys navigate the displayed table instead of
/// triggering it. `TAB` goes straight to the SD manager.
fn key_mapper_keys(
    modes: &mut ModeController,
    _ecu: &mut EcuState,
    _keymap: &KeyMapping,
    key: &str,
) {
    if key == ADVANCE_KEY {
        modes.set_mode(Mode::SdManager);
    } else if UP_KEYS.contains(&key) {
        modes.move_selection(-1);
    } else if DOWN_KEYS.contains(&key) {
        modes.move_selection(1);
    }
}

/// Every other screen: apply the bound action, with `TAB` as the fallback
/// screen cycle.
fn mapped_keys(modes: &mut ModeController, ecu: &mut EcuState, keymap: &KeyMapping, key: &str) {
    match keymap.get(key) {
        Some(KeyAction::NextMode) => modes.advance(),
        Some(KeyAction::PrevMode) => modes.retreat(),
        Some(KeyAction::RpmUp) => ecu.adjust_rpm(1),
        Some(KeyAction::RpmDown) => ecu.adjust_rpm(-1),
        Some(KeyAction::SpdUp) => ecu.adjust_speed(1),
        Some(KeyAction::SpdDown) => ecu.adjust_speed(-1),
        Some(KeyAction::ToggleBle) => ecu.toggle_ble(),
        Some(KeyAction::ToggleMil) => ecu.toggle_mil(),
        Some(KeyAction::None) | None => {
            if key == ADVANCE_KEY {
                modes.advance();
            }
        }
    }
}

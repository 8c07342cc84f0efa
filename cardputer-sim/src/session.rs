//! Whole-session simulator state

use crate::dispatch::{dispatch, Effect, Input, Transition};
use crate::keymap::KeyMapping;
use crate::mode::ModeController;
use crate::profile::{ProfileStore, VehicleProfile};
use crate::state::EcuState;

/// Everything the presentation layer renders from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub ecu: EcuState,
    pub modes: ModeController,
    pub keymap: KeyMapping,
    pub profiles: ProfileStore,
}

impl Session {
    /// Fresh defaults with a persisted key map and profile list
    pub fn new(keymap: KeyMapping, profiles: ProfileStore) -> Self {
        Self {
            ecu: EcuState::default(),
            modes: ModeController::default(),
            keymap,
            profiles,
        }
    }

    /// Transition `input` would produce, without applying it
    pub fn preview(&self, input: &Input) -> Transition {
        dispatch(&self.modes, &self.ecu, &self.keymap, input)
    }

    /// Apply `input`. Returns the profile appended by a save, if any.
    pub fn handle(&mut self, input: &Input) -> Option<&VehicleProfile> {
        let Transition { modes, ecu, effect } = self.preview(input);
        self.modes = modes;
        self.ecu = ecu;

        match effect {
            Some(Effect::SaveProfile) => Some(self.profiles.save(&self.ecu)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::state::DTC_MISFIRE;

    #[test]
    fn test_save_then_load_restores_snapshot() {
        let mut session = Session::default();
        session.handle(&Input::key("ENT"));
        let saved = session.handle(&Input::SaveProfile).cloned().unwrap();
        session.handle(&Input::key("ENT"));
        session.handle(&Input::key("UP"));
        assert!(!session.ecu.mil);

        session.handle(&Input::LoadProfile(saved));
        assert!(session.ecu.mil);
        assert_eq!(session.ecu.dtc, DTC_MISFIRE);
        assert_eq!(session.ecu.rpm, 850);
        assert_eq!(session.profiles.len(), 1);
    }

    #[test]
    fn test_keys_only_return_profile_on_save() {
        let mut session = Session::default();
        assert!(session.handle(&Input::key("TAB")).is_none());
        assert_eq!(session.modes.current(), Mode::Terminal);
        assert!(session.profiles.is_empty());
    }
}

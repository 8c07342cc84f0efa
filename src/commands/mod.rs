//! Command handlers for the CLI application.
//!
//! - `keymap`: key map inspection and editing (show, set, unbind, reset)
//! - `profiles`: saved vehicle profiles (list, show)
//! - `generate`: one-shot firmware bundle generation
//! - `simulate`: headless key replay and ELM327 requests

pub mod generate;
pub mod keymap;
pub mod profiles;
pub mod simulate;

use anyhow::{anyhow, Result};
use cardputer_ecu::Storage;
use cardputer_sim::{EcuState, ProfileStore};

/// Result type for command handlers
pub type CommandResult = Result<()>;

/// ECU state to start from: a saved profile's snapshot, or defaults
pub fn starting_state(storage: &Storage, from: Option<&str>) -> Result<EcuState> {
    let Some(wanted) = from else {
        return Ok(EcuState::default());
    };
    let profiles = storage.load_profiles();
    find_profile_state(&profiles, wanted)
}

fn find_profile_state(profiles: &ProfileStore, wanted: &str) -> Result<EcuState> {
    profiles
        .find(wanted)
        .map(ProfileStore::load)
        .ok_or_else(|| anyhow!("No saved profile matches '{wanted}'"))
}

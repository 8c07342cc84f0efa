//! Headless simulation: key replay and ELM327 requests.

use super::{starting_state, CommandResult};
use anyhow::bail;
use cardputer_ecu::Storage;
use cardputer_sim::elm::{respond, TERMINAL_SCRIPT};
use cardputer_sim::{is_layout_key, EcuState, Input, Session};
use serde::Serialize;
use tracing::debug;

/// Final state after a key replay
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PressReport {
    pub mode: String,
    pub selected_index: usize,
    pub ecu: EcuState,
}

/// Replay `keys` against the persisted key map, starting from defaults
/// or from a saved profile's snapshot.
pub fn replay(
    storage: &Storage,
    keys: &[String],
    from: Option<&str>,
) -> anyhow::Result<PressReport> {
    if let Some(bad) = keys.iter().find(|k| !is_layout_key(k)) {
        bail!("'{bad}' is not a keypad key");
    }

    let mut session = Session::new(storage.load_keymap(), storage.load_profiles());
    session.ecu = starting_state(storage, from)?;

    for key in keys {
        session.handle(&Input::key(key.as_str()));
        debug!(key = %key, mode = %session.modes.current(), rpm = session.ecu.rpm, "Replayed key");
    }

    Ok(PressReport {
        mode: session.modes.current().to_string(),
        selected_index: session.modes.selected_index(),
        ecu: session.ecu,
    })
}

/// Replay keys and print the resulting state as JSON
pub fn press(storage: &Storage, keys: &[String], from: Option<&str>) -> CommandResult {
    let report = replay(storage, keys, from)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Answer ELM327 request lines (the terminal script when none are given)
pub fn elm(storage: &Storage, requests: &[String], from: Option<&str>) -> CommandResult {
    let ecu = starting_state(storage, from)?;
    let script: Vec<&str> = if requests.is_empty() {
        TERMINAL_SCRIPT.to_vec()
    } else {
        requests.iter().map(String::as_str).collect()
    };

    for request in script {
        println!("> {request}");
        println!("{}", respond(&ecu, request));
    }
    Ok(())
}

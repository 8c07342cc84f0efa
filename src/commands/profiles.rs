//! Saved profile command handlers.

use super::CommandResult;
use anyhow::anyhow;
use cardputer_ecu::Storage;

/// List saved profiles, oldest first
pub fn list(storage: &Storage) -> CommandResult {
    let profiles = storage.load_profiles();
    if profiles.is_empty() {
        println!("SD empty ({})", storage.profiles_path().display());
        return Ok(());
    }

    println!("{:<10} {:<14} {:<20} {:>5} {:>4}  DTC", "ID", "File", "Saved", "RPM", "SPD");
    for profile in profiles.list() {
        println!(
            "{:<10} {:<14} {:<20} {:>5} {:>4}  {}",
            profile.id,
            profile.file_name(),
            profile.timestamp,
            profile.data.rpm,
            profile.data.speed,
            profile.data.dtc
        );
    }
    Ok(())
}

/// Print one profile as JSON
pub fn show(storage: &Storage, wanted: &str) -> CommandResult {
    let profiles = storage.load_profiles();
    let profile = profiles
        .find(wanted)
        .ok_or_else(|| anyhow!("No saved profile matches '{wanted}'"))?;
    println!("{}", serde_json::to_string_pretty(profile)?);
    Ok(())
}

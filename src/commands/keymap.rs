//! Key map command handlers.

use super::CommandResult;
use anyhow::bail;
use cardputer_ecu::Storage;
use cardputer_sim::{is_layout_key, KeyAction, KeyMapping};

/// Print every binding
pub fn show(storage: &Storage) -> CommandResult {
    let keymap = storage.load_keymap();
    println!("Key map ({})", storage.keymap_path().display());
    println!("{:<6} {:<12} Description", "Key", "Action");
    for (key, action) in keymap.iter() {
        println!("{:<6} {:<12} {}", key, action, action.description());
    }
    Ok(())
}

/// Bind `key` to `action` and persist
pub fn set(storage: &Storage, key: &str, action: &str) -> CommandResult {
    let key = normalize_key(key);
    if !is_layout_key(&key) {
        bail!("'{key}' is not a keypad key");
    }
    let action: KeyAction = action.parse()?;

    let mut keymap = storage.load_keymap();
    match keymap.bind(key.clone(), action) {
        Some(previous) if previous != action => println!("{key}: {previous} -> {action}"),
        Some(_) => println!("{key} already bound to {action}"),
        None => println!("{key}: bound to {action}"),
    }
    storage.save_keymap(&keymap)?;
    Ok(())
}

/// Remove `key`'s binding and persist
pub fn unbind(storage: &Storage, key: &str) -> CommandResult {
    let key = normalize_key(key);
    let mut keymap = storage.load_keymap();
    match keymap.unbind(&key) {
        Some(previous) => {
            storage.save_keymap(&keymap)?;
            println!("{key}: unbound (was {previous})");
        }
        None => println!("{key} was not bound"),
    }
    Ok(())
}

/// Restore the factory table
pub fn reset(storage: &Storage) -> CommandResult {
    storage.save_keymap(&KeyMapping::default())?;
    println!("Key map reset to defaults");
    Ok(())
}

/// Letter legends are uppercase on the keypad; symbols pass through
fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_unbind_persist() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());

        set(&storage, "q", "prev-mode").unwrap();
        assert_eq!(storage.load_keymap().get("Q"), Some(KeyAction::PrevMode));

        unbind(&storage, "ent").unwrap();
        assert_eq!(storage.load_keymap().get("ENT"), None);

        reset(&storage).unwrap();
        assert_eq!(storage.load_keymap(), KeyMapping::default());
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        assert!(set(&storage, "F13", "RPM_UP").is_err());
        assert!(set(&storage, "Q", "LAUNCH").is_err());
        assert!(!storage.keymap_path().exists());
    }
}

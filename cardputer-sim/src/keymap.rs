//! Keypad layout and key → action mapping
//!
//! Key identifiers are the legends printed on the handheld's keycaps
//! (`"TAB"`, `"ENT"`, `";"`, `"DWN"`, ...). A [`KeyMapping`] binds any of
//! them to a [`KeyAction`]; keys without an entry do nothing.

use crate::action::KeyAction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Physical keypad, top row first
pub const KEYPAD_ROWS: &[&[&str]] = &[
    &["ESC", "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "BS"],
    &["TAB", "Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "["],
    &["CTRL", "A", "S", "D", "F", "G", "H", "J", "K", "L", ";", "ENT"],
    &["SHFT", "Z", "X", "C", "V", "B", "N", "M", ",", ".", "/", "UP"],
    &["ALT", "SPC", "OPT", "LFT", "DWN", "RGT"],
];

/// Key that cycles screens even when no mapping handles it
pub const ADVANCE_KEY: &str = "TAB";
/// Keys that move a list selection up (dedicated arrow and its row-mate)
pub const UP_KEYS: &[&str] = &["UP", ";"];
/// Keys that move a list selection down
pub const DOWN_KEYS: &[&str] = &["DWN", "."];

/// Whether `key` exists on the keypad
pub fn is_layout_key(key: &str) -> bool {
    KEYPAD_ROWS.iter().any(|row| row.contains(&key))
}

/// Key identifier → action table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMapping {
    bindings: BTreeMap<String, KeyAction>,
}

impl Default for KeyMapping {
    /// Factory bindings: arrows and their punctuation twins drive RPM/speed
    fn default() -> Self {
        let table = [
            ("UP", KeyAction::RpmUp),
            (";", KeyAction::RpmUp),
            ("DWN", KeyAction::RpmDown),
            (".", KeyAction::RpmDown),
            ("RGT", KeyAction::SpdUp),
            ("/", KeyAction::SpdUp),
            ("LFT", KeyAction::SpdDown),
            (",", KeyAction::SpdDown),
            ("OPT", KeyAction::ToggleBle),
            ("TAB", KeyAction::NextMode),
            ("ENT", KeyAction::ToggleMil),
        ];
        table.into_iter().collect()
    }
}

impl<K: Into<String>> FromIterator<(K, KeyAction)> for KeyMapping {
    fn from_iter<I: IntoIterator<Item = (K, KeyAction)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().map(|(k, a)| (k.into(), a)).collect(),
        }
    }
}

impl KeyMapping {
    /// A mapping with no bindings at all
    pub fn empty() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Action bound to `key`, if any
    pub fn get(&self, key: &str) -> Option<KeyAction> {
        self.bindings.get(key).copied()
    }

    /// Whether `key` has an entry (including an explicit `NONE`)
    pub fn is_bound(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// Bind `key`, returning the previous action
    pub fn bind(&mut self, key: impl Into<String>, action: KeyAction) -> Option<KeyAction> {
        self.bindings.insert(key.into(), action)
    }

    /// Remove the entry for `key`, returning the action it had
    pub fn unbind(&mut self, key: &str) -> Option<KeyAction> {
        self.bindings.remove(key)
    }

    /// Bindings in key order (the order the key mapper screen lists them)
    pub fn iter(&self) -> impl Iterator<Item = (&str, KeyAction)> {
        self.bindings.iter().map(|(k, a)| (k.as_str(), *a))
    }

    /// Keys bound to `action`
    pub fn keys_for(&self, action: KeyAction) -> Vec<&str> {
        self.iter()
            .filter(|(_, a)| *a == action)
            .map(|(k, _)| k)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

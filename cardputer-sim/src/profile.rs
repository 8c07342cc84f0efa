//! Vehicle profiles ("SD card" snapshots)
//!
//! A [`VehicleProfile`] is an immutable copy of an [`EcuState`] taken at
//! save time. The [`ProfileStore`] only ever appends; insertion order is
//! the listing order.

use crate::state::EcuState;
use chrono::{DateTime, Local};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of generated profile identifiers
const ID_LEN: usize = 9;

/// Named snapshot of the ECU state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleProfile {
    /// Opaque unique identifier
    pub id: String,
    /// Display name, e.g. `LOG_1432`
    pub name: String,
    /// Creation time, display string
    pub timestamp: String,
    /// State captured at save time
    pub data: EcuState,
}

impl VehicleProfile {
    /// File name the SD manager shows for this profile
    pub fn file_name(&self) -> String {
        format!("{}.JSON", self.name)
    }
}

/// Ordered, append-only list of profiles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileStore {
    profiles: Vec<VehicleProfile>,
}

impl From<Vec<VehicleProfile>> for ProfileStore {
    fn from(profiles: Vec<VehicleProfile>) -> Self {
        Self { profiles }
    }
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `ecu` using the current local time
    pub fn save(&mut self, ecu: &EcuState) -> &VehicleProfile {
        self.save_at(ecu, Local::now())
    }

    /// Snapshot `ecu` stamped with `now`
    pub fn save_at(&mut self, ecu: &EcuState, now: DateTime<Local>) -> &VehicleProfile {
        let profile = VehicleProfile {
            id: self.fresh_id(),
            name: now.format("LOG_%H%M").to_string(),
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            data: ecu.clone(),
        };
        tracing::debug!(id = %profile.id, name = %profile.name, "profile saved");
        self.profiles.push(profile);
        &self.profiles[self.profiles.len() - 1]
    }

    /// State to install from `profile`, brought back inside the live
    /// invariants. Does not touch the store.
    pub fn load(profile: &VehicleProfile) -> EcuState {
        profile.data.clone().normalized()
    }

    /// Profiles, oldest first
    pub fn list(&self) -> &[VehicleProfile] {
        &self.profiles
    }

    pub fn get(&self, index: usize) -> Option<&VehicleProfile> {
        self.profiles.get(index)
    }

    /// Look up by id, falling back to the most recent profile with that name
    pub fn find(&self, id_or_name: &str) -> Option<&VehicleProfile> {
        self.profiles
            .iter()
            .find(|p| p.id == id_or_name)
            .or_else(|| self.profiles.iter().rev().find(|p| p.name == id_or_name))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    fn fresh_id(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let id: String = (&mut rng)
                .sample_iter(Alphanumeric)
                .take(ID_LEN)
                .map(|b| char::from(b).to_ascii_lowercase())
                .collect();
            if !self.profiles.iter().any(|p| p.id == id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, h, m, 5).unwrap()
    }

    #[test]
    fn test_save_names_and_stamps() {
        let mut store = ProfileStore::new();
        let profile = store.save_at(&EcuState::default(), at(9, 7));
        assert_eq!(profile.name, "LOG_0907");
        assert_eq!(profile.timestamp, "2024-03-09 09:07:05");
        assert_eq!(profile.id.len(), ID_LEN);
        assert!(profile
            .id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_eq!(profile.file_name(), "LOG_0907.JSON");
    }

    #[test]
    fn test_append_only_in_order() {
        let mut store = ProfileStore::new();
        let mut ecu = EcuState::default();
        store.save_at(&ecu, at(10, 0));
        ecu.rpm = 3000;
        store.save_at(&ecu, at(10, 1));

        let list = store.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].data.rpm, 850);
        assert_eq!(list[1].data.rpm, 3000);
        assert_ne!(list[0].id, list[1].id);
    }

    #[test]
    fn test_snapshot_not_aliased() {
        let mut store = ProfileStore::new();
        let mut ecu = EcuState::default();
        store.save_at(&ecu, at(11, 30));
        ecu.rpm = 7000;
        ecu.toggle_mil();

        let restored = ProfileStore::load(&store.list()[0]);
        assert_eq!(restored, EcuState::default());
    }

    #[test]
    fn test_find_by_id_or_name() {
        let mut store = ProfileStore::new();
        let first_id = store.save_at(&EcuState::default(), at(8, 15)).id.clone();
        store.save_at(&EcuState::default(), at(8, 16));

        assert_eq!(store.find(&first_id).unwrap().name, "LOG_0815");
        assert_eq!(store.find("LOG_0816").unwrap().name, "LOG_0816");
        assert!(store.find("LOG_9999").is_none());
    }

    #[test]
    fn test_json_list_shape() {
        let mut store = ProfileStore::new();
        store.save_at(&EcuState::default(), at(12, 0));
        let json = serde_json::to_value(&store).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["name"], "LOG_1200");
        assert_eq!(json[0]["data"]["rpm"], 850);

        let parsed: ProfileStore = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, store);
    }
}

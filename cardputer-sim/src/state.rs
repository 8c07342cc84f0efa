//! Simulated ECU sensor state
//!
//! [`EcuState`] is the snapshot the dashboard renders and the profile store
//! archives. RPM and speed are hard-clamped after every mutation; the
//! trouble code always follows the MIL flag.
//!
//! Serialized with the camelCase field names used by the handheld's JSON
//! profiles (`temp`, `bleConnected`, ...), so archived files stay readable.

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper RPM bound (lower bound is 0)
pub const RPM_MAX: i32 = 8500;
/// RPM change per RPM_UP / RPM_DOWN press
pub const RPM_STEP: i32 = 250;
/// Upper speed bound in km/h (lower bound is 0)
pub const SPEED_MAX: i32 = 260;
/// Speed change per SPD_UP / SPD_DOWN press
pub const SPEED_STEP: i32 = 10;

/// Trouble code reported when the MIL is off
pub const DTC_NONE: &str = "P0000";
/// Trouble code reported when the MIL is lit (random/multiple misfire)
pub const DTC_MISFIRE: &str = "P0300";

/// Human-readable description for a trouble code in the simulator's vocabulary
pub fn dtc_description(code: &str) -> &'static str {
    match code {
        DTC_NONE => "No fault",
        DTC_MISFIRE => "Random/multiple cylinder misfire",
        _ => "Unknown code",
    }
}

/// One simulated vehicle-sensor snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcuState {
    /// Engine speed, always within [0, RPM_MAX]
    pub rpm: i32,
    /// Vehicle speed in km/h, always within [0, SPEED_MAX]
    pub speed: i32,
    /// Coolant temperature in °C (nominal -40..150, not clamped)
    #[serde(rename = "temp")]
    pub temperature: i32,
    /// Battery voltage (nominal 9..16, one decimal)
    pub voltage: f64,
    /// Engine load in percent
    pub load: u8,
    /// Throttle position in percent
    pub throttle: u8,
    /// Malfunction indicator lamp
    pub mil: bool,
    /// Diagnostic trouble code, derived from `mil`
    pub dtc: String,
    /// A BLE client is connected
    pub ble_connected: bool,
    /// BLE advertising is enabled
    pub ble_enabled: bool,
    /// Advertised device name
    pub device_name: String,
}

impl Default for EcuState {
    fn default() -> Self {
        Self {
            rpm: 850,
            speed: 0,
            temperature: 85,
            voltage: 14.1,
            load: 12,
            throttle: 5,
            mil: false,
            dtc: DTC_NONE.to_string(),
            ble_connected: false,
            ble_enabled: true,
            device_name: "CARDPUTER_OBD".to_string(),
        }
    }
}

impl EcuState {
    /// Move RPM by `steps` × [`RPM_STEP`], clamping once after the full delta.
    pub fn adjust_rpm(&mut self, steps: i32) {
        self.rpm = clamp_rpm(self.rpm.saturating_add(steps.saturating_mul(RPM_STEP)));
    }

    /// Move speed by `steps` × [`SPEED_STEP`], clamping once after the full delta.
    pub fn adjust_speed(&mut self, steps: i32) {
        self.speed = clamp_speed(self.speed.saturating_add(steps.saturating_mul(SPEED_STEP)));
    }

    /// Flip the MIL and re-derive the trouble code.
    pub fn toggle_mil(&mut self) {
        self.set_mil(!self.mil);
    }

    /// Set the MIL; the trouble code follows.
    pub fn set_mil(&mut self, lit: bool) {
        self.mil = lit;
        self.dtc = if lit { DTC_MISFIRE } else { DTC_NONE }.to_string();
    }

    /// Same state with RPM and speed inside their hard ranges and the
    /// trouble code re-derived from the MIL.
    pub fn normalized(mut self) -> EcuState {
        self.rpm = clamp_rpm(self.rpm);
        self.speed = clamp_speed(self.speed);
        self.set_mil(self.mil);
        self
    }

    /// Flip BLE advertising.
    pub fn toggle_ble(&mut self) {
        self.ble_enabled = !self.ble_enabled;
    }

    /// Direct edit of a numeric control.
    ///
    /// RPM and speed are clamped to their hard ranges, voltage is rounded
    /// to one decimal, temperature is stored as given.
    pub fn set_control(&mut self, control: Control, value: f64) {
        match control {
            Control::Rpm => self.rpm = clamp_rpm(value.round() as i32),
            Control::Speed => self.speed = clamp_speed(value.round() as i32),
            Control::Temperature => self.temperature = value.round() as i32,
            Control::Voltage => self.voltage = round_tenth(value),
        }
    }

    /// Slider-style edit: move by `steps` slider increments and keep the
    /// result inside the slider range.
    pub fn nudge_control(&mut self, control: Control, steps: i32) {
        let (min, max) = control.range();
        let next = (self.control_value(control) + control.step() * steps as f64).clamp(min, max);
        self.set_control(control, next);
    }

    /// Current value of a numeric control
    pub fn control_value(&self, control: Control) -> f64 {
        match control {
            Control::Rpm => self.rpm as f64,
            Control::Speed => self.speed as f64,
            Control::Temperature => self.temperature as f64,
            Control::Voltage => self.voltage,
        }
    }
}

fn clamp_rpm(rpm: i32) -> i32 {
    rpm.clamp(0, RPM_MAX)
}

fn clamp_speed(speed: i32) -> i32 {
    speed.clamp(0, SPEED_MAX)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Numeric controls editable outside the keypad (the dashboard fields)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Rpm,
    Speed,
    Temperature,
    Voltage,
}

impl Control {
    /// Dashboard field order; `selected_index` on the dashboard indexes this.
    pub const ALL: &'static [Control] = &[
        Control::Rpm,
        Control::Speed,
        Control::Temperature,
        Control::Voltage,
    ];

    /// Control shown at a dashboard row, if any
    pub fn from_index(index: usize) -> Option<Control> {
        Self::ALL.get(index).copied()
    }

    /// Short LCD label
    pub fn label(&self) -> &'static str {
        match self {
            Control::Rpm => "RPM",
            Control::Speed => "SPD",
            Control::Temperature => "TMP",
            Control::Voltage => "VLT",
        }
    }

    /// Unit suffix
    pub fn unit(&self) -> &'static str {
        match self {
            Control::Rpm => "rpm",
            Control::Speed => "km/h",
            Control::Temperature => "°C",
            Control::Voltage => "V",
        }
    }

    /// Slider range (min, max)
    pub fn range(&self) -> (f64, f64) {
        match self {
            Control::Rpm => (0.0, RPM_MAX as f64),
            Control::Speed => (0.0, SPEED_MAX as f64),
            Control::Temperature => (-40.0, 150.0),
            Control::Voltage => (9.0, 16.0),
        }
    }

    /// Slider increment
    pub fn step(&self) -> f64 {
        match self {
            Control::Rpm => 100.0,
            Control::Speed => 5.0,
            Control::Temperature => 1.0,
            Control::Voltage => 0.1,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Control::Rpm => "rpm",
            Control::Speed => "speed",
            Control::Temperature => "temp",
            Control::Voltage => "voltage",
        };
        f.pad(name)
    }
}

impl FromStr for Control {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rpm" => Ok(Control::Rpm),
            "speed" | "spd" => Ok(Control::Speed),
            "temp" | "temperature" | "tmp" => Ok(Control::Temperature),
            "voltage" | "volt" | "vlt" => Ok(Control::Voltage),
            _ => Err(SimError::UnknownControl(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpm_clamps_after_full_step() {
        let mut ecu = EcuState {
            rpm: 8400,
            ..Default::default()
        };
        ecu.adjust_rpm(1);
        assert_eq!(ecu.rpm, 8500);

        ecu.rpm = 100;
        ecu.adjust_rpm(-1);
        assert_eq!(ecu.rpm, 0);
    }

    #[test]
    fn test_speed_clamps_after_full_step() {
        let mut ecu = EcuState {
            speed: 255,
            ..Default::default()
        };
        ecu.adjust_speed(1);
        assert_eq!(ecu.speed, 260);

        ecu.speed = 5;
        ecu.adjust_speed(-1);
        assert_eq!(ecu.speed, 0);
    }

    #[test]
    fn test_mil_drives_dtc() {
        let mut ecu = EcuState::default();
        ecu.toggle_mil();
        assert!(ecu.mil);
        assert_eq!(ecu.dtc, DTC_MISFIRE);
        ecu.toggle_mil();
        assert!(!ecu.mil);
        assert_eq!(ecu.dtc, DTC_NONE);
    }

    #[test]
    fn test_normalized_clamps_and_rederives_dtc() {
        let ecu = EcuState {
            rpm: 9000,
            speed: -5,
            mil: false,
            dtc: DTC_MISFIRE.to_string(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(ecu.rpm, RPM_MAX);
        assert_eq!(ecu.speed, 0);
        assert_eq!(ecu.dtc, DTC_NONE);
    }

    #[test]
    fn test_set_control_rules() {
        let mut ecu = EcuState::default();
        ecu.set_control(Control::Rpm, 9999.0);
        assert_eq!(ecu.rpm, RPM_MAX);
        ecu.set_control(Control::Speed, -3.0);
        assert_eq!(ecu.speed, 0);
        // Temperature is deliberately left unclamped
        ecu.set_control(Control::Temperature, 200.0);
        assert_eq!(ecu.temperature, 200);
        ecu.set_control(Control::Voltage, 12.345);
        assert_eq!(ecu.voltage, 12.3);
    }

    #[test]
    fn test_nudge_stays_in_slider_range() {
        let mut ecu = EcuState::default();
        ecu.nudge_control(Control::Voltage, 100);
        assert_eq!(ecu.voltage, 16.0);
        ecu.nudge_control(Control::Voltage, -1);
        assert_eq!(ecu.voltage, 15.9);
        ecu.nudge_control(Control::Temperature, -1000);
        assert_eq!(ecu.temperature, -40);
        ecu.nudge_control(Control::Speed, 3);
        assert_eq!(ecu.speed, 15);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(EcuState::default()).unwrap();
        assert_eq!(json["temp"], 85);
        assert_eq!(json["bleEnabled"], true);
        assert_eq!(json["deviceName"], "CARDPUTER_OBD");
        assert_eq!(json["dtc"], "P0000");
    }

    #[test]
    fn test_control_parse() {
        assert_eq!("RPM".parse::<Control>().unwrap(), Control::Rpm);
        assert_eq!("tmp".parse::<Control>().unwrap(), Control::Temperature);
        assert!("boost".parse::<Control>().is_err());
    }
}

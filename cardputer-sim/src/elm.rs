//! ELM327-style responder for the terminal screen
//!
//! Answers a small subset of AT commands and OBD-II mode 01/03 requests
//! from the live [`EcuState`]. Responses are uppercase hex bytes separated
//! by single spaces, the way an ELM327 prints them with spaces enabled.

use crate::state::{EcuState, DTC_MISFIRE};

/// Adapter identification string
pub const ELM_VERSION: &str = "ELM327 v1.5";

/// Requests the terminal screen replays against the live state
pub const TERMINAL_SCRIPT: &[&str] = &["ATZ", "01 0C", "01 0D", "01 05", "ATRV", "03"];

/// Answer one request line
pub fn respond(ecu: &EcuState, request: &str) -> String {
    let cmd: String = request
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    match cmd.as_str() {
        "ATZ" | "ATI" => ELM_VERSION.to_string(),
        "ATRV" => format!("{:.1}V", ecu.voltage),
        "03" => stored_codes(ecu),
        _ if cmd.starts_with("AT") => "OK".to_string(),
        _ => match cmd.strip_prefix("01") {
            Some(pid) => current_data(ecu, pid),
            None => "?".to_string(),
        },
    }
}

/// Replay `script` and pair each request with its response
pub fn transcript(ecu: &EcuState, script: &[&str]) -> Vec<(String, String)> {
    script
        .iter()
        .map(|req| (req.to_string(), respond(ecu, req)))
        .collect()
}

fn current_data(ecu: &EcuState, pid: &str) -> String {
    let Ok(pid) = u8::from_str_radix(pid, 16) else {
        return "?".to_string();
    };
    let data: Vec<u8> = match pid {
        // Monitor status: MIL in bit 7, stored code count in the low bits
        0x01 => {
            let a = if ecu.mil { 0x81 } else { 0x00 };
            vec![a, 0x00, 0x00, 0x00]
        }
        0x04 => vec![percent_byte(ecu.load)],
        0x05 => vec![ecu.temperature.saturating_add(40).clamp(0, 255) as u8],
        0x0C => word((ecu.rpm.max(0) as u32).saturating_mul(4)),
        0x0D => vec![ecu.speed.clamp(0, 255) as u8],
        0x11 => vec![percent_byte(ecu.throttle)],
        0x42 => word((ecu.voltage.max(0.0) * 1000.0).round() as u32),
        _ => return "NO DATA".to_string(),
    };

    let mut out = format!("41 {pid:02X}");
    for byte in data {
        out.push_str(&format!(" {byte:02X}"));
    }
    out
}

fn stored_codes(ecu: &EcuState) -> String {
    if ecu.mil && ecu.dtc == DTC_MISFIRE {
        "43 03 00".to_string()
    } else {
        "43 00".to_string()
    }
}

fn percent_byte(percent: u8) -> u8 {
    (percent.min(100) as u32 * 255 / 100) as u8
}

fn word(value: u32) -> Vec<u8> {
    let value = value.min(u16::MAX as u32) as u16;
    value.to_be_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Control;

    #[test]
    fn test_rpm_pid() {
        let ecu = EcuState::default();
        // 850 rpm * 4 = 3400 = 0x0D48
        assert_eq!(respond(&ecu, "01 0C"), "41 0C 0D 48");
        assert_eq!(respond(&ecu, "010c"), "41 0C 0D 48");
    }

    #[test]
    fn test_sensor_pids() {
        let ecu = EcuState {
            speed: 120,
            temperature: 90,
            load: 100,
            throttle: 50,
            ..Default::default()
        };
        assert_eq!(respond(&ecu, "01 0D"), "41 0D 78");
        assert_eq!(respond(&ecu, "01 05"), "41 05 82");
        assert_eq!(respond(&ecu, "01 04"), "41 04 FF");
        assert_eq!(respond(&ecu, "01 11"), "41 11 7F");
        // 14.1 V = 14100 mV = 0x3714
        assert_eq!(respond(&ecu, "01 42"), "41 42 37 14");
    }

    #[test]
    fn test_speed_saturates_at_byte() {
        let ecu = EcuState {
            speed: 260,
            ..Default::default()
        };
        assert_eq!(respond(&ecu, "01 0D"), "41 0D FF");
    }

    #[test]
    fn test_extreme_values_saturate() {
        let mut ecu = EcuState {
            rpm: i32::MAX,
            temperature: i32::MAX,
            ..Default::default()
        };
        assert_eq!(respond(&ecu, "01 05"), "41 05 FF");
        assert_eq!(respond(&ecu, "01 0C"), "41 0C FF FF");

        ecu.set_control(Control::Temperature, 1e12);
        assert_eq!(respond(&ecu, "01 05"), "41 05 FF");
        ecu.temperature = i32::MIN;
        assert_eq!(respond(&ecu, "01 05"), "41 05 00");
    }

    #[test]
    fn test_at_commands() {
        let ecu = EcuState::default();
        assert_eq!(respond(&ecu, "ATZ"), ELM_VERSION);
        assert_eq!(respond(&ecu, "at rv"), "14.1V");
        assert_eq!(respond(&ecu, "ATE0"), "OK");
    }

    #[test]
    fn test_stored_codes_follow_mil() {
        let mut ecu = EcuState::default();
        assert_eq!(respond(&ecu, "03"), "43 00");
        assert_eq!(respond(&ecu, "01 01"), "41 01 00 00 00 00");
        ecu.toggle_mil();
        assert_eq!(respond(&ecu, "03"), "43 03 00");
        assert_eq!(respond(&ecu, "01 01"), "41 01 81 00 00 00");
    }

    #[test]
    fn test_unknown_requests() {
        let ecu = EcuState::default();
        assert_eq!(respond(&ecu, "01 FF"), "NO DATA");
        assert_eq!(respond(&ecu, "01 ZZ"), "?");
        assert_eq!(respond(&ecu, "09 02"), "?");
    }

    #[test]
    fn test_transcript_pairs() {
        let lines = transcript(&EcuState::default(), TERMINAL_SCRIPT);
        assert_eq!(lines.len(), TERMINAL_SCRIPT.len());
        assert_eq!(lines[0], ("ATZ".to_string(), ELM_VERSION.to_string()));
    }
}

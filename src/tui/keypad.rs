//! Host keyboard → virtual keypad translation

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a host key press means to the simulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Press a virtual keypad key
    Keypad(&'static str),
    ToggleHelp,
    SaveProfile,
    LoadSelectedProfile,
    /// Cycle the action bound to the selected key-mapper row
    CycleBinding,
    Generate,
    NextExportTab,
    Export,
    MoveSelection(isize),
    /// Slider nudge of the selected dashboard field
    Nudge(i32),
    Quit,
}

/// Translate one host key event. Unmapped keys yield `None`.
pub fn translate(key: &KeyEvent) -> Option<HostCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(HostCommand::Quit),
            _ => None,
        };
    }

    let command = match key.code {
        KeyCode::F(1) => HostCommand::ToggleHelp,
        KeyCode::F(2) => HostCommand::SaveProfile,
        KeyCode::F(3) => HostCommand::LoadSelectedProfile,
        KeyCode::F(4) => HostCommand::CycleBinding,
        KeyCode::F(5) => HostCommand::Generate,
        KeyCode::F(6) => HostCommand::NextExportTab,
        KeyCode::F(7) => HostCommand::Export,
        KeyCode::PageUp => HostCommand::MoveSelection(-1),
        KeyCode::PageDown => HostCommand::MoveSelection(1),
        KeyCode::Char('+') | KeyCode::Char('=') => HostCommand::Nudge(1),
        KeyCode::Char('-') => HostCommand::Nudge(-1),
        code => HostCommand::Keypad(keypad_key(code)?),
    };
    Some(command)
}

/// Keypad legend for a host key
pub fn keypad_key(code: KeyCode) -> Option<&'static str> {
    let key = match code {
        KeyCode::Tab => "TAB",
        KeyCode::Enter => "ENT",
        KeyCode::Backspace => "BS",
        KeyCode::Esc => "ESC",
        KeyCode::Up => "UP",
        KeyCode::Down => "DWN",
        KeyCode::Left => "LFT",
        KeyCode::Right => "RGT",
        KeyCode::Char(' ') => "SPC",
        KeyCode::Char('\\') => "OPT",
        KeyCode::Char(c) => char_key(c.to_ascii_uppercase())?,
        _ => return None,
    };
    Some(key)
}

fn char_key(c: char) -> Option<&'static str> {
    #[rustfmt::skip]
    const CHARS: &[(char, &str)] = &[
        ('1', "1"), ('2', "2"), ('3', "3"), ('4', "4"), ('5', "5"),
        ('6', "6"), ('7', "7"), ('8', "8"), ('9', "9"), ('0', "0"),
        ('Q', "Q"), ('W', "W"), ('E', "E"), ('R', "R"), ('T', "T"),
        ('Y', "Y"), ('U', "U"), ('I', "I"), ('O', "O"), ('P', "P"),
        ('A', "A"), ('S', "S"), ('D', "D"), ('F', "F"), ('G', "G"),
        ('H', "H"), ('J', "J"), ('K', "K"), ('L', "L"),
        ('Z', "Z"), ('X', "X"), ('C', "C"), ('V', "V"), ('B', "B"),
        ('N', "N"), ('M', "M"),
        ('[', "["), (';', ";"), (',', ","), ('.', "."), ('/', "/"),
    ];
    CHARS.iter().find(|(ch, _)| *ch == c).map(|(_, key)| *key)
}

/// Help overlay lines: host key, meaning
pub const HELP: &[(&str, &str)] = &[
    ("Letters/digits", "Press the matching keypad key"),
    ("Tab / Enter", "TAB / ENT"),
    ("Arrows", "UP / DWN / LFT / RGT"),
    ("Esc / Bksp / Space", "ESC / BS / SPC"),
    ("\\", "OPT"),
    ("PgUp / PgDn", "Move selection"),
    ("+ / -", "Nudge selected dashboard field"),
    ("F2", "Save profile to SD"),
    ("F3", "Load selected SD profile"),
    ("F4", "Cycle selected key binding"),
    ("F5", "Generate firmware bundle"),
    ("F6 / F7", "Next file tab / export files"),
    ("F1", "Toggle help"),
    ("Ctrl+Q / Ctrl+C", "Quit"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use cardputer_sim::is_layout_key;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(translate(&press(KeyCode::Tab)), Some(HostCommand::Keypad("TAB")));
        assert_eq!(translate(&press(KeyCode::Enter)), Some(HostCommand::Keypad("ENT")));
        assert_eq!(translate(&press(KeyCode::Down)), Some(HostCommand::Keypad("DWN")));
        assert_eq!(translate(&press(KeyCode::Char('\\'))), Some(HostCommand::Keypad("OPT")));
    }

    #[test]
    fn test_letters_are_case_insensitive() {
        assert_eq!(translate(&press(KeyCode::Char('q'))), Some(HostCommand::Keypad("Q")));
        assert_eq!(translate(&press(KeyCode::Char('Q'))), Some(HostCommand::Keypad("Q")));
    }

    #[test]
    fn test_host_controls() {
        assert_eq!(translate(&press(KeyCode::F(5))), Some(HostCommand::Generate));
        assert_eq!(translate(&press(KeyCode::PageDown)), Some(HostCommand::MoveSelection(1)));
        assert_eq!(translate(&press(KeyCode::Char('-'))), Some(HostCommand::Nudge(-1)));
        let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(translate(&quit), Some(HostCommand::Quit));
    }

    #[test]
    fn test_unmapped() {
        assert_eq!(translate(&press(KeyCode::Char('!'))), None);
        assert_eq!(translate(&press(KeyCode::Home)), None);
    }

    #[test]
    fn test_every_translation_is_a_layout_key() {
        let codes = (' '..='~')
            .map(KeyCode::Char)
            .chain([KeyCode::Tab, KeyCode::Enter, KeyCode::Backspace, KeyCode::Esc])
            .chain([KeyCode::Up, KeyCode::Down, KeyCode::Left, KeyCode::Right]);
        for code in codes {
            if let Some(key) = keypad_key(code) {
                assert!(is_layout_key(key), "{key} not on the keypad");
            }
        }
    }
}

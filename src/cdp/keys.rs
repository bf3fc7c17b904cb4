//! WebDriver key table
//!
//! Maps the private-use key codes (`U+E000`..`U+E03D`) to the DOM key
//! names and Windows virtual key codes `Input.dispatchKeyEvent` expects.

use phf::phf_map;

/// Modifier bit: Alt
pub const MODIFIER_ALT: i32 = 1;
/// Modifier bit: Control
pub const MODIFIER_CTRL: i32 = 2;
/// Modifier bit: Meta
pub const MODIFIER_META: i32 = 4;
/// Modifier bit: Shift
pub const MODIFIER_SHIFT: i32 = 8;

/// WebDriver `Null` key, releases every pressed modifier
pub const KEY_NULL: char = '\u{E000}';

/// One named key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDefinition {
    /// DOM `key` value
    pub key: &'static str,
    /// DOM `code` value
    pub code: &'static str,
    /// Windows virtual key code
    pub key_code: i32,
    /// Text the key inserts, if any
    pub text: Option<&'static str>,
    /// Modifier bit for modifier keys, `0` otherwise
    pub modifier: i32,
}

const fn key(key: &'static str, code: &'static str, key_code: i32) -> KeyDefinition {
    KeyDefinition {
        key,
        code,
        key_code,
        text: None,
        modifier: 0,
    }
}

const fn text_key(key: &'static str, code: &'static str, key_code: i32, text: &'static str) -> KeyDefinition {
    KeyDefinition {
        key,
        code,
        key_code,
        text: Some(text),
        modifier: 0,
    }
}

const fn modifier(key: &'static str, code: &'static str, key_code: i32, bit: i32) -> KeyDefinition {
    KeyDefinition {
        key,
        code,
        key_code,
        text: None,
        modifier: bit,
    }
}

static SPECIAL_KEYS: phf::Map<char, KeyDefinition> = phf_map! {
    '\u{E001}' => key("Cancel", "", 3),
    '\u{E002}' => key("Help", "Help", 6),
    '\u{E003}' => key("Backspace", "Backspace", 8),
    '\u{E004}' => key("Tab", "Tab", 9),
    '\u{E005}' => key("Clear", "NumpadEqual", 12),
    '\u{E006}' => text_key("Enter", "Enter", 13, "\r"),
    '\u{E007}' => text_key("Enter", "NumpadEnter", 13, "\r"),
    '\u{E008}' => modifier("Shift", "ShiftLeft", 16, MODIFIER_SHIFT),
    '\u{E009}' => modifier("Control", "ControlLeft", 17, MODIFIER_CTRL),
    '\u{E00A}' => modifier("Alt", "AltLeft", 18, MODIFIER_ALT),
    '\u{E00B}' => key("Pause", "Pause", 19),
    '\u{E00C}' => key("Escape", "Escape", 27),
    '\u{E00D}' => text_key(" ", "Space", 32, " "),
    '\u{E00E}' => key("PageUp", "PageUp", 33),
    '\u{E00F}' => key("PageDown", "PageDown", 34),
    '\u{E010}' => key("End", "End", 35),
    '\u{E011}' => key("Home", "Home", 36),
    '\u{E012}' => key("ArrowLeft", "ArrowLeft", 37),
    '\u{E013}' => key("ArrowUp", "ArrowUp", 38),
    '\u{E014}' => key("ArrowRight", "ArrowRight", 39),
    '\u{E015}' => key("ArrowDown", "ArrowDown", 40),
    '\u{E016}' => key("Insert", "Insert", 45),
    '\u{E017}' => key("Delete", "Delete", 46),
    '\u{E018}' => text_key(";", "Semicolon", 186, ";"),
    '\u{E019}' => text_key("=", "Equal", 187, "="),
    '\u{E01A}' => text_key("0", "Numpad0", 96, "0"),
    '\u{E01B}' => text_key("1", "Numpad1", 97, "1"),
    '\u{E01C}' => text_key("2", "Numpad2", 98, "2"),
    '\u{E01D}' => text_key("3", "Numpad3", 99, "3"),
    '\u{E01E}' => text_key("4", "Numpad4", 100, "4"),
    '\u{E01F}' => text_key("5", "Numpad5", 101, "5"),
    '\u{E020}' => text_key("6", "Numpad6", 102, "6"),
    '\u{E021}' => text_key("7", "Numpad7", 103, "7"),
    '\u{E022}' => text_key("8", "Numpad8", 104, "8"),
    '\u{E023}' => text_key("9", "Numpad9", 105, "9"),
    '\u{E024}' => text_key("*", "NumpadMultiply", 106, "*"),
    '\u{E025}' => text_key("+", "NumpadAdd", 107, "+"),
    '\u{E026}' => text_key(",", "NumpadComma", 108, ","),
    '\u{E027}' => text_key("-", "NumpadSubtract", 109, "-"),
    '\u{E028}' => text_key(".", "NumpadDecimal", 110, "."),
    '\u{E029}' => text_key("/", "NumpadDivide", 111, "/"),
    '\u{E031}' => key("F1", "F1", 112),
    '\u{E032}' => key("F2", "F2", 113),
    '\u{E033}' => key("F3", "F3", 114),
    '\u{E034}' => key("F4", "F4", 115),
    '\u{E035}' => key("F5", "F5", 116),
    '\u{E036}' => key("F6", "F6", 117),
    '\u{E037}' => key("F7", "F7", 118),
    '\u{E038}' => key("F8", "F8", 119),
    '\u{E039}' => key("F9", "F9", 120),
    '\u{E03A}' => key("F10", "F10", 121),
    '\u{E03B}' => key("F11", "F11", 122),
    '\u{E03C}' => key("F12", "F12", 123),
    '\u{E03D}' => modifier("Meta", "MetaLeft", 91, MODIFIER_META),
};

/// Look up a WebDriver key code
pub fn special_key(ch: char) -> Option<&'static KeyDefinition> {
    SPECIAL_KEYS.get(&ch)
}

/// Every modifier key, in release order
pub fn modifier_keys() -> impl Iterator<Item = &'static KeyDefinition> {
    ['\u{E008}', '\u{E009}', '\u{E00A}', '\u{E03D}']
        .into_iter()
        .filter_map(special_key)
}

/// Definition for an ordinary character
pub fn printable_key(ch: char) -> KeyDefinition {
    let key_code = if ch.is_ascii_alphanumeric() {
        ch.to_ascii_uppercase() as i32
    } else if ch == ' ' {
        32
    } else {
        0
    };

    KeyDefinition {
        key: "",
        code: "",
        key_code,
        text: None,
        modifier: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_inserts_carriage_return() {
        let enter = special_key('\u{E007}').unwrap();
        assert_eq!(enter.key, "Enter");
        assert_eq!(enter.key_code, 13);
        assert_eq!(enter.text, Some("\r"));
    }

    #[test]
    fn test_modifier_bits() {
        assert_eq!(special_key('\u{E008}').unwrap().modifier, MODIFIER_SHIFT);
        assert_eq!(special_key('\u{E009}').unwrap().modifier, MODIFIER_CTRL);
        assert_eq!(special_key('\u{E00A}').unwrap().modifier, MODIFIER_ALT);
        assert_eq!(special_key('\u{E03D}').unwrap().modifier, MODIFIER_META);
        assert_eq!(modifier_keys().count(), 4);
    }

    #[test]
    fn test_function_and_numpad_ranges() {
        assert_eq!(special_key('\u{E031}').unwrap().key_code, 112);
        assert_eq!(special_key('\u{E03C}').unwrap().key_code, 123);
        assert_eq!(special_key('\u{E01A}').unwrap().text, Some("0"));
        assert!(special_key('\u{E02A}').is_none());
        assert!(special_key('a').is_none());
    }

    #[test]
    fn test_printable_key_codes() {
        assert_eq!(printable_key('a').key_code, 65);
        assert_eq!(printable_key('7').key_code, 55);
        assert_eq!(printable_key('é').key_code, 0);
    }
}

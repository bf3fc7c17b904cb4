//! Input normalizer
//!
//! Rewrites raw typed text into the WebDriver private-use key codes before
//! it reaches native key delivery.

/// WebDriver `Backspace` key
pub const KEY_BACKSPACE: char = '\u{E003}';
/// WebDriver `Tab` key
pub const KEY_TAB: char = '\u{E004}';
/// WebDriver `Return` key
pub const KEY_RETURN: char = '\u{E006}';
/// WebDriver `Enter` key
pub const KEY_ENTER: char = '\u{E007}';

/// Normalize raw control characters in a single left-to-right pass
///
/// CRLF collapses into one `Return`. Form feed is left untouched. The
/// output is never longer (in chars) than the input.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\u{0008}' => out.push(KEY_BACKSPACE),
            '\t' => out.push(KEY_TAB),
            '\r' => {
                out.push(KEY_RETURN);
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' => out.push(KEY_ENTER),
            other => out.push(other),
        }
    }

    out
}

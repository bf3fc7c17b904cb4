//! Atom invoker
//!
//! Wraps an atom in the shared prelude, runs it in the session's current
//! window and decodes the raw output according to the atom's shape.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::catalog::{Atom, ResponseShape};
use super::scripts::PRELUDE;
use crate::error::Result;
use crate::session::traits::PageExecution;
use crate::webdriver::status::WebDriverStatus;
use crate::webdriver::wire::AtomResult;

/// Leading marker of every generated atom script
pub const ATOM_MARKER: &str = "/* ghost-atom: ";

/// Build the full script for one atom invocation
pub fn build_script(atom: Atom, args: &[Value]) -> Result<String> {
    let args_json = serde_json::to_string(args)?;
    let shape = match atom.shape() {
        ResponseShape::Envelope => "envelope",
        ResponseShape::NestedEnvelope => "nested",
        ResponseShape::Bare => "bare",
    };

    Ok(format!(
        r#"{marker}{name} */
(function () {{
{prelude}
  var shape = '{shape}';
  var atom = {source};
  var args = {args};
  try {{
    var value = encode(atom.apply(null, args.map(decode)));
    if (shape === 'bare') {{
      return JSON.stringify(value);
    }}
    var envelope = JSON.stringify({{ status: 0, value: value }});
    if (shape === 'nested') {{
      return JSON.stringify({{ status: 0, value: envelope }});
    }}
    return envelope;
  }} catch (e) {{
    var status = (e && typeof e.status === 'number') ? e.status : 17;
    var message = (e && e.message) ? e.message : String(e);
    return JSON.stringify({{ status: status, value: {{ message: message }} }});
  }}
}})()"#,
        marker = ATOM_MARKER,
        name = atom.name(),
        prelude = PRELUDE,
        shape = shape,
        source = atom.source(),
        args = args_json,
    ))
}

/// Recover the atom name from a generated script
pub fn atom_name_of(script: &str) -> Option<&str> {
    let rest = script.strip_prefix(ATOM_MARKER)?;
    let end = rest.find(" */")?;
    Some(&rest[..end])
}

/// Decode raw atom output according to the atom's response shape
///
/// Malformed output is reported as an `UnknownError` result rather than an
/// `Err`, since it originates in the page.
pub fn decode(atom: Atom, raw: &str) -> AtomResult {
    match atom.shape() {
        ResponseShape::Envelope => parse_envelope(atom, raw),
        ResponseShape::NestedEnvelope => {
            let outer = parse_envelope(atom, raw);
            if !outer.is_success() {
                return outer;
            }
            match outer.value.as_str() {
                Some(inner) => parse_envelope(atom, inner),
                None => malformed(atom, raw),
            }
        }
        ResponseShape::Bare => match serde_json::from_str::<Value>(raw) {
            Ok(value) => match error_envelope(&value) {
                Some(result) => result,
                None => AtomResult::success(value),
            },
            Err(_) => malformed(atom, raw),
        },
    }
}

fn parse_envelope(atom: Atom, raw: &str) -> AtomResult {
    serde_json::from_str::<AtomResult>(raw).unwrap_or_else(|_| malformed(atom, raw))
}

/// A bare atom that threw still reports through the prelude's envelope
fn error_envelope(value: &Value) -> Option<AtomResult> {
    let status = value.get("status")?.as_i64()?;
    if status == 0 || value.get("value").is_none() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

fn malformed(atom: Atom, raw: &str) -> AtomResult {
    warn!("Atom {} produced malformed output: {}", atom.name(), raw);
    AtomResult::failure(
        WebDriverStatus::UnknownError,
        format!("Unable to decode result of atom {}", atom.name()),
    )
}

/// Executes atoms against one window
#[derive(Debug, Clone)]
pub struct AtomInvoker {
    window: Arc<dyn PageExecution>,
}

impl AtomInvoker {
    /// Create an invoker bound to a window
    pub fn new(window: Arc<dyn PageExecution>) -> Self {
        Self { window }
    }

    /// Run an atom and return the raw text the page produced
    #[instrument(skip(self, args), fields(atom = atom.name()))]
    pub async fn invoke_raw(&self, atom: Atom, args: &[Value]) -> Result<String> {
        let script = build_script(atom, args)?;
        let raw = self.window.evaluate(&script).await?;
        debug!("Atom {} returned {}", atom.name(), raw);
        Ok(raw)
    }

    /// Run an atom and decode its result envelope
    pub async fn invoke(&self, atom: Atom, args: &[Value]) -> Result<AtomResult> {
        let raw = self.invoke_raw(atom, args).await?;
        Ok(decode(atom, &raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_script_embeds_name_and_args() {
        let script = build_script(
            Atom::GetAttributeValue,
            &[json!({"ELEMENT": ":wdc:1"}), json!("hr'ef")],
        )
        .unwrap();
        assert_eq!(atom_name_of(&script), Some("get_attribute_value"));
        assert!(script.contains(r#"[{"ELEMENT":":wdc:1"},"hr'ef"]"#));
        assert!(script.contains("var shape = 'envelope'"));
    }

    #[test]
    fn test_shape_marker_in_script() {
        let nested = build_script(Atom::GetSize, &[]).unwrap();
        assert!(nested.contains("var shape = 'nested'"));
        let bare = build_script(Atom::IsFileInput, &[]).unwrap();
        assert!(bare.contains("var shape = 'bare'"));
    }

    #[test]
    fn test_atom_name_of_foreign_script() {
        assert_eq!(atom_name_of("document.title"), None);
    }

    #[test]
    fn test_decode_envelope() {
        let result = decode(Atom::GetText, r#"{"status":0,"value":"hello"}"#);
        assert_eq!(result, AtomResult::success(json!("hello")));

        let stale = decode(
            Atom::GetText,
            r#"{"status":10,"value":{"message":"Element is no longer attached to the DOM"}}"#,
        );
        assert_eq!(stale.status, 10);
    }

    #[test]
    fn test_decode_nested_envelope_unwraps_twice() {
        let inner = json!({"status": 0, "value": {"width": 10, "height": 20}}).to_string();
        let raw = json!({"status": 0, "value": inner}).to_string();
        let result = decode(Atom::GetSize, &raw);
        assert_eq!(result, AtomResult::success(json!({"width": 10, "height": 20})));
    }

    #[test]
    fn test_decode_nested_envelope_outer_failure() {
        let raw = r#"{"status":10,"value":{"message":"stale"}}"#;
        let result = decode(Atom::GetSize, raw);
        assert_eq!(result.status, 10);
    }

    #[test]
    fn test_decode_nested_envelope_requires_string_value() {
        let raw = r#"{"status":0,"value":{"width":1}}"#;
        let result = decode(Atom::GetLocationInView, raw);
        assert_eq!(result.status, 13);
    }

    #[test]
    fn test_decode_bare() {
        assert_eq!(decode(Atom::IsFileInput, "true"), AtomResult::success(json!(true)));
        let thrown = decode(
            Atom::IsFileInput,
            r#"{"status":10,"value":{"message":"Element does not exist in cache"}}"#,
        );
        assert_eq!(thrown.status, 10);
    }

    #[test]
    fn test_decode_garbage_is_unknown_error() {
        let result = decode(Atom::Click, "<html>");
        assert_eq!(result.status, 13);
        assert!(result.message().unwrap().contains("click"));
    }
}

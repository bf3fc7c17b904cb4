//! Result translator
//!
//! Turns atom result envelopes into wire responses. Never fails: every call
//! yields exactly one response.

use serde_json::Value;

use super::status::WebDriverStatus;
use super::wire::{AtomResult, WireResponse};

/// Translate an atom result, answering success with the atom's value
pub fn translate(session_id: &str, result: AtomResult) -> WireResponse {
    if result.is_success() {
        WireResponse::success(session_id, result.value)
    } else {
        failed(session_id, &result)
    }
}

/// Translate an atom result for operations whose success value is undefined
pub fn translate_empty(session_id: &str, result: AtomResult) -> WireResponse {
    if result.is_success() {
        WireResponse::success_empty(session_id)
    } else {
        failed(session_id, &result)
    }
}

/// Translate an atom result after reshaping a successful value
pub fn translate_with<F>(session_id: &str, result: AtomResult, map: F) -> WireResponse
where
    F: FnOnce(Value) -> Value,
{
    if result.is_success() {
        WireResponse::success(session_id, map(result.value))
    } else {
        failed(session_id, &result)
    }
}

/// Failure body for a non-zero status
pub fn failed(session_id: &str, result: &AtomResult) -> WireResponse {
    let message = result
        .message()
        .map(|m| m.to_string())
        .unwrap_or_else(|| generic_message(result.status).to_string());

    WireResponse::failure(Some(session_id), result.status, message)
}

fn generic_message(status: i64) -> &'static str {
    WebDriverStatus::from_code(status)
        .unwrap_or(WebDriverStatus::UnknownError)
        .message()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_carries_value() {
        let wire = translate("s1", AtomResult::success(json!({"x": 4, "y": 2})));
        assert_eq!(wire.http_status, 200);
        assert_eq!(wire.status, 0);
        assert_eq!(wire.value, json!({"x": 4, "y": 2}));
        assert_eq!(wire.session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_failure_carries_code_and_message() {
        let result = AtomResult {
            status: 10,
            value: json!({"message": "Element is no longer attached to the DOM"}),
        };
        let wire = translate("s1", result);
        assert_eq!(wire.http_status, 500);
        assert_eq!(wire.status, 10);
        assert_eq!(wire.value["message"], "Element is no longer attached to the DOM");
    }

    #[test]
    fn test_failure_without_message_uses_generic() {
        let wire = translate("s1", AtomResult { status: 17, value: Value::Null });
        assert_eq!(wire.status, 17);
        assert_eq!(
            wire.value["message"],
            WebDriverStatus::JavaScriptError.message()
        );

        let odd = translate("s1", AtomResult { status: 99, value: json!("boom") });
        assert_eq!(odd.status, 99);
        assert_eq!(odd.value["message"], WebDriverStatus::UnknownError.message());
    }

    #[test]
    fn test_empty_success_drops_value() {
        let wire = translate_empty("s1", AtomResult::success(json!(true)));
        assert_eq!(wire.value, Value::Null);
        assert!(wire.is_success());
    }

    #[test]
    fn test_translate_with_only_maps_success() {
        let ok = translate_with("s", AtomResult::success(json!(1)), |v| json!([v]));
        assert_eq!(ok.value, json!([1]));

        let err = translate_with(
            "s",
            AtomResult::failure(WebDriverStatus::NoSuchElement, "gone"),
            |_| panic!("mapper must not run on failure"),
        );
        assert_eq!(err.status, 7);
    }
}

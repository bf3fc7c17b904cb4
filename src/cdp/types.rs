//! CDP (Chrome DevTools Protocol) type definitions
//!
//! This module defines the core data structures for CDP communication.

use serde::{Deserialize, Serialize};

/// CDP JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct CdpRequest {
    /// Request ID
    pub id: u64,
    /// Method name (e.g., "Runtime.evaluate")
    pub method: String,
    /// Method parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Session ID for multi-session targets
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// CDP JSON-RPC notification (event)
#[derive(Debug, Clone, Deserialize)]
pub struct CdpNotification {
    /// Event method (e.g., "Page.loadEventFired")
    pub method: String,
    /// Event parameters
    #[serde(default)]
    pub params: serde_json::Value,
    /// Session ID for multi-session targets
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

/// CDP JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct CdpRpcResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    #[serde(default)]
    pub result: serde_json::Value,
    /// Error if any
    #[serde(default)]
    pub error: Option<CdpErrorDetail>,
}

/// CDP error detail
#[derive(Debug, Clone, Deserialize)]
pub struct CdpErrorDetail {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// JavaScript evaluation parameters
#[derive(Debug, Clone, Serialize)]
pub struct EvaluateParams {
    /// JavaScript expression to evaluate
    pub expression: String,
    /// Whether to await promise
    #[serde(skip_serializing_if = "Option::is_none", rename = "awaitPromise")]
    pub await_promise: Option<bool>,
    /// Whether to return as value
    #[serde(skip_serializing_if = "Option::is_none", rename = "returnByValue")]
    pub return_by_value: Option<bool>,
    /// Treat the evaluation as initiated by a user gesture
    #[serde(skip_serializing_if = "Option::is_none", rename = "userGesture")]
    pub user_gesture: Option<bool>,
}

/// Remote object (result of JavaScript evaluation)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RemoteObject {
    /// Object type
    #[serde(default)]
    pub r#type: String,
    /// Object subtype
    #[serde(default)]
    pub subtype: Option<String>,
    /// Object value
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    /// Object description
    #[serde(default)]
    pub description: Option<String>,
}

/// Exception details
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    /// Exception text
    #[serde(default)]
    pub text: Option<String>,
    /// Exception object
    #[serde(default)]
    pub exception: Option<RemoteObject>,
}

impl ExceptionDetails {
    /// Most specific description available
    pub fn describe(&self) -> String {
        self.exception
            .as_ref()
            .and_then(|e| e.description.clone())
            .or_else(|| self.text.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// JavaScript evaluation response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    /// Evaluation result
    #[serde(default)]
    pub result: RemoteObject,
    /// Exception details if evaluation failed
    #[serde(default)]
    pub exception_details: Option<ExceptionDetails>,
}

/// Document node
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Node ID
    pub node_id: i64,
    /// Node name
    #[serde(default)]
    pub node_name: String,
}

/// Get document response
#[derive(Debug, Clone, Deserialize)]
pub struct GetDocumentResponse {
    /// Root node
    pub root: Node,
}

/// `DOM.querySelector` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySelectorResponse {
    /// Matching node, `0` when nothing matched
    pub node_id: i64,
}

/// `Page.getFrameTree` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTreeResponse {
    pub frame_tree: FrameTree,
}

/// Frame tree node; only the frame itself is read
#[derive(Debug, Clone, Deserialize)]
pub struct FrameTree {
    pub frame: Frame,
}

/// Frame description
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: String,
    /// Absent for the main frame
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub url: String,
}

/// `Input.dispatchMouseEvent` parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseEventParams {
    /// `mousePressed`, `mouseReleased` or `mouseMoved`
    pub r#type: &'static str,
    pub x: f64,
    pub y: f64,
    /// `none`, `left`, `middle` or `right`
    pub button: &'static str,
    pub click_count: u32,
    /// Bit field: Alt=1, Ctrl=2, Meta=4, Shift=8
    pub modifiers: i32,
}

/// `Input.dispatchKeyEvent` parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEventParams {
    /// `keyDown`, `keyUp`, `rawKeyDown` or `char`
    pub r#type: &'static str,
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmodified_text: Option<String>,
    pub windows_virtual_key_code: i32,
    pub modifiers: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cdp_request_serialization() {
        let request = CdpRequest {
            id: 1,
            method: "Runtime.evaluate".to_string(),
            params: Some(json!({ "expression": "1 + 1" })),
            session_id: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"method\":\"Runtime.evaluate\""));
    }

    #[test]
    fn test_cdp_request_without_params() {
        let request = CdpRequest {
            id: 2,
            method: "Page.enable".to_string(),
            params: None,
            session_id: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("\"params\""));
        assert!(!json.contains("\"sessionId\""));
    }

    #[test]
    fn test_evaluate_response_with_exception() {
        let response: EvaluateResponse = serde_json::from_value(json!({
            "result": {"type": "object", "subtype": "error"},
            "exceptionDetails": {
                "exceptionId": 1,
                "text": "Uncaught",
                "exception": {"type": "object", "description": "ReferenceError: x is not defined"}
            }
        }))
        .unwrap();

        let details = response.exception_details.unwrap();
        assert_eq!(details.describe(), "ReferenceError: x is not defined");
    }

    #[test]
    fn test_mouse_event_field_names() {
        let params = MouseEventParams {
            r#type: "mousePressed",
            x: 1.0,
            y: 2.0,
            button: "left",
            click_count: 1,
            modifiers: 0,
        };
        let value = serde_json::to_value(params).unwrap();
        assert_eq!(value["type"], "mousePressed");
        assert_eq!(value["clickCount"], 1);
    }

    #[test]
    fn test_key_event_skips_empty_fields() {
        let params = KeyEventParams {
            r#type: "keyUp",
            key: "a".to_string(),
            code: String::new(),
            text: None,
            unmodified_text: None,
            windows_virtual_key_code: 65,
            modifiers: 0,
        };
        let value = serde_json::to_value(params).unwrap();
        assert!(value.get("code").is_none());
        assert!(value.get("text").is_none());
        assert_eq!(value["windowsVirtualKeyCode"], 65);
    }
}

//! Wire-level types for the element command surface
//!
//! Request, element handle, atom envelope and response shapes exchanged
//! between the HTTP front end and the element handler.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use super::status::WebDriverStatus;

/// Opaque, session-scoped DOM element handle
///
/// Minted by the page-side element cache and round-tripped through the
/// wire protocol as `{"ELEMENT": id}`. Not validated locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementReference {
    #[serde(rename = "ELEMENT")]
    pub element_id: String,
}

impl ElementReference {
    /// Create a reference from a raw element id
    pub fn new<S: Into<String>>(element_id: S) -> Self {
        Self {
            element_id: element_id.into(),
        }
    }

    /// Wire form `{"ELEMENT": id}`
    pub fn to_json(&self) -> Value {
        json!({ "ELEMENT": self.element_id })
    }

    /// Parse a wire-form element handle
    pub fn from_json(value: &Value) -> Option<Self> {
        value
            .get("ELEMENT")
            .and_then(|v| v.as_str())
            .map(Self::new)
    }
}

impl fmt::Display for ElementReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.element_id)
    }
}

/// HTTP methods the command surface understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    /// Parse an HTTP method name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed element-scoped request
///
/// `path_suffix` is everything after `/session/:sid/element/:eid/`, and
/// `path_segments` is that suffix split on `/`.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub method: HttpMethod,
    pub path_suffix: String,
    pub path_segments: Vec<String>,
    pub body: Option<Value>,
}

impl CommandRequest {
    /// Build a request from a method and the path remainder after the element id
    pub fn new<S: Into<String>>(method: HttpMethod, path_suffix: S, body: Option<Value>) -> Self {
        let path_suffix = path_suffix.into().trim_matches('/').to_string();
        let path_segments = if path_suffix.is_empty() {
            Vec::new()
        } else {
            path_suffix.split('/').map(|s| s.to_string()).collect()
        };

        Self {
            method,
            path_suffix,
            path_segments,
            body,
        }
    }

    /// First path segment, empty for the bare element resource
    pub fn first_segment(&self) -> &str {
        self.path_segments.first().map(|s| s.as_str()).unwrap_or("")
    }

    /// Path parameter following the first segment (`attribute/:name` etc.)
    pub fn parameter(&self) -> String {
        self.path_segments
            .iter()
            .skip(1)
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Look up a top-level body field
    pub fn body_field(&self, name: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.get(name))
    }

    /// Look up a top-level string body field
    pub fn body_str(&self, name: &str) -> Option<&str> {
        self.body_field(name).and_then(|v| v.as_str())
    }
}

/// Result envelope produced by every atom invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomResult {
    pub status: i64,
    #[serde(default)]
    pub value: Value,
}

impl AtomResult {
    /// Successful result carrying `value`
    pub fn success(value: Value) -> Self {
        Self { status: 0, value }
    }

    /// Failed result with a `{message}` value
    pub fn failure<S: Into<String>>(status: WebDriverStatus, message: S) -> Self {
        Self {
            status: status.code(),
            value: json!({ "message": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// `value.message` when the value carries one
    pub fn message(&self) -> Option<&str> {
        self.value.get("message").and_then(|m| m.as_str())
    }
}

/// A fully-formed wire response, before HTTP encoding
#[derive(Debug, Clone, PartialEq)]
pub struct WireResponse {
    /// HTTP status code
    pub http_status: u16,
    /// Session the response belongs to, if any
    pub session_id: Option<String>,
    /// WebDriver status code
    pub status: i64,
    /// Payload
    pub value: Value,
}

impl WireResponse {
    /// HTTP 200 response with a payload
    pub fn success(session_id: &str, value: Value) -> Self {
        Self {
            http_status: 200,
            session_id: Some(session_id.to_string()),
            status: 0,
            value,
        }
    }

    /// HTTP 200 response whose payload is undefined
    pub fn success_empty(session_id: &str) -> Self {
        Self::success(session_id, Value::Null)
    }

    /// HTTP 500 failed-command response
    pub fn failure<S: Into<String>>(session_id: Option<&str>, status: i64, message: S) -> Self {
        let class = WebDriverStatus::from_code(status)
            .unwrap_or(WebDriverStatus::UnknownError)
            .class_name();

        Self {
            http_status: 500,
            session_id: session_id.map(|s| s.to_string()),
            status,
            value: json!({
                "message": message.into(),
                "class": class,
            }),
        }
    }

    /// Override the HTTP status code
    pub fn with_http_status(mut self, http_status: u16) -> Self {
        self.http_status = http_status;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// JSON Wire Protocol body
    pub fn to_json(&self) -> Value {
        json!({
            "sessionId": self.session_id,
            "status": self.status,
            "value": self.value,
        })
    }
}

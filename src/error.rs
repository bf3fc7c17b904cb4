//! Unified error types for Ghost-Oxide

use std::net;
use thiserror::Error;

use crate::webdriver::status::WebDriverStatus;
use crate::webdriver::wire::WireResponse;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Ghost-Oxide
///
/// Protocol-usage errors (bad route, missing parameter) and collaborator
/// faults live here. Automation-domain failures reported by atoms are not
/// errors: they travel as `AtomResult` data.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network errors
    #[error("Network error: {0}")]
    Net(#[from] net::AddrParseError),

    /// WebSocket errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No route matches the method and path
    #[error("Invalid Command Method: {0}")]
    InvalidCommandMethod(String),

    /// A required body field or path parameter is absent
    #[error("Missing Command Parameter: {0}")]
    MissingCommandParameter(String),

    /// Request path is outside the supported command surface
    #[error("Unknown Command: {0}")]
    UnknownCommand(String),

    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// The session's window is gone
    #[error("Window closed: {0}")]
    WindowClosed(String),

    /// Timeout
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Script execution failed
    #[error("Script execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(msg: S) -> Self {
        Error::WebSocket(msg.into())
    }

    /// Create a new CDP error
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Create a new invalid command method error
    pub fn invalid_command_method<S: Into<String>>(msg: S) -> Self {
        Error::InvalidCommandMethod(msg.into())
    }

    /// Create a new missing command parameter error
    pub fn missing_command_parameter<S: Into<String>>(msg: S) -> Self {
        Error::MissingCommandParameter(msg.into())
    }

    /// Create a new unknown command error
    pub fn unknown_command<S: Into<String>>(msg: S) -> Self {
        Error::UnknownCommand(msg.into())
    }

    /// Create a new session not found error
    pub fn session_not_found<S: Into<String>>(id: S) -> Self {
        Error::SessionNotFound(id.into())
    }

    /// Create a new window closed error
    pub fn window_closed<S: Into<String>>(msg: S) -> Self {
        Error::WindowClosed(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new script execution failed error
    pub fn script_execution_failed<S: Into<String>>(msg: S) -> Self {
        Error::ScriptExecutionFailed(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// HTTP status and WebDriver status this error is reported with
    pub fn wire_codes(&self) -> (u16, WebDriverStatus) {
        match self {
            Error::InvalidCommandMethod(_) | Error::UnknownCommand(_) => {
                (404, WebDriverStatus::UnknownCommand)
            }
            Error::MissingCommandParameter(_) => (400, WebDriverStatus::UnknownError),
            Error::SessionNotFound(_) => (404, WebDriverStatus::NoSuchDriver),
            Error::WindowClosed(_) => (500, WebDriverStatus::NoSuchWindow),
            Error::Timeout(_) => (500, WebDriverStatus::Timeout),
            Error::ScriptExecutionFailed(_) => (500, WebDriverStatus::JavaScriptError),
            _ => (500, WebDriverStatus::UnknownError),
        }
    }

    /// Convert the error into a wire response for the given session
    pub fn to_wire(&self, session_id: Option<&str>) -> WireResponse {
        let (http_status, status) = self.wire_codes();
        WireResponse::failure(session_id, status.code(), self.to_string()).with_http_status(http_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_errors_map_to_client_statuses() {
        let (http, status) = Error::invalid_command_method("POST displayed").wire_codes();
        assert_eq!(http, 404);
        assert_eq!(status, WebDriverStatus::UnknownCommand);

        let (http, _) = Error::missing_command_parameter("name").wire_codes();
        assert_eq!(http, 400);

        let (http, status) = Error::session_not_found("abc").wire_codes();
        assert_eq!(http, 404);
        assert_eq!(status, WebDriverStatus::NoSuchDriver);
    }

    #[test]
    fn test_to_wire_carries_message() {
        let wire = Error::timeout("load").to_wire(Some("s1"));
        assert_eq!(wire.http_status, 500);
        assert_eq!(wire.status, 21);
        assert_eq!(wire.session_id.as_deref(), Some("s1"));
        assert!(wire.value["message"].as_str().unwrap().contains("load"));
    }
}

//! WebDriver JSON Wire Protocol status codes

use serde::{Serialize, Serializer};

/// Status codes carried in the `status` field of every wire response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebDriverStatus {
    Success,
    NoSuchDriver,
    NoSuchElement,
    NoSuchFrame,
    UnknownCommand,
    StaleElementReference,
    ElementNotVisible,
    InvalidElementState,
    UnknownError,
    ElementIsNotSelectable,
    JavaScriptError,
    XPathLookupError,
    Timeout,
    NoSuchWindow,
    InvalidCookieDomain,
    UnableToSetCookie,
    UnexpectedAlertOpen,
    NoAlertOpenError,
    ScriptTimeout,
    InvalidElementCoordinates,
    ImeNotAvailable,
    ImeEngineActivationFailed,
    InvalidSelector,
    SessionNotCreatedException,
    MoveTargetOutOfBounds,
}

impl WebDriverStatus {
    /// Numeric wire code
    pub fn code(self) -> i64 {
        match self {
            WebDriverStatus::Success => 0,
            WebDriverStatus::NoSuchDriver => 6,
            WebDriverStatus::NoSuchElement => 7,
            WebDriverStatus::NoSuchFrame => 8,
            WebDriverStatus::UnknownCommand => 9,
            WebDriverStatus::StaleElementReference => 10,
            WebDriverStatus::ElementNotVisible => 11,
            WebDriverStatus::InvalidElementState => 12,
            WebDriverStatus::UnknownError => 13,
            WebDriverStatus::ElementIsNotSelectable => 15,
            WebDriverStatus::JavaScriptError => 17,
            WebDriverStatus::XPathLookupError => 19,
            WebDriverStatus::Timeout => 21,
            WebDriverStatus::NoSuchWindow => 23,
            WebDriverStatus::InvalidCookieDomain => 24,
            WebDriverStatus::UnableToSetCookie => 25,
            WebDriverStatus::UnexpectedAlertOpen => 26,
            WebDriverStatus::NoAlertOpenError => 27,
            WebDriverStatus::ScriptTimeout => 28,
            WebDriverStatus::InvalidElementCoordinates => 29,
            WebDriverStatus::ImeNotAvailable => 30,
            WebDriverStatus::ImeEngineActivationFailed => 31,
            WebDriverStatus::InvalidSelector => 32,
            WebDriverStatus::SessionNotCreatedException => 33,
            WebDriverStatus::MoveTargetOutOfBounds => 34,
        }
    }

    /// Look up a status by its wire code
    pub fn from_code(code: i64) -> Option<Self> {
        let status = match code {
            0 => WebDriverStatus::Success,
            6 => WebDriverStatus::NoSuchDriver,
            7 => WebDriverStatus::NoSuchElement,
            8 => WebDriverStatus::NoSuchFrame,
            9 => WebDriverStatus::UnknownCommand,
            10 => WebDriverStatus::StaleElementReference,
            11 => WebDriverStatus::ElementNotVisible,
            12 => WebDriverStatus::InvalidElementState,
            13 => WebDriverStatus::UnknownError,
            15 => WebDriverStatus::ElementIsNotSelectable,
            17 => WebDriverStatus::JavaScriptError,
            19 => WebDriverStatus::XPathLookupError,
            21 => WebDriverStatus::Timeout,
            23 => WebDriverStatus::NoSuchWindow,
            24 => WebDriverStatus::InvalidCookieDomain,
            25 => WebDriverStatus::UnableToSetCookie,
            26 => WebDriverStatus::UnexpectedAlertOpen,
            27 => WebDriverStatus::NoAlertOpenError,
            28 => WebDriverStatus::ScriptTimeout,
            29 => WebDriverStatus::InvalidElementCoordinates,
            30 => WebDriverStatus::ImeNotAvailable,
            31 => WebDriverStatus::ImeEngineActivationFailed,
            32 => WebDriverStatus::InvalidSelector,
            33 => WebDriverStatus::SessionNotCreatedException,
            34 => WebDriverStatus::MoveTargetOutOfBounds,
            _ => return None,
        };
        Some(status)
    }

    /// Exception class name reported to clients in `value.class`
    pub fn class_name(self) -> &'static str {
        match self {
            WebDriverStatus::Success => "Success",
            WebDriverStatus::NoSuchDriver => "NoSuchDriver",
            WebDriverStatus::NoSuchElement => "NoSuchElement",
            WebDriverStatus::NoSuchFrame => "NoSuchFrame",
            WebDriverStatus::UnknownCommand => "UnknownCommand",
            WebDriverStatus::StaleElementReference => "StaleElementReference",
            WebDriverStatus::ElementNotVisible => "ElementNotVisible",
            WebDriverStatus::InvalidElementState => "InvalidElementState",
            WebDriverStatus::UnknownError => "UnknownError",
            WebDriverStatus::ElementIsNotSelectable => "ElementIsNotSelectable",
            WebDriverStatus::JavaScriptError => "JavaScriptError",
            WebDriverStatus::XPathLookupError => "XPathLookupError",
            WebDriverStatus::Timeout => "Timeout",
            WebDriverStatus::NoSuchWindow => "NoSuchWindow",
            WebDriverStatus::InvalidCookieDomain => "InvalidCookieDomain",
            WebDriverStatus::UnableToSetCookie => "UnableToSetCookie",
            WebDriverStatus::UnexpectedAlertOpen => "UnexpectedAlertOpen",
            WebDriverStatus::NoAlertOpenError => "NoAlertOpenError",
            WebDriverStatus::ScriptTimeout => "ScriptTimeout",
            WebDriverStatus::InvalidElementCoordinates => "InvalidElementCoordinates",
            WebDriverStatus::ImeNotAvailable => "IMENotAvailable",
            WebDriverStatus::ImeEngineActivationFailed => "IMEEngineActivationFailed",
            WebDriverStatus::InvalidSelector => "InvalidSelector",
            WebDriverStatus::SessionNotCreatedException => "SessionNotCreatedException",
            WebDriverStatus::MoveTargetOutOfBounds => "MoveTargetOutOfBounds",
        }
    }

    /// Generic message used when a failure carries no message of its own
    pub fn message(self) -> &'static str {
        match self {
            WebDriverStatus::Success => "The command executed successfully.",
            WebDriverStatus::NoSuchDriver => "A session is either terminated or not started.",
            WebDriverStatus::NoSuchElement => {
                "An element could not be located on the page using the given search parameters."
            }
            WebDriverStatus::NoSuchFrame => {
                "A request to switch to a frame could not be satisfied because the frame could not be found."
            }
            WebDriverStatus::UnknownCommand => {
                "The requested resource could not be found, or a request was received using an HTTP method that is not supported by the mapped resource."
            }
            WebDriverStatus::StaleElementReference => {
                "An element command failed because the referenced element is no longer attached to the DOM."
            }
            WebDriverStatus::ElementNotVisible => {
                "An element command could not be completed because the element is not visible on the page."
            }
            WebDriverStatus::InvalidElementState => {
                "An element command could not be completed because the element is in an invalid state."
            }
            WebDriverStatus::UnknownError => {
                "An unknown server-side error occurred while processing the command."
            }
            WebDriverStatus::ElementIsNotSelectable => {
                "An attempt was made to select an element that cannot be selected."
            }
            WebDriverStatus::JavaScriptError => {
                "An error occurred while executing user supplied JavaScript."
            }
            WebDriverStatus::XPathLookupError => {
                "An error occurred while searching for an element by XPath."
            }
            WebDriverStatus::Timeout => "An operation did not complete before its timeout expired.",
            WebDriverStatus::NoSuchWindow => {
                "A request to switch to a different window could not be satisfied because the window could not be found."
            }
            WebDriverStatus::InvalidCookieDomain => {
                "An illegal attempt was made to set a cookie under a different domain than the current page."
            }
            WebDriverStatus::UnableToSetCookie => {
                "A request to set a cookie's value could not be satisfied."
            }
            WebDriverStatus::UnexpectedAlertOpen => "A modal dialog was open, blocking this operation.",
            WebDriverStatus::NoAlertOpenError => {
                "An attempt was made to operate on a modal dialog when one was not open."
            }
            WebDriverStatus::ScriptTimeout => {
                "A script did not complete before its timeout expired."
            }
            WebDriverStatus::InvalidElementCoordinates => {
                "The coordinates provided to an interactions operation are invalid."
            }
            WebDriverStatus::ImeNotAvailable => "IME was not available.",
            WebDriverStatus::ImeEngineActivationFailed => "An IME engine could not be started.",
            WebDriverStatus::InvalidSelector => "Argument was an invalid selector.",
            WebDriverStatus::SessionNotCreatedException => "A new session could not be created.",
            WebDriverStatus::MoveTargetOutOfBounds => {
                "Target provided for a move action is out of bounds."
            }
        }
    }
}

impl Serialize for WebDriverStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_lookup_is_consistent() {
        for code in 0..40 {
            if let Some(status) = WebDriverStatus::from_code(code) {
                assert_eq!(status.code(), code);
            }
        }
        assert_eq!(WebDriverStatus::from_code(14), None);
        assert_eq!(WebDriverStatus::from_code(21), Some(WebDriverStatus::Timeout));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_value(WebDriverStatus::StaleElementReference).unwrap();
        assert_eq!(json, serde_json::json!(10));
    }
}

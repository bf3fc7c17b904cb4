//! URL routing for the HTTP command surface
//!
//! Splits a request path into the session-level endpoint it addresses.
//! Element sub-commands are left to the element router.

use crate::webdriver::HttpMethod;

/// Optional mount prefix used by Selenium clients
const HUB_PREFIX: &str = "/wd/hub";

/// Endpoint addressed by a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `GET /status`
    Status,
    /// `POST /session`
    NewSession,
    /// `GET /sessions`
    ListSessions,
    /// `GET /session/:sid`
    GetSession { session_id: String },
    /// `DELETE /session/:sid`
    DeleteSession { session_id: String },
    /// `POST /session/:sid/element` and `/elements`
    FindFromRoot { session_id: String, many: bool },
    /// Anything under `/session/:sid/element/:eid`
    Element {
        session_id: String,
        element_id: String,
        suffix: String,
    },
    /// No endpoint matches
    Unknown,
}

/// Resolve a method and path to an endpoint
pub fn resolve(method: HttpMethod, path: &str) -> Route {
    let path = path.strip_prefix(HUB_PREFIX).unwrap_or(path);
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        (HttpMethod::Get, ["status"]) => Route::Status,
        (HttpMethod::Post, ["session"]) => Route::NewSession,
        (HttpMethod::Get, ["sessions"]) => Route::ListSessions,
        (HttpMethod::Get, ["session", sid]) => Route::GetSession {
            session_id: sid.to_string(),
        },
        (HttpMethod::Delete, ["session", sid]) => Route::DeleteSession {
            session_id: sid.to_string(),
        },
        (HttpMethod::Post, ["session", sid, "element"]) => Route::FindFromRoot {
            session_id: sid.to_string(),
            many: false,
        },
        (HttpMethod::Post, ["session", sid, "elements"]) => Route::FindFromRoot {
            session_id: sid.to_string(),
            many: true,
        },
        (_, ["session", sid, "element", eid, rest @ ..]) if !eid.is_empty() => Route::Element {
            session_id: sid.to_string(),
            element_id: eid.to_string(),
            suffix: rest.join("/"),
        },
        _ => Route::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_endpoints() {
        assert_eq!(resolve(HttpMethod::Get, "/status"), Route::Status);
        assert_eq!(resolve(HttpMethod::Post, "/session"), Route::NewSession);
        assert_eq!(resolve(HttpMethod::Get, "/sessions"), Route::ListSessions);
        assert_eq!(
            resolve(HttpMethod::Delete, "/session/abc"),
            Route::DeleteSession {
                session_id: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_hub_prefix_is_optional() {
        assert_eq!(resolve(HttpMethod::Get, "/wd/hub/status"), Route::Status);
        assert_eq!(
            resolve(HttpMethod::Post, "/wd/hub/session/s1/elements"),
            Route::FindFromRoot {
                session_id: "s1".to_string(),
                many: true
            }
        );
    }

    #[test]
    fn test_element_suffix() {
        assert_eq!(
            resolve(HttpMethod::Get, "/session/s1/element/:wdc:3/attribute/href"),
            Route::Element {
                session_id: "s1".to_string(),
                element_id: ":wdc:3".to_string(),
                suffix: "attribute/href".to_string(),
            }
        );
        assert_eq!(
            resolve(HttpMethod::Get, "/session/s1/element/e1"),
            Route::Element {
                session_id: "s1".to_string(),
                element_id: "e1".to_string(),
                suffix: String::new(),
            }
        );
    }

    #[test]
    fn test_element_accepts_any_method() {
        // method validation belongs to the element router
        assert!(matches!(
            resolve(HttpMethod::Delete, "/session/s1/element/e1/click"),
            Route::Element { .. }
        ));
    }

    #[test]
    fn test_unknown_paths() {
        assert_eq!(resolve(HttpMethod::Get, "/session"), Route::Unknown);
        assert_eq!(resolve(HttpMethod::Post, "/status"), Route::Unknown);
        assert_eq!(resolve(HttpMethod::Get, "/session/s1/url"), Route::Unknown);
        assert_eq!(resolve(HttpMethod::Get, "/"), Route::Unknown);
    }
}

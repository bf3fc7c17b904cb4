//! Session manager implementation
//!
//! Keeps every live session keyed by ID with thread-safe operations.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::session::context::Session;
use crate::session::traits::{SessionManager, WindowFactory};
use crate::Error;

/// Start URL used when the capabilities name none
pub const DEFAULT_START_URL: &str = "about:blank";

/// Session manager implementation
pub struct SessionManagerImpl {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    window_factory: Arc<dyn WindowFactory>,
    native_events: bool,
}

impl SessionManagerImpl {
    /// Create a new session manager
    pub fn new(window_factory: Arc<dyn WindowFactory>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            window_factory,
            native_events: true,
        }
    }

    /// Report whether sessions deliver native input events
    pub fn with_native_events(mut self, enabled: bool) -> Self {
        self.native_events = enabled;
        self
    }

    /// Create a session manager backed by mock windows for testing
    pub fn mock() -> Self {
        Self::new(Arc::new(crate::session::mock::MockWindowFactory::new()))
    }

    fn start_url(capabilities: &Value) -> String {
        capabilities
            .pointer("/ghost/startUrl")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_START_URL)
            .to_string()
    }

    /// Capabilities reported back for a new session
    fn reported_capabilities(&self, requested: &Value) -> Value {
        let mut caps = json!({
            "browserName": "chrome",
            "version": env!("CARGO_PKG_VERSION"),
            "platform": std::env::consts::OS,
            "javascriptEnabled": true,
            "nativeEvents": self.native_events,
            "takesScreenshot": false,
            "handlesAlerts": false,
            "cssSelectorsEnabled": true,
        });
        if let (Some(out), Some(ghost)) = (caps.as_object_mut(), requested.get("ghost")) {
            out.insert("ghost".to_string(), ghost.clone());
        }
        caps
    }
}

#[cfg(test)]
impl Default for SessionManagerImpl {
    fn default() -> Self {
        Self::mock()
    }
}

#[async_trait]
impl SessionManager for SessionManagerImpl {
    async fn create_session(&self, capabilities: Value) -> Result<Arc<Session>, Error> {
        let start_url = Self::start_url(&capabilities);
        let handles = self.window_factory.open_window(&start_url).await?;

        let session_id = Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(
            session_id.clone(),
            handles,
            self.reported_capabilities(&capabilities),
        ));

        self.sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .insert(session_id.clone(), session.clone());

        info!("Created session {} at {}", session_id, start_url);
        Ok(session)
    }

    async fn get_session(&self, session_id: &str) -> Result<Arc<Session>, Error> {
        self.sessions
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::session_not_found(session_id))
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), Error> {
        let session = self
            .sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .remove(session_id)
            .ok_or_else(|| Error::session_not_found(session_id))?;

        session.close().await
    }

    async fn list_sessions(&self) -> Result<Vec<String>, Error> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        Ok(sessions.keys().cloned().collect())
    }

    async fn cleanup(&self, max_idle_secs: u64) -> Result<usize, Error> {
        let expired: Vec<Arc<Session>> = {
            let mut sessions = self
                .sessions
                .write()
                .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

            let ids: Vec<String> = sessions
                .iter()
                .filter(|(_, s)| s.idle_for() >= max_idle_secs as i64 || !s.current_window().is_active())
                .map(|(id, _)| id.clone())
                .collect();

            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };
        // Lock guard dropped before closing windows

        for session in &expired {
            if let Err(e) = session.close().await {
                warn!("Failed to close expired session {}: {}", session.id(), e);
            }
        }

        Ok(expired.len())
    }

    fn session_count(&self) -> usize {
        self.sessions
            .read()
            .map(|s| s.len())
            .unwrap_or(0)
    }
}

//! Automation session
//!
//! One session owns its current window, its native input device and the
//! offset of the frame commands currently address.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::session::traits::{InputDevice, PageExecution, Point, WindowHandles};
use crate::Error;

/// A live automation session
#[derive(Debug)]
pub struct Session {
    id: String,
    window: Arc<dyn PageExecution>,
    inputs: Arc<dyn InputDevice>,
    frame_offset: RwLock<Point>,
    capabilities: Value,
    created_at: DateTime<Utc>,
    last_activity: RwLock<DateTime<Utc>>,
    command_gate: Mutex<()>,
}

impl Session {
    /// Create a new session over an opened window
    pub fn new(id: impl Into<String>, handles: WindowHandles, capabilities: Value) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            window: handles.window,
            inputs: handles.inputs,
            frame_offset: RwLock::new(Point::default()),
            capabilities,
            created_at: now,
            last_activity: RwLock::new(now),
            command_gate: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Window that receives atoms and load notifications
    pub fn current_window(&self) -> Arc<dyn PageExecution> {
        self.window.clone()
    }

    /// Native input device
    pub fn inputs(&self) -> Arc<dyn InputDevice> {
        self.inputs.clone()
    }

    /// Offset of the current frame relative to the top-level viewport
    pub fn frame_offset(&self) -> Point {
        self.frame_offset.read().map(|p| *p).unwrap_or_default()
    }

    pub fn set_frame_offset(&self, offset: Point) {
        if let Ok(mut current) = self.frame_offset.write() {
            *current = offset;
        }
    }

    /// Capabilities reported to the client
    pub fn capabilities(&self) -> &Value {
        &self.capabilities
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Record activity now
    pub fn touch(&self) {
        if let Ok(mut last) = self.last_activity.write() {
            *last = Utc::now();
        }
    }

    /// Seconds since the last command
    pub fn idle_for(&self) -> i64 {
        let last = self
            .last_activity
            .read()
            .map(|t| *t)
            .unwrap_or(self.created_at);
        (Utc::now() - last).num_seconds()
    }

    /// Serialize commands on this session
    ///
    /// Held for the whole duration of one command, including the load wait.
    pub async fn lock_commands(&self) -> MutexGuard<'_, ()> {
        let guard = self.command_gate.lock().await;
        self.touch();
        guard
    }

    /// Close the session's window
    pub async fn close(&self) -> Result<(), Error> {
        info!("Closing session {}", self.id);
        if self.window.is_active() {
            self.window.close().await?;
        } else {
            debug!("Window {} already closed", self.window.id());
        }
        Ok(())
    }
}

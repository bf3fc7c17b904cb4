//! Session collaborator traits
//!
//! Abstract interfaces the element command layer drives: script execution
//! and load notification in a window, native input delivery, the local
//! filesystem, and window creation for new sessions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::session::context::Session;

/// Outcome of a page load observed after a wrapped command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The load completed, or no navigation was started
    Finished,
    /// The load failed; `"timeout"` is reserved for an expired wait
    Failed(String),
}

/// Load outcome subscription held across one wrapped command
///
/// Events are observed from the moment of subscription, but the
/// no-navigation settle window only starts once the action has finished.
#[derive(Debug)]
pub struct LoadSubscription {
    outcome: oneshot::Receiver<LoadOutcome>,
    action_done: Option<oneshot::Sender<()>>,
}

impl LoadSubscription {
    pub fn new(outcome: oneshot::Receiver<LoadOutcome>, action_done: oneshot::Sender<()>) -> Self {
        Self {
            outcome,
            action_done: Some(action_done),
        }
    }

    /// Signal that the action ran to completion and hand out the outcome
    pub fn action_finished(mut self) -> oneshot::Receiver<LoadOutcome> {
        if let Some(done) = self.action_done.take() {
            let _ = done.send(());
        }
        self.outcome
    }
}

/// Viewport point in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset this point by another
    pub fn offset_by(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// CDP button name
    pub fn as_str(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Middle => "middle",
            MouseButton::Right => "right",
        }
    }
}

/// Kind of synthesized mouse button event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Click,
    DoubleClick,
    Down,
    Up,
}

/// Script execution and load notification in one window
///
/// Implemented by the CDP page backend and by test mocks.
#[async_trait]
pub trait PageExecution: Send + Sync + std::fmt::Debug {
    /// Window ID
    fn id(&self) -> &str;

    /// Evaluate a script and return its string result
    async fn evaluate(&self, script: &str) -> Result<String, crate::Error>;

    /// Subscribe to the next load outcome
    ///
    /// Exactly one outcome is delivered per subscription. When no
    /// navigation starts within the settle window after
    /// [`LoadSubscription::action_finished`], `LoadOutcome::Finished` is
    /// delivered.
    async fn subscribe_load_outcome(&self) -> Result<LoadSubscription, crate::Error>;

    /// Set the files of the file input matched by `selector`
    async fn upload_file(&self, selector: &str, paths: &[PathBuf]) -> Result<(), crate::Error>;

    /// Close the window
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if the window is still open
    fn is_active(&self) -> bool;
}

/// Native mouse and keyboard delivery for one session
///
/// Holds the pressed-modifier state and the current mouse position.
#[async_trait]
pub trait InputDevice: Send + Sync + std::fmt::Debug {
    /// Move the mouse to a viewport point
    async fn mouse_move(&self, point: Point) -> Result<(), crate::Error>;

    /// Synthesize a mouse button event at the current position
    async fn mouse_button_click(&self, button: MouseButton, kind: ClickKind) -> Result<(), crate::Error>;

    /// Type text into the focused element
    ///
    /// WebDriver private-use key codes are delivered as keys, and modifier
    /// keys stay pressed until cleared.
    async fn send_keys(&self, text: &str) -> Result<(), crate::Error>;

    /// Release every pressed modifier key
    async fn clear_modifier_keys(&self) -> Result<(), crate::Error>;
}

/// Filesystem queries used by the upload path
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    fn exists(&self, path: &Path) -> bool;
}

/// `std::fs` backed filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Window and input device pair backing a new session
#[derive(Debug, Clone)]
pub struct WindowHandles {
    pub window: Arc<dyn PageExecution>,
    pub inputs: Arc<dyn InputDevice>,
}

/// Opens browser windows for new sessions
#[async_trait]
pub trait WindowFactory: Send + Sync {
    /// Open a window at `start_url`
    async fn open_window(&self, start_url: &str) -> Result<WindowHandles, crate::Error>;
}

/// Session manager trait
///
/// Owns every live session.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Create a session with the given desired capabilities
    async fn create_session(&self, capabilities: serde_json::Value) -> Result<Arc<Session>, crate::Error>;

    /// Get a session by ID
    async fn get_session(&self, session_id: &str) -> Result<Arc<Session>, crate::Error>;

    /// Remove and close a session
    async fn delete_session(&self, session_id: &str) -> Result<(), crate::Error>;

    /// List session IDs
    async fn list_sessions(&self) -> Result<Vec<String>, crate::Error>;

    /// Close sessions idle longer than `max_idle_secs`, returning how many
    async fn cleanup(&self, max_idle_secs: u64) -> Result<usize, crate::Error>;

    /// Get session count
    fn session_count(&self) -> usize;
}

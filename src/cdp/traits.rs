//! CDP (Chrome DevTools Protocol) layer traits
//!
//! This module defines the abstract interfaces for CDP communication.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// CDP event representation
#[derive(Debug, Clone)]
pub struct CdpEvent {
    /// Event method (e.g., "Page.loadEventFired")
    pub method: String,
    /// Event parameters
    pub params: Value,
    /// Session ID (for multi-session targets)
    pub session_id: Option<String>,
}

impl CdpEvent {
    pub fn new<S: Into<String>>(method: S, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
            session_id: None,
        }
    }
}

/// CDP response representation
#[derive(Debug, Clone)]
pub struct CdpResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    pub result: Option<Value>,
    /// Error if any
    pub error: Option<CdpError>,
}

/// CDP error representation
#[derive(Debug, Clone)]
pub struct CdpError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    pub data: Option<Value>,
}

/// CDP connection trait
///
/// Represents a WebSocket connection to a Chrome DevTools Protocol target.
#[async_trait]
pub trait CdpConnection: Send + Sync + std::fmt::Debug {
    /// Send a CDP command and wait for response
    async fn send_command(
        &self,
        method: &str,
        params: Value,
    ) -> Result<CdpResponse, crate::Error>;

    /// Subscribe to CDP events
    async fn listen_events(&self) -> Result<tokio::sync::mpsc::Receiver<CdpEvent>, crate::Error>;

    /// Close the connection
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if connection is active
    fn is_active(&self) -> bool;
}

/// CDP client trait
///
/// Typed methods over one target connection.
#[async_trait]
pub trait CdpClient: Send + Sync + std::fmt::Debug {
    /// Get the underlying connection
    fn connection(&self) -> Arc<dyn CdpConnection>;

    /// Evaluate JavaScript in the page and return its value by value
    async fn evaluate(&self, script: &str) -> Result<Value, crate::Error>;

    /// Enable a domain
    async fn enable_domain(&self, domain: &str) -> Result<(), crate::Error>;

    /// Call a raw CDP method (returns JSON Value)
    async fn call_method(&self, method: &str, params: Value) -> Result<Value, crate::Error>;

    /// Subscribe to the events named in `methods` (`"*"` matches all)
    async fn subscribe_events(&self, methods: &[&str]) -> Result<tokio::sync::mpsc::Receiver<CdpEvent>, crate::Error>;
}

/// CDP browser trait
///
/// Controls browser-level operations via the DevTools HTTP endpoints.
#[async_trait]
pub trait CdpBrowser: Send + Sync + std::fmt::Debug {
    /// Connect a client to a target's WebSocket URL
    async fn create_client(&self, ws_url: &str) -> Result<Arc<dyn CdpClient>, crate::Error>;

    /// Open a new page target at `url`
    async fn create_target(&self, url: &str) -> Result<TargetInfo, crate::Error>;

    /// Close a page target
    async fn close_target(&self, target_id: &str) -> Result<(), crate::Error>;

    /// Get browser version
    async fn get_version(&self) -> Result<BrowserVersion, crate::Error>;

    /// Close every connection opened through this browser
    async fn close(&self) -> Result<(), crate::Error>;
}

/// Browser version information
#[derive(Debug, Clone)]
pub struct BrowserVersion {
    /// Protocol version
    pub protocol_version: String,
    /// Product name
    pub product: String,
    /// User agent
    pub user_agent: String,
}

/// Page target information
#[derive(Debug, Clone, PartialEq)]
pub struct TargetInfo {
    /// Target ID
    pub target_id: String,
    /// Target URL
    pub url: String,
    /// WebSocket debugger URL
    pub ws_url: String,
}

//! Mock CDP implementation for testing
//!
//! A scripted connection that records every command and lets tests inject
//! events, plus a browser handing out clients over such connections.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

use crate::cdp::client::CdpClientImpl;
use crate::cdp::traits::*;
use crate::Error;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Mock CDP connection
#[derive(Debug)]
pub struct MockCdpConnection {
    is_active: AtomicBool,
    next_id: AtomicU64,
    responses: Mutex<HashMap<String, Value>>,
    commands: Mutex<Vec<(String, Value)>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<CdpEvent>>>,
}

impl MockCdpConnection {
    /// Create a new mock CDP connection
    pub fn new() -> Self {
        Self {
            is_active: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
            responses: Mutex::new(HashMap::new()),
            commands: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Answer `method` with `result`
    pub fn respond(&self, method: &str, result: Value) {
        lock(&self.responses).insert(method.to_string(), result);
    }

    /// Commands sent so far with their parameters
    pub fn commands(&self) -> Vec<(String, Value)> {
        lock(&self.commands).clone()
    }

    /// Commands sent so far for one method
    pub fn commands_for(&self, method: &str) -> Vec<Value> {
        lock(&self.commands)
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Deliver an event to every listener
    pub fn emit(&self, event: CdpEvent) {
        lock(&self.subscribers).retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// Simulate the browser dropping the socket
    pub fn disconnect(&self) {
        self.is_active.store(false, Ordering::SeqCst);
        lock(&self.subscribers).clear();
    }
}

impl Default for MockCdpConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpConnection for MockCdpConnection {
    async fn send_command(&self, method: &str, params: Value) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::window_closed("Connection is closed"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.commands).push((method.to_string(), params));

        let result = lock(&self.responses)
            .get(method)
            .cloned()
            .unwrap_or_else(|| json!({}));

        Ok(CdpResponse {
            id,
            result: Some(result),
            error: None,
        })
    }

    async fn listen_events(&self) -> Result<mpsc::Receiver<CdpEvent>, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::window_closed("Connection is closed"));
        }

        let (unbounded_tx, mut unbounded_rx) = mpsc::unbounded_channel();
        lock(&self.subscribers).push(unbounded_tx);

        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(async move {
            while let Some(event) = unbounded_rx.recv().await {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }

    async fn close(&self) -> Result<(), Error> {
        self.disconnect();
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}

/// Mock CDP browser
#[derive(Debug, Default)]
pub struct MockCdpBrowser {
    connections: Mutex<HashMap<String, Arc<MockCdpConnection>>>,
    created: Mutex<Vec<TargetInfo>>,
    closed: Mutex<Vec<String>>,
}

impl MockCdpBrowser {
    /// Create a new mock browser
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection backing a target's WebSocket URL
    pub fn connection(&self, ws_url: &str) -> Option<Arc<MockCdpConnection>> {
        lock(&self.connections).get(ws_url).cloned()
    }

    /// Targets created so far
    pub fn created_targets(&self) -> Vec<TargetInfo> {
        lock(&self.created).clone()
    }

    /// Target IDs closed so far
    pub fn closed_targets(&self) -> Vec<String> {
        lock(&self.closed).clone()
    }
}

#[async_trait]
impl CdpBrowser for MockCdpBrowser {
    async fn create_client(&self, ws_url: &str) -> Result<Arc<dyn CdpClient>, Error> {
        let connection = lock(&self.connections)
            .entry(ws_url.to_string())
            .or_insert_with(|| Arc::new(MockCdpConnection::new()))
            .clone();
        Ok(Arc::new(CdpClientImpl::new(connection)))
    }

    async fn create_target(&self, url: &str) -> Result<TargetInfo, Error> {
        let target_id = uuid::Uuid::new_v4().to_string();
        let target = TargetInfo {
            target_id: target_id.clone(),
            url: url.to_string(),
            ws_url: format!("ws://mock/devtools/page/{}", target_id),
        };
        // Chrome names a page's main frame after its target
        let connection = Arc::new(MockCdpConnection::new());
        connection.respond(
            "Page.getFrameTree",
            json!({ "frameTree": { "frame": { "id": target_id, "url": url } } }),
        );
        lock(&self.connections).insert(target.ws_url.clone(), connection);

        lock(&self.created).push(target.clone());
        Ok(target)
    }

    async fn close_target(&self, target_id: &str) -> Result<(), Error> {
        lock(&self.closed).push(target_id.to_string());
        Ok(())
    }

    async fn get_version(&self) -> Result<BrowserVersion, Error> {
        Ok(BrowserVersion {
            protocol_version: "1.3".to_string(),
            product: "MockChrome/1.0".to_string(),
            user_agent: "Mozilla/5.0 (Mock)".to_string(),
        })
    }

    async fn close(&self) -> Result<(), Error> {
        let connections: Vec<_> = lock(&self.connections).drain().map(|(_, c)| c).collect();
        for connection in connections {
            connection.disconnect();
        }
        Ok(())
    }
}

//! CDP WebSocket connection implementation
//!
//! One WebSocket per page target. Outgoing commands go through a shared
//! sink; a reader task owns the stream, resolves pending commands by ID and
//! broadcasts events to subscribers.

use super::traits::{CdpConnection, CdpError as CdpErrorResponse, CdpEvent, CdpResponse};
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type PendingMap = Arc<Mutex<HashMap<u64, PendingCommand>>>;
type Subscribers = Arc<Mutex<Vec<mpsc::UnboundedSender<CdpEvent>>>>;

/// CDP timeout configuration
#[derive(Debug, Clone)]
struct CdpTimeoutConfig {
    /// Default timeout for most commands (seconds)
    default_timeout_secs: u64,
    /// Timeout for JavaScript execution (seconds)
    execution_timeout_secs: u64,
}

impl Default for CdpTimeoutConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 30,
            execution_timeout_secs: 60,
        }
    }
}

impl CdpTimeoutConfig {
    /// Get timeout duration for a specific command method
    fn get_timeout_for_command(&self, method: &str) -> Duration {
        if method.starts_with("Runtime.evaluate") || method.starts_with("Runtime.callFunctionOn") {
            return Duration::from_secs(self.execution_timeout_secs);
        }
        Duration::from_secs(self.default_timeout_secs)
    }
}

/// Pending command response
#[derive(Debug)]
struct PendingCommand {
    /// Response channel sender
    sender: oneshot::Sender<CdpResponse>,
    /// Command method (for logging)
    method: String,
}

/// CDP WebSocket connection implementation
#[derive(Debug)]
pub struct CdpWebSocketConnection {
    /// WebSocket URL
    url: String,
    /// Outgoing half of the WebSocket
    sink: Mutex<SplitSink<WsStream, Message>>,
    /// Next command ID
    next_id: AtomicU64,
    /// Pending commands (ID -> response sender)
    pending_commands: PendingMap,
    /// Event subscribers
    event_subscribers: Subscribers,
    /// Is connection active
    is_active: Arc<AtomicBool>,
    /// Timeout configuration
    timeout_config: CdpTimeoutConfig,
}

impl CdpWebSocketConnection {
    /// Connect to a target
    ///
    /// # Arguments
    /// * `url` - WebSocket URL (e.g., "ws://localhost:9222/devtools/page/ABC123")
    pub async fn connect<S: Into<String>>(url: S) -> Result<Arc<Self>, Error> {
        let url = url.into();
        info!("Connecting to CDP target {}", url);

        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::websocket(format!("Failed to connect to {}: {}", url, e)))?;
        let (sink, stream) = ws_stream.split();

        let connection = Arc::new(Self {
            url,
            sink: Mutex::new(sink),
            next_id: AtomicU64::new(1),
            pending_commands: Arc::new(Mutex::new(HashMap::new())),
            event_subscribers: Arc::new(Mutex::new(Vec::new())),
            is_active: Arc::new(AtomicBool::new(true)),
            timeout_config: CdpTimeoutConfig::default(),
        });

        let pending = Arc::clone(&connection.pending_commands);
        let subscribers = Arc::clone(&connection.event_subscribers);
        let is_active = Arc::clone(&connection.is_active);
        tokio::spawn(async move {
            Self::read_loop(stream, pending, subscribers, is_active).await;
        });

        Ok(connection)
    }

    /// WebSocket URL this connection is bound to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Reader task: runs until the socket closes
    async fn read_loop(
        mut stream: SplitStream<WsStream>,
        pending_commands: PendingMap,
        event_subscribers: Subscribers,
        is_active: Arc<AtomicBool>,
    ) {
        debug!("CDP read loop started");

        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    Self::dispatch_message(&text, &pending_commands, &event_subscribers).await;
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket close frame received");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket error: {}", e);
                    break;
                }
            }
        }

        is_active.store(false, Ordering::SeqCst);
        // Dropping the senders fails every waiter and ends every subscription
        pending_commands.lock().await.clear();
        event_subscribers.lock().await.clear();
        debug!("CDP read loop exited");
    }

    /// Route one incoming frame to its waiter or to the subscribers
    async fn dispatch_message(text: &str, pending_commands: &PendingMap, event_subscribers: &Subscribers) {
        if let Ok(response) = serde_json::from_str::<CdpRpcResponse>(text) {
            Self::handle_response(response, pending_commands).await;
            return;
        }

        if let Ok(notification) = serde_json::from_str::<CdpNotification>(text) {
            Self::handle_notification(notification, event_subscribers).await;
            return;
        }

        warn!("Unknown message format: {}", text);
    }

    /// Handle CDP response
    async fn handle_response(response: CdpRpcResponse, pending_commands: &PendingMap) {
        let mut pending = pending_commands.lock().await;

        if let Some(pending_cmd) = pending.remove(&response.id) {
            debug!("Received response for command {}: {}", response.id, pending_cmd.method);

            let cdp_response = CdpResponse {
                id: response.id,
                result: Some(response.result),
                error: response.error.map(|e| CdpErrorResponse {
                    code: e.code,
                    message: e.message,
                    data: e.data,
                }),
            };

            let _ = pending_cmd.sender.send(cdp_response);
        } else {
            warn!("Received response for unknown command ID: {}", response.id);
        }
    }

    /// Handle CDP notification/event
    async fn handle_notification(notification: CdpNotification, event_subscribers: &Subscribers) {
        debug!("Received event: {}", notification.method);

        let event = CdpEvent {
            method: notification.method,
            params: notification.params,
            session_id: notification.session_id,
        };

        let mut subscribers = event_subscribers.lock().await;
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl CdpConnection for CdpWebSocketConnection {
    /// Send a CDP command and wait for response
    async fn send_command(&self, method: &str, params: serde_json::Value) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::websocket("Connection is not active"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
            session_id: None,
        };
        let json = serde_json::to_string(&request)?;

        debug!("Sending CDP command {}: {}", id, method);

        let (sender, receiver) = oneshot::channel();
        self.pending_commands.lock().await.insert(
            id,
            PendingCommand {
                sender,
                method: method.to_string(),
            },
        );

        if let Err(e) = self.sink.lock().await.send(Message::Text(json)).await {
            self.pending_commands.lock().await.remove(&id);
            return Err(Error::websocket(format!("Failed to send {}: {}", method, e)));
        }

        let timeout_duration = self.timeout_config.get_timeout_for_command(method);
        match tokio::time::timeout(timeout_duration, receiver).await {
            Ok(Ok(response)) => {
                if let Some(error) = &response.error {
                    return Err(Error::cdp(format!(
                        "{}: {} (code: {})",
                        method, error.message, error.code
                    )));
                }
                Ok(response)
            }
            Ok(Err(_)) => Err(Error::window_closed(format!(
                "Connection closed while waiting for {}",
                method
            ))),
            Err(_) => {
                self.pending_commands.lock().await.remove(&id);
                Err(Error::timeout(format!("Command {} ({}) timed out", id, method)))
            }
        }
    }

    /// Subscribe to CDP events
    async fn listen_events(&self) -> Result<mpsc::Receiver<CdpEvent>, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::window_closed("Connection is not active"));
        }

        let (sender, receiver) = mpsc::channel(100);
        let (unbounded_sender, mut unbounded_receiver) = mpsc::unbounded_channel();
        self.event_subscribers.lock().await.push(unbounded_sender);

        // Forward events to bounded channel
        tokio::spawn(async move {
            while let Some(event) = unbounded_receiver.recv().await {
                if sender.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(receiver)
    }

    /// Close the connection
    async fn close(&self) -> Result<(), Error> {
        info!("Closing CDP WebSocket connection to {}", self.url);

        if !self.is_active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        if let Err(e) = self.sink.lock().await.close().await {
            error!("Failed to close WebSocket: {}", e);
        }
        Ok(())
    }

    /// Check if connection is active
    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}

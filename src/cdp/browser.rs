//! CDP browser control implementation
//!
//! Talks to the browser's DevTools HTTP endpoints to open and close page
//! targets, and connects clients to their WebSockets.

use super::client::CdpClientImpl;
use super::connection::CdpWebSocketConnection;
use super::traits::*;
use crate::Error;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Domains every page client needs
const REQUIRED_DOMAINS: [&str; 3] = ["Page", "Runtime", "DOM"];

/// Entry returned by `/json/new`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewTargetResponse {
    id: String,
    #[serde(default)]
    url: String,
    web_socket_debugger_url: Option<String>,
}

/// Response of `/json/version`
#[derive(Debug, Deserialize)]
struct VersionResponse {
    #[serde(rename = "Protocol-Version", default)]
    protocol_version: String,
    #[serde(rename = "Browser", default)]
    browser: String,
    #[serde(rename = "User-Agent", default)]
    user_agent: String,
}

/// CDP browser implementation
#[derive(Debug)]
pub struct CdpBrowserImpl {
    /// Browser endpoint (e.g., "ws://localhost:9222")
    endpoint: String,
    /// HTTP client for the `/json/*` endpoints
    http: reqwest::Client,
    /// Active connections (WebSocket URL -> connection)
    connections: Mutex<HashMap<String, Arc<dyn CdpConnection>>>,
}

impl CdpBrowserImpl {
    /// Create a new CDP browser controller
    ///
    /// # Arguments
    /// * `endpoint` - Browser endpoint (e.g., "ws://localhost:9222")
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        let endpoint = endpoint.into();
        info!("Creating CDP browser controller for endpoint: {}", endpoint);
        Self {
            endpoint,
            http: reqwest::Client::new(),
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// HTTP base URL of the DevTools endpoint
    fn http_endpoint(&self) -> String {
        self.endpoint
            .trim_end_matches('/')
            .replace("ws://", "http://")
            .replace("wss://", "https://")
    }

    fn unreachable(&self, e: reqwest::Error) -> Error {
        Error::cdp(format!(
            "Failed to reach DevTools endpoint at {} (start Chrome with --remote-debugging-port=9222): {}",
            self.endpoint, e
        ))
    }
}

#[async_trait]
impl CdpBrowser for CdpBrowserImpl {
    /// Connect a client to a target and enable the domains it needs
    async fn create_client(&self, ws_url: &str) -> Result<Arc<dyn CdpClient>, Error> {
        info!("Creating CDP client for target: {}", ws_url);

        let connection = CdpWebSocketConnection::connect(ws_url).await?;
        self.connections
            .lock()
            .await
            .insert(ws_url.to_string(), Arc::clone(&connection) as Arc<dyn CdpConnection>);

        let client = Arc::new(CdpClientImpl::new(connection));
        for domain in REQUIRED_DOMAINS {
            client.enable_domain(domain).await?;
        }

        Ok(client)
    }

    /// Open a new page through `/json/new`
    async fn create_target(&self, url: &str) -> Result<TargetInfo, Error> {
        let new_url = format!("{}/json/new?{}", self.http_endpoint(), urlencoding::encode(url));
        debug!("Creating new page via HTTP API: {}", new_url);

        let response = self
            .http
            .put(&new_url)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        let target: NewTargetResponse = response
            .json()
            .await
            .map_err(|e| Error::cdp(format!("Failed to parse new target response: {}", e)))?;

        let ws_url = target
            .web_socket_debugger_url
            .ok_or_else(|| Error::cdp("No webSocketDebuggerUrl in new target response"))?;

        info!("Created target {} at {}", target.id, url);
        Ok(TargetInfo {
            target_id: target.id,
            url: target.url,
            ws_url,
        })
    }

    /// Close a page through `/json/close/:id`
    async fn close_target(&self, target_id: &str) -> Result<(), Error> {
        let close_url = format!("{}/json/close/{}", self.http_endpoint(), target_id);
        debug!("Closing target via HTTP API: {}", close_url);

        self.http
            .get(&close_url)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        let mut connections = self.connections.lock().await;
        connections.retain(|ws_url, _| !ws_url.ends_with(target_id));
        Ok(())
    }

    /// Get browser version
    async fn get_version(&self) -> Result<BrowserVersion, Error> {
        let url = format!("{}/json/version", self.http_endpoint());
        debug!("Fetching browser version from {}", url);

        let version: VersionResponse = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?
            .json()
            .await
            .map_err(|e| Error::cdp(format!("Failed to parse version: {}", e)))?;

        Ok(BrowserVersion {
            protocol_version: version.protocol_version,
            product: version.browser,
            user_agent: version.user_agent,
        })
    }

    /// Close every connection opened through this browser
    async fn close(&self) -> Result<(), Error> {
        let mut connections = self.connections.lock().await;
        info!("Closing {} CDP connections", connections.len());

        for (ws_url, connection) in connections.drain() {
            if let Err(e) = connection.close().await {
                warn!("Failed to close connection to {}: {}", ws_url, e);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_endpoint_conversion() {
        assert_eq!(
            CdpBrowserImpl::new("ws://localhost:9222").http_endpoint(),
            "http://localhost:9222"
        );
        assert_eq!(
            CdpBrowserImpl::new("wss://remote.example.com:9222/").http_endpoint(),
            "https://remote.example.com:9222"
        );
    }

    #[test]
    fn test_new_target_response() {
        let target: NewTargetResponse = serde_json::from_value(json!({
            "id": "ABC",
            "type": "page",
            "url": "about:blank",
            "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/ABC"
        }))
        .unwrap();
        assert_eq!(target.id, "ABC");
        assert_eq!(
            target.web_socket_debugger_url.as_deref(),
            Some("ws://localhost:9222/devtools/page/ABC")
        );
    }

    #[test]
    fn test_version_response() {
        let version: VersionResponse = serde_json::from_value(json!({
            "Browser": "Chrome/120.0.0.0",
            "Protocol-Version": "1.3",
            "User-Agent": "Mozilla/5.0"
        }))
        .unwrap();
        assert_eq!(version.browser, "Chrome/120.0.0.0");
        assert_eq!(version.protocol_version, "1.3");
    }
}

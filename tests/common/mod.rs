//! Common test utilities
//!
//! Starts the WebDriver server on an ephemeral port over mock windows and
//! offers small request helpers for the integration tests.

#![allow(dead_code)]

use ghost_oxide::atoms::Atom;
use ghost_oxide::server::{ServerState, WebDriverServer};
use ghost_oxide::session::{MockFileSystem, MockInput, MockPage, MockWindowFactory, SessionManagerImpl};
use ghost_oxide::webdriver::HandlerOptions;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Files the mock filesystem reports as present
pub const EXISTING_FILES: [&str; 2] = ["/tmp/report.pdf", "/tmp/photo.png"];

/// A running server and the factory behind its sessions
pub struct TestServer {
    pub server: WebDriverServer,
    pub addr: SocketAddr,
    pub factory: Arc<MockWindowFactory>,
    pub client: reqwest::Client,
}

/// Page state for a visible 100x20 element at (10, 40)
pub fn visible_element(page: &MockPage) {
    page.respond(Atom::IsDisplayed, json!(true));
    page.respond(Atom::GetLocationInView, json!({"x": 10, "y": 40}));
    page.respond(Atom::GetSize, json!({"width": 100, "height": 20}));
}

/// Start a server whose windows are prepared by `setup`
pub async fn start_server<F>(native_events: bool, setup: F) -> TestServer
where
    F: Fn(&MockPage) + Send + Sync + 'static,
{
    let factory = Arc::new(MockWindowFactory::with_setup(setup));
    let sessions = Arc::new(SessionManagerImpl::new(factory.clone()).with_native_events(native_events));
    let options = HandlerOptions {
        native_events,
        load_timeout: Duration::from_millis(500),
        file_system: Arc::new(MockFileSystem::with_files(&EXISTING_FILES)),
    };

    let server = WebDriverServer::new(ServerState::new(sessions, options));
    let addr = server
        .start("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();

    TestServer {
        server,
        addr,
        factory,
        client: reqwest::Client::new(),
    }
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Send a request, returning the HTTP status and decoded body
    pub async fn send(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> (u16, Value) {
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.unwrap();
        let status = response.status().as_u16();
        let body = response.json().await.unwrap();
        (status, body)
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        self.send(reqwest::Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        self.send(reqwest::Method::POST, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> (u16, Value) {
        self.send(reqwest::Method::DELETE, path, None).await
    }

    /// Create a session and return its id with the mock window and inputs behind it
    pub async fn new_session(&self) -> (String, Arc<MockPage>, Arc<MockInput>) {
        let (status, body) = self
            .post("/session", json!({"desiredCapabilities": {"browserName": "chrome"}}))
            .await;
        assert_eq!(status, 200, "session creation failed: {}", body);

        let sid = body["sessionId"].as_str().unwrap().to_string();
        let (_, page, inputs) = self.factory.opened().pop().unwrap();
        (sid, page, inputs)
    }

    pub async fn shutdown(self) {
        self.server.stop().await;
    }
}

//! HTTP front end for the JSON Wire Protocol
//!
//! Accepts connections on a hyper HTTP/1 server, resolves each request to a
//! session endpoint and serializes the resulting wire response as JSON.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, RwLock};
use tracing::{debug, error, info, instrument, warn};

use super::routes::{self, Route};
use crate::session::SessionManager;
use crate::webdriver::{
    find_from_root, CommandRequest, ElementReference, HandlerOptions, HttpMethod, RequestHandler,
    WebElementHandler, WireResponse,
};
use crate::{Error, Result};

const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Shared state for every connection
pub struct ServerState {
    sessions: Arc<dyn SessionManager>,
    options: Arc<HandlerOptions>,
}

impl ServerState {
    pub fn new(sessions: Arc<dyn SessionManager>, options: HandlerOptions) -> Self {
        Self {
            sessions,
            options: Arc::new(options),
        }
    }

    pub fn sessions(&self) -> Arc<dyn SessionManager> {
        Arc::clone(&self.sessions)
    }
}

/// WebDriver HTTP server
pub struct WebDriverServer {
    state: Arc<ServerState>,
    addr: RwLock<Option<SocketAddr>>,
    shutdown_tx: RwLock<Option<oneshot::Sender<()>>>,
}

impl WebDriverServer {
    pub fn new(state: ServerState) -> Self {
        Self {
            state: Arc::new(state),
            addr: RwLock::new(None),
            shutdown_tx: RwLock::new(None),
        }
    }

    /// Start serving on `addr` (port 0 for auto-assign), returning the bound address
    pub async fn start(&self, addr: SocketAddr) -> Result<SocketAddr> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        *self.addr.write().await = Some(addr);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        *self.shutdown_tx.write().await = Some(shutdown_tx);

        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            info!("WebDriver server listening on {}", addr);

            loop {
                tokio::select! {
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, peer)) => {
                                debug!("Accepted connection from {}", peer);
                                let io = TokioIo::new(stream);
                                let state = Arc::clone(&state);

                                tokio::spawn(async move {
                                    let service = service_fn(move |req| {
                                        let state = Arc::clone(&state);
                                        async move { handle_request(req, state).await }
                                    });

                                    if let Err(e) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection error: {}", e);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Accept error: {}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        info!("WebDriver server shutting down");
                        break;
                    }
                }
            }
        });

        Ok(addr)
    }

    /// Stop accepting connections
    pub async fn stop(&self) {
        if let Some(tx) = self.shutdown_tx.write().await.take() {
            let _ = tx.send(());
        }
    }

    /// Address the server is listening on
    pub async fn addr(&self) -> Option<SocketAddr> {
        *self.addr.read().await
    }
}

/// Handle one HTTP request
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<ServerState>,
) -> std::result::Result<Response<BoxBody<Bytes, Infallible>>, Infallible> {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            return Ok(wire_response(
                Error::internal("Failed to read request body").to_wire(None),
            ));
        }
    };

    let wire = dispatch(&state, &method, &path, &body).await;
    Ok(wire_response(wire))
}

/// Execute a request against the session layer
#[instrument(skip_all, fields(method = %method, path = %path))]
pub async fn dispatch(state: &ServerState, method: &str, path: &str, body: &[u8]) -> WireResponse {
    let Some(http_method) = HttpMethod::parse(method) else {
        return Error::invalid_command_method(format!("{} {}", method, path)).to_wire(None);
    };

    let body = match parse_body(body) {
        Ok(body) => body,
        Err(e) => return e.to_wire(None),
    };

    match routes::resolve(http_method, path) {
        Route::Status => unscoped_success(json!({
            "build": { "version": crate::VERSION },
            "os": { "name": std::env::consts::OS, "arch": std::env::consts::ARCH },
            "ready": true,
        })),
        Route::NewSession => new_session(state, body).await,
        Route::ListSessions => list_sessions(state).await,
        Route::GetSession { session_id } => match state.sessions.get_session(&session_id).await {
            Ok(session) => WireResponse::success(&session_id, session.capabilities().clone()),
            Err(e) => e.to_wire(Some(&session_id)),
        },
        Route::DeleteSession { session_id } => match state.sessions.delete_session(&session_id).await {
            Ok(()) => WireResponse::success_empty(&session_id),
            Err(e) => e.to_wire(Some(&session_id)),
        },
        Route::FindFromRoot { session_id, many } => {
            let session = match state.sessions.get_session(&session_id).await {
                Ok(session) => session,
                Err(e) => return e.to_wire(Some(&session_id)),
            };
            let _gate = session.lock_commands().await;
            let request = CommandRequest::new(http_method, "", body);
            find_from_root(&session, &request, many).await
        }
        Route::Element {
            session_id,
            element_id,
            suffix,
        } => {
            let session = match state.sessions.get_session(&session_id).await {
                Ok(session) => session,
                Err(e) => return e.to_wire(Some(&session_id)),
            };
            let _gate = session.lock_commands().await;
            let handler = WebElementHandler::new(
                ElementReference::new(element_id),
                Arc::clone(&state.options),
            );
            handler
                .handle(&session, CommandRequest::new(http_method, suffix, body))
                .await
        }
        Route::Unknown => Error::unknown_command(format!("{} {}", method, path)).to_wire(None),
    }
}

async fn new_session(state: &ServerState, body: Option<Value>) -> WireResponse {
    let desired = body
        .as_ref()
        .and_then(|b| b.get("desiredCapabilities"))
        .cloned()
        .unwrap_or_else(|| json!({}));

    match state.sessions.create_session(desired).await {
        Ok(session) => WireResponse::success(session.id(), session.capabilities().clone()),
        Err(e) => {
            error!("Failed to create session: {}", e);
            e.to_wire(None)
        }
    }
}

async fn list_sessions(state: &ServerState) -> WireResponse {
    let ids = match state.sessions.list_sessions().await {
        Ok(ids) => ids,
        Err(e) => return e.to_wire(None),
    };

    let mut entries = Vec::with_capacity(ids.len());
    for id in ids {
        if let Ok(session) = state.sessions.get_session(&id).await {
            entries.push(json!({ "id": id, "capabilities": session.capabilities() }));
        }
    }
    unscoped_success(Value::Array(entries))
}

fn unscoped_success(value: Value) -> WireResponse {
    WireResponse {
        http_status: 200,
        session_id: None,
        status: 0,
        value,
    }
}

/// Empty bodies are absent; anything else must be JSON
fn parse_body(body: &[u8]) -> Result<Option<Value>> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| Error::missing_command_parameter(format!("Invalid JSON body: {}", e)))
}

/// Encode a wire response as an HTTP response
fn wire_response(wire: WireResponse) -> Response<BoxBody<Bytes, Infallible>> {
    let status = StatusCode::from_u16(wire.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = serde_json::to_vec(&wire.to_json()).unwrap_or_default();

    Response::builder()
        .status(status)
        .header("Content-Type", JSON_CONTENT_TYPE)
        .header("Cache-Control", "no-cache")
        .body(full_body(Bytes::from(body)))
        .unwrap_or_else(|_| {
            let mut resp = Response::new(full_body(Bytes::from_static(b"Internal error")));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}

fn full_body(bytes: Bytes) -> BoxBody<Bytes, Infallible> {
    Full::new(bytes).map_err(|never| match never {}).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::Atom;
    use crate::session::{MockWindowFactory, SessionManagerImpl};

    fn state() -> ServerState {
        let factory = MockWindowFactory::with_setup(|page| {
            page.respond(Atom::GetText, json!("hello"));
            page.respond(Atom::FindElement, json!({"ELEMENT": ":wdc:1"}));
        });
        ServerState::new(
            Arc::new(SessionManagerImpl::new(Arc::new(factory))),
            HandlerOptions::default(),
        )
    }

    async fn new_session_id(state: &ServerState) -> String {
        let created = dispatch(state, "POST", "/session", b"{\"desiredCapabilities\":{}}").await;
        assert_eq!(created.http_status, 200);
        created.session_id.unwrap()
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b"").unwrap(), None);
        assert_eq!(parse_body(b"  \n").unwrap(), None);
        assert_eq!(parse_body(b"{\"a\":1}").unwrap(), Some(json!({"a": 1})));
        assert!(matches!(
            parse_body(b"{nope"),
            Err(Error::MissingCommandParameter(_))
        ));
    }

    #[test]
    fn test_wire_response_headers() {
        let resp = wire_response(WireResponse::success("s1", json!(1)));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], JSON_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_status() {
        let response = dispatch(&state(), "GET", "/status", b"").await;
        assert_eq!(response.http_status, 200);
        assert_eq!(response.session_id, None);
        assert_eq!(response.value["build"]["version"], crate::VERSION);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let state = state();
        let sid = new_session_id(&state).await;

        let listed = dispatch(&state, "GET", "/sessions", b"").await;
        assert_eq!(listed.value[0]["id"], sid);

        let fetched = dispatch(&state, "GET", &format!("/session/{}", sid), b"").await;
        assert_eq!(fetched.value["browserName"], "chrome");

        let deleted = dispatch(&state, "DELETE", &format!("/session/{}", sid), b"").await;
        assert_eq!(deleted.http_status, 200);

        let gone = dispatch(&state, "GET", &format!("/session/{}", sid), b"").await;
        assert_eq!(gone.http_status, 404);
        assert_eq!(gone.status, 6);
    }

    #[tokio::test]
    async fn test_element_command() {
        let state = state();
        let sid = new_session_id(&state).await;

        let response = dispatch(&state, "GET", &format!("/session/{}/element/:wdc:1/text", sid), b"").await;
        assert_eq!(response.http_status, 200);
        assert_eq!(response.value, "hello");
    }

    #[tokio::test]
    async fn test_find_from_root() {
        let state = state();
        let sid = new_session_id(&state).await;

        let body = br##"{"using":"css selector","value":"#main"}"##;
        let response = dispatch(&state, "POST", &format!("/session/{}/element", sid), body).await;
        assert_eq!(response.value, json!({"ELEMENT": ":wdc:1"}));
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let response = dispatch(&state(), "GET", "/session/missing/element/e1/text", b"").await;
        assert_eq!(response.http_status, 404);
        assert_eq!(response.status, 6);
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let state = state();
        let unknown = dispatch(&state, "GET", "/nothing/here", b"").await;
        assert_eq!(unknown.http_status, 404);
        assert_eq!(unknown.status, 9);

        let method = dispatch(&state, "PATCH", "/status", b"").await;
        assert_eq!(method.http_status, 404);
        assert_eq!(method.status, 9);
    }

    #[tokio::test]
    async fn test_invalid_element_sub_command() {
        let state = state();
        let sid = new_session_id(&state).await;

        let response = dispatch(&state, "GET", &format!("/session/{}/element/e1/bogus", sid), b"").await;
        assert_eq!(response.http_status, 404);
        assert_eq!(response.status, 9);
    }
}

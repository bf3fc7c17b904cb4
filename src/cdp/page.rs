//! CDP page backend
//!
//! A page target driven as a session window: script evaluation, load
//! watching, file input population and target teardown.

use super::input::CdpInput;
use super::traits::{CdpBrowser, CdpClient, CdpEvent};
use super::types::{FrameTreeResponse, GetDocumentResponse, QuerySelectorResponse};
use crate::session::{LoadOutcome, LoadSubscription, PageExecution, WindowFactory, WindowHandles};
use crate::webdriver::navigation::LOAD_PAGE_CLOSED;
use crate::Error;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Events the load watcher listens to
const LOAD_EVENTS: [&str; 4] = [
    "Page.frameStartedLoading",
    "Page.frameStoppedLoading",
    "Page.loadEventFired",
    "Inspector.targetCrashed",
];

/// Failure reported when the renderer crashes mid-load
pub const LOAD_TARGET_CRASHED: &str = "target crashed";

/// One browser page used as a session window
#[derive(Debug)]
pub struct CdpPage {
    target_id: String,
    /// Frame whose loads count as navigation
    main_frame: String,
    client: Arc<dyn CdpClient>,
    browser: Arc<dyn CdpBrowser>,
    /// Quiet period after which no navigation is assumed
    settle: Duration,
    is_active: AtomicBool,
}

impl CdpPage {
    pub fn new(
        target_id: impl Into<String>,
        main_frame: impl Into<String>,
        client: Arc<dyn CdpClient>,
        browser: Arc<dyn CdpBrowser>,
        settle: Duration,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            main_frame: main_frame.into(),
            client,
            browser,
            settle,
            is_active: AtomicBool::new(true),
        }
    }

    fn ensure_active(&self) -> Result<(), Error> {
        if PageExecution::is_active(self) {
            Ok(())
        } else {
            Err(Error::window_closed(format!("Window {} is closed", self.target_id)))
        }
    }

    async fn query_selector(&self, selector: &str) -> Result<i64, Error> {
        let document: GetDocumentResponse = serde_json::from_value(
            self.client
                .call_method("DOM.getDocument", json!({ "depth": 0 }))
                .await?,
        )?;

        let found: QuerySelectorResponse = serde_json::from_value(
            self.client
                .call_method(
                    "DOM.querySelector",
                    json!({ "nodeId": document.root.node_id, "selector": selector }),
                )
                .await?,
        )?;

        if found.node_id == 0 {
            return Err(Error::cdp(format!("No file input matches {}", selector)));
        }
        Ok(found.node_id)
    }
}

/// Load progress of the main frame
#[derive(Debug)]
struct LoadWatch<'a> {
    main_frame: &'a str,
    started: bool,
}

impl<'a> LoadWatch<'a> {
    fn new(main_frame: &'a str) -> Self {
        Self {
            main_frame,
            started: false,
        }
    }

    /// Fold one event in, returning the outcome once it is known
    fn observe(&mut self, event: &CdpEvent) -> Option<LoadOutcome> {
        let frame_id = event.params.get("frameId").and_then(Value::as_str);
        let on_main_frame = frame_id == Some(self.main_frame);

        match event.method.as_str() {
            "Page.frameStartedLoading" if on_main_frame => self.started = true,
            "Page.loadEventFired" if self.started => return Some(LoadOutcome::Finished),
            // Covers navigations that stop without a load event (204, downloads)
            "Page.frameStoppedLoading" if self.started && on_main_frame => {
                return Some(LoadOutcome::Finished)
            }
            "Inspector.targetCrashed" => {
                return Some(LoadOutcome::Failed(LOAD_TARGET_CRASHED.to_string()))
            }
            other => debug!("Ignoring {} for frame {:?}", other, frame_id),
        }
        None
    }
}

/// Wait for the outcome of whatever load the wrapped action started
///
/// Events are tracked while the action runs. Once it has finished, a
/// main-frame load that has not started within `settle` is taken as no
/// navigation. Returns `None` when the action is abandoned.
async fn await_load(
    events: &mut mpsc::Receiver<CdpEvent>,
    mut action_done: oneshot::Receiver<()>,
    main_frame: &str,
    settle: Duration,
) -> Option<LoadOutcome> {
    let mut watch = LoadWatch::new(main_frame);

    loop {
        tokio::select! {
            done = &mut action_done => {
                if done.is_err() {
                    return None;
                }
                break;
            }
            next = events.recv() => {
                let Some(event) = next else {
                    return Some(LoadOutcome::Failed(LOAD_PAGE_CLOSED.to_string()));
                };
                if let Some(outcome) = watch.observe(&event) {
                    return Some(outcome);
                }
            }
        }
    }

    let settle_deadline = Instant::now() + settle;
    loop {
        let next = if watch.started {
            events.recv().await
        } else {
            match tokio::time::timeout_at(settle_deadline, events.recv()).await {
                Ok(next) => next,
                Err(_) => return Some(LoadOutcome::Finished),
            }
        };

        let Some(event) = next else {
            return Some(LoadOutcome::Failed(LOAD_PAGE_CLOSED.to_string()));
        };
        if let Some(outcome) = watch.observe(&event) {
            return Some(outcome);
        }
    }
}

/// Main frame of a freshly opened target, falling back to the target ID
async fn main_frame_id(client: &dyn CdpClient, target_id: &str) -> String {
    let tree = async {
        let value = client.call_method("Page.getFrameTree", json!({})).await?;
        Ok::<_, Error>(serde_json::from_value::<FrameTreeResponse>(value)?)
    };

    match tree.await {
        Ok(tree) => {
            let frame = tree.frame_tree.frame;
            debug!("Main frame of {} is {} ({})", target_id, frame.id, frame.url);
            frame.id
        }
        Err(e) => {
            warn!("Frame tree of {} unavailable, using target ID: {}", target_id, e);
            target_id.to_string()
        }
    }
}

#[async_trait]
impl PageExecution for CdpPage {
    fn id(&self) -> &str {
        &self.target_id
    }

    async fn evaluate(&self, script: &str) -> Result<String, Error> {
        self.ensure_active()?;

        match self.client.evaluate(script).await? {
            Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    async fn subscribe_load_outcome(&self) -> Result<LoadSubscription, Error> {
        self.ensure_active()?;

        let mut events = self.client.subscribe_events(&LOAD_EVENTS).await?;
        let (mut tx, rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();
        let settle = self.settle;
        let target_id = self.target_id.clone();
        let main_frame = self.main_frame.clone();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = tx.closed() => None,
                outcome = await_load(&mut events, done_rx, &main_frame, settle) => outcome,
            };

            match outcome {
                Some(outcome) => {
                    debug!("Load outcome for {}: {:?}", target_id, outcome);
                    let _ = tx.send(outcome);
                }
                None => debug!("Load watcher for {} abandoned", target_id),
            }
        });

        Ok(LoadSubscription::new(rx, done_tx))
    }

    async fn upload_file(&self, selector: &str, paths: &[PathBuf]) -> Result<(), Error> {
        self.ensure_active()?;

        let node_id = self.query_selector(selector).await?;
        let files: Vec<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        info!("Setting {} file(s) on {}", files.len(), selector);

        self.client
            .call_method("DOM.setFileInputFiles", json!({ "files": files, "nodeId": node_id }))
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        if !self.is_active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        info!("Closing window {}", self.target_id);
        if let Err(e) = self.browser.close_target(&self.target_id).await {
            warn!("Failed to close target {}: {}", self.target_id, e);
        }
        self.client.connection().close().await
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst) && self.client.connection().is_active()
    }
}

/// Opens session windows as new browser page targets
#[derive(Debug, Clone)]
pub struct CdpWindowFactory {
    browser: Arc<dyn CdpBrowser>,
    settle: Duration,
}

impl CdpWindowFactory {
    pub fn new(browser: Arc<dyn CdpBrowser>, settle: Duration) -> Self {
        Self { browser, settle }
    }
}

#[async_trait]
impl WindowFactory for CdpWindowFactory {
    async fn open_window(&self, start_url: &str) -> Result<WindowHandles, Error> {
        let target = self.browser.create_target(start_url).await?;
        let client = self.browser.create_client(&target.ws_url).await?;
        info!("Opened window {} at {}", target.target_id, start_url);

        let main_frame = main_frame_id(client.as_ref(), &target.target_id).await;
        let window = Arc::new(CdpPage::new(
            target.target_id,
            main_frame,
            Arc::clone(&client),
            Arc::clone(&self.browser),
            self.settle,
        ));
        let inputs = Arc::new(CdpInput::new(client));

        Ok(WindowHandles { window, inputs })
    }
}

//! Mock session collaborators for testing
//!
//! Scripted windows, recording input devices and an in-memory filesystem.
//! Windows answer atoms by name from a response table, so tests can drive
//! every element command without a browser.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot::{self, error::TryRecvError};
use uuid::Uuid;

use super::traits::{
    ClickKind, FileSystem, InputDevice, LoadOutcome, LoadSubscription, MouseButton,
    PageExecution, Point, WindowFactory, WindowHandles,
};
use crate::atoms::{atom_name_of, Atom, ResponseShape};
use crate::Error;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// How a mock window answers load subscriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadBehavior {
    /// Deliver `Finished` straight away
    FinishImmediately,
    /// Deliver `Failed` with the given message
    Fail(String),
    /// Hold the subscription until `fire_load` is called
    Never,
}

/// Encode a successful atom value in the raw form the atom's shape uses
pub fn raw_success(atom: Atom, value: Value) -> String {
    let envelope = json!({ "status": 0, "value": value });
    match atom.shape() {
        ResponseShape::Envelope => envelope.to_string(),
        ResponseShape::NestedEnvelope => json!({ "status": 0, "value": envelope.to_string() }).to_string(),
        ResponseShape::Bare => value.to_string(),
    }
}

/// Encode a failed atom invocation the way the page prelude reports it
pub fn raw_failure(status: i64, message: &str) -> String {
    json!({ "status": status, "value": { "message": message } }).to_string()
}

/// Mock window
#[derive(Debug)]
pub struct MockPage {
    id: String,
    active: AtomicBool,
    responses: Mutex<HashMap<String, String>>,
    scripts: Mutex<Vec<String>>,
    uploads: Mutex<Vec<(String, Vec<PathBuf>)>>,
    load_behavior: Mutex<LoadBehavior>,
    pending_loads: Mutex<Vec<oneshot::Sender<LoadOutcome>>>,
    subscriptions: Mutex<usize>,
    action_signals: Mutex<(usize, Vec<oneshot::Receiver<()>>)>,
}

impl MockPage {
    /// Create a new mock window
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            active: AtomicBool::new(true),
            responses: Mutex::new(HashMap::new()),
            scripts: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            load_behavior: Mutex::new(LoadBehavior::FinishImmediately),
            pending_loads: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(0),
            action_signals: Mutex::new((0, Vec::new())),
        }
    }

    /// Answer `atom` with raw text
    pub fn respond_raw(&self, atom: Atom, raw: impl Into<String>) {
        lock(&self.responses).insert(atom.name().to_string(), raw.into());
    }

    /// Answer `atom` with a successful value
    pub fn respond(&self, atom: Atom, value: Value) {
        self.respond_raw(atom, raw_success(atom, value));
    }

    /// Answer `atom` with a failure
    pub fn respond_error(&self, atom: Atom, status: i64, message: &str) {
        self.respond_raw(atom, raw_failure(status, message));
    }

    pub fn set_load_behavior(&self, behavior: LoadBehavior) {
        *lock(&self.load_behavior) = behavior;
    }

    /// Deliver an outcome to every held subscription
    pub fn fire_load(&self, outcome: LoadOutcome) {
        for sender in lock(&self.pending_loads).drain(..) {
            let _ = sender.send(outcome.clone());
        }
    }

    /// Drop every held subscription without an outcome
    pub fn drop_pending_loads(&self) {
        lock(&self.pending_loads).clear();
    }

    /// Atom names evaluated so far, in order
    pub fn atom_calls(&self) -> Vec<String> {
        lock(&self.scripts)
            .iter()
            .map(|s| atom_name_of(s).unwrap_or("<script>").to_string())
            .collect()
    }

    /// Raw scripts evaluated so far
    pub fn scripts(&self) -> Vec<String> {
        lock(&self.scripts).clone()
    }

    /// Upload calls received so far
    pub fn uploads(&self) -> Vec<(String, Vec<PathBuf>)> {
        lock(&self.uploads).clone()
    }

    /// Number of load subscriptions taken
    pub fn subscriptions(&self) -> usize {
        *lock(&self.subscriptions)
    }

    /// Number of subscriptions whose action was reported finished
    pub fn finished_actions(&self) -> usize {
        let mut guard = lock(&self.action_signals);
        let (finished, pending) = &mut *guard;
        pending.retain_mut(|signal| match signal.try_recv() {
            Ok(()) => {
                *finished += 1;
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Closed) => false,
        });
        *finished
    }

    fn default_response(name: &str) -> String {
        match Atom::from_name(name) {
            Some(atom) => raw_success(atom, Value::Null),
            None => raw_success(Atom::GetText, Value::Null),
        }
    }

    fn ensure_active(&self) -> Result<(), Error> {
        if self.active.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::window_closed(self.id.clone()))
        }
    }
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageExecution for MockPage {
    fn id(&self) -> &str {
        &self.id
    }

    async fn evaluate(&self, script: &str) -> Result<String, Error> {
        self.ensure_active()?;
        lock(&self.scripts).push(script.to_string());

        let name = atom_name_of(script).unwrap_or_default().to_string();
        let response = lock(&self.responses)
            .get(&name)
            .cloned()
            .unwrap_or_else(|| Self::default_response(&name));
        Ok(response)
    }

    async fn subscribe_load_outcome(&self) -> Result<LoadSubscription, Error> {
        self.ensure_active()?;
        *lock(&self.subscriptions) += 1;

        let (done_tx, done_rx) = oneshot::channel();
        lock(&self.action_signals).1.push(done_rx);

        let (tx, rx) = oneshot::channel();
        let behavior = lock(&self.load_behavior).clone();
        match behavior {
            LoadBehavior::FinishImmediately => {
                let _ = tx.send(LoadOutcome::Finished);
            }
            LoadBehavior::Fail(message) => {
                let _ = tx.send(LoadOutcome::Failed(message));
            }
            LoadBehavior::Never => lock(&self.pending_loads).push(tx),
        }
        Ok(LoadSubscription::new(rx, done_tx))
    }

    async fn upload_file(&self, selector: &str, paths: &[PathBuf]) -> Result<(), Error> {
        self.ensure_active()?;
        lock(&self.uploads).push((selector.to_string(), paths.to_vec()));
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        self.active.store(false, Ordering::SeqCst);
        self.drop_pending_loads();
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Event recorded by `MockInput`
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseMove(Point),
    MouseButton(MouseButton, ClickKind),
    Keys(String),
    ClearModifiers,
}

/// Recording input device
#[derive(Debug, Default)]
pub struct MockInput {
    events: Mutex<Vec<InputEvent>>,
}

impl MockInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, in order
    pub fn events(&self) -> Vec<InputEvent> {
        lock(&self.events).clone()
    }
}

#[async_trait]
impl InputDevice for MockInput {
    async fn mouse_move(&self, point: Point) -> Result<(), Error> {
        lock(&self.events).push(InputEvent::MouseMove(point));
        Ok(())
    }

    async fn mouse_button_click(&self, button: MouseButton, kind: ClickKind) -> Result<(), Error> {
        lock(&self.events).push(InputEvent::MouseButton(button, kind));
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> Result<(), Error> {
        lock(&self.events).push(InputEvent::Keys(text.to_string()));
        Ok(())
    }

    async fn clear_modifier_keys(&self) -> Result<(), Error> {
        lock(&self.events).push(InputEvent::ClearModifiers);
        Ok(())
    }
}

/// In-memory filesystem
#[derive(Debug, Default)]
pub struct MockFileSystem {
    files: HashSet<PathBuf>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filesystem containing exactly `paths`
    pub fn with_files<P: AsRef<Path>>(paths: &[P]) -> Self {
        Self {
            files: paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }
}

type PageSetup = Arc<dyn Fn(&MockPage) + Send + Sync>;

/// Window factory producing mock windows
#[derive(Default)]
pub struct MockWindowFactory {
    setup: Option<PageSetup>,
    opened: Mutex<Vec<(String, Arc<MockPage>, Arc<MockInput>)>>,
}

impl MockWindowFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `setup` on every window before it is handed out
    pub fn with_setup<F>(setup: F) -> Self
    where
        F: Fn(&MockPage) + Send + Sync + 'static,
    {
        Self {
            setup: Some(Arc::new(setup)),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Windows opened so far with their start URLs
    pub fn opened(&self) -> Vec<(String, Arc<MockPage>, Arc<MockInput>)> {
        lock(&self.opened).clone()
    }
}

#[async_trait]
impl WindowFactory for MockWindowFactory {
    async fn open_window(&self, start_url: &str) -> Result<WindowHandles, Error> {
        let page = Arc::new(MockPage::new());
        if let Some(setup) = &self.setup {
            setup(&page);
        }
        let inputs = Arc::new(MockInput::new());
        lock(&self.opened).push((start_url.to_string(), page.clone(), inputs.clone()));

        Ok(WindowHandles {
            window: page,
            inputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_page_answers_by_atom_name() {
        let page = MockPage::new();
        page.respond(Atom::GetText, json!("hello"));

        let script = crate::atoms::build_script(Atom::GetText, &[]).unwrap();
        let raw = page.evaluate(&script).await.unwrap();
        assert_eq!(raw, r#"{"status":0,"value":"hello"}"#);
        assert_eq!(page.atom_calls(), vec!["get_text"]);
    }

    #[tokio::test]
    async fn test_mock_page_held_load() {
        let page = MockPage::new();
        page.set_load_behavior(LoadBehavior::Never);

        let subscription = page.subscribe_load_outcome().await.unwrap();
        page.fire_load(LoadOutcome::Failed("net::ERR".to_string()));
        assert_eq!(page.finished_actions(), 0);

        let rx = subscription.action_finished();
        assert_eq!(page.finished_actions(), 1);
        assert_eq!(rx.await.unwrap(), LoadOutcome::Failed("net::ERR".to_string()));
    }

    #[tokio::test]
    async fn test_closed_page_rejects_evaluate() {
        let page = MockPage::new();
        page.close().await.unwrap();
        assert!(matches!(page.evaluate("1").await, Err(Error::WindowClosed(_))));
    }

    #[test]
    fn test_raw_success_shapes() {
        assert_eq!(raw_success(Atom::IsFileInput, json!(true)), "true");
        let nested: Value = serde_json::from_str(&raw_success(Atom::GetSize, json!(1))).unwrap();
        assert!(nested["value"].is_string());
    }
}

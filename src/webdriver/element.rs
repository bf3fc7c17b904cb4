//! Element request handler
//!
//! Serves every element-scoped command for one element handle: routes the
//! request, runs atoms or native input, defers load-triggering operations
//! through the navigation executor and translates the outcome.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::input;
use super::locator::{self, LocatorQuery};
use super::navigation::NavigationExecutor;
use super::router::{self, ElementCommand};
use super::status::WebDriverStatus;
use super::translator;
use super::wire::{AtomResult, CommandRequest, ElementReference, WireResponse};
use crate::atoms::{Atom, AtomInvoker};
use crate::error::{Error, Result};
use crate::session::context::Session;
use crate::session::traits::{ClickKind, FileSystem, LocalFileSystem, MouseButton, Point};

/// Something that answers one wire request for a session
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Produce exactly one response for `request`
    async fn handle(&self, session: &Session, request: CommandRequest) -> WireResponse;
}

/// Behavior switches shared by every element handler
#[derive(Debug, Clone)]
pub struct HandlerOptions {
    /// Deliver clicks and keys as native input events instead of atoms
    pub native_events: bool,
    /// Upper bound on the load wait after click, submit and value
    pub load_timeout: Duration,
    /// Filesystem consulted by the upload path
    pub file_system: Arc<dyn FileSystem>,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            native_events: true,
            load_timeout: Duration::from_millis(30_000),
            file_system: Arc::new(LocalFileSystem),
        }
    }
}

/// Handler for `/session/:sid/element/:eid/...`
#[derive(Debug, Clone)]
pub struct WebElementHandler {
    element: ElementReference,
    options: Arc<HandlerOptions>,
}

impl WebElementHandler {
    pub fn new(element: ElementReference, options: Arc<HandlerOptions>) -> Self {
        Self { element, options }
    }

    pub fn element(&self) -> &ElementReference {
        &self.element
    }

    fn el(&self) -> Value {
        self.element.to_json()
    }

    fn executor(&self) -> NavigationExecutor {
        NavigationExecutor::new(self.options.load_timeout)
    }

    /// Route and run one command
    #[instrument(skip_all, fields(session = session.id(), element = %self.element))]
    async fn dispatch(&self, session: &Session, request: &CommandRequest) -> Result<WireResponse> {
        let command = router::route_request(request)?;
        debug!("{} {} -> {}", request.method, request.path_suffix, command.name());

        let sid = session.id();
        let invoker = AtomInvoker::new(session.current_window());

        match command {
            ElementCommand::FindChild => self.find(session, &invoker, request, false).await,
            ElementCommand::FindChildren => self.find(session, &invoker, request, true).await,
            ElementCommand::SendKeys => self.send_keys(session, &invoker, request).await,
            ElementCommand::Submit => self.submit(session, &invoker).await,
            ElementCommand::Click => self.click(session, &invoker).await,
            ElementCommand::IsDisplayed => self.simple(sid, &invoker, Atom::IsDisplayed).await,
            ElementCommand::IsEnabled => self.simple(sid, &invoker, Atom::IsEnabled).await,
            ElementCommand::TagName => self.simple(sid, &invoker, Atom::GetName).await,
            ElementCommand::IsSelected => self.simple(sid, &invoker, Atom::IsSelected).await,
            ElementCommand::Clear => self.simple(sid, &invoker, Atom::Clear).await,
            ElementCommand::Text => self.simple(sid, &invoker, Atom::GetText).await,
            ElementCommand::Location => self.simple(sid, &invoker, Atom::GetLocation).await,
            ElementCommand::Size => self.simple(sid, &invoker, Atom::GetSize).await,
            ElementCommand::LocationInView => self.location_in_view(session, &invoker).await,
            ElementCommand::Handle => Ok(WireResponse::success(sid, self.el())),
            ElementCommand::Attribute(name) => {
                let result = invoker
                    .invoke(Atom::GetAttributeValue, &[self.el(), Value::String(name)])
                    .await?;
                Ok(translator::translate(sid, result))
            }
            ElementCommand::Css(property) => {
                let result = invoker
                    .invoke(Atom::GetValueOfCssProperty, &[self.el(), Value::String(property)])
                    .await?;
                Ok(translator::translate(sid, result))
            }
            ElementCommand::Equals(other) => {
                let other = ElementReference::new(other).to_json();
                let result = invoker.invoke(Atom::Equals, &[self.el(), other]).await?;
                Ok(translator::translate(sid, result))
            }
        }
    }

    /// Single atom over this element, translated directly
    async fn simple(&self, sid: &str, invoker: &AtomInvoker, atom: Atom) -> Result<WireResponse> {
        let result = invoker.invoke(atom, &[self.el()]).await?;
        Ok(translator::translate(sid, result))
    }

    async fn find(
        &self,
        session: &Session,
        invoker: &AtomInvoker,
        request: &CommandRequest,
        many: bool,
    ) -> Result<WireResponse> {
        let query = LocatorQuery::from_request(request)?;
        let result = locator::locate(invoker, &query, Some(&self.element), many).await?;
        Ok(translator::translate(session.id(), result))
    }

    async fn location_in_view(&self, session: &Session, invoker: &AtomInvoker) -> Result<WireResponse> {
        let result = invoker.invoke(Atom::GetLocationInView, &[self.el()]).await?;
        let offset = session.frame_offset();

        Ok(translator::translate_with(session.id(), result, |value| {
            match read_point(&value, "x", "y") {
                Some(point) => {
                    let shifted = point.offset_by(offset);
                    json!({ "x": shifted.x, "y": shifted.y })
                }
                None => value,
            }
        }))
    }

    async fn submit(&self, session: &Session, invoker: &AtomInvoker) -> Result<WireResponse> {
        let window = session.current_window();
        self.executor()
            .execute(window.as_ref(), session.id(), "submit", || async {
                invoker.invoke(Atom::Submit, &[self.el()]).await
            })
            .await
    }

    async fn click(&self, session: &Session, invoker: &AtomInvoker) -> Result<WireResponse> {
        let window = session.current_window();
        let native = self.options.native_events;

        self.executor()
            .execute(window.as_ref(), session.id(), "click", || async {
                if native {
                    self.native_click(session, invoker).await
                } else {
                    invoker.invoke(Atom::Click, &[self.el()]).await
                }
            })
            .await
    }

    /// Visible check, scroll, then a mouse click at the element centre
    async fn native_click(&self, session: &Session, invoker: &AtomInvoker) -> Result<AtomResult> {
        let displayed = invoker.invoke(Atom::IsDisplayed, &[self.el()]).await?;
        if !displayed.is_success() {
            return Ok(displayed);
        }
        if displayed.value != Value::Bool(true) {
            return Ok(AtomResult::failure(
                WebDriverStatus::ElementNotVisible,
                "Element is not currently visible and may not be manipulated",
            ));
        }

        let scrolled = invoker.invoke(Atom::ScrollIntoView, &[self.el()]).await?;
        if !scrolled.is_success() {
            return Ok(scrolled);
        }

        self.click_centre(session, invoker).await
    }

    /// Move the mouse to the element centre and press the left button
    async fn click_centre(&self, session: &Session, invoker: &AtomInvoker) -> Result<AtomResult> {
        let centre = match self.centre(invoker).await? {
            Ok(point) => point.offset_by(session.frame_offset()),
            Err(failure) => return Ok(failure),
        };

        let inputs = session.inputs();
        inputs.mouse_move(centre).await?;
        inputs.mouse_button_click(MouseButton::Left, ClickKind::Click).await?;
        debug!("Clicked {} at ({}, {})", self.element, centre.x, centre.y);

        Ok(AtomResult::success(Value::Null))
    }

    /// Element centre in viewport coordinates, or the failing atom result
    async fn centre(&self, invoker: &AtomInvoker) -> Result<std::result::Result<Point, AtomResult>> {
        let location = invoker.invoke(Atom::GetLocationInView, &[self.el()]).await?;
        if !location.is_success() {
            return Ok(Err(location));
        }
        let size = invoker.invoke(Atom::GetSize, &[self.el()]).await?;
        if !size.is_success() {
            return Ok(Err(size));
        }

        match (
            read_point(&location.value, "x", "y"),
            read_point(&size.value, "width", "height"),
        ) {
            (Some(origin), Some(extent)) => Ok(Ok(Point::new(
                origin.x + extent.x / 2.0,
                origin.y + extent.y / 2.0,
            ))),
            _ => Ok(Err(AtomResult::failure(
                WebDriverStatus::UnknownError,
                "Unable to determine element position",
            ))),
        }
    }

    async fn send_keys(
        &self,
        session: &Session,
        invoker: &AtomInvoker,
        request: &CommandRequest,
    ) -> Result<WireResponse> {
        let text = keys_from_body(request)?;

        let file_input = invoker.invoke(Atom::IsFileInput, &[self.el()]).await?;
        if !file_input.is_success() {
            return Ok(translator::failed(session.id(), &file_input));
        }
        if file_input.value == Value::Bool(true) {
            return self.upload(session, invoker, &text).await;
        }

        let window = session.current_window();
        let text = input::normalize(&text);
        let native = self.options.native_events;

        self.executor()
            .execute(window.as_ref(), session.id(), "value", || async {
                if native {
                    self.native_type(session, invoker, &text).await
                } else {
                    invoker
                        .invoke(Atom::Type, &[self.el(), Value::String(text.clone()), Value::Bool(false)])
                        .await
                }
            })
            .await
    }

    /// Focus through the `type` atom, then deliver keys natively
    async fn native_type(&self, session: &Session, invoker: &AtomInvoker, text: &str) -> Result<AtomResult> {
        let editable = invoker.invoke(Atom::IsContentEditable, &[self.el()]).await?;
        if !editable.is_success() {
            return Ok(editable);
        }
        let caret_to_end = editable.value == Value::Bool(true);

        let focused = invoker
            .invoke(
                Atom::Type,
                &[self.el(), Value::String(String::new()), Value::Bool(caret_to_end)],
            )
            .await?;
        if !focused.is_success() {
            return Ok(focused);
        }

        let inputs = session.inputs();
        inputs.send_keys(text).await?;
        inputs.clear_modifier_keys().await?;

        Ok(AtomResult::success(Value::Null))
    }

    /// Set the files of a file input
    ///
    /// A path that does not exist answers success without uploading
    /// anything. Clients depend on this, so it is kept.
    async fn upload(&self, session: &Session, invoker: &AtomInvoker, text: &str) -> Result<WireResponse> {
        let sid = session.id();
        let paths: Vec<PathBuf> = text
            .split('\n')
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect();

        if paths.is_empty() {
            warn!("No upload paths given for {}", self.element);
            return Ok(WireResponse::success_empty(sid));
        }
        if let Some(missing) = paths.iter().find(|p| !self.options.file_system.exists(p)) {
            warn!("Upload file {} does not exist, skipping upload", missing.display());
            return Ok(WireResponse::success_empty(sid));
        }

        let token = Uuid::new_v4().to_string();
        let marked = invoker
            .invoke(Atom::MarkUploadTarget, &[self.el(), Value::String(token)])
            .await?;
        if !marked.is_success() {
            return Ok(translator::failed(sid, &marked));
        }
        let selector = marked
            .value
            .as_str()
            .ok_or_else(|| Error::internal("Upload target selector is not a string"))?;

        session.current_window().upload_file(selector, &paths).await?;
        info!("Uploaded {} file(s) to {}", paths.len(), self.element);

        let clicked = self.click_centre(session, invoker).await?;
        Ok(translator::translate_empty(sid, clicked))
    }
}

#[async_trait]
impl RequestHandler for WebElementHandler {
    async fn handle(&self, session: &Session, request: CommandRequest) -> WireResponse {
        match self.dispatch(session, &request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("{} {} failed: {}", request.method, request.path_suffix, e);
                e.to_wire(Some(session.id()))
            }
        }
    }
}

/// Join the `value` key sequence of a `value` body
fn keys_from_body(request: &CommandRequest) -> Result<String> {
    let keys = request
        .body_field("value")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::missing_command_parameter("value"))?;

    keys.iter()
        .map(|key| {
            key.as_str()
                .ok_or_else(|| Error::missing_command_parameter("value must be an array of strings"))
        })
        .collect()
}

fn read_point(value: &Value, x: &str, y: &str) -> Option<Point> {
    Some(Point::new(value.get(x)?.as_f64()?, value.get(y)?.as_f64()?))
}

/// Locate from the document root for `/session/:sid/element(s)`
pub async fn find_from_root(session: &Session, request: &CommandRequest, many: bool) -> WireResponse {
    let result = async {
        let query = LocatorQuery::from_request(request)?;
        let invoker = AtomInvoker::new(session.current_window());
        let found = locator::locate(&invoker, &query, None, many).await?;
        Ok::<_, Error>(translator::translate(session.id(), found))
    }
    .await;

    result.unwrap_or_else(|e| e.to_wire(Some(session.id())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webdriver::wire::HttpMethod;

    #[test]
    fn test_keys_are_joined() {
        let request = CommandRequest::new(HttpMethod::Post, "value", Some(json!({"value": ["ab", "c"]})));
        assert_eq!(keys_from_body(&request).unwrap(), "abc");
    }

    #[test]
    fn test_keys_require_string_array() {
        for body in [json!({}), json!({"value": "abc"}), json!({"value": [1, 2]})] {
            let request = CommandRequest::new(HttpMethod::Post, "value", Some(body));
            assert!(matches!(
                keys_from_body(&request),
                Err(Error::MissingCommandParameter(_))
            ));
        }
    }

    #[test]
    fn test_read_point() {
        assert_eq!(
            read_point(&json!({"width": 10, "height": 4.5}), "width", "height"),
            Some(Point::new(10.0, 4.5))
        );
        assert_eq!(read_point(&json!({"x": 1}), "x", "y"), None);
    }
}

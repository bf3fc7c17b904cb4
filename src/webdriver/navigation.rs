//! Navigation-aware command executor
//!
//! Commands that may trigger a page load (click, submit, value) only
//! respond once the load has finished or failed. Sequencing is an explicit
//! state machine per command; the executor drives it from the action result
//! and from one load-outcome subscription taken before the action runs.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::status::WebDriverStatus;
use super::translator;
use super::wire::{AtomResult, WireResponse};
use crate::session::traits::{LoadOutcome, PageExecution};
use crate::Error;

/// Load error reported when the wait expires
pub const LOAD_TIMEOUT: &str = "timeout";
/// Load error reported when the window drops the subscription
pub const LOAD_PAGE_CLOSED: &str = "page closed";

/// Executor state of one pending command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    Executing,
    WaitingForLoad,
    Responded,
}

/// Per-command load sequencing
///
/// Produces exactly one response. Once the action has failed the command
/// is aborted and every later load event is ignored.
#[derive(Debug)]
pub struct PendingLoadCommand {
    session_id: String,
    label: String,
    state: ExecutorState,
    aborted: bool,
}

impl PendingLoadCommand {
    pub fn new(session_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            label: label.into(),
            state: ExecutorState::Idle,
            aborted: false,
        }
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// `Idle -> Executing`
    pub fn begin(&mut self) {
        if self.state == ExecutorState::Idle {
            self.state = ExecutorState::Executing;
        }
    }

    /// Feed the action's result; a failure responds immediately
    pub fn on_action_result(&mut self, result: &AtomResult) -> Option<WireResponse> {
        if self.state != ExecutorState::Executing {
            return None;
        }

        if result.is_success() {
            self.state = ExecutorState::WaitingForLoad;
            None
        } else {
            self.aborted = true;
            self.state = ExecutorState::Responded;
            Some(translator::failed(&self.session_id, result))
        }
    }

    /// Feed a finished load
    pub fn on_load_finished(&mut self) -> Option<WireResponse> {
        if !self.accepts_load_event() {
            return None;
        }
        self.state = ExecutorState::Responded;
        Some(WireResponse::success_empty(&self.session_id))
    }

    /// Feed a load error; `"timeout"` maps to the timeout status
    pub fn on_load_error(&mut self, message: &str) -> Option<WireResponse> {
        if !self.accepts_load_event() {
            return None;
        }
        self.state = ExecutorState::Responded;

        let response = if message == LOAD_TIMEOUT {
            WireResponse::failure(
                Some(&self.session_id),
                WebDriverStatus::Timeout.code(),
                format!("Timed out waiting for page load after {}", self.label),
            )
        } else {
            WireResponse::failure(
                Some(&self.session_id),
                WebDriverStatus::UnknownError.code(),
                format!("Page load failed after {}: {}", self.label, message),
            )
        };
        Some(response)
    }

    fn accepts_load_event(&self) -> bool {
        !self.aborted && self.state == ExecutorState::WaitingForLoad
    }
}

/// Runs load-triggering actions and defers their response
#[derive(Debug, Clone, Copy)]
pub struct NavigationExecutor {
    load_timeout: Duration,
}

impl NavigationExecutor {
    pub fn new(load_timeout: Duration) -> Self {
        Self { load_timeout }
    }

    pub fn load_timeout(&self) -> Duration {
        self.load_timeout
    }

    /// Run `action` and answer once its load outcome is known
    ///
    /// The subscription is taken before the action runs so a load that
    /// completes during the action is not missed. The backend's
    /// no-navigation window opens only once the action has succeeded.
    #[instrument(skip(self, window, action), fields(window = window.id()))]
    pub async fn execute<F, Fut>(
        &self,
        window: &dyn PageExecution,
        session_id: &str,
        label: &str,
        action: F,
    ) -> Result<WireResponse, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AtomResult, Error>>,
    {
        let mut command = PendingLoadCommand::new(session_id, label);
        let subscription = window.subscribe_load_outcome().await?;

        command.begin();
        let result = action().await?;
        if let Some(response) = command.on_action_result(&result) {
            debug!("{} failed with status {}, skipping load wait", label, result.status);
            return Ok(response);
        }
        let load_outcome = subscription.action_finished();

        let response = match tokio::time::timeout(self.load_timeout, load_outcome).await {
            Ok(Ok(LoadOutcome::Finished)) => command.on_load_finished(),
            Ok(Ok(LoadOutcome::Failed(message))) => {
                warn!("Load after {} failed: {}", label, message);
                command.on_load_error(&message)
            }
            Ok(Err(_)) => command.on_load_error(LOAD_PAGE_CLOSED),
            Err(_) => {
                warn!("Load after {} timed out after {:?}", label, self.load_timeout);
                command.on_load_error(LOAD_TIMEOUT)
            }
        };

        response.ok_or_else(|| Error::internal(format!("{} produced no response", label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::{LoadBehavior, MockPage};
    use serde_json::json;

    #[test]
    fn test_state_machine_success_path() {
        let mut command = PendingLoadCommand::new("s1", "click");
        assert_eq!(command.state(), ExecutorState::Idle);

        command.begin();
        assert_eq!(command.state(), ExecutorState::Executing);
        assert!(command.on_action_result(&AtomResult::success(json!(null))).is_none());
        assert_eq!(command.state(), ExecutorState::WaitingForLoad);

        let response = command.on_load_finished().unwrap();
        assert_eq!(response.status, 0);
        assert_eq!(response.session_id.as_deref(), Some("s1"));
        assert_eq!(command.state(), ExecutorState::Responded);

        assert!(command.on_load_finished().is_none());
        assert!(command.on_load_error("late").is_none());
    }

    #[test]
    fn test_abort_ignores_later_loads() {
        let mut command = PendingLoadCommand::new("s1", "submit");
        command.begin();

        let failure = AtomResult::failure(WebDriverStatus::UnknownError, "no form");
        let response = command.on_action_result(&failure).unwrap();
        assert_eq!(response.status, 13);
        assert!(command.is_aborted());

        assert!(command.on_load_finished().is_none());
        assert!(command.on_load_error("net::ERR_ABORTED").is_none());
    }

    #[test]
    fn test_load_errors_map_to_statuses() {
        let mut timed_out = PendingLoadCommand::new("s1", "click");
        timed_out.begin();
        timed_out.on_action_result(&AtomResult::success(json!(null)));
        assert_eq!(timed_out.on_load_error(LOAD_TIMEOUT).unwrap().status, 21);

        let mut failed = PendingLoadCommand::new("s1", "click");
        failed.begin();
        failed.on_action_result(&AtomResult::success(json!(null)));
        let response = failed.on_load_error("net::ERR_NAME_NOT_RESOLVED").unwrap();
        assert_eq!(response.status, 13);
        assert!(response.value["message"]
            .as_str()
            .unwrap()
            .contains("net::ERR_NAME_NOT_RESOLVED"));
    }

    #[test]
    fn test_action_result_before_begin_is_ignored() {
        let mut command = PendingLoadCommand::new("s1", "click");
        assert!(command
            .on_action_result(&AtomResult::failure(WebDriverStatus::UnknownError, "x"))
            .is_none());
        assert!(!command.is_aborted());
    }

    #[tokio::test]
    async fn test_execute_waits_for_load() {
        let page = MockPage::new();
        let executor = NavigationExecutor::new(Duration::from_secs(1));

        let response = executor
            .execute(&page, "s1", "click", || async { Ok(AtomResult::success(json!(null))) })
            .await
            .unwrap();

        assert_eq!(response.status, 0);
        assert_eq!(response.value, json!(null));
        assert_eq!(page.subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_execute_reports_action_end_after_action() {
        let page = MockPage::new();
        let executor = NavigationExecutor::new(Duration::from_secs(1));

        let response = executor
            .execute(&page, "s1", "click", || async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                assert_eq!(page.finished_actions(), 0);
                Ok(AtomResult::success(json!(null)))
            })
            .await
            .unwrap();

        assert_eq!(response.status, 0);
        assert_eq!(page.finished_actions(), 1);
    }

    #[tokio::test]
    async fn test_execute_failure_skips_wait() {
        let page = MockPage::new();
        page.set_load_behavior(LoadBehavior::Never);
        let executor = NavigationExecutor::new(Duration::from_secs(30));

        let response = executor
            .execute(&page, "s1", "click", || async {
                Ok(AtomResult::failure(WebDriverStatus::ElementNotVisible, "hidden"))
            })
            .await
            .unwrap();

        assert_eq!(response.status, 11);
        assert_eq!(response.value["message"], "hidden");
        assert_eq!(page.finished_actions(), 0);

        // A load arriving after the response has nowhere to go
        page.fire_load(LoadOutcome::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_times_out() {
        let page = MockPage::new();
        page.set_load_behavior(LoadBehavior::Never);
        let executor = NavigationExecutor::new(Duration::from_millis(500));

        let response = executor
            .execute(&page, "s1", "submit", || async { Ok(AtomResult::success(json!(null))) })
            .await
            .unwrap();

        assert_eq!(response.status, 21);
        assert_eq!(response.http_status, 500);
    }

    #[tokio::test]
    async fn test_execute_load_failure() {
        let page = MockPage::new();
        page.set_load_behavior(LoadBehavior::Fail("net::ERR_CONNECTION_REFUSED".to_string()));
        let executor = NavigationExecutor::new(Duration::from_secs(1));

        let response = executor
            .execute(&page, "s1", "click", || async { Ok(AtomResult::success(json!(null))) })
            .await
            .unwrap();

        assert_eq!(response.status, 13);
    }

    #[tokio::test]
    async fn test_execute_closed_subscription() {
        let page = MockPage::new();
        page.set_load_behavior(LoadBehavior::Never);
        let executor = NavigationExecutor::new(Duration::from_secs(5));

        let response = executor
            .execute(&page, "s1", "click", || async {
                page.drop_pending_loads();
                Ok(AtomResult::success(json!(null)))
            })
            .await
            .unwrap();

        assert_eq!(response.status, 13);
        assert!(response.value["message"].as_str().unwrap().contains(LOAD_PAGE_CLOSED));
    }

    #[tokio::test]
    async fn test_execute_propagates_collaborator_errors() {
        let page = MockPage::new();
        let executor = NavigationExecutor::new(Duration::from_secs(1));

        let result = executor
            .execute(&page, "s1", "click", || async {
                Err(Error::window_closed("gone"))
            })
            .await;

        assert!(matches!(result, Err(Error::WindowClosed(_))));
    }
}

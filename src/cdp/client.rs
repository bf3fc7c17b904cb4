//! CDP client implementation
//!
//! This module provides a high-level CDP client with typed methods for the
//! operations the page and input backends need.

use super::traits::*;
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// CDP client implementation
#[derive(Debug, Clone)]
pub struct CdpClientImpl {
    /// Underlying CDP connection
    connection: Arc<dyn CdpConnection>,
}

impl CdpClientImpl {
    /// Create a new CDP client
    ///
    /// # Arguments
    /// * `connection` - CDP connection instance
    pub fn new(connection: Arc<dyn CdpConnection>) -> Self {
        Self { connection }
    }

    /// Value carried by a by-value remote object
    fn remote_value(obj: &RemoteObject) -> Value {
        match obj.r#type.as_str() {
            "undefined" => Value::Null,
            _ => obj.value.clone().unwrap_or(Value::Null),
        }
    }
}

#[async_trait]
impl CdpClient for CdpClientImpl {
    fn connection(&self) -> Arc<dyn CdpConnection> {
        Arc::clone(&self.connection)
    }

    /// Evaluate JavaScript in the page
    async fn evaluate(&self, script: &str) -> Result<Value, Error> {
        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(false),
            return_by_value: Some(true),
            user_gesture: Some(true),
        };

        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;

        let response: EvaluateResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse EvaluateResponse: {}", e)))?;

        if let Some(exception) = response.exception_details {
            return Err(Error::script_execution_failed(exception.describe()));
        }

        let value = Self::remote_value(&response.result);
        debug!("evaluate: {} result", response.result.r#type);
        Ok(value)
    }

    /// Enable a domain
    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        info!("Enabling domain: {}", domain);
        self.call_method(&format!("{}.enable", domain), serde_json::json!({}))
            .await?;
        Ok(())
    }

    /// Call a raw CDP method
    async fn call_method(&self, method: &str, params: Value) -> Result<Value, Error> {
        let response = self.connection.send_command(method, params).await?;
        response.result.ok_or_else(|| Error::cdp("No result in response"))
    }

    /// Subscribe to events
    async fn subscribe_events(&self, methods: &[&str]) -> Result<mpsc::Receiver<CdpEvent>, Error> {
        let mut event_receiver = self.connection.listen_events().await?;

        let (tx, rx) = mpsc::channel(100);
        let filter: Vec<String> = methods.iter().map(|m| m.to_string()).collect();

        tokio::spawn(async move {
            while let Some(event) = event_receiver.recv().await {
                let wanted = filter.iter().any(|m| m == "*" || *m == event.method);
                if wanted && tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::mock::MockCdpConnection;
    use serde_json::json;

    #[test]
    fn test_remote_value() {
        let obj = RemoteObject {
            r#type: "string".to_string(),
            value: Some(json!("test")),
            ..Default::default()
        };
        assert_eq!(CdpClientImpl::remote_value(&obj), json!("test"));

        let undefined = RemoteObject {
            r#type: "undefined".to_string(),
            ..Default::default()
        };
        assert_eq!(CdpClientImpl::remote_value(&undefined), Value::Null);
    }

    #[tokio::test]
    async fn test_evaluate_returns_value() {
        let connection = Arc::new(MockCdpConnection::new());
        connection.respond(
            "Runtime.evaluate",
            json!({"result": {"type": "string", "value": "{\"status\":0}"}}),
        );
        let client = CdpClientImpl::new(connection.clone());

        let value = client.evaluate("1").await.unwrap();
        assert_eq!(value, json!("{\"status\":0}"));

        let sent = connection.commands();
        assert_eq!(sent[0].0, "Runtime.evaluate");
        assert_eq!(sent[0].1["returnByValue"], true);
    }

    #[tokio::test]
    async fn test_evaluate_exception_is_script_error() {
        let connection = Arc::new(MockCdpConnection::new());
        connection.respond(
            "Runtime.evaluate",
            json!({
                "result": {"type": "object"},
                "exceptionDetails": {"text": "Uncaught SyntaxError"}
            }),
        );
        let client = CdpClientImpl::new(connection);

        let result = client.evaluate("(").await;
        assert!(matches!(result, Err(Error::ScriptExecutionFailed(_))));
    }

    #[tokio::test]
    async fn test_subscribe_filters_events() {
        let connection = Arc::new(MockCdpConnection::new());
        let client = CdpClientImpl::new(connection.clone());

        let mut events = client.subscribe_events(&["Page.loadEventFired"]).await.unwrap();
        connection.emit(CdpEvent::new("Network.requestWillBeSent", json!({})));
        connection.emit(CdpEvent::new("Page.loadEventFired", json!({})));

        let event = events.recv().await.unwrap();
        assert_eq!(event.method, "Page.loadEventFired");
    }
}

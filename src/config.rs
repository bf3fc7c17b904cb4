//! Configuration management for Ghost-Oxide

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Browser DevTools endpoint
    pub cdp_endpoint: String,

    /// Upper bound on the wait for a page load after a command (milliseconds)
    pub load_timeout_ms: u64,

    /// Quiet period after which a command is taken not to have navigated (milliseconds)
    pub navigation_settle_ms: u64,

    /// Session idle timeout in seconds
    pub session_timeout: u64,

    /// Deliver clicks and keys as native input events
    pub native_events: bool,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8910,
            cdp_endpoint: "ws://localhost:9222".to_string(),
            load_timeout_ms: 30000,
            navigation_settle_ms: 250,
            session_timeout: 3600,
            native_events: true,
            log_level: "info".to_string(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::configuration(format!("Invalid {}", name))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration: `GHOST_CONFIG` file if set, then environment overrides
    pub fn load() -> Result<Self> {
        let base = match env::var("GHOST_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `GHOST_*` environment variables on top of this configuration
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(host) = env::var("GHOST_HOST") {
            self.host = host;
        }

        if let Some(port) = parse_var("GHOST_PORT")? {
            self.port = port;
        }

        if let Ok(endpoint) = env::var("GHOST_CDP_ENDPOINT") {
            self.cdp_endpoint = endpoint;
        }

        if let Some(timeout) = parse_var("GHOST_LOAD_TIMEOUT_MS")? {
            self.load_timeout_ms = timeout;
        }

        if let Some(settle) = parse_var("GHOST_NAVIGATION_SETTLE_MS")? {
            self.navigation_settle_ms = settle;
        }

        if let Some(timeout) = parse_var("GHOST_SESSION_TIMEOUT")? {
            self.session_timeout = timeout;
        }

        if let Some(native) = parse_var("GHOST_NATIVE_EVENTS")? {
            self.native_events = native;
        }

        if let Ok(log_level) = env::var("GHOST_LOG_LEVEL") {
            self.log_level = log_level;
        }

        Ok(self)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Bind address as `host:port`
    pub fn bind_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse::<std::net::SocketAddr>()?)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn navigation_settle(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8910);
        assert_eq!(config.cdp_endpoint, "ws://localhost:9222");
        assert_eq!(config.load_timeout(), Duration::from_secs(30));
        assert_eq!(config.navigation_settle(), Duration::from_millis(250));
        assert!(config.native_events);
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8910");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let path = env::temp_dir().join(format!("ghost-config-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "port = 4444\nnative_events = false\n").unwrap();

        let config = Config::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.port, 4444);
        assert!(!config.native_events);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.session_timeout, 3600);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = Config::from_file("/nonexistent/ghost.toml");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let path = env::temp_dir().join(format!("ghost-config-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "port = \"not a port\"\n").unwrap();

        let result = Config::from_file(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("GHOST_LOAD_TIMEOUT_MS", "1500");
        env::set_var("GHOST_NATIVE_EVENTS", "false");
        let config = Config::from_env();
        env::set_var("GHOST_PORT", "not-a-port");
        let invalid = Config::from_env();
        env::remove_var("GHOST_LOAD_TIMEOUT_MS");
        env::remove_var("GHOST_NATIVE_EVENTS");
        env::remove_var("GHOST_PORT");

        let config = config.unwrap();
        assert_eq!(config.load_timeout_ms, 1500);
        assert!(!config.native_events);
        assert!(matches!(invalid, Err(Error::Configuration(_))));
    }
}

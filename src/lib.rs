//! Ghost-Oxide: WebDriver element-command adapter for Chrome
//!
//! This library serves the JSON Wire Protocol element commands over HTTP and
//! executes them in Chrome through the DevTools Protocol.

pub mod error;
pub mod config;

pub mod atoms;
pub mod cdp;
pub mod server;
pub mod session;
pub mod webdriver;

// Re-exports
pub use error::{Error, Result};

/// Ghost-Oxide library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # Chrome DevTools Protocol (CDP) 层
//!
//! 提供 Chrome/Chromium 浏览器的 WebSocket 通信接口，作为会话窗口与原生输入的后端。
//!
//! ## 主要功能
//! - **WebSocket 连接管理**: 每个页面目标一条 CDP WebSocket 连接，读取任务分发响应与事件
//! - **目标管理**: 通过 `/json/new`、`/json/close` 打开和关闭页面
//! - **脚本执行**: 在页面上下文中按值执行 JavaScript
//! - **加载监听**: 根据 `Page.frameStartedLoading` / `Page.loadEventFired` 判断命令是否触发了导航
//! - **原生输入**: 通过 `Input.dispatchMouseEvent` / `Input.dispatchKeyEvent` 发送鼠标与键盘事件
//! - **文件上传**: 通过 `DOM.setFileInputFiles` 填充文件输入框
//!
//! ## 模块结构
//! - `traits`: CDP 操作的核心 trait 定义
//! - `types`: CDP 协议相关的数据类型
//! - `connection`: WebSocket 连接实现
//! - `client`: CDP 客户端实现
//! - `browser`: 浏览器级别的操作
//! - `page`: 会话窗口后端与窗口工厂
//! - `input`: 原生鼠标键盘输入
//! - `keys`: WebDriver 私有区键码表
//! - `mock`: 用于测试的 Mock 实现
//!
//! ## 使用示例
//! ```rust,no_run
//! use ghost_oxide::cdp::{CdpBrowserImpl, CdpWindowFactory};
//! use ghost_oxide::session::WindowFactory;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let browser = Arc::new(CdpBrowserImpl::new("ws://localhost:9222"));
//! let factory = CdpWindowFactory::new(browser, Duration::from_millis(300));
//!
//! let handles = factory.open_window("about:blank").await?;
//! let title = handles.window.evaluate("document.title").await?;
//! println!("Title: {}", title);
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod types;
pub mod connection;
pub mod client;
pub mod browser;
pub mod keys;
pub mod input;
pub mod page;
pub mod mock;


pub use traits::{
    CdpConnection, CdpClient, CdpBrowser, CdpEvent, CdpResponse, CdpError,
    BrowserVersion, TargetInfo,
};

// Re-export implementation structs
pub use connection::CdpWebSocketConnection;
pub use client::CdpClientImpl;
pub use browser::CdpBrowserImpl;
pub use input::CdpInput;
pub use page::{CdpPage, CdpWindowFactory};

// Re-export mock for development/testing
pub use mock::{MockCdpBrowser, MockCdpConnection};

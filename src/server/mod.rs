//! # HTTP 服务层
//!
//! 基于 hyper 的 JSON Wire Protocol HTTP 服务器，将请求分发到会话与元素命令层。
//!
//! ## 主要功能
//! - **连接处理**: 每个连接在独立的 tokio 任务上以 HTTP/1 提供服务
//! - **路由**: 解析 `/session`、`/sessions`、`/status` 以及 `/session/:id/element(s)/...` 路径，支持可选的 `/wd/hub` 前缀
//! - **命令串行化**: 执行会话命令前获取该会话的命令锁
//! - **响应编码**: 以 `application/json` 返回 `{"sessionId","status","value"}`
//!
//! ## 模块结构
//! - `routes`: 会话级路由解析
//! - `http`: 服务器与请求分发
//!
//! ## 使用示例
//! ```rust,no_run
//! use ghost_oxide::server::{ServerState, WebDriverServer};
//! use ghost_oxide::session::SessionManagerImpl;
//! use ghost_oxide::webdriver::HandlerOptions;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = ServerState::new(Arc::new(SessionManagerImpl::mock()), HandlerOptions::default());
//! let server = WebDriverServer::new(state);
//! let addr = server.start("127.0.0.1:0".parse()?).await?;
//! println!("Listening on {}", addr);
//! # Ok(())
//! # }
//! ```

pub mod routes;
pub mod http;

pub use http::{dispatch, ServerState, WebDriverServer};
pub use routes::{resolve, Route};

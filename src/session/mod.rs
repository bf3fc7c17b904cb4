//! # 会话管理层
//!
//! 管理自动化会话的生命周期，并定义元素命令层所依赖的协作者接口。
//!
//! ## 主要功能
//! - **会话管理**: 创建、查询、删除会话，每个会话绑定一个浏览器窗口
//! - **命令串行化**: 每个会话同一时刻只执行一条命令
//! - **会话清理**: 自动清理空闲超时或窗口已关闭的会话
//! - **协作者抽象**: 脚本执行、加载通知、原生输入和文件系统均通过 trait 注入
//!
//! ## 核心概念
//! - **Session**: 会话，持有当前窗口、输入设备和框架偏移
//! - **PageExecution**: 窗口内的脚本执行与页面加载通知
//! - **InputDevice**: 原生鼠标和键盘事件
//! - **FileSystem**: 上传路径使用的文件存在性检查
//!
//! ## 模块结构
//! - `traits`: 协作者与会话管理器 trait 定义
//! - `context`: 会话实现
//! - `manager`: 会话管理器实现
//! - `mock`: 用于测试的 Mock 实现
//!
//! ## 使用示例
//! ```rust,no_run
//! use ghost_oxide::session::SessionManager;
//! use std::sync::Arc;
//!
//! # async fn example(manager: Arc<dyn SessionManager>) -> Result<(), Box<dyn std::error::Error>> {
//! // 创建会话
//! let session = manager.create_session(serde_json::json!({})).await?;
//!
//! // 当前窗口
//! let window = session.current_window();
//! println!("Session {} on window {}", session.id(), window.id());
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod context;
pub mod manager;
pub mod mock;


pub use traits::{
    ClickKind, FileSystem, InputDevice, LoadOutcome, LoadSubscription, LocalFileSystem, MouseButton,
    PageExecution, Point, SessionManager, WindowFactory, WindowHandles,
};

pub use context::Session;
pub use manager::SessionManagerImpl;

// Re-export mock implementations for testing
pub use mock::{MockFileSystem, MockInput, MockPage, MockWindowFactory};

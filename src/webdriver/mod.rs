//! # WebDriver 元素命令层
//!
//! 实现 JSON Wire Protocol 中 `/session/:sessionId/element/:id/...` 下的全部元素命令。
//!
//! ## 主要功能
//! - **命令路由**: 根据 HTTP 方法和路径后缀选择唯一的元素操作
//! - **结果转换**: 将原子返回的状态信封转换为线协议响应
//! - **导航感知执行**: 点击、提交、输入等可能触发页面加载的命令在加载完成后才响应
//! - **输入规范化**: 将原始控制字符转换为 WebDriver 私有区按键码
//! - **文件上传**: 对文件输入框的 `value` 命令设置上传文件
//!
//! ## 模块结构
//! - `status`: 线协议状态码
//! - `wire`: 请求、元素句柄、原子结果和响应类型
//! - `router`: 命令路由
//! - `translator`: 结果转换
//! - `navigation`: 导航感知命令执行器
//! - `input`: 输入规范化
//! - `locator`: 元素定位
//! - `element`: 元素请求处理器

pub mod status;
pub mod wire;
pub mod router;
pub mod translator;
pub mod navigation;
pub mod input;
pub mod locator;
pub mod element;


pub use element::{find_from_root, HandlerOptions, RequestHandler, WebElementHandler};
pub use navigation::{ExecutorState, NavigationExecutor, PendingLoadCommand};
pub use router::{route, route_request, ElementCommand};
pub use status::WebDriverStatus;
pub use wire::{AtomResult, CommandRequest, ElementReference, HttpMethod, WireResponse};

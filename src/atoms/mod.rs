//! # 自动化原子（Atoms）
//!
//! 在目标页面中执行的预置 JavaScript 函数，是元素命令与浏览器之间的唯一桥梁。
//!
//! ## 主要功能
//! - **原子目录**: 固定的原子集合及其各自的响应格式
//! - **页面侧元素缓存**: 元素句柄 `{"ELEMENT": id}` 与 DOM 节点的双向转换
//! - **原子调用**: 在会话当前窗口中执行原子并解析结果信封
//!
//! ## 响应格式
//! 不同原子的返回格式并不统一，这是与既有原子构建的兼容约定：
//! - `Envelope`: 一次序列化的 `{"status","value"}`
//! - `NestedEnvelope`: `value` 本身是序列化信封，需要解析两次
//! - `Bare`: 无信封的裸值
//!
//! ## 模块结构
//! - `catalog`: 原子目录与响应格式表
//! - `scripts`: 原子 JavaScript 源码与公共前导脚本
//! - `invoker`: 原子调用器

pub mod catalog;
pub mod scripts;
pub mod invoker;

pub use catalog::{Atom, ResponseShape};
pub use invoker::{atom_name_of, build_script, decode, AtomInvoker};

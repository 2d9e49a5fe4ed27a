//! # Favicon 生成工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                展示层 (main.rs, 命令行)                   │
//! │                                                          │
//! │  参数解析 ── Session ── 进度打印 ── HTML 输出/复制        │
//! │       │          (Result<T, AppError>)                   │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ GenerationRequest / progress 通道
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            核心 (Rust 库)                         │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ favicon ──── 加载 · 归一化 · 铺底 · 写出               │
//! │  │   ├─ service        忙碌守卫 + 后台线程                │
//! │  │   └─ emitter        PNG / ICO / manifest 编排          │
//! │  │                                                       │
//! │  ├─ settings           JSON 设置文件                      │
//! │  └─ clipboard          HTML 片段复制到剪贴板              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，命令行入口的返回类型 |
//! | [`favicon`] | 源图加载、正方形归一化、铺底、PNG/ICO/manifest 生成 |
//! | [`settings`] | 读取 JSON 设置文件并叠加到默认配置 |
//! | [`clipboard`] | 将 HTML 片段写入系统剪贴板 |

pub mod clipboard;
pub mod error;
pub mod favicon;
pub mod settings;

//! # 图标生成模块（favicon）
//!
//! ## 设计思路
//!
//! 该模块将“源图加载 → 正方形归一化 → 铺底 → 多尺寸写出 → ICO/manifest”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `catalog`：输出文件名与尺寸的静态目录
//! - `config/error/source`：配置、错误、数据模型
//! - `loader`：文件读取、签名校验、像素上限、解码
//! - `pipeline`：归一化（透明补边 + 缩放）与铺底
//! - `writer`：PNG/ICO 编码与原子写入
//! - `manifest`：`site.webmanifest` 与 HTML 片段
//! - `emitter`：编排整条生成流水线
//! - `progress`：后台线程到展示层的进度通道
//! - `service`：忙碌守卫 + 后台线程
//! - `session`：展示层当前选择，产出请求快照
//!
//! ## 调用链
//!
//! ```text
//! 展示层（CLI）
//!    ↓ Session::build_request()
//! service.rs（忙碌守卫、启动后台线程）
//!    ↓
//! emitter.rs（统一编排 + 阶段耗时日志）
//!    ├─ pipeline.rs（归一化 + 铺底）
//!    ├─ writer.rs（编码 + 原子写入）
//!    └─ manifest.rs（manifest + HTML）
//!    ↓
//! progress 通道 → 展示层
//! ```

pub mod catalog;
mod config;
mod emitter;
mod error;
mod loader;
pub mod manifest;
pub mod pipeline;
pub mod progress;
mod service;
mod session;
mod source;
mod writer;

pub use config::{FaviconConfig, ResampleProfile};
pub use emitter::{FaviconEmitter, GenerationReport};
pub use error::FaviconError;
pub use loader::{load_source, load_source_from_memory};
pub use manifest::{html_snippet, WebManifest};
pub use pipeline::{flatten, normalize};
pub use progress::{ProgressEvent, ProgressSender};
pub use service::{FaviconService, GenerationHandle};
pub use session::Session;
pub use source::{BackgroundColor, GenerationRequest, SourceImage};

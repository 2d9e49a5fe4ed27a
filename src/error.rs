//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)`、`expect()` 等不一致模式。
//!
//! 命令行入口统一返回 `Result<T, AppError>`，失败时把原始消息交给用户。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `FaviconError` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于以 JSON 形式输出。

use serde::Serialize;

use crate::favicon::FaviconError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图标生成流水线错误（加载 / 归一化 / 写出）
    #[error("{0}")]
    Favicon(#[from] FaviconError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件无法读取或解析
    #[error("设置文件错误: {0}")]
    Settings(String),

    /// 剪贴板读写操作失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 命令行参数错误
    #[error("参数错误: {0}")]
    Usage(String),
}

impl AppError {
    /// 前置条件类错误只需提示，不算生成失败。
    pub fn is_warning(&self) -> bool {
        match self {
            Self::Favicon(err) => err.is_precondition(),
            Self::Usage(_) => true,
            _ => false,
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

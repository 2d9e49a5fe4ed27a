//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载生成链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//! `code()` / `stage()` 提供稳定的机器可读标识，供展示层决定提示方式。

/// 图标生成统一错误类型。
///
/// 该类型会在应用层被上转为 `AppError`，最终以原始消息展示给用户。
#[derive(Debug, thiserror::Error)]
pub enum FaviconError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("缺少输入：{0}")]
    MissingInput(String),

    #[error("任务进行中：{0}")]
    Busy(String),

    #[error("后台任务异常：{0}")]
    Worker(String),
}

impl FaviconError {
    /// 稳定错误码，不随提示文案变化。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "E_DECODE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::Encode(_) => "E_ENCODE",
            Self::FileSystem(_) => "E_FILE_SYSTEM",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::MissingInput(_) => "E_MISSING_INPUT",
            Self::Busy(_) => "E_BUSY",
            Self::Worker(_) => "E_WORKER",
        }
    }

    /// 出错所处阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode(_) | Self::InvalidFormat(_) | Self::ResourceLimit(_) => "load",
            Self::Encode(_) => "encode",
            Self::FileSystem(_) => "write",
            Self::MissingInput(_) | Self::Busy(_) => "precondition",
            Self::Worker(_) => "worker",
        }
    }

    /// 前置条件类错误（缺少输入 / 任务占用），批处理根本不会启动。
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingInput(_) | Self::Busy(_))
    }
}

impl From<FaviconError> for String {
    fn from(error: FaviconError) -> Self {
        error.to_string()
    }
}

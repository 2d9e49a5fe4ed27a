//! # 进度事件
//!
//! 后台线程通过消息通道把进度推给展示层，展示层按自己的节奏消费。
//! 发送端从不阻塞：通道无界，单次任务最多 `total_steps() + 1` 条消息。
//! 接收端已被丢弃时静默忽略，生成流程不受影响。

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::emitter::GenerationReport;

pub const STATUS_DONE: &str = "✓ Done!";
pub const STATUS_ERROR: &str = "Error";

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// 第 `step` 步（从 1 开始）已开始处理。
    Step {
        step: usize,
        total: usize,
        percent: f32,
        message: String,
    },
    /// 全部完成，携带产物清单。
    Completed(GenerationReport),
    /// 批处理中止；已写出的文件保留在磁盘上。
    Failed {
        code: &'static str,
        message: String,
    },
}

impl ProgressEvent {
    pub fn step(step: usize, total: usize, message: impl Into<String>) -> Self {
        Self::Step {
            step,
            total,
            percent: percent(step, total),
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed { .. })
    }

    /// 状态栏文本。
    pub fn status_text(&self) -> &str {
        match self {
            Self::Step { message, .. } => message,
            Self::Completed(_) => STATUS_DONE,
            Self::Failed { .. } => STATUS_ERROR,
        }
    }
}

pub fn percent(step: usize, total: usize) -> f32 {
    if total == 0 {
        return 100.0;
    }
    (step as f32 / total as f32) * 100.0
}

pub fn channel() -> (ProgressSender, UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx: Some(tx) }, rx)
}

/// 进度发送端。`ProgressSender::disabled()` 可用于无需展示进度的同步调用。
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressSender {
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, event: ProgressEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(event).is_err() {
            log::debug!("进度接收端已关闭，丢弃事件");
        }
    }
}

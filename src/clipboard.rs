//! 剪贴板写入
//!
//! 将 HTML 片段复制到系统剪贴板，失败时做有限重试
//! （其他应用短暂占用剪贴板时很常见）。

use std::thread;
use std::time::Duration;

use crate::error::AppError;

const CLIPBOARD_RETRIES: u32 = 3;
const CLIPBOARD_RETRY_DELAY: Duration = Duration::from_millis(100);

/// 将文本写入系统剪贴板。
pub fn copy_text(text: &str) -> Result<(), AppError> {
    let mut last_error = None;

    for attempt in 1..=CLIPBOARD_RETRIES {
        if attempt > 1 {
            log::debug!("🔄 重试 {}/{}", attempt, CLIPBOARD_RETRIES);
            thread::sleep(CLIPBOARD_RETRY_DELAY);
        }

        match try_copy_text(text) {
            Ok(()) => {
                log::info!("📋 已复制到剪贴板 ({} 字符, 尝试 {})", text.chars().count(), attempt);
                return Ok(());
            }
            Err(err) => {
                log::warn!("❌ 剪贴板写入尝试 {} 失败: {}", attempt, err);
                last_error = Some(err);
            }
        }
    }

    Err(AppError::Clipboard(last_error.unwrap_or_else(|| "未知错误".to_string())))
}

fn try_copy_text(text: &str) -> Result<(), String> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| format!("无法访问剪贴板：{}", e))?;
    clipboard
        .set_text(text.to_owned())
        .map_err(|e| format!("复制失败：{}", e))
}

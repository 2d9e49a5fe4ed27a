//! # 展示层会话状态
//!
//! 保存用户当前选择（源图、输出目录、背景色），并在触发生成时
//! 校验前置条件、产出不可变的 `GenerationRequest`。
//! 后台任务只拿到请求快照，会话之后的任何修改都不会影响它。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::load_source;
use super::{BackgroundColor, FaviconConfig, FaviconError, GenerationRequest, SourceImage};

#[derive(Debug, Default)]
pub struct Session {
    source: Option<Arc<SourceImage>>,
    output_dir: Option<PathBuf>,
    background: BackgroundColor,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加载新的源图，整体替换旧图。
    ///
    /// 失败时会话保持不变。尚未选择输出目录时，默认使用源图所在目录。
    pub fn load_image(&mut self, path: &Path, config: &FaviconConfig) -> Result<Arc<SourceImage>, FaviconError> {
        let source = Arc::new(load_source(path, config)?);
        self.set_source(Arc::clone(&source));

        if self.output_dir.is_none() {
            if let Some(parent) = path.parent() {
                let parent = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
                self.output_dir = Some(parent.to_path_buf());
            }
        }

        Ok(source)
    }

    pub fn set_source(&mut self, source: Arc<SourceImage>) {
        log::info!("🖼️ 源图已更新：{}", source.describe());
        self.source = Some(source);
    }

    pub fn source(&self) -> Option<&Arc<SourceImage>> {
        self.source.as_ref()
    }

    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = Some(dir.into());
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn set_background(&mut self, background: BackgroundColor) {
        self.background = background;
    }

    pub fn background(&self) -> BackgroundColor {
        self.background
    }

    /// 校验前置条件并生成请求快照。
    pub fn build_request(&self) -> Result<GenerationRequest, FaviconError> {
        let source = self
            .source
            .clone()
            .ok_or_else(|| FaviconError::MissingInput("请先选择源图片".to_string()))?;

        let output_dir = self
            .output_dir
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or_else(|| FaviconError::MissingInput("请先选择输出目录".to_string()))?;

        Ok(GenerationRequest::new(source, self.background, output_dir))
    }
}

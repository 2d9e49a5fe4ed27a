//! 设置文件
//!
//! 可选的 JSON 设置文件，用于覆盖默认背景色、重采样档位、输出子目录与资源上限。
//! 缺省字段回退到默认值；未知字段忽略。

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::favicon::{BackgroundColor, FaviconConfig, ResampleProfile};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub background: Option<String>,
    pub profile: Option<String>,
    pub output_subdir: Option<String>,
    pub max_file_size: Option<u64>,
    pub max_decoded_pixels: Option<u64>,
    pub max_decoded_bytes: Option<u64>,
    pub max_canvas_bytes: Option<u64>,
}

impl Settings {
    pub fn load_from_path(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Settings(format!("读取 '{}' 失败: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content).map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))
    }

    /// 在默认配置上叠加设置，并校验结果。
    pub fn to_config(&self) -> Result<FaviconConfig, AppError> {
        let mut config = FaviconConfig::default();

        if let Some(profile) = &self.profile {
            config.apply_resample_profile(ResampleProfile::from_str(profile)?);
        }
        if let Some(subdir) = &self.output_subdir {
            config.output_subdir = subdir.clone();
        }
        if let Some(value) = self.max_file_size {
            config.max_file_size = value;
        }
        if let Some(value) = self.max_decoded_pixels {
            config.max_decoded_pixels = value;
        }
        if let Some(value) = self.max_decoded_bytes {
            config.max_decoded_bytes = value;
        }
        if let Some(value) = self.max_canvas_bytes {
            config.max_canvas_bytes = value;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn background(&self) -> Result<BackgroundColor, AppError> {
        match &self.background {
            Some(value) => Ok(value.parse()?),
            None => Ok(BackgroundColor::default()),
        }
    }
}

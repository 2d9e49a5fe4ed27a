//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `FaviconConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中重采样档位（quality / balanced / speed）作为高层语义，映射到底层滤镜。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用配置（Lanczos3 重采样）。
//! - `ResampleProfile` 负责档位字符串解析与反向输出。
//! - `apply_resample_profile` 将档位转换为具体滤镜。
//! - `infer_resample_profile` 用于从当前配置反推档位（给展示层显示状态）。

use image::imageops::FilterType;

use super::catalog::OUTPUT_SUBDIR;
use super::FaviconError;

/// 图标生成配置。
///
/// 字段覆盖了加载校验、重采样与输出目录三个阶段。
#[derive(Debug, Clone)]
pub struct FaviconConfig {
    /// 读取源文件时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 归一化正方形画布（`max(w,h)²` RGBA）的内存上限（字节）。
    pub max_canvas_bytes: u64,
    /// 归一化画布缩放到目标尺寸时使用的滤镜。
    pub resize_filter: FilterType,
    /// 输出目录下创建的子目录名。
    pub output_subdir: String,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            max_canvas_bytes: 512 * 1024 * 1024,
            resize_filter: FilterType::Lanczos3,
            output_subdir: OUTPUT_SUBDIR.to_string(),
        }
    }
}

/// 重采样档位。
///
/// - `Quality`：Lanczos3，默认
/// - `Balanced`：CatmullRom
/// - `Speed`：Triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleProfile {
    Quality,
    Balanced,
    Speed,
}

impl ResampleProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use favicon_generator::favicon::ResampleProfile;
    ///
    /// let p = ResampleProfile::from_str("Quality")?;
    /// assert_eq!(p.as_str(), "quality");
    /// # Ok::<(), favicon_generator::favicon::FaviconError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(profile: &str) -> Result<Self, FaviconError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(FaviconError::InvalidFormat(format!(
                "未知重采样档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }

    pub fn filter(self) -> FilterType {
        match self {
            Self::Quality => FilterType::Lanczos3,
            Self::Balanced => FilterType::CatmullRom,
            Self::Speed => FilterType::Triangle,
        }
    }
}

impl FaviconConfig {
    /// 基于当前滤镜反推档位。非标准滤镜一律视为 `Balanced`。
    pub fn infer_resample_profile(&self) -> ResampleProfile {
        match self.resize_filter {
            FilterType::Lanczos3 => ResampleProfile::Quality,
            FilterType::Triangle | FilterType::Nearest => ResampleProfile::Speed,
            FilterType::CatmullRom | FilterType::Gaussian => ResampleProfile::Balanced,
        }
    }

    pub fn apply_resample_profile(&mut self, profile: ResampleProfile) {
        self.resize_filter = profile.filter();
    }

    /// 校验配置取值范围，在任务开始前调用。
    pub fn validate(&self) -> Result<(), FaviconError> {
        if self.max_file_size == 0 {
            return Err(FaviconError::InvalidFormat("max_file_size 不能为 0".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(FaviconError::InvalidFormat("max_decoded_pixels 不能为 0".to_string()));
        }
        if self.max_decoded_bytes < 4 {
            return Err(FaviconError::InvalidFormat("max_decoded_bytes 过小".to_string()));
        }
        if self.max_canvas_bytes < 4 {
            return Err(FaviconError::InvalidFormat("max_canvas_bytes 过小".to_string()));
        }

        let subdir = self.output_subdir.trim();
        if subdir.is_empty()
            || subdir == "."
            || subdir == ".."
            || subdir.contains(['/', '\\'])
        {
            return Err(FaviconError::InvalidFormat(format!(
                "输出子目录名无效：{:?}",
                self.output_subdir
            )));
        }

        Ok(())
    }
}

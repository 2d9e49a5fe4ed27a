//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“一次生成请求”解耦：
//! - `RawImageData` 表示已读取但未解码的字节
//! - `SourceImage` 表示已解码、不可变的源图
//! - `BackgroundColor` 表示铺底颜色
//! - `GenerationRequest` 表示一次生成所需的全部输入（不可变快照）

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use image::{ColorType, DynamicImage, GenericImageView, Rgb};

use super::FaviconError;

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: String,
}

/// 已解码的源图。
///
/// 加载后不可变，生成时以 `Arc` 只读共享给后台线程。
#[derive(Debug)]
pub struct SourceImage {
    image: DynamicImage,
    path: Option<PathBuf>,
}

impl SourceImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image, path: None }
    }

    pub(crate) fn with_path(image: DynamicImage, path: PathBuf) -> Self {
        Self {
            image,
            path: Some(path),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    /// 颜色模式短名，例如 `RGBA`、`RGB`、`L`。
    pub fn mode(&self) -> &'static str {
        match self.image.color() {
            ColorType::L8 | ColorType::L16 => "L",
            ColorType::La8 | ColorType::La16 => "LA",
            ColorType::Rgb8 | ColorType::Rgb16 => "RGB",
            ColorType::Rgba8 | ColorType::Rgba16 => "RGBA",
            ColorType::Rgb32F => "RGB;F",
            ColorType::Rgba32F => "RGBA;F",
            _ => "?",
        }
    }

    /// 信息行：`1000×400 px • RGB`。
    pub fn describe(&self) -> String {
        let (w, h) = self.image.dimensions();
        format!("{}×{} px • {}", w, h, self.mode())
    }
}

/// 透明像素的铺底颜色，默认白色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundColor(pub Rgb<u8>);

impl BackgroundColor {
    pub const WHITE: Self = Self(Rgb([0xFF, 0xFF, 0xFF]));

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Rgb([r, g, b]))
    }

    pub fn channels(self) -> [u8; 3] {
        self.0.0
    }

    /// `#RRGGBB` 十六进制形式（大写）。
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.channels();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for BackgroundColor {
    type Err = FaviconError;

    /// 支持 `#RRGGBB`、`RRGGBB`、`#RGB`。
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);

        let invalid = || FaviconError::InvalidFormat(format!("无效的颜色值：{}", value));

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match hex.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
                Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| invalid())
                };
                Ok(Self::rgb(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

/// 一次生成请求。
///
/// 构造后不可变；展示层状态的任何后续变化都不会影响进行中的任务。
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub source: Arc<SourceImage>,
    pub background: BackgroundColor,
    /// 用户选择的输出目录；资源写入其下的子目录。
    pub output_dir: PathBuf,
}

impl GenerationRequest {
    pub fn new(source: Arc<SourceImage>, background: BackgroundColor, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            background,
            output_dir: output_dir.into(),
        }
    }
}

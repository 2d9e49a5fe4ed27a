//! # 目标尺寸目录
//!
//! 所有输出文件名与像素尺寸集中为静态数据，发射器只负责遍历，
//! 目录本身可脱离生成流程单独测试。

/// 输出子目录名（位于用户选择的输出目录之下）。
pub const OUTPUT_SUBDIR: &str = "favicons";

pub const ICO_FILE_NAME: &str = "favicon.ico";

pub const MANIFEST_FILE_NAME: &str = "site.webmanifest";

/// ICO 内含的分辨率，升序。
pub const ICO_SIZES: [u32; 3] = [16, 32, 48];

/// 单个 PNG 目标。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    pub file_name: &'static str,
    pub size: u32,
    /// 是否出现在 `site.webmanifest` 的 `icons` 列表中。
    pub in_manifest: bool,
}

impl TargetSpec {
    const fn png(file_name: &'static str, size: u32) -> Self {
        Self {
            file_name,
            size,
            in_manifest: false,
        }
    }

    const fn manifest_png(file_name: &'static str, size: u32) -> Self {
        Self {
            file_name,
            size,
            in_manifest: true,
        }
    }

    /// `"192x192"` 形式的尺寸描述。
    pub fn sizes_attr(&self) -> String {
        format!("{0}x{0}", self.size)
    }
}

/// PNG 目录，顺序即生成顺序。
pub const PNG_TARGETS: &[TargetSpec] = &[
    TargetSpec::png("favicon-16x16.png", 16),
    TargetSpec::png("favicon-32x32.png", 32),
    TargetSpec::png("apple-touch-icon.png", 180),
    TargetSpec::manifest_png("android-chrome-192x192.png", 192),
    TargetSpec::manifest_png("android-chrome-512x512.png", 512),
    TargetSpec::png("mstile-150x150.png", 150),
];

/// 一次完整生成的步骤数：每个 PNG 一步 + ICO + manifest + 完成。
pub fn total_steps() -> usize {
    PNG_TARGETS.len() + 3
}

/// 清单引用的 PNG 目标。
pub fn manifest_targets() -> impl Iterator<Item = &'static TargetSpec> {
    PNG_TARGETS.iter().filter(|target| target.in_manifest)
}

pub fn find_target(file_name: &str) -> Option<&'static TargetSpec> {
    PNG_TARGETS.iter().find(|target| target.file_name == file_name)
}

/// 本次生成会写出的全部文件名。
pub fn output_file_names() -> Vec<&'static str> {
    PNG_TARGETS
        .iter()
        .map(|target| target.file_name)
        .chain([ICO_FILE_NAME, MANIFEST_FILE_NAME])
        .collect()
}

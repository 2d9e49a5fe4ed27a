//! # 资源写出模块
//!
//! ## 设计思路
//!
//! 所有落盘操作集中在这里：先在目标目录内写临时文件，再原子重命名覆盖目标。
//! 任何时刻目标路径要么是旧文件、要么是完整的新文件，不会出现写了一半的文件。
//!
//! PNG 编码交给 `image`，ICO 打包交给 `ico`。

use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use ico::{IconDir, IconDirEntry, IconImage, ResourceType};
use image::{DynamicImage, ImageFormat, RgbImage};
use tempfile::NamedTempFile;

use super::FaviconError;

/// 创建（或复用）输出目录。
pub(crate) fn ensure_output_dir(dir: &Path) -> Result<PathBuf, FaviconError> {
    fs::create_dir_all(dir).map_err(|e| {
        FaviconError::FileSystem(format!("创建输出目录 '{}' 失败：{}", dir.display(), e))
    })?;
    Ok(dir.to_path_buf())
}

/// 原子写入：同目录临时文件 + rename。
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FaviconError> {
    let parent = path
        .parent()
        .ok_or_else(|| FaviconError::FileSystem(format!("无效的输出路径：{}", path.display())))?;

    let mut tmp = temp_file_in(parent)
        .map_err(|e| FaviconError::FileSystem(format!("创建临时文件失败：{}", e)))?;

    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| FaviconError::FileSystem(format!("写入 '{}' 失败：{}", path.display(), e)))?;

    tmp.persist(path).map_err(|e| {
        FaviconError::FileSystem(format!("替换 '{}' 失败：{}", path.display(), e.error))
    })?;

    log::debug!("💾 已写入 {}（{} bytes）", path.display(), bytes.len());
    Ok(())
}

/// 在目标目录创建临时文件。
///
/// `tempfile` 默认权限为 0600，rename 后沿用；产物按常规文件 0644 创建（仍受 umask 约束）。
fn temp_file_in(parent: &Path) -> io::Result<NamedTempFile> {
    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = tempfile::Builder::new();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o644));
    }

    builder.tempfile_in(parent)
}

pub(crate) fn encode_png(image: &RgbImage) -> Result<Vec<u8>, FaviconError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| FaviconError::Encode(format!("PNG 编码失败：{}", e)))?;
    Ok(cursor.into_inner())
}

/// 将多张不透明位图打包为一个多分辨率 ICO。
pub(crate) fn encode_ico(frames: &[RgbImage]) -> Result<Vec<u8>, FaviconError> {
    if frames.is_empty() {
        return Err(FaviconError::Encode("ICO 至少需要一张位图".to_string()));
    }

    let mut icon_dir = IconDir::new(ResourceType::Icon);
    for frame in frames {
        let (width, height) = frame.dimensions();
        let rgba = DynamicImage::ImageRgb8(frame.clone()).into_rgba8().into_raw();
        let icon_image = IconImage::from_rgba_data(width, height, rgba);
        let entry = IconDirEntry::encode(&icon_image).map_err(|e| {
            FaviconError::Encode(format!("ICO 条目 {}x{} 编码失败：{}", width, height, e))
        })?;
        icon_dir.add_entry(entry);
    }

    let mut bytes = Vec::new();
    icon_dir
        .write(&mut bytes)
        .map_err(|e| FaviconError::Encode(format!("ICO 写出失败：{}", e)))?;
    Ok(bytes)
}

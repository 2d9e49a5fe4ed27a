//! # 源图加载模块
//!
//! ## 设计思路
//!
//! 优先做廉价检查，再进行完整解码，降低异常输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 检查文件存在与体积上限
//! 2. 通过文件签名（magic bytes）确认是图片
//! 3. 仅读取 header 尺寸，按像素 / 内存上限快速拒绝
//! 4. 完整解码

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageReader};

use super::source::{RawImageData, SourceImage};
use super::{FaviconConfig, FaviconError};

/// 从本地路径加载源图。
pub fn load_source(path: &Path, config: &FaviconConfig) -> Result<SourceImage, FaviconError> {
    let raw = read_source_file(path, config)?;
    let image = decode_source(&raw, config)?;
    Ok(SourceImage::with_path(image, path.to_path_buf()))
}

/// 从内存字节加载源图。
pub fn load_source_from_memory(bytes: Vec<u8>, config: &FaviconConfig) -> Result<SourceImage, FaviconError> {
    if bytes.len() as u64 > config.max_file_size {
        return Err(file_too_large(bytes.len() as u64, config));
    }

    let raw = RawImageData {
        bytes,
        source_hint: "memory".to_string(),
    };
    Ok(SourceImage::new(decode_source(&raw, config)?))
}

fn read_source_file(path: &Path, config: &FaviconConfig) -> Result<RawImageData, FaviconError> {
    log::info!("📁 开始读取源图 - 路径: {}", path.display());

    if !path.exists() {
        return Err(FaviconError::FileSystem(format!("文件不存在：{}", path.display())));
    }

    let metadata = std::fs::metadata(path)
        .map_err(|e| FaviconError::FileSystem(format!("无法读取文件信息：{}", e)))?;

    if !metadata.is_file() {
        return Err(FaviconError::FileSystem(format!("不是文件：{}", path.display())));
    }

    if metadata.len() > config.max_file_size {
        return Err(file_too_large(metadata.len(), config));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| FaviconError::FileSystem(format!("无法读取图片文件：{}", e)))?;

    Ok(RawImageData {
        bytes,
        source_hint: path.display().to_string(),
    })
}

fn decode_source(raw: &RawImageData, config: &FaviconConfig) -> Result<DynamicImage, FaviconError> {
    validate_image_signature(&raw.bytes)?;

    let (header_width, header_height) = inspect_dimensions_from_memory(&raw.bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;
    validate_decoded_memory_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(&raw.bytes)
        .map_err(|e| FaviconError::Decode(format!("图片解码失败：{}", e)))?;

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(FaviconError::Decode(format!("图片尺寸无效：{}x{}", width, height)));
    }

    log::info!(
        "✅ 源图解码成功 - 来源: {} 尺寸: {}x{} 颜色: {:?}",
        raw.source_hint,
        width,
        height,
        decoded.color()
    );

    Ok(decoded)
}

/// 通过文件签名校验输入是否为图片。
fn validate_image_signature(bytes: &[u8]) -> Result<(), FaviconError> {
    if bytes.is_empty() {
        return Err(FaviconError::InvalidFormat("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| FaviconError::InvalidFormat("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(FaviconError::InvalidFormat(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(())
}

/// 仅通过图片头信息读取宽高。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), FaviconError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FaviconError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

    if reader.format().is_none() {
        return Err(FaviconError::InvalidFormat("不支持的图片格式".to_string()));
    }

    reader
        .into_dimensions()
        .map_err(|e| FaviconError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limits(config: &FaviconConfig, width: u32, height: u32) -> Result<(), FaviconError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| FaviconError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(FaviconError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

fn validate_decoded_memory_limits(config: &FaviconConfig, width: u32, height: u32) -> Result<(), FaviconError> {
    let decoded = rgba_bytes(width as u64, height as u64)?;
    if decoded > config.max_decoded_bytes {
        return Err(memory_limit_error("图片解码预计内存过大", decoded, config.max_decoded_bytes));
    }

    // 归一化会再分配一张 max(w,h)² 的透明画布，单独计算上限。
    let side = width.max(height) as u64;
    let canvas = rgba_bytes(side, side)?;
    if canvas > config.max_canvas_bytes {
        return Err(memory_limit_error("归一化画布预计内存过大", canvas, config.max_canvas_bytes));
    }

    Ok(())
}

fn rgba_bytes(width: u64, height: u64) -> Result<u64, FaviconError> {
    width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| FaviconError::ResourceLimit("图片内存估算溢出".to_string()))
}

fn memory_limit_error(what: &str, estimated: u64, limit: u64) -> FaviconError {
    FaviconError::ResourceLimit(format!(
        "{}：{:.2} MB（限制：{:.2} MB）",
        what,
        estimated as f64 / 1024.0 / 1024.0,
        limit as f64 / 1024.0 / 1024.0
    ))
}

fn file_too_large(len: u64, config: &FaviconConfig) -> FaviconError {
    FaviconError::ResourceLimit(format!(
        "文件过大：{:.2} MB（限制：{:.2} MB）",
        len as f64 / 1024.0 / 1024.0,
        config.max_file_size as f64 / 1024.0 / 1024.0
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use tempfile::tempdir;

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
        });

        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    #[test]
    fn loads_png_from_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("logo.png");
        std::fs::write(&path, create_png_bytes(40, 20)).expect("write png");

        let source = load_source(&path, &FaviconConfig::default()).expect("load should succeed");
        assert_eq!((source.width(), source.height()), (40, 20));
        assert_eq!(source.path(), Some(path.as_path()));
    }

    #[test]
    fn missing_file_is_file_system_error() {
        let dir = tempdir().expect("tempdir");
        let result = load_source(&dir.path().join("nope.png"), &FaviconConfig::default());
        assert!(matches!(result, Err(FaviconError::FileSystem(_))));
    }

    #[test]
    fn rejects_non_image_payload() {
        let result = load_source_from_memory(b"%PDF-1.7 not an image".to_vec(), &FaviconConfig::default());
        assert!(matches!(result, Err(FaviconError::InvalidFormat(_))));
    }

    #[test]
    fn rejects_truncated_png() {
        let mut bytes = create_png_bytes(32, 32);
        bytes.truncate(bytes.len() / 2);
        let result = load_source_from_memory(bytes, &FaviconConfig::default());
        assert!(matches!(result, Err(FaviconError::Decode(_))));
    }

    #[test]
    fn rejects_too_many_pixels_before_decode() {
        let mut config = FaviconConfig::default();
        config.max_decoded_pixels = 1_000;

        let result = load_source_from_memory(create_png_bytes(100, 100), &config);
        assert!(matches!(result, Err(FaviconError::ResourceLimit(_))));
    }

    #[test]
    fn wide_banner_fits_default_limits() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("banner.png");
        std::fs::write(&path, create_png_bytes(7000, 200)).expect("write png");

        let source = load_source(&path, &FaviconConfig::default()).expect("wide banner should load");
        assert_eq!((source.width(), source.height()), (7000, 200));
    }

    #[test]
    fn canvas_limit_is_checked_separately_from_decode_limit() {
        let mut config = FaviconConfig::default();
        // 解码 400x10x4 = 16000 字节，画布 400x400x4 = 640000 字节
        config.max_decoded_bytes = 20_000;
        config.max_canvas_bytes = 100_000;

        let result = load_source_from_memory(create_png_bytes(400, 10), &config);
        match result {
            Err(FaviconError::ResourceLimit(message)) => assert!(message.contains("画布"), "{message}"),
            other => panic!("expected canvas limit error, got {other:?}"),
        }

        config.max_canvas_bytes = 640_000;
        load_source_from_memory(create_png_bytes(400, 10), &config).expect("canvas within limit");
    }

    #[test]
    fn rejects_oversized_file() {
        let mut config = FaviconConfig::default();
        config.max_file_size = 16;

        let result = load_source_from_memory(create_png_bytes(8, 8), &config);
        assert!(matches!(result, Err(FaviconError::ResourceLimit(_))));
    }
}

//! # 归一化与铺底流水线
//!
//! ## 设计思路
//!
//! 任意尺寸的源图先补成透明正方形画布再缩放，保证不裁切、不变形。
//! 缩放走 `fast_image_resize`，失败时回退 `image::imageops`。
//!
//! ## 实现思路
//!
//! 1. 转为 RGBA8
//! 2. 以 `max(w, h)` 为边长分配全透明画布
//! 3. 按整数偏移 `((max-w)/2, (max-h)/2)` 居中贴入（奇数差向左上偏一像素）
//! 4. 缩放到目标边长
//! 5. 需要时以 alpha 为蒙版铺到纯色底上，得到不透明 RGB

use fast_image_resize as fr;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};

use super::{BackgroundColor, FaviconError};

/// 补成透明正方形画布（不缩放）。
pub fn pad_to_square(image: &DynamicImage) -> RgbaImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let max_dim = width.max(height);

    if width == height {
        return rgba;
    }

    let mut canvas = RgbaImage::from_pixel(max_dim, max_dim, Rgba([0, 0, 0, 0]));
    let offset_x = (max_dim - width) / 2;
    let offset_y = (max_dim - height) / 2;
    imageops::replace(&mut canvas, &rgba, offset_x as i64, offset_y as i64);
    canvas
}

/// 归一化：输出始终为 `size × size` 的 RGBA 图，内容居中、比例不变。
pub fn normalize(image: &DynamicImage, size: u32, filter: FilterType) -> Result<RgbaImage, FaviconError> {
    if size == 0 {
        return Err(FaviconError::InvalidFormat("目标尺寸必须大于 0".to_string()));
    }

    let square = pad_to_square(image);
    if square.width() == size {
        return Ok(square);
    }

    match resize_with_fast_image_resize(&square, size, filter) {
        Ok(resized) => Ok(resized),
        Err(err) => {
            log::warn!(
                "⚠️ fast_image_resize 缩放失败，回退 image::imageops::resize：{}",
                err
            );
            Ok(resize_with_imageops(&square, size, filter))
        }
    }
}

/// 以 alpha 为蒙版铺到纯色底上，丢弃 alpha 通道。
///
/// 完全不透明的像素原样保留。
pub fn flatten(image: &RgbaImage, background: BackgroundColor) -> RgbImage {
    let bg = background.channels();

    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let blend = |fg: u8, bg: u8| -> u8 {
            let a = a as u32;
            ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8
        };
        Rgb([blend(r, bg[0]), blend(g, bg[1]), blend(b, bg[2])])
    })
}

/// 归一化后铺底，得到可直接写出的不透明图。
pub fn render_opaque(
    image: &DynamicImage,
    size: u32,
    filter: FilterType,
    background: BackgroundColor,
) -> Result<RgbImage, FaviconError> {
    let normalized = normalize(image, size, filter)?;
    Ok(flatten(&normalized, background))
}

fn resize_with_fast_image_resize(
    square: &RgbaImage,
    size: u32,
    filter: FilterType,
) -> Result<RgbaImage, FaviconError> {
    let (src_width, src_height) = square.dimensions();

    let src_image = fr::images::ImageRef::new(src_width, src_height, square.as_raw(), fr::PixelType::U8x4)
        .map_err(|e| FaviconError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(size, size, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| FaviconError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    RgbaImage::from_raw(size, size, dst_image.into_vec())
        .ok_or_else(|| FaviconError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
}

/// `imageops` 回退路径。
///
/// 与 `fast_image_resize` 一致，在预乘 alpha 空间内缩放，
/// 透明补边的黑色不会渗进内容边缘。
fn resize_with_imageops(square: &RgbaImage, size: u32, filter: FilterType) -> RgbaImage {
    let mut premultiplied = square.clone();
    for pixel in premultiplied.pixels_mut() {
        let a = pixel[3] as u32;
        for c in 0..3 {
            pixel[c] = ((pixel[c] as u32 * a + 127) / 255) as u8;
        }
    }

    let mut resized = imageops::resize(&premultiplied, size, size, filter);
    for pixel in resized.pixels_mut() {
        let a = pixel[3] as u32;
        for c in 0..3 {
            pixel[c] = if a == 0 {
                0
            } else {
                ((pixel[c] as u32 * 255 + a / 2) / a).min(255) as u8
            };
        }
    }
    resized
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}

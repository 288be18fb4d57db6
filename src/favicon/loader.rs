//! # 源图加载模块
//!
//! ## 设计思路
//!
//! 上传控件最终交给我们的是一段字节（或 Data URL），这里负责把它变成 `SourceImage`。
//! 顺序固定为：签名校验 → 体积校验 → 读取头部尺寸 → 像素上限 → 完整解码。
//! 在完整解码前就拒绝超大图片，避免恶意输入触发高内存开销。
//!
//! 显示尺寸由裁剪编辑器决定；调用方未提供时按自然尺寸处理。

use std::io::Cursor;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};

use super::{FaviconConfig, FaviconError, SourceImage};

/// 从原始字节加载源图。
pub fn load_from_bytes(
    bytes: &[u8],
    displayed: Option<(u32, u32)>,
    config: &FaviconConfig,
) -> Result<SourceImage, FaviconError> {
    if bytes.len() as u64 > config.max_file_size {
        return Err(FaviconError::ResourceLimit(format!(
            "图片体积过大：{:.2} MB（限制：{:.2} MB）",
            bytes.len() as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }
    validate_image_signature(bytes)?;

    let (header_width, header_height) = inspect_dimensions_from_memory(bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| FaviconError::Decode(format!("图片解码失败：{}", e)))?;
    let pixels = decoded.to_rgba8();
    let (width, height) = pixels.dimensions();
    validate_pixel_limits(config, width, height)?;

    let (displayed_width, displayed_height) = displayed.unwrap_or((width, height));

    log::info!(
        "🖼️ 源图加载成功 - 自然尺寸: {}x{} 显示尺寸: {}x{}",
        width,
        height,
        displayed_width,
        displayed_height
    );

    SourceImage::with_displayed_size(pixels, displayed_width, displayed_height)
}

/// 从 Base64 加载（支持 Data URL 与纯 Base64 字符串）。
pub fn load_from_base64(
    data: &str,
    displayed: Option<(u32, u32)>,
    config: &FaviconConfig,
) -> Result<SourceImage, FaviconError> {
    let bytes = parse_base64_with_limit(data, config.max_file_size)?;
    load_from_bytes(&bytes, displayed, config)
}

/// 从本地路径加载。
pub fn load_from_file(
    path: impl AsRef<Path>,
    displayed: Option<(u32, u32)>,
    config: &FaviconConfig,
) -> Result<SourceImage, FaviconError> {
    let file_path = path.as_ref();
    log::info!("📁 开始读取本地图片 - 路径: {}", file_path.display());

    if !file_path.exists() {
        return Err(FaviconError::FileSystem(format!(
            "文件不存在：{}",
            file_path.display()
        )));
    }

    let metadata = std::fs::metadata(file_path)
        .map_err(|e| FaviconError::FileSystem(format!("无法读取文件信息：{}", e)))?;
    if metadata.len() > config.max_file_size {
        return Err(FaviconError::ResourceLimit(format!(
            "文件过大：{:.2} MB（限制：{:.2} MB）",
            metadata.len() as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    let bytes = std::fs::read(file_path)
        .map_err(|e| FaviconError::FileSystem(format!("无法读取图片文件：{}", e)))?;
    load_from_bytes(&bytes, displayed, config)
}

fn parse_base64_with_limit(data: &str, max_file_size: u64) -> Result<Vec<u8>, FaviconError> {
    let normalized = data.trim();

    let payload = if normalized.starts_with("data:") {
        let base64_start = normalized
            .find(";base64,")
            .ok_or_else(|| FaviconError::InvalidFormat("缺少 base64 标记".to_string()))?;
        &normalized[base64_start + 8..]
    } else {
        normalized
    };

    let estimated_len = (payload.len() as u64).div_ceil(4).saturating_mul(3);
    if estimated_len > max_file_size {
        return Err(FaviconError::ResourceLimit(format!(
            "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / 1024.0 / 1024.0,
            max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| FaviconError::Decode(format!("Base64 解码失败：{}", e)))
}

/// 通过文件签名（magic bytes）校验输入是否为图片。
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

/// 仅通过图片头信息读取宽高，用于完整解码前的像素限制检查。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), FaviconError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FaviconError::InvalidFormat(format!("无法识别图片格式：{}", e)))?
        .into_dimensions()
        .map_err(|e| FaviconError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limits(
    config: &FaviconConfig,
    width: u32,
    height: u32,
) -> Result<(), FaviconError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| FaviconError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels == 0 {
        return Err(FaviconError::MissingInput("图片尺寸为零".to_string()));
    }

    if pixels > config.max_source_pixels {
        return Err(FaviconError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_source_pixels
        )));
    }

    Ok(())
}

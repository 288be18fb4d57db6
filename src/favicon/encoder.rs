//! PNG 编码。只使用无损格式，透明通道原样保留。

use std::io::Cursor;

use bytes::Bytes;
use image::ImageFormat;

use super::{FaviconError, GeneratedAsset, PixelBuffer};

/// 将像素缓冲编码为 PNG 字节。
pub fn encode_png(buffer: &PixelBuffer) -> Result<Bytes, FaviconError> {
    let mut cursor = Cursor::new(Vec::new());
    buffer
        .image()
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| FaviconError::Encode(format!("PNG 编码失败：{}", e)))?;
    Ok(Bytes::from(cursor.into_inner()))
}

/// 编码并包装为 `GeneratedAsset`。
pub fn encode_asset(buffer: &PixelBuffer) -> Result<GeneratedAsset, FaviconError> {
    let encoded = encode_png(buffer)?;
    Ok(GeneratedAsset::new(
        buffer.edge_length(),
        buffer.pixel_size(),
        encoded,
    ))
}

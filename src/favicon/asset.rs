//! # 输出资产模型
//!
//! `TARGET_SIZES` 的顺序决定了输出集合中的下标、文件名顺序以及“全部导出”的顺序，
//! 不能调整。

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use serde::Serialize;

/// 固定的输出边长列表（升序）。
pub const TARGET_SIZES: [u32; 8] = [16, 32, 48, 64, 96, 128, 192, 256];

pub const PNG_MIME_TYPE: &str = "image/png";

/// 生成结果中的单个 favicon。发布后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAsset {
    edge_length: u32,
    pixel_size: u32,
    encoded: Bytes,
}

impl GeneratedAsset {
    pub(crate) fn new(edge_length: u32, pixel_size: u32, encoded: Bytes) -> Self {
        Self {
            edge_length,
            pixel_size,
            encoded,
        }
    }

    /// 与密度无关的边长（即 `TARGET_SIZES` 中的值）。
    pub fn edge_length(&self) -> u32 {
        self.edge_length
    }

    /// 编码图像的实际像素边长（`edge_length * pixel_density`）。
    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    /// PNG 编码字节，克隆开销为引用计数。
    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }

    pub fn mime_type(&self) -> &'static str {
        PNG_MIME_TYPE
    }

    /// 下载文件名：`favicon-{N}x{N}.png`。
    pub fn file_name(&self) -> String {
        file_name_for(self.edge_length)
    }

    /// 可直接嵌入页面的 Data URL。
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            PNG_MIME_TYPE,
            general_purpose::STANDARD.encode(&self.encoded)
        )
    }

    /// 不含像素数据的摘要，用于日志与序列化输出。
    pub fn summary(&self) -> AssetSummary {
        AssetSummary {
            edge_length: self.edge_length,
            pixel_size: self.pixel_size,
            file_name: self.file_name(),
            byte_len: self.encoded.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetSummary {
    pub edge_length: u32,
    pub pixel_size: u32,
    pub file_name: String,
    pub byte_len: usize,
}

pub fn file_name_for(edge_length: u32) -> String {
    format!("favicon-{0}x{0}.png", edge_length)
}

//! # favicon 生成模块（favicon）
//!
//! ## 设计思路
//!
//! 该模块把“源图加载 → 坐标映射与重采样 → 圆形遮罩 → PNG 编码 → 批量汇总 → 导出”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `loader`：字节 / Base64 / 文件 → `SourceImage`，含签名与体积校验
//! - `extractor`：显示坐标裁剪 → 自然像素裁剪 → 指定边长的像素缓冲
//! - `mask`：纯函数遮罩（正方形原样、圆形硬边裁切）
//! - `encoder`：无损 PNG 编码
//! - `generator`：`GenerationState` 状态机与批量编排
//! - `export`：`DownloadSink` 能力与逐个导出
//! - `config/error/source/asset`：配置、错误、输入与输出数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 裁剪确认
//!    ↓
//! generator.rs（状态机 + 扇出/汇合 + 阶段耗时日志）
//!    ├─ extractor.rs（坐标映射 + fast_image_resize 重采样）
//!    ├─ mask.rs（圆形遮罩）
//!    └─ encoder.rs（PNG）
//!    ↓
//! GenerationState::Success { assets } / Error { message }
//!    ↓
//! export.rs（DownloadSink 逐个交付 favicon-{N}x{N}.png）
//! ```

mod asset;
mod config;
mod encoder;
mod error;
mod export;
mod extractor;
mod generator;
mod loader;
mod mask;
mod source;

pub use asset::{AssetSummary, GeneratedAsset, PNG_MIME_TYPE, TARGET_SIZES, file_name_for};
pub use config::{FaviconConfig, MAX_PIXEL_DENSITY, ResizeQuality};
pub use encoder::{encode_asset, encode_png};
pub use error::FaviconError;
pub use export::{DownloadSink, FileSink, MemorySink, export_all, export_asset, html_link_tags};
pub use extractor::{CropExtractor, PixelBuffer, RasterCropExtractor, physical_edge};
pub use generator::{
    FAULT_MESSAGE, FaviconBatchGenerator, GenerationRequest, GenerationState,
    PARTIAL_FAILURE_MESSAGE, render_size,
};
pub use loader::{load_from_base64, load_from_bytes, load_from_file};
pub use mask::{apply_mask, is_outside_circle};
pub use source::{CropRegion, CropShape, NaturalRect, SourceImage};

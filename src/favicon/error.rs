//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载 favicon 链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 注意：单个尺寸的失败只在批处理内部计数，不会逐个暴露给用户，
//! 用户最终看到的是 `GenerationState::Error` 中的汇总文案。

/// favicon 处理统一错误类型。
///
/// 该类型会在应用层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum FaviconError {
    #[error("缺少输入：{0}")]
    MissingInput(String),

    #[error("裁剪区域无效：{0}")]
    InvalidCrop(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("裁剪提取失败：{0}")]
    Extraction(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("状态切换无效：{0}")]
    InvalidTransition(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("导出失败：{0}")]
    Sink(String),
}

impl FaviconError {
    /// 稳定的错误码，供调用方做分支处理。
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "missing_input",
            Self::InvalidCrop(_) => "invalid_crop",
            Self::InvalidFormat(_) => "invalid_format",
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::Extraction(_) => "extraction",
            Self::ResourceLimit(_) => "resource_limit",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::FileSystem(_) => "file_system",
            Self::Sink(_) => "sink",
        }
    }

    /// 错误所属阶段（load / extract / encode / generate / export）。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingInput(_) | Self::InvalidTransition(_) => "generate",
            Self::InvalidFormat(_) | Self::Decode(_) | Self::ResourceLimit(_) => "load",
            Self::InvalidCrop(_) | Self::Extraction(_) => "extract",
            Self::Encode(_) => "encode",
            Self::FileSystem(_) | Self::Sink(_) => "export",
        }
    }
}

impl From<FaviconError> for String {
    fn from(error: FaviconError) -> Self {
        error.to_string()
    }
}

//! 任务配置模块
//!
//! 命令行入口通过一个 JSON 文件描述单次生成：源图、显示尺寸、裁剪区域、形状与输出位置。
//! 字段使用 `snake_case`，可选字段缺省时采用 `FaviconConfig::default()` 的取值。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::favicon::{CropRegion, CropShape, FaviconConfig, ResizeQuality};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSettings {
    /// 源图路径。
    pub source: String,
    /// 裁剪编辑器中的显示宽度，缺省为自然宽度。
    #[serde(default)]
    pub displayed_width: Option<u32>,
    /// 裁剪编辑器中的显示高度，缺省为自然高度。
    #[serde(default)]
    pub displayed_height: Option<u32>,
    /// 显示坐标空间中的裁剪区域。
    pub crop: CropRegion,
    #[serde(default)]
    pub shape: CropShape,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub pixel_density: Option<f32>,
    /// `quality` / `balanced` / `speed`
    #[serde(default)]
    pub quality: Option<String>,
    /// 是否在输出目录额外写入 `favicon-links.html`。
    #[serde(default)]
    pub write_html: bool,
}

impl JobSettings {
    /// 从 JSON 文件读取任务配置。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Settings(format!("读取任务文件 '{}' 失败: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, AppError> {
        let settings = serde_json::from_str::<Self>(content)
            .map_err(|e| AppError::Settings(format!("解析任务文件失败: {}", e)))?;
        settings.crop.validate_shape()?;
        Ok(settings)
    }

    /// 显示尺寸需要宽高同时提供，只给一个视为配置错误。
    pub fn displayed_size(&self) -> Result<Option<(u32, u32)>, AppError> {
        match (self.displayed_width, self.displayed_height) {
            (Some(w), Some(h)) => Ok(Some((w, h))),
            (None, None) => Ok(None),
            _ => Err(AppError::Settings(
                "displayed_width 与 displayed_height 必须同时提供".to_string(),
            )),
        }
    }

    /// 合并到生成配置。
    pub fn to_config(&self) -> Result<FaviconConfig, AppError> {
        let mut config = FaviconConfig::default();
        if let Some(density) = self.pixel_density {
            FaviconConfig::validate_pixel_density(density)?;
            config.pixel_density = density;
        }
        if let Some(quality) = &self.quality {
            config.apply_resize_quality(ResizeQuality::parse(quality)?);
        }
        Ok(config)
    }
}

//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `FaviconConfig`，保证生成行为可观测、可调整、可测试。
//! 其中缩放质量档位（quality / balanced / speed）作为高层语义，映射到底层滤镜。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置。
//! - `ResizeQuality` 负责档位字符串解析与反向输出。
//! - `apply_resize_quality` 将档位转换为具体滤镜。
//! - `infer_resize_quality` 用于从当前配置反推档位。
//!
//! 所有档位都不会使用最近邻采样，小尺寸图标在最近邻下锯齿明显。

use image::imageops::FilterType;

use super::FaviconError;

/// 像素密度允许的上限。
pub const MAX_PIXEL_DENSITY: f32 = 4.0;

/// favicon 生成配置。
#[derive(Debug, Clone)]
pub struct FaviconConfig {
    /// 显示设备像素密度，输出缓冲边长为 `edge * pixel_density`。
    pub pixel_density: f32,
    /// 重采样滤镜。
    pub resize_filter: FilterType,
    /// 是否将各尺寸任务并行分发到阻塞线程池。
    pub parallel: bool,
    /// 加载源图时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 源图解码后的像素上限（`width * height`）。
    pub max_source_pixels: u64,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            pixel_density: 1.0,
            resize_filter: FilterType::CatmullRom,
            parallel: true,
            max_file_size: 50 * 1024 * 1024,
            max_source_pixels: 40_000_000,
        }
    }
}

/// 缩放质量档位。
///
/// - `Quality`：Lanczos3，最锐利
/// - `Balanced`：CatmullRom，默认
/// - `Speed`：Triangle，双线性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeQuality {
    Quality,
    Balanced,
    Speed,
}

impl ResizeQuality {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use favicon_generator::favicon::ResizeQuality;
    ///
    /// let q = ResizeQuality::parse("balanced")?;
    /// assert_eq!(q.as_str(), "balanced");
    /// # Ok::<(), favicon_generator::favicon::FaviconError>(())
    /// ```
    pub fn parse(quality: &str) -> Result<Self, FaviconError> {
        match quality.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(FaviconError::InvalidFormat(format!(
                "未知缩放档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl FaviconConfig {
    /// 基于当前滤镜反推档位。
    pub fn infer_resize_quality(&self) -> ResizeQuality {
        match self.resize_filter {
            FilterType::Lanczos3 | FilterType::Gaussian => ResizeQuality::Quality,
            FilterType::Triangle | FilterType::Nearest => ResizeQuality::Speed,
            FilterType::CatmullRom => ResizeQuality::Balanced,
        }
    }

    /// 应用指定档位到实际参数。
    pub fn apply_resize_quality(&mut self, quality: ResizeQuality) {
        self.resize_filter = match quality {
            ResizeQuality::Quality => FilterType::Lanczos3,
            ResizeQuality::Balanced => FilterType::CatmullRom,
            ResizeQuality::Speed => FilterType::Triangle,
        };
    }

    /// 校验像素密度范围 `(0, MAX_PIXEL_DENSITY]`。
    pub fn validate_pixel_density(density: f32) -> Result<(), FaviconError> {
        if !density.is_finite() || density <= 0.0 || density > MAX_PIXEL_DENSITY {
            return Err(FaviconError::InvalidFormat(format!(
                "pixel_density 必须在 (0, {}] 之间，当前：{}",
                MAX_PIXEL_DENSITY, density
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_mixed_case_and_whitespace() {
        assert_eq!(
            ResizeQuality::parse("  Quality ").expect("parse failed"),
            ResizeQuality::Quality
        );
        assert!(matches!(
            ResizeQuality::parse("ultra"),
            Err(FaviconError::InvalidFormat(_))
        ));
    }

    #[test]
    fn apply_then_infer_is_consistent() {
        let mut config = FaviconConfig::default();
        assert_eq!(config.infer_resize_quality(), ResizeQuality::Balanced);

        for quality in [ResizeQuality::Quality, ResizeQuality::Speed, ResizeQuality::Balanced] {
            config.apply_resize_quality(quality);
            assert_eq!(config.infer_resize_quality(), quality);
            assert_ne!(config.resize_filter, FilterType::Nearest);
        }
    }

    #[test]
    fn pixel_density_range_is_enforced() {
        assert!(FaviconConfig::validate_pixel_density(1.0).is_ok());
        assert!(FaviconConfig::validate_pixel_density(4.0).is_ok());
        assert!(FaviconConfig::validate_pixel_density(0.0).is_err());
        assert!(FaviconConfig::validate_pixel_density(-1.0).is_err());
        assert!(FaviconConfig::validate_pixel_density(4.5).is_err());
        assert!(FaviconConfig::validate_pixel_density(f32::NAN).is_err());
    }
}

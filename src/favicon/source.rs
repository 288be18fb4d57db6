//! # 输入数据模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”与“坐标空间”解耦：
//! - `SourceImage` 同时记录自然尺寸（真实像素）与显示尺寸（裁剪编辑器中渲染的尺寸）
//! - `CropRegion` 始终位于显示坐标空间，由外部裁剪编辑器给出
//! - `CropShape` 只影响后处理（遮罩），不改变提取的矩形
//!
//! 源图像素以 `Arc` 共享，各尺寸任务只读访问，无需复制。

use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::FaviconError;

/// 正方形判定的容差。
const SQUARE_EPSILON: f64 = 1e-6;
/// 越界判定的容差（显示像素）。
const BOUNDS_EPSILON: f64 = 0.5;

/// 已解码的源图。
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: Arc<RgbaImage>,
    displayed_width: u32,
    displayed_height: u32,
}

impl SourceImage {
    /// 以自然尺寸作为显示尺寸创建源图（缩放比例 1.0）。
    pub fn new(pixels: RgbaImage) -> Result<Self, FaviconError> {
        let (width, height) = pixels.dimensions();
        Self::with_displayed_size(pixels, width, height)
    }

    /// 指定显示尺寸创建源图。
    ///
    /// 缩放比例可以是任意正数，不要求显示尺寸小于自然尺寸。
    pub fn with_displayed_size(
        pixels: RgbaImage,
        displayed_width: u32,
        displayed_height: u32,
    ) -> Result<Self, FaviconError> {
        let (natural_width, natural_height) = pixels.dimensions();
        if natural_width == 0 || natural_height == 0 {
            return Err(FaviconError::MissingInput("源图像素为空".to_string()));
        }
        if displayed_width == 0 || displayed_height == 0 {
            return Err(FaviconError::InvalidFormat(format!(
                "显示尺寸无效：{}x{}",
                displayed_width, displayed_height
            )));
        }

        Ok(Self {
            pixels: Arc::new(pixels),
            displayed_width,
            displayed_height,
        })
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn natural_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn displayed_width(&self) -> u32 {
        self.displayed_width
    }

    pub fn displayed_height(&self) -> u32 {
        self.displayed_height
    }

    /// 显示坐标 → 自然像素坐标的缩放比例 `(scale_x, scale_y)`。
    pub fn scale_factors(&self) -> (f64, f64) {
        (
            self.natural_width() as f64 / self.displayed_width as f64,
            self.natural_height() as f64 / self.displayed_height as f64,
        )
    }
}

/// 显示坐标空间中的正方形裁剪区域。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRegion {
    /// 创建并校验裁剪区域：必须是边长大于 0 的正方形。
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, FaviconError> {
        let region = Self {
            x,
            y,
            width,
            height,
        };
        region.validate_shape()?;
        Ok(region)
    }

    /// 校验宽高相等且为正。
    pub fn validate_shape(&self) -> Result<(), FaviconError> {
        let values = [self.x, self.y, self.width, self.height];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FaviconError::InvalidCrop("坐标包含非有限数值".to_string()));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(FaviconError::InvalidCrop(format!(
                "裁剪区域尺寸为零：{}x{}",
                self.width, self.height
            )));
        }
        if (self.width - self.height).abs() > SQUARE_EPSILON {
            return Err(FaviconError::InvalidCrop(format!(
                "裁剪区域必须为正方形：{}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// 校验区域位于 `[0, displayed_width] × [0, displayed_height]` 内。
    pub fn validate_within(&self, source: &SourceImage) -> Result<(), FaviconError> {
        let max_x = source.displayed_width() as f64 + BOUNDS_EPSILON;
        let max_y = source.displayed_height() as f64 + BOUNDS_EPSILON;

        if self.x < -BOUNDS_EPSILON
            || self.y < -BOUNDS_EPSILON
            || self.x + self.width > max_x
            || self.y + self.height > max_y
        {
            return Err(FaviconError::InvalidCrop(format!(
                "裁剪区域越界：({}, {}, {}, {}) 超出显示尺寸 {}x{}",
                self.x,
                self.y,
                self.width,
                self.height,
                source.displayed_width(),
                source.displayed_height()
            )));
        }
        Ok(())
    }

    /// 映射到自然像素空间。返回的矩形不做截断，由提取器负责夹取。
    pub fn to_natural(&self, source: &SourceImage) -> NaturalRect {
        let (scale_x, scale_y) = source.scale_factors();
        NaturalRect {
            x: self.x * scale_x,
            y: self.y * scale_y,
            width: self.width * scale_x,
            height: self.height * scale_y,
        }
    }
}

/// 自然像素空间中的矩形（可含小数）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NaturalRect {
    /// 夹取到 `[0, width] × [0, height]` 范围内，保持宽高比不变。
    ///
    /// 越界时优先平移原点；只有矩形本身大于源图时才按同一比例缩小两边。
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let max_w = width as f64;
        let max_h = height as f64;
        if self.width <= 0.0 || self.height <= 0.0 {
            return Self {
                x: self.x.clamp(0.0, max_w),
                y: self.y.clamp(0.0, max_h),
                width: 0.0,
                height: 0.0,
            };
        }

        let shrink = (max_w / self.width).min(max_h / self.height).min(1.0);
        let rect_w = self.width * shrink;
        let rect_h = self.height * shrink;
        Self {
            x: self.x.min(max_w - rect_w).max(0.0),
            y: self.y.min(max_h - rect_h).max(0.0),
            width: rect_w,
            height: rect_h,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// 裁剪形状。只作用于后处理遮罩。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropShape {
    #[default]
    Square,
    Circle,
}

impl CropShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Circle => "circle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(natural: (u32, u32), displayed: (u32, u32)) -> SourceImage {
        SourceImage::with_displayed_size(
            RgbaImage::new(natural.0, natural.1),
            displayed.0,
            displayed.1,
        )
        .expect("source init failed")
    }

    #[test]
    fn maps_displayed_crop_to_natural_space() {
        let src = source((800, 600), (400, 300));
        assert_eq!(src.scale_factors(), (2.0, 2.0));

        let crop = CropRegion::new(100.0, 50.0, 100.0, 100.0).expect("crop init failed");
        crop.validate_within(&src).expect("crop should fit");

        let natural = crop.to_natural(&src);
        assert_eq!(
            natural,
            NaturalRect {
                x: 200.0,
                y: 100.0,
                width: 200.0,
                height: 200.0
            }
        );
    }

    #[test]
    fn scale_factors_may_be_below_one() {
        let src = source((100, 100), (400, 400));
        assert_eq!(src.scale_factors(), (0.25, 0.25));
    }

    #[test]
    fn rejects_non_square_and_zero_regions() {
        assert!(matches!(
            CropRegion::new(0.0, 0.0, 10.0, 12.0),
            Err(FaviconError::InvalidCrop(_))
        ));
        assert!(matches!(
            CropRegion::new(0.0, 0.0, 0.0, 0.0),
            Err(FaviconError::InvalidCrop(_))
        ));
        assert!(matches!(
            CropRegion::new(f64::NAN, 0.0, 1.0, 1.0),
            Err(FaviconError::InvalidCrop(_))
        ));
    }

    #[test]
    fn rejects_region_outside_displayed_bounds() {
        let src = source((200, 200), (100, 100));
        let crop = CropRegion::new(60.0, 0.0, 50.0, 50.0).expect("crop init failed");
        assert!(crop.validate_within(&src).is_err());

        let edge = CropRegion::new(50.0, 50.0, 50.0, 50.0).expect("crop init failed");
        assert!(edge.validate_within(&src).is_ok());
    }

    #[test]
    fn clamp_keeps_rect_inside_image() {
        let rect = NaturalRect {
            x: -2.0,
            y: 90.0,
            width: 20.0,
            height: 20.0,
        };
        let clamped = rect.clamp_to(100, 100);
        assert_eq!(clamped.x, 0.0);
        assert_eq!(clamped.y, 80.0);
        assert_eq!(clamped.width, 20.0);
        assert_eq!(clamped.height, 20.0);
    }

    #[test]
    fn overhang_within_slack_keeps_square_side() {
        // 越界 0.4px 仍在容差内，夹取后应平移而不是压扁
        let src = source((100, 100), (100, 100));
        let crop = CropRegion::new(60.4, 0.0, 40.0, 40.0).expect("crop init failed");
        crop.validate_within(&src).expect("crop should fit within slack");

        let clamped = crop.to_natural(&src).clamp_to(100, 100);
        assert_eq!(clamped.width, 40.0);
        assert_eq!(clamped.height, 40.0);
        assert_eq!(clamped.x, 60.0);
        assert_eq!(clamped.y, 0.0);
    }

    #[test]
    fn oversized_rect_shrinks_both_sides_equally() {
        let rect = NaturalRect {
            x: -0.2,
            y: -0.2,
            width: 100.4,
            height: 100.4,
        };
        let clamped = rect.clamp_to(100, 80);
        assert_eq!(clamped.x, 0.0);
        assert_eq!(clamped.y, 0.0);
        assert!((clamped.width - 80.0).abs() < 1e-9);
        assert!((clamped.height - 80.0).abs() < 1e-9);
        assert!((clamped.width / clamped.height - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_preserves_aspect_for_anisotropic_scale() {
        // 横纵缩放比例不同时，自然空间矩形本就不是正方形，比例仍需保持
        let rect = NaturalRect {
            x: 1.0,
            y: 0.0,
            width: 60.0,
            height: 30.0,
        };
        let clamped = rect.clamp_to(50, 50);
        assert!((clamped.width / clamped.height - 2.0).abs() < 1e-12);
        assert!(clamped.x + clamped.width <= 50.0 + 1e-9);
    }

    #[test]
    fn empty_pixels_are_missing_input() {
        let result = SourceImage::new(RgbaImage::new(0, 0));
        assert!(matches!(result, Err(FaviconError::MissingInput(_))));
    }
}

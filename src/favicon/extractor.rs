//! # 裁剪提取模块
//!
//! ## 设计思路
//!
//! 输入是显示坐标空间中的裁剪区域，输出是指定边长的正方形像素缓冲。
//! 整个过程是一次仿射缩放：没有旋转、没有错切。
//!
//! ## 实现思路
//!
//! 1. 计算 `scale_x / scale_y`，把裁剪区域映射到自然像素空间
//! 2. 按像素密度分配输出缓冲：物理边长 = `edge * pixel_density`
//! 3. 使用 `fast_image_resize` 卷积缩放，直接以小数坐标裁剪源图
//! 4. `fast_image_resize` 失败时回退 `image::imageops`（整数裁剪 + `resize`）
//!
//! 所有坐标都以密度无关单位表达，密度只影响最终缓冲的物理像素数。

use std::time::Instant;

use fast_image_resize as fr;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};

use super::source::NaturalRect;
use super::{CropRegion, FaviconConfig, FaviconError, SourceImage};

/// 正方形像素缓冲。
///
/// `edge_length` 是密度无关边长，`image` 的实际边长为 `pixel_size()`。
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    edge_length: u32,
    pixel_density: f32,
    image: RgbaImage,
}

impl PixelBuffer {
    /// 包装已有图像，要求其边长与 `edge_length * pixel_density` 一致。
    pub fn from_image(
        edge_length: u32,
        pixel_density: f32,
        image: RgbaImage,
    ) -> Result<Self, FaviconError> {
        FaviconConfig::validate_pixel_density(pixel_density)?;
        let expected = physical_edge(edge_length, pixel_density)?;
        if image.width() != expected || image.height() != expected {
            return Err(FaviconError::Extraction(format!(
                "缓冲尺寸不匹配：{}x{}（期望 {}x{}）",
                image.width(),
                image.height(),
                expected,
                expected
            )));
        }
        Ok(Self {
            edge_length,
            pixel_density,
            image,
        })
    }

    pub fn edge_length(&self) -> u32 {
        self.edge_length
    }

    pub fn pixel_density(&self) -> f32 {
        self.pixel_density
    }

    pub fn pixel_size(&self) -> u32 {
        self.image.width()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// 仅供遮罩等就地修改像素值的步骤使用，不允许改变尺寸。
    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }
}

/// 密度无关边长 → 物理像素边长（至少为 1）。
pub fn physical_edge(edge_length: u32, pixel_density: f32) -> Result<u32, FaviconError> {
    if edge_length == 0 {
        return Err(FaviconError::InvalidCrop("输出边长必须大于 0".to_string()));
    }
    let size = (edge_length as f64 * pixel_density as f64).round();
    if !size.is_finite() || size > u32::MAX as f64 {
        return Err(FaviconError::ResourceLimit(format!(
            "输出缓冲过大：{} * {}",
            edge_length, pixel_density
        )));
    }
    Ok((size as u32).max(1))
}

/// 裁剪提取能力。批处理生成器通过该 trait 调用提取器，便于替换实现。
pub trait CropExtractor: Send + Sync {
    fn extract(
        &self,
        source: &SourceImage,
        crop: &CropRegion,
        output_edge: u32,
        config: &FaviconConfig,
    ) -> Result<PixelBuffer, FaviconError>;
}

/// 基于重采样的默认提取器。
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCropExtractor;

impl CropExtractor for RasterCropExtractor {
    fn extract(
        &self,
        source: &SourceImage,
        crop: &CropRegion,
        output_edge: u32,
        config: &FaviconConfig,
    ) -> Result<PixelBuffer, FaviconError> {
        self.extract_with(
            source,
            crop,
            output_edge,
            config,
            Self::resize_with_fast_image_resize,
        )
    }
}

/// 主缩放路径的函数签名，失败时由 `extract_with` 回退 `imageops`。
type ResizeFn = fn(&RgbaImage, &NaturalRect, u32, FilterType) -> Result<RgbaImage, FaviconError>;

impl RasterCropExtractor {
    fn extract_with(
        &self,
        source: &SourceImage,
        crop: &CropRegion,
        output_edge: u32,
        config: &FaviconConfig,
        primary: ResizeFn,
    ) -> Result<PixelBuffer, FaviconError> {
        crop.validate_shape()?;
        crop.validate_within(source)?;
        FaviconConfig::validate_pixel_density(config.pixel_density)?;

        let size = physical_edge(output_edge, config.pixel_density)?;
        let natural = crop
            .to_natural(source)
            .clamp_to(source.natural_width(), source.natural_height());
        if natural.is_empty() {
            return Err(FaviconError::InvalidCrop(format!(
                "映射到源图后裁剪区域为空：{:?}",
                natural
            )));
        }

        let start = Instant::now();
        let image = match primary(source.pixels(), &natural, size, config.resize_filter) {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 缩放失败，回退 image::imageops：{}",
                    err
                );
                Self::resize_with_imageops(source.pixels(), &natural, size, config.resize_filter)?
            }
        };

        log::debug!(
            "✂️ 提取完成 - edge={} size={}x{} src=({:.1}, {:.1}, {:.1}, {:.1}) {}µs",
            output_edge,
            size,
            size,
            natural.x,
            natural.y,
            natural.width,
            natural.height,
            start.elapsed().as_micros()
        );

        PixelBuffer::from_image(output_edge, config.pixel_density, image)
    }

    fn resize_with_fast_image_resize(
        source: &RgbaImage,
        natural: &NaturalRect,
        size: u32,
        filter: FilterType,
    ) -> Result<RgbaImage, FaviconError> {
        let src_image = fr::images::ImageRef::new(
            source.width(),
            source.height(),
            source.as_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| FaviconError::Extraction(format!("构建源图像视图失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(size, size, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)))
            .crop(natural.x, natural.y, natural.width, natural.height);

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| FaviconError::Extraction(format!("fast_image_resize 执行失败：{}", e)))?;

        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(size, size, dst_image.into_vec())
            .ok_or_else(|| FaviconError::Extraction("fast_image_resize 输出缓冲长度异常".to_string()))
    }

    /// 回退路径：裁剪坐标取整后再缩放。
    fn resize_with_imageops(
        source: &RgbaImage,
        natural: &NaturalRect,
        size: u32,
        filter: FilterType,
    ) -> Result<RgbaImage, FaviconError> {
        let x = (natural.x.floor() as u32).min(source.width().saturating_sub(1));
        let y = (natural.y.floor() as u32).min(source.height().saturating_sub(1));
        let width = (natural.width.round() as u32)
            .max(1)
            .min(source.width() - x);
        let height = (natural.height.round() as u32)
            .max(1)
            .min(source.height() - y);

        let cropped = imageops::crop_imm(source, x, y, width, height).to_image();
        let resized = imageops::resize(&cropped, size, size, filter);
        if resized.width() != size || resized.height() != size {
            return Err(FaviconError::Extraction(format!(
                "回退缩放输出尺寸异常：{}x{}",
                resized.width(),
                resized.height()
            )));
        }
        Ok(resized)
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
}

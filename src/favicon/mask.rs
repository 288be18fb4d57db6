//! # 遮罩模块
//!
//! 纯函数：输入一个像素缓冲，返回一个新的像素缓冲，不依赖任何渲染表面。
//!
//! 圆形遮罩是硬边裁切：像素偏移 `(x, y)` 到中心 `(edge/2, edge/2)` 的欧氏距离
//! 大于 `edge/2` 时 alpha 置 0，颜色通道保持不变；距离小于等于半径的像素原样保留。
//! 边缘不做抗锯齿。
//!
//! 像素密度不为 1 时，物理像素坐标先除以密度换算回密度无关单位再比较。

use super::{CropShape, PixelBuffer};

/// 按形状应用遮罩。`Square` 原样返回。
pub fn apply_mask(buffer: PixelBuffer, shape: CropShape) -> PixelBuffer {
    match shape {
        CropShape::Square => buffer,
        CropShape::Circle => apply_circle_mask(buffer),
    }
}

fn apply_circle_mask(buffer: PixelBuffer) -> PixelBuffer {
    let edge = buffer.edge_length();
    let density = buffer.pixel_density() as f64;
    let mut masked = buffer;

    // 构造时已保证 image 尺寸与 edge/density 一致，这里只改 alpha。
    let image = masked.image_mut();
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if is_outside_circle(x as f64 / density, y as f64 / density, edge) {
            pixel[3] = 0;
        }
    }
    masked
}

/// 判断密度无关坐标 `(x, y)` 是否位于边长为 `edge` 的内切圆之外。
pub fn is_outside_circle(x: f64, y: f64, edge: u32) -> bool {
    let center = edge as f64 / 2.0;
    let radius = center;
    let dx = x - center;
    let dy = y - center;
    (dx * dx + dy * dy).sqrt() > radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(edge: u32, density: f32, alpha: u8) -> PixelBuffer {
        let size = crate::favicon::physical_edge(edge, density).expect("edge failed");
        PixelBuffer::from_image(
            edge,
            density,
            RgbaImage::from_pixel(size, size, Rgba([200, 100, 50, alpha])),
        )
        .expect("buffer init failed")
    }

    #[test]
    fn square_mask_is_identity() {
        let buffer = solid(16, 1.0, 255);
        let masked = apply_mask(buffer.clone(), CropShape::Square);
        assert_eq!(masked, buffer);
    }

    #[test]
    fn circle_mask_clears_corners_keeps_center() {
        let masked = apply_mask(solid(16, 1.0, 255), CropShape::Circle);
        let image = masked.image();

        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(15, 0)[3], 0);
        assert_eq!(image.get_pixel(0, 15)[3], 0);
        assert_eq!(image.get_pixel(15, 15)[3], 0);
        assert_eq!(image.get_pixel(8, 8), &Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn circle_mask_leaves_color_channels_untouched() {
        let masked = apply_mask(solid(32, 1.0, 255), CropShape::Circle);
        let corner = masked.image().get_pixel(0, 0);
        assert_eq!(&corner.0[..3], &[200, 100, 50]);
    }

    #[test]
    fn pixels_exactly_on_radius_are_kept() {
        // edge=16：(8, 0) 距中心 (8, 8) 恰好为 8，等于半径，保留
        let masked = apply_mask(solid(16, 1.0, 255), CropShape::Circle);
        assert_eq!(masked.image().get_pixel(8, 0)[3], 255);
        assert_eq!(masked.image().get_pixel(0, 8)[3], 255);
        // (7, 0) 距离 sqrt(65) > 8，清除
        assert_eq!(masked.image().get_pixel(7, 0)[3], 0);
    }

    #[test]
    fn center_keeps_source_alpha() {
        let masked = apply_mask(solid(16, 1.0, 128), CropShape::Circle);
        assert_eq!(masked.image().get_pixel(8, 8)[3], 128);
    }

    #[test]
    fn mask_matches_predicate_for_every_pixel() {
        let edge = 48;
        let masked = apply_mask(solid(edge, 1.0, 255), CropShape::Circle);
        for (x, y, pixel) in masked.image().enumerate_pixels() {
            let expected = if is_outside_circle(x as f64, y as f64, edge) { 0 } else { 255 };
            assert_eq!(pixel[3], expected, "pixel ({}, {})", x, y);
        }
    }

    #[test]
    fn high_density_mask_uses_logical_coordinates() {
        let masked = apply_mask(solid(16, 2.0, 255), CropShape::Circle);
        assert_eq!(masked.pixel_size(), 32);
        // 物理 (16, 16) → 逻辑 (8, 8)，中心
        assert_eq!(masked.image().get_pixel(16, 16)[3], 255);
        // 物理 (16, 0) → 逻辑 (8, 0)，恰在半径上
        assert_eq!(masked.image().get_pixel(16, 0)[3], 255);
        assert_eq!(masked.image().get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn edge_is_hard_not_antialiased() {
        let masked = apply_mask(solid(64, 1.0, 255), CropShape::Circle);
        assert!(masked.image().pixels().all(|p| p[3] == 0 || p[3] == 255));
    }
}

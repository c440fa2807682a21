//! Perspective resampling of an RGBA image

use image::{Rgba, RgbaImage};

use super::homography::Homography;
use crate::error::{CropError, Result};

/// Warp `src` into a new `width` x `height` image
///
/// `transform` maps source coordinates to output coordinates. Every output
/// pixel center is mapped back through the inverse and sampled bilinearly.
/// Samples that land outside the source are transparent.
pub fn warp_perspective(
    src: &RgbaImage,
    transform: &Homography,
    width: u32,
    height: u32,
) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(CropError::InvalidOutputSize { width, height });
    }
    let inverse = transform.invert().ok_or(CropError::SingularTransform)?;

    let mut out = RgbaImage::new(width, height);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let Some((sx, sy)) = inverse.map_xy(x as f64 + 0.5, y as f64 + 0.5) else {
            continue;
        };
        if let Some(sample) = bilinear_sample(src, sx, sy) {
            *pixel = sample;
        }
    }
    Ok(out)
}

/// Bilinear sample at continuous coordinates where pixel centers sit at +0.5
fn bilinear_sample(src: &RgbaImage, x: f64, y: f64) -> Option<Rgba<u8>> {
    let (w, h) = (src.width(), src.height());
    if w == 0 || h == 0 || x < 0.0 || y < 0.0 || x > w as f64 || y > h as f64 {
        return None;
    }

    let px = (x - 0.5).max(0.0);
    let py = (y - 0.5).max(0.0);
    let x0 = (px.floor() as u32).min(w - 1);
    let y0 = (py.floor() as u32).min(h - 1);
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = (px - x0 as f64).clamp(0.0, 1.0);
    let fy = (py - y0 as f64).clamp(0.0, 1.0);

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x1, y0).0;
    let p01 = src.get_pixel(x0, y1).0;
    let p11 = src.get_pixel(x1, y1).0;

    let mut result = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        result[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgba(result))
}

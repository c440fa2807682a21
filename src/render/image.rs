//! View rendering using tiny-skia
//!
//! Composes one frame: the source image scaled into the fit rectangle, the
//! dim mask over everything outside the regions, region outlines and the
//! selected region's corner handles.

use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, IntSize, LineJoin, Mask, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Rect, Stroke, Transform,
};

use super::geometry::handle;
use crate::config::{CropConfig, RgbaColor};
use crate::domain::{Quad, RegionSet};
use crate::viewport::Viewport;

/// Convert an RgbaImage (straight alpha) into a premultiplied Pixmap
pub fn rgba_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(img.width(), img.height())?;
    let mut pixmap = Pixmap::new(size.width(), size.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Convert a premultiplied Pixmap back into a straight-alpha RgbaImage
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .unwrap_or_else(|| RgbaImage::new(pixmap.width(), pixmap.height()))
}

fn paint_for(color: RgbaColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.into());
    paint.anti_alias = true;
    paint
}

/// Closed path through the four corners of a region
fn build_quad_path(quad: &Quad) -> Option<Path> {
    let [first, rest @ ..] = quad.points();
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.close();
    pb.finish()
}

/// Draw the premultiplied source scaled into the fit rectangle
fn draw_source(pixmap: &mut Pixmap, source: &Pixmap, viewport: &Viewport) {
    let fit = viewport.fit();
    let sx = fit.width() / source.width() as f32;
    let sy = fit.height() / source.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };
    pixmap.draw_pixmap(
        0,
        0,
        source.as_ref(),
        &paint,
        Transform::from_row(sx, 0.0, 0.0, sy, fit.left, fit.top),
        None,
    );
}

/// Fill everything outside the union of all regions with the dim color
fn draw_dim_mask(pixmap: &mut Pixmap, paths: &[Path], config: &CropConfig) {
    let Some(mut mask) = Mask::new(pixmap.width(), pixmap.height()) else {
        return;
    };
    // Each polygon separately, so crossed or overlapping quads never cancel out
    for path in paths {
        mask.fill_path(path, FillRule::Winding, true, Transform::identity());
    }
    mask.invert();

    let Some(full) = Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)
    else {
        return;
    };
    let paint = paint_for(config.style.dim_color);
    pixmap.fill_rect(full, &paint, Transform::identity(), Some(&mask));
}

fn draw_handles(pixmap: &mut Pixmap, quad: &Quad, config: &CropConfig) {
    let paint = paint_for(config.style.handle_color);
    let radius = handle::draw_radius(config.corner_size);
    for p in quad.points() {
        if let Some(circle) = PathBuilder::from_circle(p.x, p.y, radius) {
            pixmap.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

/// Render one frame of the crop view
///
/// `source` is the image already converted with [`rgba_to_pixmap`], so callers
/// can keep it across redraws. Returns `None` when the viewport has no area.
/// Repeated calls with the same inputs produce identical pixels.
pub fn render_view(
    source: &Pixmap,
    viewport: &Viewport,
    regions: &RegionSet,
    crop_mode: bool,
    config: &CropConfig,
) -> Option<Pixmap> {
    if !viewport.is_ready() {
        return None;
    }
    let width = viewport.view_width.round() as u32;
    let height = viewport.view_height.round() as u32;
    let mut pixmap = Pixmap::new(width, height)?;
    pixmap.fill(config.style.background.into());

    draw_source(&mut pixmap, source, viewport);

    if !crop_mode || regions.is_empty() {
        return Some(pixmap);
    }

    let paths: Vec<Option<Path>> = regions.regions().iter().map(build_quad_path).collect();
    let filled: Vec<Path> = paths.iter().flatten().cloned().collect();
    draw_dim_mask(&mut pixmap, &filled, config);

    let style = &config.style;
    let selected = regions.selected();
    for (index, path) in paths.iter().enumerate() {
        let Some(path) = path else {
            continue;
        };
        let is_selected = selected == Some(index);
        let (color, width) = if is_selected {
            (style.selected_outline_color, style.selected_outline_width)
        } else {
            (style.outline_color, style.outline_width)
        };
        let stroke = Stroke {
            width,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        pixmap.stroke_path(path, &paint_for(color), &stroke, Transform::identity(), None);
    }

    if let Some(quad) = regions.selected_quad() {
        draw_handles(&mut pixmap, quad, config);
    }

    Some(pixmap)
}

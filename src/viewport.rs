//! Fit rectangle and view/source coordinate mapping
//!
//! Region geometry lives in view coordinates. The viewport knows where the
//! source image is drawn inside the view and converts between the two spaces.

use crate::domain::{PixelRect, Point, RectF, fit_rect};

/// View size, source image size and the derived fit rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub view_width: f32,
    pub view_height: f32,
    pub image_width: u32,
    pub image_height: u32,
    fit: RectF,
}

impl Viewport {
    pub fn new(view_width: f32, view_height: f32, image_width: u32, image_height: u32) -> Self {
        Self {
            view_width,
            view_height,
            image_width,
            image_height,
            fit: fit_rect(view_width, view_height, image_width, image_height),
        }
    }

    /// Where the source image is drawn inside the view
    pub fn fit(&self) -> RectF {
        self.fit
    }

    /// The full view bounds
    pub fn view_rect(&self) -> RectF {
        RectF::new(0.0, 0.0, self.view_width, self.view_height)
    }

    /// True once both the view and the image have a size
    pub fn is_ready(&self) -> bool {
        !self.fit.is_empty()
    }

    /// Source pixels per view pixel, per axis
    fn source_per_view(&self) -> Option<(f32, f32)> {
        if !self.is_ready() {
            return None;
        }
        Some((
            self.image_width as f32 / self.fit.width(),
            self.image_height as f32 / self.fit.height(),
        ))
    }

    /// Convert a source-image pixel rectangle into view coordinates
    pub fn source_to_view(&self, rect: PixelRect) -> Option<RectF> {
        let (sx, sy) = self.source_per_view()?;
        Some(RectF::new(
            self.fit.left + rect.left as f32 / sx,
            self.fit.top + rect.top as f32 / sy,
            self.fit.left + rect.right as f32 / sx,
            self.fit.top + rect.bottom as f32 / sy,
        ))
    }

    /// Convert a view point into source-image coordinates (unclamped)
    pub fn view_to_source(&self, point: Point) -> Option<Point> {
        let (sx, sy) = self.source_per_view()?;
        Some(Point::new(
            (point.x - self.fit.left) * sx,
            (point.y - self.fit.top) * sy,
        ))
    }

    /// Convert a view point into source coordinates clamped to `[0, w] x [0, h]`
    pub fn view_to_source_clamped(&self, point: Point) -> Option<Point> {
        let p = self.view_to_source(point)?;
        Some(Point::new(
            p.x.clamp(0.0, self.image_width as f32),
            p.y.clamp(0.0, self.image_height as f32),
        ))
    }

    /// Source-pixel size of a view-space extent
    pub fn view_extent_to_source(&self, width: f32, height: f32) -> Option<(f32, f32)> {
        let (sx, sy) = self.source_per_view()?;
        Some((width * sx, height * sy))
    }

    /// Convert a view rectangle into a source pixel rectangle clamped to the image
    pub fn view_rect_to_source(&self, rect: RectF) -> Option<PixelRect> {
        let (sx, sy) = self.source_per_view()?;
        let (w, h) = (self.image_width as i32, self.image_height as i32);
        let left = ((rect.left - self.fit.left) * sx) as i32;
        let top = ((rect.top - self.fit.top) * sy) as i32;
        let right = ((rect.right - self.fit.left) * sx) as i32;
        let bottom = ((rect.bottom - self.fit.top) * sy) as i32;
        Some(PixelRect::new(
            left.clamp(0, w),
            top.clamp(0, h),
            right.clamp(0, w),
            bottom.clamp(0, h),
        ))
    }

    /// Map a point from this viewport's fit rectangle onto another's, proportionally
    pub fn remap_point(&self, point: Point, to: &Viewport) -> Point {
        if !self.is_ready() || !to.is_ready() {
            return point;
        }
        let fx = (point.x - self.fit.left) / self.fit.width();
        let fy = (point.y - self.fit.top) / self.fit.height();
        Point::new(
            to.fit.left + fx * to.fit.width(),
            to.fit.top + fy * to.fit.height(),
        )
    }
}

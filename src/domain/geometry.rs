//! Geometric primitives for crop regions and coordinates

use serde::{Deserialize, Serialize};

/// Point in view coordinates (device pixels)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Offset the point by the given delta
    pub fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Clip x and y independently into the rectangle bounds
    pub fn clamp_to(&self, rect: &RectF) -> Point {
        Point::new(
            self.x.clamp(rect.left, rect.right.max(rect.left)),
            self.y.clamp(rect.top, rect.bottom.max(rect.top)),
        )
    }
}

/// Floating point rectangle in view coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// True when the rectangle has no positive area
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Inclusive containment test (edges count as inside)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// True if `other` lies entirely within this rectangle
    pub fn contains_rect(&self, other: &RectF) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }

    /// Grow the rectangle by `by` in every direction
    pub fn expand(&self, by: f32) -> RectF {
        RectF::new(
            self.left - by,
            self.top - by,
            self.right + by,
            self.bottom + by,
        )
    }

    pub fn translate(&self, dx: f32, dy: f32) -> RectF {
        RectF::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }
}

/// Integer rectangle in source-image pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Union of two rectangles
    pub fn union(&self, other: PixelRect) -> PixelRect {
        PixelRect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Min/max reduction over a set of points
pub fn bounding_rect(points: &[Point]) -> RectF {
    let Some(first) = points.first() else {
        return RectF::default();
    };
    points.iter().skip(1).fold(
        RectF::new(first.x, first.y, first.x, first.y),
        |acc, p| RectF {
            left: acc.left.min(p.x),
            top: acc.top.min(p.y),
            right: acc.right.max(p.x),
            bottom: acc.bottom.max(p.y),
        },
    )
}

/// Closed-path inclusion test (even-odd ray casting)
pub fn polygon_contains(points: &[Point], x: f32, y: f32) -> bool {
    if points.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > y) != (pj.y > y) && x < (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Uniform scale-to-fit of an image into a view, centered
///
/// Returns an empty rectangle when either size is zero.
pub fn fit_rect(view_width: f32, view_height: f32, image_width: u32, image_height: u32) -> RectF {
    if view_width <= 0.0 || view_height <= 0.0 || image_width == 0 || image_height == 0 {
        return RectF::default();
    }

    let (img_w, img_h) = (image_width as f32, image_height as f32);
    let scale = (view_width / img_w).min(view_height / img_h);
    let scaled_width = img_w * scale;
    let scaled_height = img_h * scale;
    let left = (view_width - scaled_width) / 2.0;
    let top = (view_height - scaled_height) / 2.0;

    RectF::new(left, top, left + scaled_width, top + scaled_height)
}

//! Quadrilateral crop regions
//!
//! Corners keep a fixed logical order (top-left, top-right, bottom-right,
//! bottom-left). The names are labels only: dragging can move a corner past
//! its neighbours and the order is never re-sorted.

use serde::{Deserialize, Serialize};

use super::geometry::{self, Point, RectF};

/// Corner label of a quadrilateral region
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// All corners in winding order
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A selectable, draggable, resizable crop quadrilateral in view coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    corners: [Point; 4],
}

impl Quad {
    /// Create from corners given in top-left, top-right, bottom-right, bottom-left order
    pub fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned quad with the four corners of `rect`
    pub fn from_rect(rect: RectF) -> Self {
        Self::new([
            Point::new(rect.left, rect.top),
            Point::new(rect.right, rect.top),
            Point::new(rect.right, rect.bottom),
            Point::new(rect.left, rect.bottom),
        ])
    }

    /// Axis-aligned quad inset from `fit` by `margin` (fraction of width/height) on each side
    pub fn inset(fit: RectF, margin: f32) -> Self {
        let margin = margin.clamp(0.0, 0.5);
        let dx = fit.width() * margin;
        let dy = fit.height() * margin;
        Self::from_rect(RectF::new(
            fit.left + dx,
            fit.top + dy,
            fit.right - dx,
            fit.bottom - dy,
        ))
    }

    pub fn corner(&self, corner: Corner) -> Point {
        self.corners[corner.index()]
    }

    /// Corners in winding order
    pub fn points(&self) -> &[Point; 4] {
        &self.corners
    }

    pub fn bounding_rect(&self) -> RectF {
        geometry::bounding_rect(&self.corners)
    }

    /// Check if a point lies inside the closed path through the four corners
    pub fn contains(&self, x: f32, y: f32) -> bool {
        geometry::polygon_contains(&self.corners, x, y)
    }

    /// Move every corner by (dx, dy) only if the moved bounding rect stays inside `bounds`
    ///
    /// Returns whether the move was committed.
    pub fn translate_within(&mut self, dx: f32, dy: f32, bounds: &RectF) -> bool {
        let moved = self.bounding_rect().translate(dx, dy);
        if !bounds.contains_rect(&moved) {
            return false;
        }
        for corner in &mut self.corners {
            *corner = corner.offset(dx, dy);
        }
        true
    }

    /// Move a single corner by (dx, dy), then clamp it into `bounds`
    pub fn move_corner(&mut self, corner: Corner, dx: f32, dy: f32, bounds: &RectF) {
        let point = &mut self.corners[corner.index()];
        *point = point.offset(dx, dy).clamp_to(bounds);
    }

    /// Clamp every corner into `bounds`
    pub fn clamp_to(&mut self, bounds: &RectF) {
        for corner in &mut self.corners {
            *corner = corner.clamp_to(bounds);
        }
    }

    /// Apply a point transform to every corner
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Quad {
        Quad::new(self.corners.map(f))
    }

    /// Nearest corner within `radius` of (x, y)
    pub fn nearest_corner(&self, x: f32, y: f32, radius: f32) -> Option<Corner> {
        let touch = Point::new(x, y);
        Corner::ALL
            .iter()
            .map(|&c| (c, self.corner(c).distance_to(touch)))
            .filter(|&(_, distance)| distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit() -> RectF {
        RectF::new(0.0, 0.0, 500.0, 1000.0)
    }

    #[test]
    fn test_inset_covers_central_area() {
        let quad = Quad::inset(fit(), 0.1);
        assert_eq!(quad.bounding_rect(), RectF::new(50.0, 100.0, 450.0, 900.0));
        assert_eq!(quad.corner(Corner::TopRight), Point::new(450.0, 100.0));
        assert_eq!(quad.corner(Corner::BottomLeft), Point::new(50.0, 900.0));
    }

    #[test]
    fn test_from_rect_corner_order() {
        let quad = Quad::from_rect(RectF::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(
            quad.points(),
            &[
                Point::new(1.0, 2.0),
                Point::new(3.0, 2.0),
                Point::new(3.0, 4.0),
                Point::new(1.0, 4.0),
            ]
        );
    }

    #[test]
    fn test_translate_within_commits() {
        let mut quad = Quad::from_rect(RectF::new(10.0, 10.0, 110.0, 110.0));
        assert!(quad.translate_within(20.0, 30.0, &fit()));
        assert_eq!(quad.bounding_rect(), RectF::new(30.0, 40.0, 130.0, 140.0));
    }

    #[test]
    fn test_translate_within_rejects_whole_move() {
        let mut quad = Quad::from_rect(RectF::new(10.0, 10.0, 110.0, 110.0));
        let before = quad;
        // Would push the left edge off the image: nothing moves, not even y
        assert!(!quad.translate_within(-20.0, 5.0, &fit()));
        assert_eq!(quad, before);
    }

    #[test]
    fn test_move_corner_clamps() {
        let bounds = RectF::new(100.0, 100.0, 400.0, 400.0);
        let mut quad = Quad::from_rect(RectF::new(120.0, 120.0, 300.0, 300.0));
        quad.move_corner(Corner::TopLeft, -50.0, -50.0, &bounds);
        assert_eq!(quad.corner(Corner::TopLeft), Point::new(100.0, 100.0));
        // Other corners untouched
        assert_eq!(quad.corner(Corner::TopRight), Point::new(300.0, 120.0));
    }

    #[test]
    fn test_nearest_corner_picks_closest() {
        let quad = Quad::from_rect(RectF::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(quad.nearest_corner(45.0, 48.0, 60.0), Some(Corner::BottomRight));
        assert_eq!(quad.nearest_corner(200.0, 200.0, 60.0), None);
    }

    #[test]
    fn test_corners_can_cross() {
        let bounds = fit();
        let mut quad = Quad::from_rect(RectF::new(100.0, 100.0, 200.0, 200.0));
        quad.move_corner(Corner::TopLeft, 150.0, 0.0, &bounds);
        // Labels are kept even though top-left is now right of top-right
        assert_eq!(quad.corner(Corner::TopLeft), Point::new(250.0, 100.0));
        assert_eq!(quad.corner(Corner::TopRight), Point::new(200.0, 100.0));
    }
}

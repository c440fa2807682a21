//! 3x3 perspective transform between two quadrilaterals

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

use crate::domain::Point;

/// Below this absolute value a determinant or projective weight counts as zero
const EPSILON: f64 = 1e-10;

/// Quads with less area than this (in square pixels) have no usable transform
const MIN_AREA: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    h: Matrix3<f64>,
}

impl Homography {
    pub fn identity() -> Self {
        Self {
            h: Matrix3::identity(),
        }
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.h
    }

    /// Transform mapping each `src` corner onto the `dst` corner with the same index
    ///
    /// Returns `None` if either quad is degenerate (collinear corners, near-zero
    /// area) or the system has no unique solution.
    pub fn from_quad_to_quad(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        if quad_area(src) < MIN_AREA || quad_area(dst) < MIN_AREA {
            return None;
        }

        // Two rows per correspondence, h[8] fixed to 1
        let mut m = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for i in 0..4 {
            let (x, y) = (src[i].x as f64, src[i].y as f64);
            let (xp, yp) = (dst[i].x as f64, dst[i].y as f64);

            let r = i * 2;
            m[(r, 0)] = x;
            m[(r, 1)] = y;
            m[(r, 2)] = 1.0;
            m[(r, 6)] = -xp * x;
            m[(r, 7)] = -xp * y;
            b[r] = xp;

            m[(r + 1, 3)] = x;
            m[(r + 1, 4)] = y;
            m[(r + 1, 5)] = 1.0;
            m[(r + 1, 6)] = -yp * x;
            m[(r + 1, 7)] = -yp * y;
            b[r + 1] = yp;
        }

        let v = m.lu().solve(&b)?;
        let h = Matrix3::new(v[0], v[1], v[2], v[3], v[4], v[5], v[6], v[7], 1.0);
        h.iter().all(|x| x.is_finite()).then_some(Self { h })
    }

    /// Inverse transform, `None` when singular
    pub fn invert(&self) -> Option<Self> {
        if self.h.determinant().abs() < EPSILON {
            return None;
        }
        self.h.try_inverse().map(|h| Self { h })
    }

    /// Apply the transform to a point, `None` for points mapped to infinity
    #[inline]
    pub fn map_xy(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let res = self.h * Vector3::new(x, y, 1.0);
        let w = res[2];
        if w.abs() < EPSILON {
            return None;
        }
        Some((res[0] / w, res[1] / w))
    }

    pub fn map_point(&self, p: Point) -> Option<Point> {
        self.map_xy(p.x as f64, p.y as f64)
            .map(|(x, y)| Point::new(x as f32, y as f32))
    }
}

/// Absolute shoelace area of a closed quad
fn quad_area(q: &[Point; 4]) -> f64 {
    let mut twice = 0.0f64;
    for i in 0..4 {
        let (p, n) = (q[i], q[(i + 1) % 4]);
        twice += p.x as f64 * n.y as f64 - n.x as f64 * p.y as f64;
    }
    (twice / 2.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(l: f32, t: f32, r: f32, b: f32) -> [Point; 4] {
        [
            Point::new(l, t),
            Point::new(r, t),
            Point::new(r, b),
            Point::new(l, b),
        ]
    }

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_maps_corners_exactly() {
        let src = [
            Point::new(12.0, 30.0),
            Point::new(210.0, 8.0),
            Point::new(230.0, 190.0),
            Point::new(5.0, 170.0),
        ];
        let dst = rect(0.0, 0.0, 300.0, 200.0);
        let h = Homography::from_quad_to_quad(&src, &dst).unwrap();
        for i in 0..4 {
            assert_close(h.map_point(src[i]).unwrap(), dst[i]);
        }
    }

    #[test]
    fn test_scale_is_affine() {
        let h = Homography::from_quad_to_quad(&rect(0.0, 0.0, 10.0, 10.0), &rect(0.0, 0.0, 20.0, 40.0))
            .unwrap();
        assert_close(h.map_point(Point::new(5.0, 5.0)).unwrap(), Point::new(10.0, 20.0));
        assert!((h.matrix()[(0, 0)] - 2.0).abs() < 1e-9);
        assert!(h.matrix()[(2, 0)].abs() < 1e-9);
        assert_eq!(h.matrix()[(2, 2)], 1.0);
    }

    #[test]
    fn test_invert_round_trip() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 10.0),
            Point::new(90.0, 120.0),
            Point::new(-5.0, 80.0),
        ];
        let h = Homography::from_quad_to_quad(&src, &rect(0.0, 0.0, 50.0, 50.0)).unwrap();
        let inv = h.invert().unwrap();
        let p = Point::new(33.0, 41.0);
        assert_close(inv.map_point(h.map_point(p).unwrap()).unwrap(), p);
    }

    #[test]
    fn test_degenerate_quad_rejected() {
        let collapsed = [Point::new(10.0, 10.0); 4];
        assert!(Homography::from_quad_to_quad(&collapsed, &rect(0.0, 0.0, 100.0, 100.0)).is_none());

        let collinear = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
        ];
        assert!(Homography::from_quad_to_quad(&collinear, &rect(0.0, 0.0, 100.0, 100.0)).is_none());
    }

    #[test]
    fn test_identity_inverse() {
        assert_eq!(Homography::identity().invert(), Some(Homography::identity()));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let flat = Homography {
            h: Matrix3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0),
        };
        assert!(flat.invert().is_none());
    }
}

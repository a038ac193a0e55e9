//! Measures of closed pixel polygons (moments, bounding box).

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Inclusive axis-aligned pixel box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Zeroth and first order spatial moments of a polygon.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    pub fn centroid(&self) -> Option<Point2<f32>> {
        if self.m00 == 0.0 {
            return None;
        }
        Some(Point2::new(
            (self.m10 / self.m00) as f32,
            (self.m01 / self.m00) as f32,
        ))
    }
}

fn edges(points: &[Point2<i32>]) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
    let n = points.len();
    (0..n).map(move |i| {
        let a = points[(i + n - 1) % n];
        let b = points[i];
        (
            Point2::new(a.x as f64, a.y as f64),
            Point2::new(b.x as f64, b.y as f64),
        )
    })
}

/// Green's theorem moments of the closed polygon, signed so that `m00 >= 0`.
pub fn polygon_moments(points: &[Point2<i32>]) -> Moments {
    if points.len() < 3 {
        return Moments::default();
    }

    let mut a00 = 0.0;
    let mut a10 = 0.0;
    let mut a01 = 0.0;
    for (a, b) in edges(points) {
        let dxy = a.x * b.y - b.x * a.y;
        a00 += dxy;
        a10 += dxy * (a.x + b.x);
        a01 += dxy * (a.y + b.y);
    }

    let sign = if a00 < 0.0 { -1.0 } else { 1.0 };
    Moments {
        m00: sign * a00 / 2.0,
        m10: sign * a10 / 6.0,
        m01: sign * a01 / 6.0,
    }
}

/// Inclusive bounding box; `None` for an empty slice.
pub fn bounding_rect(points: &[Point2<i32>]) -> Option<PixelRect> {
    let first = points.first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    Some(PixelRect {
        x: x0,
        y: y0,
        width: x1 - x0 + 1,
        height: y1 - y0 + 1,
    })
}

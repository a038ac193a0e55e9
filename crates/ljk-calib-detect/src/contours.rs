//! Contour extraction and per-contour shape measures.

use image::GrayImage;
use imageproc::contours::BorderType;
use imageproc::geometry::{approximate_polygon_dp, arc_length, contour_area};
use imageproc::point::Point;
use ljk_calib_core::{bounding_rect, polygon_moments, Moments, PixelRect};
use nalgebra::Point2;

/// Which borders of a binary image to keep.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Retrieval {
    /// Only outermost borders: nothing nested inside another shape.
    External,
    /// Every border, outer and hole, at any nesting depth.
    Tree,
}

/// One traced border with the measures the filters need.
#[derive(Clone, Debug)]
pub struct ContourShape {
    pub points: Vec<Point2<i32>>,
    pub area: f64,
    pub perimeter: f64,
    pub bbox: PixelRect,
    pub moments: Moments,
}

impl ContourShape {
    fn from_points(points: Vec<Point<i32>>) -> Option<Self> {
        let perimeter = arc_length(&points, true);
        let area = contour_area(&points);
        let points: Vec<Point2<i32>> = points.iter().map(|p| Point2::new(p.x, p.y)).collect();
        Some(Self {
            area,
            perimeter,
            bbox: bounding_rect(&points)?,
            moments: polygon_moments(&points),
            points,
        })
    }

    pub fn centroid(&self) -> Option<Point2<f32>> {
        self.moments.centroid()
    }

    /// Douglas-Peucker simplification of the closed border with
    /// `epsilon = eps_frac * perimeter`.
    ///
    /// The ring is split at two mutually distant points so the traversal
    /// start never survives as a spurious vertex.
    pub fn approx_vertices(&self, eps_frac: f64) -> Vec<Point2<i32>> {
        let n = self.points.len();
        let epsilon = eps_frac * self.perimeter;
        if n < 3 || epsilon <= 0.0 {
            return self.points.clone();
        }

        let a = farthest_from(&self.points, 0);
        let b = farthest_from(&self.points, a);
        let split = (b + n - a) % n;
        if split == 0 {
            return vec![self.points[a]];
        }

        // ring starting at `a` and closing back onto it
        let ring: Vec<Point<i32>> = (0..=n)
            .map(|k| {
                let p = self.points[(a + k) % n];
                Point::new(p.x, p.y)
            })
            .collect();

        let mut out = approximate_polygon_dp(&ring[..=split], epsilon, false);
        out.pop();
        let mut tail = approximate_polygon_dp(&ring[split..], epsilon, false);
        tail.pop();
        out.append(&mut tail);

        out.into_iter().map(|p| Point2::new(p.x, p.y)).collect()
    }
}

fn farthest_from(points: &[Point2<i32>], from: usize) -> usize {
    let o = points[from];
    let mut best = (from, 0i64);
    for (i, p) in points.iter().enumerate() {
        let dx = (p.x - o.x) as i64;
        let dy = (p.y - o.y) as i64;
        let d = dx * dx + dy * dy;
        if d > best.1 {
            best = (i, d);
        }
    }
    best.0
}

/// Trace the borders of every non-zero region in `binary`.
pub fn find_contours(binary: &GrayImage, mode: Retrieval) -> Vec<ContourShape> {
    imageproc::contours::find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| match mode {
            Retrieval::External => {
                matches!(c.border_type, BorderType::Outer) && c.parent.is_none()
            }
            Retrieval::Tree => true,
        })
        .filter_map(|c| ContourShape::from_points(c.points))
        .collect()
}

//! Answer bubbles on the rectified canvas.

use image::GrayImage;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::contours::{find_contours, Retrieval};
use crate::{adaptive_threshold_gaussian_inv, DetectError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Thresholding and size filters for bubble outlines, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleParams {
    pub block_size: u32,
    pub c: f32,
    /// Exclusive bounds on bounding-box width and height.
    pub min_side: i32,
    pub max_side: i32,
    /// Exclusive bounds on bounding-box width / height.
    pub aspect_min: f32,
    pub aspect_max: f32,
}

impl Default for BubbleParams {
    fn default() -> Self {
        Self {
            block_size: 15,
            c: 3.0,
            min_side: 25,
            max_side: 80,
            aspect_min: 0.8,
            aspect_max: 1.2,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BubbleScan {
    /// Contours (outer and hole) found before filtering.
    pub total_contours: usize,
    /// Bubble centroids. A ring yields both its outer and inner border, so
    /// one printed bubble may appear twice at nearly the same spot.
    pub centers: Vec<Point2<f32>>,
}

/// Detect bubble-sized round outlines on the rectified canvas.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(canvas, params),
        fields(width = canvas.width(), height = canvas.height())
    )
)]
pub fn detect_bubbles(
    canvas: &GrayImage,
    params: &BubbleParams,
) -> Result<BubbleScan, DetectError> {
    let binary = adaptive_threshold_gaussian_inv(canvas, params.block_size, params.c)?;
    let contours = find_contours(&binary, Retrieval::Tree);

    let in_range = |v: i32| params.min_side < v && v < params.max_side;
    let centers: Vec<Point2<f32>> = contours
        .iter()
        .filter(|c| {
            let aspect = c.bbox.aspect();
            in_range(c.bbox.width)
                && in_range(c.bbox.height)
                && params.aspect_min < aspect
                && aspect < params.aspect_max
        })
        .filter_map(|c| c.centroid())
        .collect();

    log::debug!(
        "bubble scan: {} contours, {} bubbles",
        contours.len(),
        centers.len()
    );

    Ok(BubbleScan {
        total_contours: contours.len(),
        centers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn draw_ring(img: &mut GrayImage, cx: f32, cy: f32, r_in: f32, r_out: f32) {
        let (w, h) = img.dimensions();
        for y in 0..h {
            for x in 0..w {
                let d = (x as f32 - cx).hypot(y as f32 - cy);
                if d >= r_in && d <= r_out {
                    img.put_pixel(x, y, Luma([0]));
                }
            }
        }
    }

    #[test]
    fn rings_of_bubble_size_are_detected() {
        let mut img = GrayImage::from_pixel(300, 200, Luma([255]));
        draw_ring(&mut img, 60.0, 100.0, 20.0, 25.0);
        draw_ring(&mut img, 160.0, 100.0, 20.0, 25.0);
        // too large
        draw_ring(&mut img, 250.0, 100.0, 40.0, 45.0);

        let scan = detect_bubbles(&img, &BubbleParams::default()).expect("scan");
        assert!(!scan.centers.is_empty());
        for c in &scan.centers {
            let on_small = [(60.0, 100.0), (160.0, 100.0)]
                .iter()
                .any(|&(x, y)| (c.x - x).abs() < 1.0 && (c.y - y).abs() < 1.0);
            assert!(on_small, "unexpected bubble at {c:?}");
        }
        assert!(scan.centers.iter().any(|c| c.x < 100.0));
        assert!(scan.centers.iter().any(|c| c.x > 100.0));
    }

    #[test]
    fn blank_canvas_has_no_bubbles() {
        let img = GrayImage::from_pixel(100, 100, Luma([255]));
        let scan = detect_bubbles(&img, &BubbleParams::default()).expect("scan");
        assert_eq!(scan.total_contours, 0);
        assert!(scan.centers.is_empty());
    }
}

//! Corner fiducial anchors in the photographed page.

use image::GrayImage;
use ljk_calib_core::bounding_rect;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::contours::{find_contours, Retrieval};
use crate::{adaptive_threshold_gaussian_inv, DetectError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Thresholding and shape filters for the square corner anchors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorParams {
    /// Adaptive threshold neighbourhood (odd, pixels).
    pub block_size: u32,
    /// Offset subtracted from the local mean.
    pub c: f32,
    /// Minimum contour area as a fraction of the whole image area.
    pub min_area_frac: f64,
    /// Polygon approximation tolerance as a fraction of the perimeter.
    pub approx_eps_frac: f64,
    /// Exclusive bounds on the approximated box width / height.
    pub aspect_min: f32,
    pub aspect_max: f32,
}

impl Default for AnchorParams {
    fn default() -> Self {
        Self {
            block_size: 11,
            c: 2.0,
            min_area_frac: 0.0005,
            approx_eps_frac: 0.04,
            aspect_min: 0.7,
            aspect_max: 1.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorCandidate {
    /// Contour centroid in image pixels.
    pub center: Point2<f32>,
    /// Contour area in square pixels.
    pub area: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnchorScan {
    /// External contours found before shape filtering.
    pub total_contours: usize,
    pub candidates: Vec<AnchorCandidate>,
}

/// Anchors in page order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderedAnchors {
    pub top_left: AnchorCandidate,
    pub top_right: AnchorCandidate,
    pub bottom_left: AnchorCandidate,
    pub bottom_right: AnchorCandidate,
}

impl OrderedAnchors {
    /// Centres as TL, TR, BL, BR.
    pub fn centers(&self) -> [Point2<f32>; 4] {
        [
            self.top_left.center,
            self.top_right.center,
            self.bottom_left.center,
            self.bottom_right.center,
        ]
    }
}

/// Find every square-ish blob large enough to be a corner anchor.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, params),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn scan_anchors(img: &GrayImage, params: &AnchorParams) -> Result<AnchorScan, DetectError> {
    let binary = adaptive_threshold_gaussian_inv(img, params.block_size, params.c)?;
    let contours = find_contours(&binary, Retrieval::External);

    let img_area = img.width() as f64 * img.height() as f64;
    let min_area = img_area * params.min_area_frac;

    let mut candidates = Vec::new();
    for cnt in &contours {
        if cnt.area <= min_area {
            continue;
        }

        let approx = cnt.approx_vertices(params.approx_eps_frac);
        if approx.len() != 4 {
            log::trace!("area {:.0}: {} vertices", cnt.area, approx.len());
            continue;
        }
        let Some(bbox) = bounding_rect(&approx) else {
            continue;
        };
        let aspect = bbox.aspect();
        if !(params.aspect_min < aspect && aspect < params.aspect_max) {
            continue;
        }

        if let Some(center) = cnt.centroid() {
            candidates.push(AnchorCandidate {
                center,
                area: cnt.area,
            });
        }
    }

    log::debug!(
        "anchor scan: {} contours, {} candidates",
        contours.len(),
        candidates.len()
    );

    Ok(AnchorScan {
        total_contours: contours.len(),
        candidates,
    })
}

/// Reduce the candidates to the four corner anchors.
///
/// Extra candidates are resolved in favour of the largest blobs, since the
/// corner markers are the biggest solid squares on the form.
pub fn select_corner_anchors(
    candidates: &[AnchorCandidate],
) -> Result<[AnchorCandidate; 4], DetectError> {
    if candidates.len() < 4 {
        return Err(DetectError::NotEnoughAnchors {
            found: candidates.len(),
        });
    }

    let mut by_area = candidates.to_vec();
    if by_area.len() > 4 {
        log::warn!(
            "{} anchor candidates, keeping the 4 largest",
            by_area.len()
        );
        by_area.sort_by(|a, b| b.area.total_cmp(&a.area));
    }
    Ok([by_area[0], by_area[1], by_area[2], by_area[3]])
}

/// Sort four anchors into TL, TR, BL, BR: the two smallest `y` form the top
/// row, each row is then ordered by `x`.
pub fn order_anchors(anchors: [AnchorCandidate; 4]) -> OrderedAnchors {
    let mut sorted = anchors;
    sorted.sort_by(|a, b| a.center.y.total_cmp(&b.center.y));
    let (top, bottom) = sorted.split_at_mut(2);
    top.sort_by(|a, b| a.center.x.total_cmp(&b.center.x));
    bottom.sort_by(|a, b| a.center.x.total_cmp(&b.center.x));

    OrderedAnchors {
        top_left: sorted[0],
        top_right: sorted[1],
        bottom_left: sorted[2],
        bottom_right: sorted[3],
    }
}

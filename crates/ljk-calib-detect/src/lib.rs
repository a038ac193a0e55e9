//! Fiducial anchor and answer bubble detection for LJK answer sheets.
//!
//! Both detectors share one recipe:
//! - inverted Gaussian adaptive threshold,
//! - contour extraction (external borders for anchors, every border for bubbles),
//! - shape filtering on area, polygon approximation and bounding-box aspect,
//! - contour centroid from polygon moments.
//!
//! Anchors are searched in the photograph; bubbles on the rectified canvas.

mod anchors;
mod bubbles;
mod contours;
mod error;
mod threshold;

pub use anchors::{
    order_anchors, scan_anchors, select_corner_anchors, AnchorCandidate, AnchorParams, AnchorScan,
    OrderedAnchors,
};
pub use bubbles::{detect_bubbles, BubbleParams, BubbleScan};
pub use contours::{find_contours, ContourShape, Retrieval};
pub use error::DetectError;
pub use threshold::adaptive_threshold_gaussian_inv;

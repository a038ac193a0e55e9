//! Perspective rectification of the photographed page onto the canvas.

use ljk_calib_core::{
    homography_from_4pt, warp_perspective_gray, GrayImage, GrayImageView, Homography,
};
use ljk_calib_detect::OrderedAnchors;

use crate::{CalibrateError, FormLayout};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Largest canvas `rectify_page` will allocate, in pixels.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 26;

/// Page warped onto a `scale` px/mm canvas.
pub struct RectifiedPage {
    pub canvas: GrayImage,
    /// Maps photograph pixels onto canvas pixels.
    pub canvas_from_image: Homography,
    pub scale: f32,
}

/// Warp the photograph so the detected anchors land on the layout's anchor
/// positions.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, anchors, layout),
        fields(width = img.width, height = img.height)
    )
)]
pub fn rectify_page(
    img: &GrayImageView<'_>,
    anchors: &OrderedAnchors,
    layout: &FormLayout,
    scale: f32,
) -> Result<RectifiedPage, CalibrateError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(CalibrateError::InvalidScale(scale));
    }
    let (w, h) = layout.canvas_size(scale);
    if w == 0 || h == 0 || w as u64 * h as u64 > MAX_CANVAS_PIXELS {
        log::warn!("canvas {w}x{h} at scale {scale} is outside the pixel budget");
        return Err(CalibrateError::InvalidScale(scale));
    }

    let image_pts = anchors.centers();
    let canvas_pts = layout.anchor_canvas_points(scale);

    let canvas_from_image =
        homography_from_4pt(&image_pts, &canvas_pts).ok_or(CalibrateError::DegenerateAnchors)?;
    let image_from_canvas =
        homography_from_4pt(&canvas_pts, &image_pts).ok_or(CalibrateError::DegenerateAnchors)?;

    log::debug!("rectifying onto {w}x{h} canvas");
    let canvas = warp_perspective_gray(img, image_from_canvas, w as usize, h as usize);

    Ok(RectifiedPage {
        canvas,
        canvas_from_image,
        scale,
    })
}

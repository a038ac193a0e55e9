//! End-to-end calibration: anchors, rectification, bubbles, fit.

use ljk_calib_core::GrayImageView;
use ljk_calib_detect::{
    detect_bubbles, order_anchors, scan_anchors, select_corner_anchors, AnchorScan, DetectError,
};

use crate::calibrate::fit_layout;
use crate::rectify::rectify_page;
use crate::{CalibrateError, CalibrationConfig, CalibrationReport};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Report plus the rectified canvas it was measured on.
pub struct CalibrationRun {
    pub report: CalibrationReport,
    pub canvas: image::GrayImage,
}

/// Convert an `image::GrayImage` into the lightweight core view type.
pub fn gray_view(img: &image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// First stage: threshold the photograph and collect anchor candidates.
pub fn find_anchor_candidates(
    img: &image::GrayImage,
    cfg: &CalibrationConfig,
) -> Result<AnchorScan, CalibrateError> {
    let scan = scan_anchors(img, &cfg.anchors)?;
    log::info!("Total contours: {}", scan.total_contours);
    log::info!("Found {} potential anchors.", scan.candidates.len());
    Ok(scan)
}

/// Run the whole calibration on a grayscale photograph of the form.
pub fn calibrate_image(
    img: &image::GrayImage,
    cfg: &CalibrationConfig,
) -> Result<CalibrationRun, CalibrateError> {
    let scan = find_anchor_candidates(img, cfg)?;
    calibrate_scanned(img, cfg, scan)
}

/// Everything after the anchor scan: corner selection, rectification, bubble
/// detection and the layout fit.
///
/// Callers that report stage counts run [`find_anchor_candidates`] first so
/// the counts are known even when a later stage aborts.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, cfg, scan),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn calibrate_scanned(
    img: &image::GrayImage,
    cfg: &CalibrationConfig,
    scan: AnchorScan,
) -> Result<CalibrationRun, CalibrateError> {
    let corners = select_corner_anchors(&scan.candidates)?;
    let anchors = order_anchors(corners);

    let page = rectify_page(&gray_view(img), &anchors, &cfg.layout, cfg.scale)?;
    let (cw, ch) = (page.canvas.width as u32, page.canvas.height as u32);
    let canvas = image::GrayImage::from_raw(cw, ch, page.canvas.data).ok_or(
        CalibrateError::CanvasMismatch {
            width: cw,
            height: ch,
        },
    )?;

    let bubbles = detect_bubbles(&canvas, &cfg.bubbles)?;
    log::info!("Detected {} bubble candidates.", bubbles.centers.len());
    if bubbles.centers.is_empty() {
        return Err(CalibrateError::NoBubbles);
    }

    let calibration = fit_layout(&bubbles.centers, &cfg.layout, cfg.scale)?;

    let report = CalibrationReport {
        image_width: img.width(),
        image_height: img.height(),
        total_contours: scan.total_contours,
        anchor_candidates: scan.candidates.len(),
        anchors,
        canvas_from_image: page.canvas_from_image.to_array(),
        canvas_width: cw,
        canvas_height: ch,
        scale: cfg.scale,
        bubbles: bubbles.centers,
        calibration,
    };

    Ok(CalibrationRun { report, canvas })
}

impl CalibrateError {
    /// One-line abort message for command-line output.
    pub fn abort_message(&self) -> String {
        match self {
            CalibrateError::ImageLoad { .. } => "Failed to load image".to_string(),
            CalibrateError::Detect(DetectError::NotEnoughAnchors { .. }) => {
                "Less than 4 anchors found. Aborting calibration.".to_string()
            }
            other => other.to_string(),
        }
    }
}

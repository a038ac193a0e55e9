use ljk_calib_detect::DetectError;

/// Errors produced by the calibration pipeline.
#[derive(thiserror::Error, Debug)]
pub enum CalibrateError {
    #[error("Failed to load image: {path}")]
    ImageLoad {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error("anchors are degenerate, no perspective transform exists")]
    DegenerateAnchors,

    #[error("No bubbles detected. Check thresholds.")]
    NoBubbles,

    #[error("layout has {columns} columns x {rows} rows, calibration needs at least 3 x 15")]
    LayoutTooSmall { columns: u32, rows: u32 },

    #[error("invalid canvas scale {0} (must be positive and keep the canvas within budget)")]
    InvalidScale(f32),

    #[error("rectified canvas buffer does not match {width}x{height}")]
    CanvasMismatch { width: u32, height: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to write image: {0}")]
    ImageWrite(#[source] image::ImageError),
}

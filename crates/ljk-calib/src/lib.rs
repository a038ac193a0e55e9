//! Geometry calibration for photographed LJK answer sheets.
//!
//! Given a photo of a printed bubble-sheet form this crate:
//! - finds the four square corner anchors,
//! - rectifies the page onto a canvas of known pixels per millimetre,
//! - detects the answer bubbles on that canvas,
//! - compares three reference bubbles with the theoretical grid and derives
//!   corrected column pitch, row pitch and offsets.
//!
//! ## Quickstart
//!
//! ```no_run
//! use ljk_calib::{calibrate_image, load_gray, CalibrationConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = load_gray("ljk_template.jpg")?;
//! let run = calibrate_image(&img, &CalibrationConfig::default())?;
//! let cal = &run.report.calibration;
//! println!("column pitch: {:.3} mm", cal.calibrated.col_width);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `ljk_calib::core`: image views, homographies, polygon measures.
//! - `ljk_calib::detect`: adaptive threshold, contours, anchors, bubbles.
//! - [`FormLayout`]: printed geometry of the form, JSON-configurable.
//! - [`calibrate_image`]: the end-to-end run.

pub use ljk_calib_core as core;
pub use ljk_calib_detect as detect;

pub mod calibrate;
mod error;
mod io;
mod layout;
mod pipeline;
pub mod rectify;

pub use calibrate::{
    fit_layout, measure_reference, nearest_bubble, CalibratedParams, Calibration, ReferencePoint,
};
pub use error::CalibrateError;
pub use io::{load_gray, save_canvas, CalibrationConfig, CalibrationReport};
pub use layout::{FormLayout, PagePoint};
pub use pipeline::{
    calibrate_image, calibrate_scanned, find_anchor_candidates, gray_view, CalibrationRun,
};
pub use rectify::{rectify_page, RectifiedPage, MAX_CANVAS_PIXELS};

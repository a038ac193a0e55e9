//! Fit grid spacing and offsets from observed bubble positions.
//!
//! Three option-A bubbles anchor the fit: Q1 (first column, first row),
//! Q31 (third column, first row) and Q15 (first column, fifteenth row).
//! Q1 fixes the offsets, the Q1-Q31 span the column pitch and the Q1-Q15
//! span the row pitch.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{CalibrateError, FormLayout};

const Q31_COLUMN: u32 = 2;
const Q15_ROW: u32 = 14;

/// Theoretical vs observed position of one reference bubble, canvas pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub name: String,
    pub theoretical: Point2<f32>,
    pub observed: Point2<f32>,
    pub delta: Point2<f32>,
}

/// The four grid parameters the calibration adjusts, millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibratedParams {
    pub col_width: f32,
    pub row_height: f32,
    pub first_bubble_offset_mm: f32,
    pub vertical_align_offset: f32,
}

impl CalibratedParams {
    pub fn from_layout(layout: &FormLayout) -> Self {
        Self {
            col_width: layout.col_width,
            row_height: layout.row_height,
            first_bubble_offset_mm: layout.first_bubble_offset_mm,
            vertical_align_offset: layout.vertical_align_offset,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub q1: ReferencePoint,
    pub q31: ReferencePoint,
    pub q15: ReferencePoint,
    pub previous: CalibratedParams,
    pub calibrated: CalibratedParams,
}

/// Closest bubble to `target`; the first one wins on ties.
pub fn nearest_bubble(bubbles: &[Point2<f32>], target: Point2<f32>) -> Option<Point2<f32>> {
    let mut best: Option<(Point2<f32>, f32)> = None;
    for &b in bubbles {
        let d = nalgebra::distance_squared(&b, &target);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((b, d));
        }
    }
    best.map(|(b, _)| b)
}

/// Match a theoretical bubble position against the detections.
pub fn measure_reference(
    bubbles: &[Point2<f32>],
    name: &str,
    target: Point2<f32>,
) -> Option<ReferencePoint> {
    let observed = nearest_bubble(bubbles, target)?;
    let delta = Point2::new(observed.x - target.x, observed.y - target.y);
    log::info!(
        "{name} -> Theo:({:.1},{:.1}) Obs:({:.1},{:.1}) Delta:({:.1},{:.1})",
        target.x,
        target.y,
        observed.x,
        observed.y,
        delta.x,
        delta.y
    );
    Some(ReferencePoint {
        name: name.to_string(),
        theoretical: target,
        observed,
        delta,
    })
}

/// Derive corrected grid parameters from bubbles detected on a
/// `scale` px/mm canvas.
pub fn fit_layout(
    bubbles: &[Point2<f32>],
    layout: &FormLayout,
    scale: f32,
) -> Result<Calibration, CalibrateError> {
    if layout.columns <= Q31_COLUMN || layout.rows_per_column <= Q15_ROW {
        return Err(CalibrateError::LayoutTooSmall {
            columns: layout.columns,
            rows: layout.rows_per_column,
        });
    }
    if !(scale.is_finite() && scale > 0.0) {
        return Err(CalibrateError::InvalidScale(scale));
    }
    if bubbles.is_empty() {
        return Err(CalibrateError::NoBubbles);
    }

    let measure = |name: &str, column: u32, row: u32| {
        measure_reference(bubbles, name, layout.bubble_center_px(column, row, 0, scale))
            .ok_or(CalibrateError::NoBubbles)
    };
    let q1 = measure("Q1-A", 0, 0)?;
    let q31 = measure("Q31-A", Q31_COLUMN, 0)?;
    let q15 = measure("Q15-A", 0, Q15_ROW)?;

    let previous = CalibratedParams::from_layout(layout);
    let calibrated = CalibratedParams {
        col_width: ((q31.observed.x - q1.observed.x) / Q31_COLUMN as f32) / scale,
        row_height: ((q15.observed.y - q1.observed.y) / Q15_ROW as f32) / scale,
        first_bubble_offset_mm: previous.first_bubble_offset_mm + q1.delta.x / scale,
        vertical_align_offset: previous.vertical_align_offset + q1.delta.y / scale,
    };

    Ok(Calibration {
        q1,
        q31,
        q15,
        previous,
        calibrated,
    })
}

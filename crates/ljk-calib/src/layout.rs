//! Printed geometry of the LJK form, in millimetres.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::calibrate::CalibratedParams;
use crate::CalibrateError;

/// A point on the printed page, millimetres from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PagePoint {
    pub x: f32,
    pub y: f32,
}

impl PagePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Theoretical layout of the answer grid.
///
/// The grid is `columns` answer columns side by side, each holding
/// `rows_per_column` questions with `options` bubbles (A, B, ...) per row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormLayout {
    pub width_mm: f32,
    pub height_mm: f32,
    /// Anchor centres as TL, TR, BL, BR.
    pub anchors: [PagePoint; 4],
    /// Left edge of the first answer column.
    pub col_start_x: f32,
    /// Top of the first answer row.
    pub bubble_start_y: f32,
    /// Horizontal pitch between answer columns.
    pub col_width: f32,
    /// Vertical pitch between answer rows.
    pub row_height: f32,
    /// Horizontal pitch between options of one question.
    pub bubble_gap_mm: f32,
    /// Offset of option A from the column's left edge.
    pub first_bubble_offset_mm: f32,
    /// Offset of the bubble centre below the row top.
    pub vertical_align_offset: f32,
    pub columns: u32,
    pub rows_per_column: u32,
    pub options: u32,
}

impl Default for FormLayout {
    fn default() -> Self {
        let width_mm = 210.0;
        Self {
            width_mm,
            height_mm: 297.0,
            anchors: [
                PagePoint::new(22.5, 22.5),
                PagePoint::new(187.5, 22.5),
                PagePoint::new(22.5, 274.5),
                PagePoint::new(187.5, 274.5),
            ],
            col_start_x: 20.0,
            bubble_start_y: 110.0,
            col_width: (width_mm - 40.0) / 3.0,
            row_height: 9.0,
            bubble_gap_mm: 8.0,
            first_bubble_offset_mm: 25.0,
            vertical_align_offset: 3.0,
            columns: 3,
            rows_per_column: 15,
            options: 5,
        }
    }
}

impl FormLayout {
    /// Canvas size in pixels at `scale` pixels per millimetre (truncated).
    pub fn canvas_size(&self, scale: f32) -> (u32, u32) {
        (
            (self.width_mm * scale) as u32,
            (self.height_mm * scale) as u32,
        )
    }

    /// Anchor centres on the canvas, TL, TR, BL, BR.
    pub fn anchor_canvas_points(&self, scale: f32) -> [Point2<f32>; 4] {
        self.anchors.map(|p| Point2::new(p.x * scale, p.y * scale))
    }

    /// Theoretical bubble centre in millimetres.
    pub fn bubble_center_mm(&self, column: u32, row: u32, option: u32) -> Point2<f32> {
        Point2::new(
            self.col_start_x
                + column as f32 * self.col_width
                + self.first_bubble_offset_mm
                + option as f32 * self.bubble_gap_mm,
            self.bubble_start_y + row as f32 * self.row_height + self.vertical_align_offset,
        )
    }

    /// Theoretical bubble centre on the canvas.
    pub fn bubble_center_px(&self, column: u32, row: u32, option: u32, scale: f32) -> Point2<f32> {
        let mm = self.bubble_center_mm(column, row, option);
        Point2::new(mm.x * scale, mm.y * scale)
    }

    /// Column and row of a zero-based question index (questions run down
    /// each column first).
    pub fn question_cell(&self, question_index: u32) -> (u32, u32) {
        let rows = self.rows_per_column.max(1);
        (question_index / rows, question_index % rows)
    }

    pub fn question_count(&self) -> u32 {
        self.columns * self.rows_per_column
    }

    /// Copy of this layout with fitted grid parameters.
    pub fn with_calibration(&self, params: &CalibratedParams) -> Self {
        Self {
            col_width: params.col_width,
            row_height: params.row_height,
            first_bubble_offset_mm: params.first_bubble_offset_mm,
            vertical_align_offset: params.vertical_align_offset,
            ..self.clone()
        }
    }

    /// Load a JSON layout from disk; missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CalibrateError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this layout to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CalibrateError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

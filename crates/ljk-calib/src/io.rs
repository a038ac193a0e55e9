//! Image loading, JSON configuration and report helpers.

use ljk_calib_detect::{AnchorParams, BubbleParams, OrderedAnchors};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::{CalibrateError, Calibration, FormLayout};

fn default_scale() -> f32 {
    10.0
}

/// Everything the pipeline needs besides the photograph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default)]
    pub layout: FormLayout,
    /// Canvas pixels per millimetre.
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub anchors: AnchorParams,
    #[serde(default)]
    pub bubbles: BubbleParams,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            layout: FormLayout::default(),
            scale: default_scale(),
            anchors: AnchorParams::default(),
            bubbles: BubbleParams::default(),
        }
    }
}

impl CalibrationConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CalibrateError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CalibrateError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Outcome of one calibration run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub image_width: u32,
    pub image_height: u32,
    /// External contours seen by the anchor scan.
    pub total_contours: usize,
    pub anchor_candidates: usize,
    pub anchors: OrderedAnchors,
    /// Row-major photograph-to-canvas perspective transform.
    pub canvas_from_image: [[f64; 3]; 3],
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub scale: f32,
    pub bubbles: Vec<Point2<f32>>,
    pub calibration: Calibration,
}

impl CalibrationReport {
    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CalibrateError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CalibrateError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Decode an image file into 8-bit luma.
pub fn load_gray(path: impl AsRef<Path>) -> Result<image::GrayImage, CalibrateError> {
    let path = path.as_ref();
    let to_err = |source| CalibrateError::ImageLoad {
        path: path.display().to_string(),
        source,
    };
    let img = image::ImageReader::open(path)
        .map_err(|e| to_err(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| to_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(to_err)?;
    Ok(img.to_luma8())
}

/// Write a rectified canvas; the format follows the file extension.
pub fn save_canvas(
    canvas: &image::GrayImage,
    path: impl AsRef<Path>,
) -> Result<(), CalibrateError> {
    canvas.save(path).map_err(CalibrateError::ImageWrite)
}

//! Core types and utilities for LJK answer-sheet calibration.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any image decoding or thresholding backend.

mod homography;
mod image;
mod logger;
mod shape;

pub use homography::{homography_from_4pt, warp_perspective_gray, Homography};
pub use image::{sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView};
pub use shape::{bounding_rect, polygon_moments, Moments, PixelRect};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

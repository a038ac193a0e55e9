//! Inverted Gaussian adaptive threshold.

use crate::DetectError;
use image::{GrayImage, ImageBuffer, Luma};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Gaussian sigma for a `block_size` x `block_size` neighbourhood.
fn block_sigma(block_size: u32) -> f32 {
    0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalised 1-D Gaussian weights spanning exactly `block_size` taps.
fn block_kernel(block_size: u32) -> Vec<f32> {
    let sigma = block_sigma(block_size) as f64;
    let half = (block_size as f64 - 1.0) * 0.5;
    let weights: Vec<f64> = (0..block_size)
        .map(|i| {
            let d = i as f64 - half;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Mark dark ink against its neighbourhood.
///
/// A pixel is set to 255 when it is at least `floor(c)` below the
/// Gaussian-weighted mean of its `block_size` x `block_size` neighbourhood
/// (edges replicated), otherwise 0. Uniform regions, dark or bright, come out
/// empty.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(img), fields(width = img.width(), height = img.height()))
)]
pub fn adaptive_threshold_gaussian_inv(
    img: &GrayImage,
    block_size: u32,
    c: f32,
) -> Result<GrayImage, DetectError> {
    if block_size < 3 || block_size % 2 == 0 {
        return Err(DetectError::InvalidBlockSize { block_size });
    }

    let (w, h) = img.dimensions();
    let f: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(w, h, |x, y| Luma([img.get_pixel(x, y)[0] as f32]));
    let mean = imageproc::filter::separable_filter_equal(&f, &block_kernel(block_size));
    let delta = c.floor();

    Ok(GrayImage::from_fn(w, h, |x, y| {
        let src = img.get_pixel(x, y)[0] as f32;
        let local = mean.get_pixel(x, y)[0].round();
        if src <= local - delta {
            Luma([255])
        } else {
            Luma([0])
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_on_white(size: u32, x0: u32, x1: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (x0..x1).contains(&x) && (x0..x1).contains(&y) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn sigma_follows_block_size() {
        assert!((block_sigma(11) - 2.0).abs() < 1e-6);
        assert!((block_sigma(15) - 2.6).abs() < 1e-6);
    }

    #[test]
    fn uniform_image_is_empty() {
        let img = GrayImage::from_pixel(32, 32, Luma([180]));
        let bin = adaptive_threshold_gaussian_inv(&img, 11, 2.0).expect("threshold");
        assert!(bin.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn filled_square_becomes_an_outline() {
        let img = square_on_white(80, 20, 60);
        let bin = adaptive_threshold_gaussian_inv(&img, 11, 2.0).expect("threshold");

        // ink just inside the edge is marked
        assert_eq!(bin.get_pixel(20, 40)[0], 255);
        assert_eq!(bin.get_pixel(40, 21)[0], 255);
        // far inside and outside the square stay empty
        assert_eq!(bin.get_pixel(40, 40)[0], 0);
        assert_eq!(bin.get_pixel(5, 5)[0], 0);
        assert_eq!(bin.get_pixel(19, 40)[0], 0);
    }

    #[test]
    fn kernel_spans_the_whole_block() {
        let k = block_kernel(11);
        assert_eq!(k.len(), 11);
        assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(k[0] > 0.0 && (k[0] - k[10]).abs() < 1e-7);
    }

    #[test]
    fn block_edge_pixels_shift_the_mean() {
        // flat 100 with brighter paper starting 5 px (block_size / 2) to the right
        let img = GrayImage::from_fn(60, 20, |x, _| Luma([if x < 35 { 100 } else { 255 }]));
        let bin = adaptive_threshold_gaussian_inv(&img, 11, 1.0).expect("threshold");
        assert_eq!(bin.get_pixel(30, 10)[0], 255);
        // one pixel further away the edge leaves the window
        assert_eq!(bin.get_pixel(29, 10)[0], 0);
    }

    #[test]
    fn fractional_offset_is_floored() {
        let img = GrayImage::from_fn(60, 20, |x, _| Luma([if x < 35 { 100 } else { 255 }]));
        let whole = adaptive_threshold_gaussian_inv(&img, 11, 1.0).expect("threshold");
        let frac = adaptive_threshold_gaussian_inv(&img, 11, 1.9).expect("threshold");
        assert_eq!(whole, frac);
    }

    #[test]
    fn even_or_tiny_blocks_are_rejected() {
        let img = GrayImage::new(4, 4);
        assert_eq!(
            adaptive_threshold_gaussian_inv(&img, 10, 2.0),
            Err(DetectError::InvalidBlockSize { block_size: 10 })
        );
        assert!(adaptive_threshold_gaussian_inv(&img, 1, 2.0).is_err());
    }
}

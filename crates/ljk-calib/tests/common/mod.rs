//! Synthetic photographs of a printed LJK form.
#![allow(dead_code)]

use image::{GrayImage, Luma};
use ljk_calib::FormLayout;
use nalgebra::{Matrix3, Vector3};

pub const PHOTO_W: u32 = 1200;
pub const PHOTO_H: u32 = 1600;

/// Geometry actually printed on the synthetic sheet; differs from the
/// default layout the calibration starts from.
pub fn printed_layout() -> FormLayout {
    FormLayout {
        col_width: 57.0,
        row_height: 9.1,
        first_bubble_offset_mm: 25.8,
        vertical_align_offset: 3.5,
        ..FormLayout::default()
    }
}

/// Page millimetres to photo pixels: about 5 px/mm with a mild tilt.
fn image_from_page() -> Matrix3<f64> {
    Matrix3::new(
        5.0, 0.05, 60.0, //
        -0.04, 5.0, 50.0, //
        0.00002, 0.00001, 1.0,
    )
}

pub struct Mark {
    /// Centre on the page, millimetres.
    pub x: f64,
    pub y: f64,
    /// Side length, millimetres.
    pub side: f64,
}

const ANCHOR_SIDE_MM: f64 = 10.0;
const RING_INNER_MM: f64 = 2.0;
const RING_OUTER_MM: f64 = 2.5;

fn in_square(px: f64, py: f64, m: &Mark) -> bool {
    let h = m.side * 0.5;
    (px - m.x).abs() <= h && (py - m.y).abs() <= h
}

/// True when page point `(px, py)` lies on the ring of the nearest bubble.
fn on_bubble_ring(layout: &FormLayout, px: f64, py: f64) -> bool {
    let x0 = (layout.col_start_x + layout.first_bubble_offset_mm) as f64;
    let y0 = (layout.bubble_start_y + layout.vertical_align_offset) as f64;
    let col_w = layout.col_width as f64;
    let row_h = layout.row_height as f64;
    let gap = layout.bubble_gap_mm as f64;

    let row = ((py - y0) / row_h).round().clamp(0.0, (layout.rows_per_column - 1) as f64);
    let col = ((px - x0 + gap * 0.5) / col_w)
        .floor()
        .clamp(0.0, (layout.columns - 1) as f64);
    let opt = ((px - x0 - col * col_w) / gap)
        .round()
        .clamp(0.0, (layout.options - 1) as f64);

    let cx = x0 + col * col_w + opt * gap;
    let cy = y0 + row * row_h;
    let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
    (RING_INNER_MM..=RING_OUTER_MM).contains(&d)
}

/// Render the form photographed through a fixed perspective. `extra` adds
/// solid black squares on top of the printed content.
pub fn render_form(layout: &FormLayout, extra: &[Mark]) -> GrayImage {
    render(layout, extra, true)
}

/// Corner anchors only, no answer grid printed.
pub fn render_anchors_only() -> GrayImage {
    render(&printed_layout(), &[], false)
}

fn render(layout: &FormLayout, extra: &[Mark], rings: bool) -> GrayImage {
    let page_from_image = image_from_page()
        .try_inverse()
        .expect("invertible page transform");

    let anchors: Vec<Mark> = layout
        .anchors
        .iter()
        .map(|a| Mark {
            x: a.x as f64,
            y: a.y as f64,
            side: ANCHOR_SIDE_MM,
        })
        .collect();

    GrayImage::from_fn(PHOTO_W, PHOTO_H, |x, y| {
        let p = page_from_image * Vector3::new(x as f64, y as f64, 1.0);
        let (px, py) = (p.x / p.z, p.y / p.z);

        let dark = anchors.iter().chain(extra).any(|m| in_square(px, py, m))
            || (rings && on_bubble_ring(layout, px, py));
        Luma([if dark { 20 } else { 235 }])
    })
}

/// The default synthetic photograph.
pub fn render_default_form() -> GrayImage {
    render_form(&printed_layout(), &[])
}

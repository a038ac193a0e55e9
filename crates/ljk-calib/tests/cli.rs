mod common;

use assert_cmd::Command;
use ljk_calib::{CalibrationReport, FormLayout};
use predicates::prelude::*;

fn ljk_calib() -> Command {
    Command::cargo_bin("ljk-calib").expect("binary built")
}

#[test]
fn missing_image_aborts_with_status_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    ljk_calib()
        .arg(dir.path().join("nope.jpg"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed to load image"));
}

#[test]
fn blank_page_reports_missing_anchors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("blank.png");
    image::GrayImage::from_pixel(300, 400, image::Luma([240]))
        .save(&path)
        .expect("save");

    ljk_calib()
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Total contours: 0"))
        .stdout(predicate::str::contains(
            "Less than 4 anchors found. Aborting calibration.",
        ));
}

#[test]
fn synthetic_form_prints_results_and_writes_outputs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = dir.path().join("form.png");
    common::render_default_form().save(&photo).expect("save photo");

    let report = dir.path().join("out").join("report.json");
    let rectified = dir.path().join("rectified.png");
    let layout = dir.path().join("layout.json");

    ljk_calib()
        .arg(&photo)
        .arg("--report")
        .arg(&report)
        .arg("--rectified")
        .arg(&rectified)
        .arg("--write-layout")
        .arg(&layout)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 4 potential anchors."))
        .stdout(predicate::str::contains("Q1-A -> Theo:(450.0,1130.0)"))
        .stdout(predicate::str::contains("\n--- RESULTS ---\n"))
        .stdout(predicate::str::contains("Old ColWidth: 56.667 -> New: "))
        .stdout(predicate::str::contains("Old RowHeight: 9.000 -> New: "))
        .stdout(predicate::str::contains("Old VerticalAlignOffset: 3.000 -> New: "));

    let report = CalibrationReport::load_json(&report).expect("report");
    assert!((report.calibration.calibrated.row_height - 9.1).abs() < 0.1);

    let saved = image::open(&rectified).expect("rectified canvas").to_luma8();
    assert_eq!(saved.dimensions(), (2100, 2970));

    let fitted = FormLayout::load_json(&layout).expect("layout");
    assert!((fitted.col_width - 57.0).abs() < 0.1);
    assert_eq!(fitted.anchors, FormLayout::default().anchors);
}

#[test]
fn sheet_without_grid_reports_no_bubbles() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = dir.path().join("anchors.png");
    common::render_anchors_only().save(&photo).expect("save photo");

    ljk_calib()
        .arg(&photo)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Found 4 potential anchors."))
        .stdout(predicate::str::contains("Detected 0 bubble candidates."))
        .stdout(predicate::str::contains("No bubbles detected. Check thresholds."))
        .stdout(predicate::str::contains("--- RESULTS ---").not());
}

#[test]
fn oversized_scale_aborts_after_printing_anchor_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = dir.path().join("anchors.png");
    common::render_anchors_only().save(&photo).expect("save photo");

    ljk_calib()
        .arg(&photo)
        .args(["--scale", "1000"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Total contours: "))
        .stdout(predicate::str::contains("Found 4 potential anchors."))
        .stdout(predicate::str::contains("invalid canvas scale 1000"));
}

#[test]
fn config_block_size_is_validated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = dir.path().join("blank.png");
    image::GrayImage::from_pixel(100, 100, image::Luma([240]))
        .save(&photo)
        .expect("save");
    let config = dir.path().join("cfg.json");
    std::fs::write(&config, r#"{ "anchors": { "block_size": 10 } }"#).expect("write config");

    ljk_calib()
        .arg(&photo)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("block size must be odd"))
        .stdout(predicate::str::contains("got 10"));
}

#[test]
fn scale_flag_overrides_the_config_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = dir.path().join("form.png");
    common::render_default_form().save(&photo).expect("save photo");
    let config = dir.path().join("cfg.json");
    std::fs::write(&config, r#"{ "scale": 1000.0, "layout": { "row_height": 9.05 } }"#)
        .expect("write config");
    let report = dir.path().join("report.json");

    // the config scale alone is out of budget
    ljk_calib()
        .arg(&photo)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("invalid canvas scale 1000"));

    ljk_calib()
        .arg(&photo)
        .arg("--config")
        .arg(&config)
        .args(["--scale", "10"])
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Old RowHeight: 9.050 -> New: "));

    let report = CalibrationReport::load_json(&report).expect("report");
    assert_eq!(report.scale, 10.0);
    assert_eq!((report.canvas_width, report.canvas_height), (2100, 2970));
}

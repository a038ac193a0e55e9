//! ljk-calib: fit the answer-grid geometry of an LJK form from a photograph.

use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;

use ljk_calib::{
    calibrate_scanned, find_anchor_candidates, load_gray, save_canvas, CalibrateError,
    CalibrationConfig, CalibrationRun, ReferencePoint,
};

#[derive(Parser, Debug)]
#[command(name = "ljk-calib")]
#[command(about = "Calibrate LJK answer-sheet bubble geometry from a photograph")]
#[command(version)]
struct Cli {
    /// Photograph of a printed form.
    #[arg(default_value = "ljk_template.jpg")]
    image: PathBuf,

    /// JSON config with layout and detector parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas pixels per millimetre (overrides the config).
    #[arg(long)]
    scale: Option<f32>,

    /// Write the full calibration report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Save the rectified canvas image.
    #[arg(long)]
    rectified: Option<PathBuf>,

    /// Write the layout with the fitted parameters applied, as JSON.
    #[arg(long)]
    write_layout: Option<PathBuf>,

    /// Stderr log level (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "warn", value_parser = parse_level)]
    log_level: LevelFilter,

    /// Emit structured JSON logs through `tracing`.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    json_log: bool,
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse().map_err(|_| format!("unknown log level `{s}`"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("calibration failed: {err:?}");
            println!("{}", err.abort_message());
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) {
    if cli.json_log {
        ljk_calib::core::init_tracing(true);
    } else {
        let _ = ljk_calib::core::init_with_level(cli.log_level);
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) {
    let _ = ljk_calib::core::init_with_level(cli.log_level);
}

fn run(cli: &Cli) -> Result<(), CalibrateError> {
    let mut cfg = match &cli.config {
        Some(path) => CalibrationConfig::load_json(path)?,
        None => CalibrationConfig::default(),
    };
    if let Some(scale) = cli.scale {
        cfg.scale = scale;
    }

    let img = load_gray(&cli.image)?;

    let scan = find_anchor_candidates(&img, &cfg)?;
    println!("Total contours: {}", scan.total_contours);
    println!("Found {} potential anchors.", scan.candidates.len());

    let run = match calibrate_scanned(&img, &cfg, scan) {
        Ok(run) => run,
        Err(CalibrateError::NoBubbles) => {
            println!("Detected 0 bubble candidates.");
            return Err(CalibrateError::NoBubbles);
        }
        Err(err) => return Err(err),
    };
    print_results(&run);

    if let Some(path) = &cli.report {
        run.report.write_json(path)?;
    }
    if let Some(path) = &cli.rectified {
        save_canvas(&run.canvas, path)?;
    }
    if let Some(path) = &cli.write_layout {
        cfg.layout
            .with_calibration(&run.report.calibration.calibrated)
            .write_json(path)?;
    }
    Ok(())
}

fn print_reference(r: &ReferencePoint) {
    println!(
        "{} -> Theo:({:.1},{:.1}) Obs:({:.1},{:.1}) Delta:({:.1},{:.1})",
        r.name, r.theoretical.x, r.theoretical.y, r.observed.x, r.observed.y, r.delta.x, r.delta.y
    );
}

fn print_results(run: &CalibrationRun) {
    let report = &run.report;
    println!("Detected {} bubble candidates.", report.bubbles.len());

    let cal = &report.calibration;
    for r in [&cal.q1, &cal.q31, &cal.q15] {
        print_reference(r);
    }

    let (old, new) = (&cal.previous, &cal.calibrated);
    println!();
    println!("--- RESULTS ---");
    println!("Old ColWidth: {:.3} -> New: {:.3}", old.col_width, new.col_width);
    println!("Old RowHeight: {:.3} -> New: {:.3}", old.row_height, new.row_height);
    println!(
        "Old FirstBubbleOffset: {:.3} -> New: {:.3}",
        old.first_bubble_offset_mm, new.first_bubble_offset_mm
    );
    println!(
        "Old VerticalAlignOffset: {:.3} -> New: {:.3}",
        old.vertical_align_offset, new.vertical_align_offset
    );
}

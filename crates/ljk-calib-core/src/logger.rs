//! Stderr logger for the calibration tools.
//!
//! Records are printed as `[elapsed LEVEL stage] message`, where `stage` is the
//! last segment of the record's module path (`anchors`, `rectify`, ...).
//! Stdout stays reserved for calibration results. Records from crates outside
//! this workspace are capped at `warn` unless the level is `trace`.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const OWN_PREFIX: &str = "ljk_calib";

struct StageLogger {
    level: LevelFilter,
    started: Instant,
}

fn stage_of(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn passes(level: LevelFilter, record_level: Level, target: &str) -> bool {
    if record_level > level {
        return false;
    }
    target.starts_with(OWN_PREFIX) || level == LevelFilter::Trace || record_level <= Level::Warn
}

fn format_line(
    elapsed: f64,
    level: Level,
    target: &str,
    msg: &std::fmt::Arguments<'_>,
) -> String {
    format!("[{elapsed:7.3}s {level:>5} {}] {msg}", stage_of(target))
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        passes(self.level, metadata.level(), metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Only the first call installs; later calls keep the original level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StageLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber on stderr filtered by `RUST_LOG`
/// (default `warn,ljk_calib=info`), optionally as flattened JSON events.
///
/// `log` records are bridged into the subscriber, so library diagnostics
/// show up either way.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{OWN_PREFIX}=info")));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder.with_target(false).finish().try_init()
    };
}

//! Diagnostics sink for the analysis pipeline.
//!
//! Per-frame stage counts, dropped tiles and unreadable crops are reported
//! through the `log` facade. Hosts that bring their own logger never touch
//! this module; the `jersey-track` CLI installs the stderr sink below, which
//! stamps each line with seconds since startup so frame latency is readable
//! straight from the output:
//!
//! ```text
//! [   1.204s DEBUG jersey_track::analyzer] frame 640x480: 3 candidates, 2 read, 2 tracked
//! ```

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Names the level for [`init_from_env`] and, with the `tracing` feature,
/// the fallback filter of `init_tracing`.
pub const LOG_ENV_VAR: &str = "JERSEY_TRACK_LOG";

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:8.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Route pipeline diagnostics to stderr at `level`.
///
/// The first call wins; later calls keep the original level and return `Ok`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Like [`init_with_level`], with the level taken from `JERSEY_TRACK_LOG`
/// (`error` through `trace`, or `off`). An unset or unrecognized value keeps
/// `default`.
pub fn init_from_env(default: LevelFilter) -> Result<(), log::SetLoggerError> {
    let level = parse_level(std::env::var(LOG_ENV_VAR).ok().as_deref(), default);
    init_with_level(level)
}

fn parse_level(value: Option<&str>, default: LevelFilter) -> LevelFilter {
    value
        .and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or(default)
}

/// Span-aware output for profiling runs: one close event per analyzed frame
/// and per tracker update, with their busy/idle times.
///
/// `RUST_LOG` takes precedence; otherwise `JERSEY_TRACK_LOG` or `info`
/// selects the level. `json` switches to flattened JSON lines for log
/// collectors.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = parse_level(std::env::var(LOG_ENV_VAR).ok().as_deref(), LevelFilter::Info);
        EnvFilter::new(level.to_string().to_lowercase())
    });
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_level_falls_back_on_garbage() {
        assert_eq!(parse_level(Some(" debug "), LevelFilter::Info), LevelFilter::Debug);
        assert_eq!(parse_level(Some("OFF"), LevelFilter::Info), LevelFilter::Off);
        assert_eq!(parse_level(Some("verbose"), LevelFilter::Warn), LevelFilter::Warn);
        assert_eq!(parse_level(None, LevelFilter::Error), LevelFilter::Error);
    }
}

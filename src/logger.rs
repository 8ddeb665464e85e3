//! Debug logging for the CLI and the proxy server
//!
//! `log` records from the pipeline and `tracing` spans from the HTTP layer
//! both end up in the same optional log file.

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::{LazyLock, OnceLock};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::filter_fn,
    fmt::{self, MakeWriter, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Environment variable that turns on verbose (HTTP-level) logging
pub const VERBOSE_ENV: &str = "RELEASE_SCRIBE_VERBOSE";

const CRATE_TARGET: &str = "release_scribe";
const DEFAULT_TRACE_FILTER: &str = "release_scribe=debug,tower_http=debug,warn";
const NOISY_TARGETS: &[&str] = &["reqwest", "hyper", "h2", "rustls", "want", "mio"];

#[derive(Default)]
struct LogState {
    enabled: bool,
    verbose: bool,
    to_stdout: bool,
    to_stderr: bool,
    file: Option<File>,
}

impl LogState {
    fn accepts(&self, target: &str, level: Level) -> bool {
        if !self.enabled || level > Level::Debug {
            return false;
        }
        target.starts_with(CRATE_TARGET) || self.verbose || !is_noisy_target(target)
    }

    /// Write a finished line to the log file and, for the server, stderr
    fn write_line(&mut self, bytes: &[u8]) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.write_all(bytes);
            let _ = file.flush();
        }
        if self.to_stderr {
            let _ = io::stderr().write_all(bytes);
        }
    }
}

static STATE: LazyLock<Mutex<LogState>> = LazyLock::new(|| Mutex::new(LogState::default()));

/// Targets that flood the log with connection-level detail
fn is_noisy_target(target: &str) -> bool {
    NOISY_TARGETS.iter().any(|prefix| target.starts_with(prefix))
}

/// `tracing` and `log` share level names
fn as_log_level(level: &tracing::Level) -> Level {
    level.as_str().parse().unwrap_or(Level::Trace)
}

fn format_line(level: Level, target: &str, message: &std::fmt::Arguments<'_>) -> String {
    format!(
        "{} {level} [{target}] - {message}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f")
    )
}

struct ScribeLogger;

static LOGGER: ScribeLogger = ScribeLogger;

impl log::Log for ScribeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        STATE.lock().accepts(metadata.target(), metadata.level())
    }

    fn log(&self, record: &Record) {
        let mut state = STATE.lock();
        if !state.accepts(record.target(), record.level()) {
            return;
        }

        let line = format_line(record.level(), record.target(), record.args());
        state.write_line(line.as_bytes());
        if state.to_stdout {
            print!("{line}");
        }
    }

    fn flush(&self) {}
}

/// Routes tracing output to the same destinations as `log` records
#[derive(Clone, Copy)]
struct FileSink;

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        STATE.lock().write_line(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for FileSink {
    type Writer = FileSink;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }
}

fn verbose_requested() -> bool {
    std::env::var(VERBOSE_ENV).is_ok()
        || std::env::var("RUST_LOG").is_ok_and(|v| v.contains("debug") || v.contains("trace"))
}

fn install() -> Result<(), String> {
    {
        let mut state = STATE.lock();
        state.enabled = true;
        state.to_stdout = true;
        state.verbose = verbose_requested();
    }

    // The `log` backend goes first so no bridge can claim the facade
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(LevelFilter::Debug))
        .map_err(|e| format!("Failed to initialize logging: {e}"))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_TRACE_FILTER.into());
    let fmt_layer = fmt::Layer::new()
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::ChronoUtc::rfc_3339())
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(FileSink)
        .with_filter(filter_fn(|metadata: &tracing::Metadata<'_>| {
            STATE
                .lock()
                .accepts(metadata.target(), as_log_level(metadata.level()))
        }));

    if let Err(e) = Registry::default().with(env_filter).with(fmt_layer).try_init() {
        eprintln!("Note: Using log-only logging (tracing setup failed: {e})");
    }
    Ok(())
}

/// Install the `log` and `tracing` backends. Safe to call more than once.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    static INIT_RESULT: OnceLock<Result<(), String>> = OnceLock::new();

    INIT_RESULT
        .get_or_init(install)
        .clone()
        .map_err(Into::into)
}

pub fn enable_logging() {
    STATE.lock().enabled = true;
}

pub fn disable_logging() {
    STATE.lock().enabled = false;
}

pub fn set_verbose_logging(enabled: bool) {
    STATE.lock().verbose = enabled;
}

pub fn is_logging_enabled() -> bool {
    STATE.lock().enabled
}

pub fn set_log_to_stdout(enabled: bool) {
    STATE.lock().to_stdout = enabled;
}

/// Mirror log lines and request spans to stderr
pub fn set_log_to_stderr(enabled: bool) {
    STATE.lock().to_stderr = enabled;
}

/// Send log lines and request spans to stderr unless `--log` already chose a
/// destination. Returns whether console logging was switched on.
pub fn ensure_console_logging() -> bool {
    let mut state = STATE.lock();
    if state.enabled {
        return false;
    }
    state.enabled = true;
    state.to_stdout = false;
    state.to_stderr = true;
    true
}

pub fn set_log_file(file_path: &str) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)?;

    STATE.lock().file = Some(file);
    Ok(())
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! trace_info {
    ($($arg:tt)*) => {
        tracing::info!($($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noisy_targets() {
        assert!(is_noisy_target("hyper::proto::h1"));
        assert!(is_noisy_target("reqwest::connect"));
        assert!(!is_noisy_target("release_scribe::github"));
        assert!(!is_noisy_target("tower_http::trace"));
    }

    #[test]
    fn test_state_filters_by_target_and_verbosity() {
        let mut state = LogState {
            enabled: true,
            ..LogState::default()
        };
        assert!(state.accepts("release_scribe::pipeline", Level::Debug));
        assert!(!state.accepts("release_scribe::pipeline", Level::Trace));
        assert!(!state.accepts("hyper::client", Level::Debug));

        state.verbose = true;
        assert!(state.accepts("hyper::client", Level::Debug));

        state.enabled = false;
        assert!(!state.accepts("release_scribe::pipeline", Level::Error));
    }

    #[test]
    fn test_tracing_levels_map_onto_log_levels() {
        assert_eq!(as_log_level(&tracing::Level::ERROR), Level::Error);
        assert_eq!(as_log_level(&tracing::Level::DEBUG), Level::Debug);
        assert_eq!(as_log_level(&tracing::Level::TRACE), Level::Trace);
    }
}

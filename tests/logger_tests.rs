#![allow(clippy::unwrap_used)]

use release_scribe::logger;
use std::fs;
use tempfile::TempDir;

// Logger state is process-wide, so every switch is exercised in one test.
#[test]
fn test_switches_control_what_reaches_the_log_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scribe.log");

    logger::init().unwrap();
    logger::enable_logging();
    logger::set_log_to_stdout(false);
    logger::set_verbose_logging(false);
    logger::set_log_file(path.to_str().unwrap()).unwrap();

    log::debug!(target: "hyper::client", "hyper line while quiet");
    log::debug!(target: "release_scribe::pipeline", "pipeline line");
    tracing::debug!(target: "release_scribe::server", "server event");

    logger::set_verbose_logging(true);
    log::debug!(target: "hyper::client", "hyper line while verbose");
    logger::set_verbose_logging(false);

    logger::disable_logging();
    log::debug!(target: "release_scribe::pipeline", "pipeline line while disabled");
    tracing::debug!(target: "release_scribe::server", "server event while disabled");

    assert!(logger::ensure_console_logging());
    assert!(logger::is_logging_enabled());
    assert!(!logger::ensure_console_logging());
    logger::set_log_to_stderr(false);

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("pipeline line"));
    assert!(contents.contains("server event"));
    assert!(contents.contains("hyper line while verbose"));
    assert!(!contents.contains("hyper line while quiet"));
    assert!(!contents.contains("pipeline line while disabled"));
    assert!(!contents.contains("server event while disabled"));
    assert!(!contents.contains('\u{1b}'));
}

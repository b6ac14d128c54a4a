//! Unit tests for engine.rs
//!
//! The logger slot is process-wide, so every test here is #[serial].

use std::sync::{Arc, Mutex};
use serial_test::serial;
use super::*;

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });
    entries
}

/// Entries logged by these tests only. Structure tests running in parallel
/// may log through the same slot while a capture logger is installed.
fn captured_from_tests(entries: &Arc<Mutex<Vec<LogEntry>>>) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.source == "spatial::test")
        .cloned()
        .collect()
}

fn restore() {
    Engine::reset_logger();
    Engine::set_min_severity(LogSeverity::Info);
}

// ============================================================================
// SEVERITY FILTER
// ============================================================================

#[test]
#[serial]
fn test_default_min_severity_is_info() {
    restore();
    assert_eq!(Engine::min_severity(), LogSeverity::Info);
    assert!(!Engine::is_enabled(LogSeverity::Debug));
    assert!(Engine::is_enabled(LogSeverity::Info));
    assert!(Engine::is_enabled(LogSeverity::Error));
}

#[test]
#[serial]
fn test_set_min_severity_round_trips_every_level() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        Engine::set_min_severity(severity);
        assert_eq!(Engine::min_severity(), severity);
    }
    restore();
}

#[test]
#[serial]
fn test_filtered_messages_do_not_reach_logger() {
    let entries = install_capture();
    Engine::set_min_severity(LogSeverity::Warn);

    Engine::log(LogSeverity::Debug, "spatial::test", "hidden".to_string());
    Engine::log(LogSeverity::Warn, "spatial::test", "shown".to_string());

    let captured = captured_from_tests(&entries);
    restore();

    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].message, "shown");
    assert!(captured[0].file.is_none());
}

// ============================================================================
// LOGGER REPLACEMENT
// ============================================================================

#[test]
#[serial]
fn test_log_detailed_carries_location() {
    let entries = install_capture();

    Engine::log_detailed(LogSeverity::Error, "spatial::test", "boom".to_string(), "octree.rs", 12);

    let captured = captured_from_tests(&entries);
    restore();

    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].source, "spatial::test");
    assert_eq!(captured[0].file, Some("octree.rs"));
    assert_eq!(captured[0].line, Some(12));
}

#[test]
#[serial]
fn test_macros_route_through_engine() {
    let entries = install_capture();
    Engine::set_min_severity(LogSeverity::Trace);

    crate::spatial_trace!("spatial::test", "trace {}", 1);
    crate::spatial_debug!("spatial::test", "debug {}", 2);
    crate::spatial_info!("spatial::test", "info {}", 3);
    crate::spatial_warn!("spatial::test", "warn {}", 4);
    crate::spatial_error!("spatial::test", "error {}", 5);

    let captured = captured_from_tests(&entries);
    restore();

    let messages: Vec<&str> = captured.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["trace 1", "debug 2", "info 3", "warn 4", "error 5"]);
    assert!(captured[4].file.is_some());
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let entries = install_capture();
    Engine::reset_logger();

    Engine::log(LogSeverity::Error, "spatial::test", "to stdout".to_string());

    assert!(captured_from_tests(&entries).is_empty());
    restore();
}

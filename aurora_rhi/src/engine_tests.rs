//! Unit tests for the Engine logging hub
//!
//! LOGGER is a global shared across all tests: every test that swaps it is
//! marked #[serial] and restores the default logger before returning.

use crate::aurora::{Engine, Error, Result};
use crate::aurora::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });
    entries
}

fn restore() {
    Engine::set_min_severity(LogSeverity::Trace);
    Engine::reset_logger();
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LOGGER SWAPPING
// ============================================================================

#[test]
#[serial]
fn test_custom_logger_receives_entries() {
    let entries = install_capture();

    Engine::log(LogSeverity::Info, "aurora::Renderer", "frame 1".to_string());
    Engine::log(LogSeverity::Warn, "aurora::dxgi", "tearing unsupported".to_string());

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].source, "aurora::Renderer");
        assert_eq!(captured[1].severity, LogSeverity::Warn);
        assert!(captured[1].file.is_none());
    }
    restore();
}

#[test]
#[serial]
fn test_log_detailed_records_location() {
    let entries = install_capture();

    Engine::log_detailed(LogSeverity::Error, "aurora::vulkan", "lost".to_string(), "device.rs", 12);

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured[0].file, Some("device.rs"));
        assert_eq!(captured[0].line, Some(12));
    }
    restore();
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let entries = install_capture();
    Engine::reset_logger();

    Engine::log(LogSeverity::Info, "aurora::test", "to default".to_string());

    assert!(entries.lock().unwrap().is_empty());
    restore();
}

// ============================================================================
// SEVERITY FILTER
// ============================================================================

#[test]
#[serial]
fn test_min_severity_filters_lower_entries() {
    let entries = install_capture();
    Engine::set_min_severity(LogSeverity::Warn);
    assert_eq!(Engine::min_severity(), LogSeverity::Warn);

    Engine::log(LogSeverity::Debug, "aurora::test", "dropped".to_string());
    Engine::log(LogSeverity::Info, "aurora::test", "dropped".to_string());
    Engine::log(LogSeverity::Warn, "aurora::test", "kept".to_string());
    Engine::log_detailed(LogSeverity::Error, "aurora::test", "kept".to_string(), "x.rs", 1);

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert!(captured.iter().all(|e| e.message == "kept"));
    }
    restore();
}

// ============================================================================
// MACROS
// ============================================================================

#[test]
#[serial]
fn test_engine_err_logs_and_builds_backend_error() {
    let entries = install_capture();

    let err = crate::engine_err!("aurora::mock", "create failed: {}", 7);

    assert!(matches!(&err, Error::BackendError(msg) if msg == "create failed: 7"));
    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].severity, LogSeverity::Error);
        assert_eq!(captured[0].message, "create failed: 7");
        assert!(captured[0].line.is_some());
    }
    restore();
}

#[test]
#[serial]
fn test_engine_bail_returns_early() {
    let entries = install_capture();

    fn guarded(value: u32) -> Result<u32> {
        if value == 0 {
            crate::engine_bail!("aurora::mock", "value must be non-zero");
        }
        Ok(value * 2)
    }

    assert_eq!(guarded(4).unwrap(), 8);
    assert!(guarded(0).is_err());
    assert_eq!(entries.lock().unwrap().len(), 1);
    restore();
}

#[test]
#[serial]
fn test_level_macros_use_expected_severity() {
    let entries = install_capture();

    crate::engine_trace!("aurora::test", "t");
    crate::engine_debug!("aurora::test", "d");
    crate::engine_info!("aurora::test", "i");
    crate::engine_warn!("aurora::test", "w");
    crate::engine_error!("aurora::test", "e");

    {
        let captured = entries.lock().unwrap();
        let severities: Vec<LogSeverity> = captured.iter().map(|e| e.severity).collect();
        assert_eq!(
            severities,
            vec![
                LogSeverity::Trace,
                LogSeverity::Debug,
                LogSeverity::Info,
                LogSeverity::Warn,
                LogSeverity::Error,
            ]
        );
        assert!(captured[4].file.is_some());
    }
    restore();
}

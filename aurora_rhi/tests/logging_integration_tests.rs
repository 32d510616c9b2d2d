//! Integration tests for the Engine logging hub
//!
//! Exercises the public logging API and the exported macros the backend
//! crates rely on. No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use aurora_rhi::aurora::{Engine, Error, Result};
use aurora_rhi::aurora::log::{Logger, LogEntry, LogSeverity};
use aurora_rhi::{engine_bail, engine_err, engine_info, engine_warn};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn restore() {
    Engine::set_min_severity(LogSeverity::Trace);
    Engine::reset_logger();
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_macros_from_backend_crate() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    engine_info!("aurora::vulkan", "Selected {} ({} MB)", "GeForce", 8192);
    engine_warn!("aurora::dxgi", "Tearing is not supported");

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].message, "Selected GeForce (8192 MB)");
        assert_eq!(captured[1].source, "aurora::dxgi");
        assert_eq!(captured[1].severity, LogSeverity::Warn);
    }
    restore();
}

#[test]
#[serial]
fn test_integration_engine_err_carries_location() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    fn create() -> Result<()> {
        engine_bail!("aurora::d3d11", "D3D11CreateDevice failed: 0x{:08X}", 0x887A002Du32);
    }

    let err = create().unwrap_err();
    assert!(matches!(&err, Error::BackendError(msg) if msg.contains("887A002D")));

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let entry = &captured[0];
        assert_eq!(entry.severity, LogSeverity::Error);
        assert!(entry.file.unwrap().ends_with("logging_integration_tests.rs"));
        assert!(entry.line.is_some());
    }
    restore();
}

#[test]
#[serial]
fn test_integration_engine_err_as_map_err() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let native: std::result::Result<u32, &str> = Err("ERROR_INITIALIZATION_FAILED");
    let result: Result<u32> = native.map_err(|e| engine_err!("aurora::vulkan", "vkCreateInstance: {}", e));

    assert!(result.is_err());
    assert_eq!(entries.lock().unwrap().len(), 1);
    restore();
}

#[test]
#[serial]
fn test_integration_min_severity() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);
    Engine::set_min_severity(LogSeverity::Error);

    Engine::log(LogSeverity::Warn, "test", "filtered".to_string());
    Engine::log_detailed(LogSeverity::Error, "test", "kept".to_string(), "test_file.rs", 42);

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].file, Some("test_file.rs"));
        assert_eq!(captured[0].line, Some(42));
    }
    restore();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());
    assert_eq!(entries.lock().unwrap().len(), 1);

    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "test", "Message 2".to_string());

    // Still only one message
    assert_eq!(entries.lock().unwrap().len(), 1);
    restore();
}

//! Unit tests for gpu.rs

use std::sync::{Arc, Mutex};
use serial_test::serial;

use crate::aurora::Engine;
use crate::aurora::log::{LogEntry, LogSeverity, Logger};
use crate::error::Error;
use crate::rhi::{AdapterHandle, Gpu, GpuList, GpuType, GpuVendor};

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

const MB: u64 = 1024 * 1024;

fn gpu(name: &str, memory_mb: u64, presentable: bool) -> Gpu {
    Gpu::new(0x10DE, name, memory_mb * MB, GpuType::Discrete, AdapterHandle(memory_mb), presentable)
}

// ============================================================================
// GPU
// ============================================================================

#[test]
fn test_gpu_converts_bytes_to_megabytes() {
    let g = Gpu::new(0x1002, "Radeon", 8 * 1024 * MB + 123, GpuType::Discrete, AdapterHandle(7), true);
    assert_eq!(g.memory_mb(), 8192);
    assert_eq!(g.name(), "Radeon");
    assert_eq!(g.vendor(), GpuVendor::Amd);
    assert_eq!(g.handle(), AdapterHandle(7));
    assert!(g.is_presentable());
}

#[test]
fn test_vendor_decoding() {
    assert_eq!(GpuVendor::from_pci_id(0x10DE), GpuVendor::Nvidia);
    assert_eq!(GpuVendor::from_pci_id(0x8086), GpuVendor::Intel);
    assert_eq!(GpuVendor::from_pci_id(0x1414), GpuVendor::Microsoft);
    assert_eq!(GpuVendor::from_pci_id(0xBEEF), GpuVendor::Other(0xBEEF));
    assert_eq!(GpuVendor::Nvidia.name(), "NVIDIA");
}

// ============================================================================
// GPU LIST ORDERING
// ============================================================================

#[test]
fn test_register_gpu_sorts_descending_by_memory() {
    let mut list = GpuList::new();
    list.register_gpu(gpu("small", 256, true));
    list.register_gpu(gpu("big", 4096, true));
    list.register_gpu(gpu("mid", 1024, true));

    let memory: Vec<u64> = list.iter().map(Gpu::memory_mb).collect();
    assert_eq!(memory, vec![4096, 1024, 256]);
}

#[test]
fn test_register_gpu_is_stable_for_equal_memory() {
    let mut list = GpuList::new();
    list.register_gpu(gpu("first", 2048, true));
    list.register_gpu(gpu("second", 2048, true));

    assert_eq!(list.get(0).unwrap().name(), "first");
    assert_eq!(list.get(1).unwrap().name(), "second");
}

#[test]
fn test_list_stays_ordered_after_every_insertion() {
    let mut list = GpuList::new();
    for memory in [512, 8192, 64, 3000, 3000, 1] {
        list.register_gpu(gpu("g", memory, false));
        let sorted = list
            .as_slice()
            .windows(2)
            .all(|pair| pair[0].memory_mb() >= pair[1].memory_mb());
        assert!(sorted);
    }
    assert_eq!(list.len(), 6);
}

// ============================================================================
// PRIMARY SELECTION
// ============================================================================

#[test]
fn test_select_primary_prefers_first_presentable() {
    let mut list = GpuList::new();
    list.register_gpu(gpu("headless", 16384, false));
    list.register_gpu(gpu("display", 4096, true));
    list.register_gpu(gpu("igpu", 512, true));

    assert_eq!(list.select_primary().unwrap(), 1);
    assert_eq!(list.primary().unwrap().name(), "display");
}

#[test]
fn test_select_primary_falls_back_to_largest() {
    let mut list = GpuList::new();
    list.register_gpu(gpu("a", 1024, false));
    list.register_gpu(gpu("b", 2048, false));

    assert_eq!(list.select_primary().unwrap(), 0);
    assert_eq!(list.primary().unwrap().name(), "b");
}

#[test]
#[serial]
fn test_select_primary_on_empty_list_fails_and_logs() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });

    let mut list = GpuList::new();
    assert!(matches!(list.select_primary(), Err(Error::NoAdapter)));
    assert!(list.primary().is_none());
    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].severity, LogSeverity::Error);
        assert_eq!(captured[0].source, "aurora::Device");
    }
    Engine::reset_logger();
}

#[test]
fn test_registration_clears_primary() {
    let mut list = GpuList::new();
    list.register_gpu(gpu("a", 1024, true));
    list.select_primary().unwrap();
    assert!(list.primary().is_some());

    list.register_gpu(gpu("b", 4096, true));
    assert!(list.primary_index().is_none());
    assert!(list.primary().is_none());
}

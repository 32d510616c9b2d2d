/// GPU adapter description and the memory-ordered adapter list

use crate::engine_error;
use crate::error::{Error, Result};

/// Coarse adapter category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuType {
    Integrated,
    Discrete,
    Virtual,
    Cpu,
    #[default]
    Unknown,
}

/// Hardware vendor decoded from the PCI vendor ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    Arm,
    Qualcomm,
    Apple,
    /// Microsoft Basic Render Driver / WARP
    Microsoft,
    Other(u32),
}

impl GpuVendor {
    pub fn from_pci_id(vendor_id: u32) -> Self {
        match vendor_id {
            0x10DE => GpuVendor::Nvidia,
            0x1002 | 0x1022 => GpuVendor::Amd,
            0x8086 => GpuVendor::Intel,
            0x13B5 => GpuVendor::Arm,
            0x5143 => GpuVendor::Qualcomm,
            0x106B => GpuVendor::Apple,
            0x1414 => GpuVendor::Microsoft,
            other => GpuVendor::Other(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GpuVendor::Nvidia => "NVIDIA",
            GpuVendor::Amd => "AMD",
            GpuVendor::Intel => "Intel",
            GpuVendor::Arm => "ARM",
            GpuVendor::Qualcomm => "Qualcomm",
            GpuVendor::Apple => "Apple",
            GpuVendor::Microsoft => "Microsoft",
            GpuVendor::Other(_) => "Unknown vendor",
        }
    }
}

/// Opaque backend handle of an adapter
///
/// Vulkan stores the `VkPhysicalDevice` raw value, DXGI the adapter LUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AdapterHandle(pub u64);

/// One physical adapter
///
/// Immutable once built during adapter enumeration.
#[derive(Debug, Clone)]
pub struct Gpu {
    vendor_id: u32,
    name: String,
    memory_mb: u64,
    gpu_type: GpuType,
    handle: AdapterHandle,
    presentable: bool,
}

impl Gpu {
    /// Build an adapter entry
    ///
    /// # Arguments
    ///
    /// * `memory_bytes` - dedicated video memory in bytes, stored in MB
    /// * `presentable` - display-mode enumeration succeeded for this adapter
    pub fn new(
        vendor_id: u32,
        name: impl Into<String>,
        memory_bytes: u64,
        gpu_type: GpuType,
        handle: AdapterHandle,
        presentable: bool,
    ) -> Self {
        Self {
            vendor_id,
            name: name.into(),
            memory_mb: memory_bytes / (1024 * 1024),
            gpu_type,
            handle,
            presentable,
        }
    }

    pub fn vendor_id(&self) -> u32 {
        self.vendor_id
    }

    pub fn vendor(&self) -> GpuVendor {
        GpuVendor::from_pci_id(self.vendor_id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn memory_mb(&self) -> u64 {
        self.memory_mb
    }

    pub fn gpu_type(&self) -> GpuType {
        self.gpu_type
    }

    pub fn handle(&self) -> AdapterHandle {
        self.handle
    }

    pub fn is_presentable(&self) -> bool {
        self.presentable
    }
}

// ===== GPU LIST =====

/// Adapters of a device, sorted by memory (largest first)
///
/// Indices are not stable across registrations: every insertion re-sorts the
/// list and clears the primary selection.
#[derive(Debug, Clone, Default)]
pub struct GpuList {
    gpus: Vec<Gpu>,
    primary: Option<usize>,
}

impl GpuList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an adapter and restore the descending-memory order
    ///
    /// The sort is stable: adapters with the same memory keep their
    /// enumeration order.
    pub fn register_gpu(&mut self, gpu: Gpu) {
        self.gpus.push(gpu);
        self.gpus.sort_by(|a, b| b.memory_mb.cmp(&a.memory_mb));
        self.primary = None;
    }

    /// Pick the primary adapter
    ///
    /// The first presentable adapter in memory order wins. When none is
    /// presentable the largest adapter is used.
    ///
    /// # Errors
    ///
    /// `Error::NoAdapter` (logged) when the list is empty.
    pub fn select_primary(&mut self) -> Result<usize> {
        if self.gpus.is_empty() {
            engine_error!("aurora::Device", "No GPU adapter found");
            return Err(Error::NoAdapter);
        }
        let index = self.gpus.iter().position(Gpu::is_presentable).unwrap_or(0);
        self.primary = Some(index);
        Ok(index)
    }

    pub fn primary_index(&self) -> Option<usize> {
        self.primary
    }

    /// Bounds-checked primary adapter lookup
    pub fn primary(&self) -> Option<&Gpu> {
        self.primary.and_then(|index| self.gpus.get(index))
    }

    pub fn get(&self, index: usize) -> Option<&Gpu> {
        self.gpus.get(index)
    }

    pub fn len(&self) -> usize {
        self.gpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gpus.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Gpu> {
        self.gpus.iter()
    }

    pub fn as_slice(&self) -> &[Gpu] {
        &self.gpus
    }
}

impl<'a> IntoIterator for &'a GpuList {
    type Item = &'a Gpu;
    type IntoIter = std::slice::Iter<'a, Gpu>;

    fn into_iter(self) -> Self::IntoIter {
        self.gpus.iter()
    }
}

#[cfg(test)]
#[path = "gpu_tests.rs"]
mod tests;

/// GpuContext - Shared GPU resources for all Vulkan objects
///
/// Contains everything needed for GPU operations:
/// - Instance, surface loader and validation messenger
/// - Device for Vulkan API calls
/// - Allocator for memory management
/// - Queue for command submission
/// - Command pool for one-shot upload operations
///
/// The device owns the context through an `Arc`, and every swapchain,
/// texture and command list holds a clone, so the context outlives them all.

use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::sync::Mutex;

use ash::vk;
use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::{engine_err, engine_error, engine_warn};
use gpu_allocator::vulkan::Allocator;

use crate::debug::{ValidationStats, ValidationTracker};
use crate::vulkan_state::RasterizerFeatures;

// ============================================================================
// Instance
// ============================================================================

/// Vulkan instance with its optional validation messenger
///
/// Destroys the messenger, then the instance, when dropped.
pub struct VulkanInstance {
    pub entry: ash::Entry,
    pub instance: ash::Instance,
    pub surface_loader: ash::khr::surface::Instance,
    pub(crate) debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
    pub(crate) debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    /// Boxed so the messenger's user-data pointer stays valid
    pub(crate) validation: Option<Box<ValidationTracker>>,
}

impl VulkanInstance {
    pub fn validation_enabled(&self) -> bool {
        self.debug_messenger.is_some()
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            if let (Some(loader), Some(messenger)) = (&self.debug_utils_loader, self.debug_messenger.take()) {
                loader.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

// ============================================================================
// Context
// ============================================================================

/// Shared GPU context for all Vulkan resources.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// Adapter the device was created on
    pub physical_device: vk::PhysicalDevice,

    /// GPU memory allocator
    /// Wrapped in ManuallyDrop to ensure it's dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,

    /// Graphics queue, also used for presentation
    pub graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub graphics_queue_family: u32,

    /// Reusable command pool for one-shot upload operations
    /// (created with TRANSIENT + RESET_COMMAND_BUFFER flags)
    pub upload_command_pool: Mutex<vk::CommandPool>,

    /// Optional features enabled on the device
    pub rasterizer_features: RasterizerFeatures,

    /// Object naming, present when validation is enabled
    debug_utils_device: Option<ash::ext::debug_utils::Device>,

    /// Destroyed last, after the device
    pub instance: VulkanInstance,
}

impl GpuContext {
    pub fn new(
        instance: VulkanInstance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        allocator: Allocator,
        graphics_queue: vk::Queue,
        graphics_queue_family: u32,
        upload_command_pool: vk::CommandPool,
        rasterizer_features: RasterizerFeatures,
    ) -> Self {
        let debug_utils_device = instance
            .validation_enabled()
            .then(|| ash::ext::debug_utils::Device::new(&instance.instance, &device));

        Self {
            device,
            physical_device,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            graphics_queue,
            graphics_queue_family,
            upload_command_pool: Mutex::new(upload_command_pool),
            rasterizer_features,
            debug_utils_device,
            instance,
        }
    }

    /// Validation counters, `None` when validation is off
    pub fn validation_stats(&self) -> Option<ValidationStats> {
        self.instance.validation.as_ref().map(|tracker| tracker.stats())
    }

    pub(crate) fn validation_duplicates(&self) -> usize {
        self.instance.validation.as_ref().map_or(0, |tracker| tracker.duplicate_count())
    }

    /// Attach a debug name to a Vulkan object (no-op without validation)
    pub fn set_object_name<H: vk::Handle>(&self, handle: H, name: &str) {
        let Some(loader) = &self.debug_utils_device else {
            return;
        };
        if name.is_empty() {
            return;
        }
        let Ok(name) = CString::new(name) else {
            engine_warn!("aurora::vulkan", "Debug name {:?} contains a NUL byte, ignored", name);
            return;
        };

        let info = vk::DebugUtilsObjectNameInfoEXT::default()
            .object_handle(handle)
            .object_name(&name);
        if let Err(e) = unsafe { loader.set_debug_utils_object_name(&info) } {
            engine_warn!("aurora::vulkan", "Failed to set debug name: {:?}", e);
        }
    }

    /// Lock the allocator, mapping a poisoned mutex to an error
    pub fn lock_allocator(&self) -> Result<std::sync::MutexGuard<'_, Allocator>> {
        self.allocator
            .lock()
            .map_err(|_| engine_err!("aurora::vulkan", "GPU allocator mutex poisoned"))
    }

    /// Record, submit and wait for a one-shot command buffer
    pub fn immediate_submit<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer) -> Result<()>,
    {
        let pool = self
            .upload_command_pool
            .lock()
            .map_err(|_| engine_err!("aurora::vulkan", "Upload command pool mutex poisoned"))?;

        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(*pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffer = self
                .device
                .allocate_command_buffers(&allocate_info)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to allocate upload command buffer: {:?}", e))?
                .into_iter()
                .next()
                .ok_or_else(|| engine_err!("aurora::vulkan", "Driver returned no upload command buffer"))?;

            let result = (|| {
                let begin_info = vk::CommandBufferBeginInfo::default()
                    .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
                self.device
                    .begin_command_buffer(command_buffer, &begin_info)
                    .map_err(|e| engine_err!("aurora::vulkan", "Failed to begin upload command buffer: {:?}", e))?;

                record(&self.device, command_buffer)?;

                self.device
                    .end_command_buffer(command_buffer)
                    .map_err(|e| engine_err!("aurora::vulkan", "Failed to end upload command buffer: {:?}", e))?;

                let command_buffers = [command_buffer];
                let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
                self.device
                    .queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())
                    .map_err(|e| engine_err!("aurora::vulkan", "Failed to submit upload commands: {:?}", e))?;

                self.device
                    .queue_wait_idle(self.graphics_queue)
                    .map_err(|e| engine_err!("aurora::vulkan", "Failed to wait for upload completion: {:?}", e))
            })();

            self.device.free_command_buffers(*pool, &[command_buffer]);
            result
        }
    }

    /// Block until the device has finished every submitted command
    pub fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(|e| engine_err!("aurora::vulkan", "vkDeviceWaitIdle failed: {:?}", e))
        }
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            // Wait for GPU to finish all work
            self.device.device_wait_idle().ok();

            if let Ok(pool) = self.upload_command_pool.get_mut() {
                self.device.destroy_command_pool(*pool, None);
            }

            // Allocator must go before the device that backs its memory
            ManuallyDrop::drop(&mut self.allocator);

            self.device.destroy_device(None);
        }
        // `instance` is dropped after this body: messenger, then instance
    }
}

/// Map a creation failure to `Error::InitializationFailed`, logging it
pub(crate) fn init_failed(what: &str, e: vk::Result) -> Error {
    engine_error!("aurora::vulkan", "{}: {:?}", what, e);
    Error::InitializationFailed(format!("{}: {:?}", what, e))
}

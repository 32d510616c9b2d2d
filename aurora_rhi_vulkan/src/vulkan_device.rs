/// VulkanDevice - instance, adapter enumeration and the factory for every Vulkan RHI object

use std::any::Any;
use std::ffi::{c_char, CStr, CString};
use std::sync::Arc;

use ash::vk;
use ash::vk::Handle;
use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{
    register_adapters, AdapterDesc, AdapterHandle, BlendState, BlendStateDesc, CommandList,
    DepthStencilState, DepthStencilStateDesc, Device, DeviceConfig, DeviceLimits, Display,
    GpuList, GpuType, RasterizerState, RasterizerStateDesc, RenderApi, Swapchain,
    SwapchainDesc, Texture, TextureDesc, WindowTarget,
};
use aurora_rhi::{engine_debug, engine_err, engine_error, engine_info, engine_warn};
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};

use crate::debug::{self, ValidationStats, ValidationTracker};
use crate::vulkan_command_list::VulkanCommandList;
use crate::vulkan_context::{init_failed, GpuContext, VulkanInstance};
use crate::vulkan_state::{RasterizerFeatures, VulkanBlendState, VulkanDepthStencilState, VulkanRasterizerState};
use crate::vulkan_swapchain::VulkanSwapchain;
use crate::vulkan_texture::VulkanTexture;

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

// ============================================================================
// Adapter helpers
// ============================================================================

pub fn gpu_type_from_vk(device_type: vk::PhysicalDeviceType) -> GpuType {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => GpuType::Discrete,
        vk::PhysicalDeviceType::INTEGRATED_GPU => GpuType::Integrated,
        vk::PhysicalDeviceType::VIRTUAL_GPU => GpuType::Virtual,
        vk::PhysicalDeviceType::CPU => GpuType::Cpu,
        _ => GpuType::Unknown,
    }
}

/// Sum of the device-local heaps, the Vulkan counterpart of dedicated video memory
pub fn device_local_memory(properties: &vk::PhysicalDeviceMemoryProperties) -> u64 {
    properties
        .memory_heaps_as_slice()
        .iter()
        .filter(|heap| heap.flags.contains(vk::MemoryHeapFlags::DEVICE_LOCAL))
        .map(|heap| heap.size)
        .sum()
}

/// First queue family with graphics support for which `can_present` holds
pub fn find_graphics_present_family<F>(families: &[vk::QueueFamilyProperties], mut can_present: F) -> Option<u32>
where
    F: FnMut(u32) -> bool,
{
    families
        .iter()
        .enumerate()
        .filter(|(_, family)| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
        .map(|(index, _)| index as u32)
        .find(|&index| can_present(index))
}

// ============================================================================
// Device
// ============================================================================

/// Vulkan device
///
/// Owns the adapter list, the display modes and the shared `GpuContext`.
pub struct VulkanDevice {
    context: Arc<GpuContext>,
    gpus: GpuList,
    display: Display,
    limits: DeviceLimits,
}

impl VulkanDevice {
    /// Create the instance, pick the adapter and create the logical device
    pub fn new(config: &DeviceConfig, window: &WindowTarget) -> Result<Self> {
        let want_validation = cfg!(feature = "vulkan-validation") && config.enable_debug_layer;
        let instance = create_instance(config, window, want_validation)?;

        // Temporary surface, only to test present support per queue family
        let surface = unsafe {
            ash_window::create_surface(
                &instance.entry,
                &instance.instance,
                window.raw_display_handle(),
                window.raw_window_handle(),
                None,
            )
            .map_err(|e| init_failed("Failed to create surface", e))?
        };

        let selection = select_adapter(&instance, surface, window);
        unsafe {
            instance.surface_loader.destroy_surface(surface, None);
        }
        let (gpus, display, physical_device, queue_family) = selection?;

        let properties = unsafe { instance.instance.get_physical_device_properties(physical_device) };
        let limits = DeviceLimits {
            max_texture_dimension_2d: properties.limits.max_image_dimension2_d,
        };

        let context = create_context(instance, physical_device, queue_family)?;

        if let Some(gpu) = gpus.primary() {
            engine_info!(
                "aurora::vulkan",
                "Vulkan device created on {} ({} MB), {} display mode(s), max 2D texture {}",
                gpu.name(),
                gpu.memory_mb(),
                display.len(),
                limits.max_texture_dimension_2d
            );
        }

        Ok(Self {
            context: Arc::new(context),
            gpus,
            display,
            limits,
        })
    }

    pub fn context(&self) -> &Arc<GpuContext> {
        &self.context
    }

    /// Validation counters, `None` when validation is off
    pub fn validation_stats(&self) -> Option<ValidationStats> {
        self.context.validation_stats()
    }

    /// Print the validation summary to stdout (no-op when validation is off)
    pub fn print_validation_report(&self) {
        if let Some(stats) = self.validation_stats() {
            debug::print_validation_stats_report(&stats, self.context.validation_duplicates());
        }
    }
}

impl Device for VulkanDevice {
    fn render_api(&self) -> RenderApi {
        RenderApi::Vulkan
    }

    fn gpus(&self) -> &GpuList {
        &self.gpus
    }

    fn display(&self) -> &Display {
        &self.display
    }

    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn create_swapchain(&mut self, desc: &SwapchainDesc, window: &WindowTarget) -> Result<Box<dyn Swapchain>> {
        desc.validate()?;
        if !self.is_valid_resolution(desc.width, desc.height) {
            return Err(Error::InvalidArgument(format!(
                "swapchain size {}x{} is outside 1..={}",
                desc.width, desc.height, self.limits.max_texture_dimension_2d
            )));
        }
        let swapchain = VulkanSwapchain::new(Arc::clone(&self.context), desc, window, self.limits)?;
        Ok(Box::new(swapchain))
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Box<dyn Texture>> {
        if desc.width > self.limits.max_texture_dimension_2d || desc.height > self.limits.max_texture_dimension_2d {
            return Err(Error::InvalidArgument(format!(
                "texture '{}' size {}x{} exceeds the device maximum {}",
                desc.debug_name, desc.width, desc.height, self.limits.max_texture_dimension_2d
            )));
        }
        let texture = VulkanTexture::new(Arc::clone(&self.context), desc)?;
        Ok(Box::new(texture))
    }

    fn create_rasterizer_state(&mut self, desc: &RasterizerStateDesc) -> Result<Box<dyn RasterizerState>> {
        Ok(Box::new(VulkanRasterizerState::new(desc, self.context.rasterizer_features)))
    }

    fn create_depth_stencil_state(&mut self, desc: &DepthStencilStateDesc) -> Result<Box<dyn DepthStencilState>> {
        Ok(Box::new(VulkanDepthStencilState::new(desc)))
    }

    fn create_blend_state(&mut self, desc: &BlendStateDesc) -> Result<Box<dyn BlendState>> {
        Ok(Box::new(VulkanBlendState::new(desc)))
    }

    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(VulkanCommandList::new(Arc::clone(&self.context))?))
    }

    fn submit(&mut self, command_list: &mut dyn CommandList, swapchain: Option<&dyn Swapchain>) -> Result<()> {
        let cmd = command_list
            .as_any_mut()
            .downcast_mut::<VulkanCommandList>()
            .ok_or_else(|| Error::InvalidResource("command list was not created by the Vulkan device".to_string()))?;
        if cmd.is_recording() {
            return Err(Error::InvalidArgument("submit called on a command list still recording".to_string()));
        }

        let swapchain = match swapchain {
            Some(swapchain) => {
                let swapchain = swapchain
                    .as_any()
                    .downcast_ref::<VulkanSwapchain>()
                    .ok_or_else(|| Error::InvalidResource("swapchain was not created by the Vulkan device".to_string()))?;
                // Checked before the fence reset so a refused submit leaves the list reusable
                let sync = swapchain.sync_info()?;
                Some((swapchain, sync))
            }
            None => None,
        };

        let device = &self.context.device;
        let command_buffers = [cmd.command_buffer()];
        let fence = cmd.fence();

        unsafe {
            device
                .reset_fences(&[fence])
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to reset submit fence: {:?}", e))?;

            let result = match swapchain {
                Some((swapchain, (wait_semaphore, signal_semaphore))) => {
                    let wait_semaphores = [wait_semaphore];
                    let wait_stages = [vk::PipelineStageFlags::TRANSFER | vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
                    let signal_semaphores = [signal_semaphore];

                    let submit_info = vk::SubmitInfo::default()
                        .wait_semaphores(&wait_semaphores)
                        .wait_dst_stage_mask(&wait_stages)
                        .command_buffers(&command_buffers)
                        .signal_semaphores(&signal_semaphores);
                    let result = device.queue_submit(self.context.graphics_queue, &[submit_info], fence);
                    if result.is_ok() {
                        swapchain.mark_rendered();
                    }
                    result
                }
                None => {
                    let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
                    device.queue_submit(self.context.graphics_queue, &[submit_info], fence)
                }
            };
            if let Err(e) = result {
                cmd.recover_fence()?;
                return Err(engine_err!("aurora::vulkan", "Failed to submit command buffer: {:?}", e));
            }
        }

        cmd.mark_submitted();
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.context.wait_idle()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Creation steps
// ============================================================================

fn create_instance(config: &DeviceConfig, window: &WindowTarget, want_validation: bool) -> Result<VulkanInstance> {
    let entry = unsafe {
        ash::Entry::load().map_err(|e| {
            engine_error!("aurora::vulkan", "Failed to load the Vulkan library: {}", e);
            Error::InitializationFailed(format!("Failed to load Vulkan: {}", e))
        })?
    };

    let app_name = CString::new(config.app_name.as_str())
        .map_err(|_| Error::InvalidArgument(format!("application name {:?} contains a NUL byte", config.app_name)))?;
    let engine_name = c"Crescent Engine";

    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, 1, 0, 0))
        .engine_name(engine_name)
        .engine_version(vk::make_api_version(0, 1, 0, 0))
        .api_version(vk::API_VERSION_1_1);

    let required_extensions = ash_window::enumerate_required_extensions(window.raw_display_handle())
        .map_err(|e| init_failed("Failed to get required surface extensions", e))?;

    let try_create = |validation: bool| -> std::result::Result<ash::Instance, vk::Result> {
        let mut extensions: Vec<*const c_char> = required_extensions.to_vec();
        let mut layers: Vec<*const c_char> = Vec::new();
        if validation {
            extensions.push(ash::ext::debug_utils::NAME.as_ptr());
            layers.push(VALIDATION_LAYER.as_ptr());
        }
        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers);
        unsafe { entry.create_instance(&create_info, None) }
    };

    let (instance, validation) = match try_create(want_validation) {
        Ok(instance) => (instance, want_validation),
        Err(vk::Result::ERROR_LAYER_NOT_PRESENT | vk::Result::ERROR_EXTENSION_NOT_PRESENT) if want_validation => {
            engine_warn!("aurora::vulkan", "Validation layer is not installed, continuing without it");
            let instance = try_create(false).map_err(|e| init_failed("Failed to create Vulkan instance", e))?;
            (instance, false)
        }
        Err(e) => return Err(init_failed("Failed to create Vulkan instance", e)),
    };

    let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);
    let mut vulkan_instance = VulkanInstance {
        entry,
        instance,
        surface_loader,
        debug_utils_loader: None,
        debug_messenger: None,
        validation: None,
    };

    if validation {
        let tracker = Box::new(ValidationTracker::new());
        let loader = ash::ext::debug_utils::Instance::new(&vulkan_instance.entry, &vulkan_instance.instance);
        let create_info = debug::messenger_create_info(&tracker);
        match unsafe { loader.create_debug_utils_messenger(&create_info, None) } {
            Ok(messenger) => {
                vulkan_instance.debug_utils_loader = Some(loader);
                vulkan_instance.debug_messenger = Some(messenger);
                vulkan_instance.validation = Some(tracker);
                engine_debug!("aurora::vulkan", "Validation layer enabled");
            }
            Err(e) => engine_warn!("aurora::vulkan", "Failed to create debug messenger: {:?}", e),
        }
    }

    Ok(vulkan_instance)
}

/// Enumerate adapters, register them and resolve the primary one
///
/// Returns the GPU list, the display modes, and the primary adapter with its
/// graphics/present queue family.
fn select_adapter(
    instance: &VulkanInstance,
    surface: vk::SurfaceKHR,
    window: &WindowTarget,
) -> Result<(GpuList, Display, vk::PhysicalDevice, u32)> {
    let physical_devices = unsafe {
        instance
            .instance
            .enumerate_physical_devices()
            .map_err(|e| init_failed("Failed to enumerate physical devices", e))?
    };
    if physical_devices.is_empty() {
        engine_error!("aurora::vulkan", "No Vulkan physical device found");
        return Err(Error::NoAdapter);
    }

    let mut candidates = Vec::with_capacity(physical_devices.len());
    let mut adapters = Vec::with_capacity(physical_devices.len());

    for physical_device in physical_devices {
        let (properties, memory, families) = unsafe {
            (
                instance.instance.get_physical_device_properties(physical_device),
                instance.instance.get_physical_device_memory_properties(physical_device),
                instance.instance.get_physical_device_queue_family_properties(physical_device),
            )
        };
        let name = properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "Unknown Vulkan device".to_string());

        let queue_family = find_graphics_present_family(&families, |index| unsafe {
            instance
                .surface_loader
                .get_physical_device_surface_support(physical_device, index, surface)
                .unwrap_or(false)
        });

        engine_debug!(
            "aurora::vulkan",
            "Adapter {} ({:?}), present support: {}",
            name,
            properties.device_type,
            queue_family.is_some()
        );

        adapters.push(AdapterDesc {
            vendor_id: properties.vendor_id,
            name,
            memory_bytes: device_local_memory(&memory),
            gpu_type: gpu_type_from_vk(properties.device_type),
            handle: AdapterHandle(physical_device.as_raw()),
            display_modes: queue_family.map(|_| window.monitor_modes().to_vec()),
        });
        candidates.push((physical_device, queue_family));
    }

    let (gpus, display) = register_adapters(adapters)?;
    let primary = gpus.primary().ok_or(Error::NoAdapter)?;
    let (physical_device, queue_family) = candidates
        .into_iter()
        .find(|(device, _)| device.as_raw() == primary.handle().0)
        .ok_or(Error::NoAdapter)?;

    let queue_family = queue_family.ok_or_else(|| {
        engine_error!("aurora::vulkan", "{} has no queue that can present to the window", primary.name());
        Error::InitializationFailed(format!("{} cannot present to the window surface", primary.name()))
    })?;

    Ok((gpus, display, physical_device, queue_family))
}

fn create_context(instance: VulkanInstance, physical_device: vk::PhysicalDevice, queue_family: u32) -> Result<GpuContext> {
    unsafe {
        let supported = instance.instance.get_physical_device_features(physical_device);

        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family)
            .queue_priorities(&queue_priorities)];

        let device_extensions = [ash::khr::swapchain::NAME.as_ptr()];
        let rasterizer_features = RasterizerFeatures::from_supported(&supported);
        let features = rasterizer_features
            .to_vk()
            .sampler_anisotropy(supported.sampler_anisotropy == vk::TRUE);

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extensions)
            .enabled_features(&features);

        let device = instance
            .instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| init_failed("Failed to create logical device", e))?;

        let graphics_queue = device.get_device_queue(queue_family, 0);

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        });
        let allocator = match allocator {
            Ok(allocator) => allocator,
            Err(e) => {
                device.destroy_device(None);
                engine_error!("aurora::vulkan", "Failed to create GPU allocator: {:?}", e);
                return Err(Error::InitializationFailed(format!("Failed to create GPU allocator: {:?}", e)));
            }
        };

        let pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(queue_family)
            .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        let upload_command_pool = match device.create_command_pool(&pool_info, None) {
            Ok(pool) => pool,
            Err(e) => {
                drop(allocator);
                device.destroy_device(None);
                return Err(init_failed("Failed to create upload command pool", e));
            }
        };

        Ok(GpuContext::new(
            instance,
            physical_device,
            device,
            allocator,
            graphics_queue,
            queue_family,
            upload_command_pool,
            rasterizer_features,
        ))
    }
}

#[cfg(test)]
#[path = "vulkan_device_tests.rs"]
mod tests;

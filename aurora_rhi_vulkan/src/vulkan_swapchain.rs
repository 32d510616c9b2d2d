/// Swapchain - Vulkan implementation of the RHI Swapchain trait
///
/// Owns its window surface. Handles image acquisition, presentation, and
/// swapchain recreation on resize.

use std::any::Any;
use std::cell::Cell;
use std::sync::Arc;

use ash::vk;
use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{
    is_valid_resolution, needs_resize, DeviceLimits, Format, PresentFlags, PresentMode,
    Swapchain, SwapchainDesc, WindowTarget,
};
use aurora_rhi::{engine_debug, engine_err, engine_error, engine_warn};

use crate::vulkan_context::{init_failed, GpuContext};
use crate::vulkan_format::{format_to_vk, vk_to_format};

/// Number of frames that can be processed concurrently
const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Where the image held by the swapchain is between acquire and present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ImageState {
    /// No image held
    #[default]
    Released,
    /// Acquired; its acquire semaphore is signaled and nothing waits on it yet
    Acquired,
    /// A submit waited on the acquire semaphore and signals render-finished
    Rendered,
}

impl ImageState {
    /// A submit may consume the acquire semaphore only once per image
    pub(crate) fn check_submit(self) -> Result<()> {
        match self {
            ImageState::Acquired => Ok(()),
            ImageState::Released => Err(Error::InvalidArgument(
                "submit to a swapchain without an acquired image".to_string(),
            )),
            ImageState::Rendered => Err(Error::InvalidArgument(
                "swapchain image already submitted, present it before the next submit".to_string(),
            )),
        }
    }
}

// ============================================================================
// Selection helpers
// ============================================================================

pub fn present_mode_to_vk(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
    }
}

/// Resolve the requested present mode against what the surface supports
///
/// FIFO is always available; a missing mode falls back to it and the
/// returned flags carry FIFO in place of the dropped mode.
pub fn choose_present_mode(flags: PresentFlags, available: &[vk::PresentModeKHR]) -> (vk::PresentModeKHR, PresentFlags) {
    let requested = flags.present_mode();
    let mode = present_mode_to_vk(requested);
    if requested == PresentMode::Fifo || available.contains(&mode) {
        return (mode, flags);
    }

    engine_warn!(
        "aurora::vulkan",
        "Present mode {:?} is not supported by the surface, falling back to FIFO",
        requested
    );
    let mode_bits = PresentFlags::IMMEDIATE | PresentFlags::MAILBOX | PresentFlags::FIFO | PresentFlags::FIFO_RELAXED;
    (vk::PresentModeKHR::FIFO, (flags - mode_bits) | PresentFlags::FIFO)
}

/// Requested format if the surface offers it, else the closest UNORM/sRGB sibling
pub fn choose_surface_format(requested: Format, available: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    let wanted = format_to_vk(requested);
    let fallbacks = if requested.is_srgb() {
        [wanted, vk::Format::B8G8R8A8_SRGB, vk::Format::R8G8B8A8_SRGB]
    } else {
        [wanted, vk::Format::B8G8R8A8_UNORM, vk::Format::R8G8B8A8_UNORM]
    };

    fallbacks.iter().find_map(|format| {
        available
            .iter()
            .find(|surface_format| surface_format.format == *format)
            .copied()
    })
}

/// Clamp the buffer count to the surface limits (max 0 means unbounded)
pub fn choose_image_count(requested: u32, capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = requested.max(capabilities.min_image_count);
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

/// Surface-imposed extent, or the requested size clamped to the surface limits
pub fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, width: u32, height: u32) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        capabilities.current_extent
    } else {
        vk::Extent2D {
            width: width.clamp(capabilities.min_image_extent.width, capabilities.max_image_extent.width),
            height: height.clamp(capabilities.min_image_extent.height, capabilities.max_image_extent.height),
        }
    }
}

// ============================================================================
// Swapchain
// ============================================================================

/// Vulkan swapchain implementation
pub struct VulkanSwapchain {
    context: Arc<GpuContext>,

    /// Surface
    surface: vk::SurfaceKHR,

    /// Swapchain
    swapchain: vk::SwapchainKHR,
    swapchain_loader: ash::khr::swapchain::Device,
    swapchain_images: Vec<vk::Image>,
    swapchain_image_views: Vec<vk::ImageView>,
    surface_format: vk::SurfaceFormatKHR,
    present_mode: vk::PresentModeKHR,
    extent: vk::Extent2D,

    requested_buffer_count: u32,
    present_flags: PresentFlags,
    max_dimension: u32,
    debug_name: String,

    /// One semaphore per frame in flight (for acquire)
    image_available_semaphores: Vec<vk::Semaphore>,
    /// One semaphore per swapchain image (for present)
    render_finished_semaphores: Vec<vk::Semaphore>,

    /// Current frame in flight
    current_frame: usize,
    /// Image returned by the last acquire
    current_image: u32,
    /// Advanced by acquire, submit and present
    state: Cell<ImageState>,
}

impl VulkanSwapchain {
    pub fn new(
        context: Arc<GpuContext>,
        desc: &SwapchainDesc,
        window: &WindowTarget,
        limits: DeviceLimits,
    ) -> Result<Self> {
        let instance = &context.instance;
        let surface = unsafe {
            ash_window::create_surface(
                &instance.entry,
                &instance.instance,
                window.raw_display_handle(),
                window.raw_window_handle(),
                None,
            )
            .map_err(|e| init_failed("Failed to create window surface", e))?
        };

        // The surface is destroyed by Drop from here on
        let swapchain_loader = ash::khr::swapchain::Device::new(&instance.instance, &context.device);
        let mut swapchain = Self {
            context: Arc::clone(&context),
            surface,
            swapchain: vk::SwapchainKHR::null(),
            swapchain_loader,
            swapchain_images: Vec::new(),
            swapchain_image_views: Vec::new(),
            surface_format: vk::SurfaceFormatKHR::default(),
            present_mode: vk::PresentModeKHR::FIFO,
            extent: vk::Extent2D { width: desc.width, height: desc.height },
            requested_buffer_count: desc.buffer_count,
            present_flags: desc.flags,
            max_dimension: limits.max_texture_dimension_2d,
            debug_name: desc.debug_name.clone(),
            image_available_semaphores: Vec::with_capacity(MAX_FRAMES_IN_FLIGHT),
            render_finished_semaphores: Vec::new(),
            current_frame: 0,
            current_image: 0,
            state: Cell::new(ImageState::Released),
        };

        swapchain.select_surface_settings(desc)?;
        swapchain.build(desc.width, desc.height)?;

        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            let semaphore = swapchain.create_semaphore()?;
            swapchain.image_available_semaphores.push(semaphore);
        }

        Ok(swapchain)
    }

    fn select_surface_settings(&mut self, desc: &SwapchainDesc) -> Result<()> {
        let surface_loader = &self.context.instance.surface_loader;
        let physical_device = self.context.physical_device;

        let (formats, present_modes) = unsafe {
            let formats = surface_loader
                .get_physical_device_surface_formats(physical_device, self.surface)
                .map_err(|e| init_failed("Failed to get surface formats", e))?;
            let present_modes = surface_loader
                .get_physical_device_surface_present_modes(physical_device, self.surface)
                .map_err(|e| init_failed("Failed to get surface present modes", e))?;
            (formats, present_modes)
        };

        self.surface_format = choose_surface_format(desc.format, &formats).ok_or_else(|| {
            engine_error!("aurora::vulkan", "Surface supports neither {:?} nor an 8-bit RGBA fallback", desc.format);
            Error::InitializationFailed(format!("{:?} is not presentable on this surface", desc.format))
        })?;
        if vk_to_format(self.surface_format.format) != desc.format {
            engine_warn!(
                "aurora::vulkan",
                "Swapchain format {:?} unsupported, using {:?}",
                desc.format,
                self.surface_format.format
            );
        }

        let (present_mode, flags) = choose_present_mode(desc.flags, &present_modes);
        self.present_mode = present_mode;
        self.present_flags = flags;
        Ok(())
    }

    fn create_semaphore(&self) -> Result<vk::Semaphore> {
        unsafe {
            self.context
                .device
                .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
                .map_err(|e| init_failed("Failed to create swapchain semaphore", e))
        }
    }

    /// (Re)create the native swapchain, its views and per-image semaphores
    fn build(&mut self, width: u32, height: u32) -> Result<()> {
        let device = &self.context.device;
        let surface_loader = &self.context.instance.surface_loader;

        unsafe {
            let capabilities = surface_loader
                .get_physical_device_surface_capabilities(self.context.physical_device, self.surface)
                .map_err(|e| init_failed("Failed to get surface capabilities", e))?;

            let extent = choose_extent(&capabilities, width, height);
            let image_count = choose_image_count(self.requested_buffer_count, &capabilities);

            let old_swapchain = self.swapchain;
            let create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(self.surface)
                .min_image_count(image_count)
                .image_format(self.surface_format.format)
                .image_color_space(self.surface_format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST)
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(self.present_mode)
                .clipped(true)
                .old_swapchain(old_swapchain);

            let swapchain = self
                .swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(|e| init_failed("Failed to create swapchain", e))?;

            if old_swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(old_swapchain, None);
            }
            self.swapchain = swapchain;
            self.extent = extent;

            self.swapchain_images = self
                .swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| init_failed("Failed to get swapchain images", e))?;

            for &image in &self.swapchain_images {
                let create_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(self.surface_format.format)
                    .components(vk::ComponentMapping::default())
                    .subresource_range(color_range());

                let view = device
                    .create_image_view(&create_info, None)
                    .map_err(|e| init_failed("Failed to create swapchain image view", e))?;
                self.swapchain_image_views.push(view);
            }

            while self.render_finished_semaphores.len() < self.swapchain_images.len() {
                let semaphore = self.create_semaphore()?;
                self.render_finished_semaphores.push(semaphore);
            }
        }

        self.context.set_object_name(self.swapchain, &self.debug_name);
        for (index, &image) in self.swapchain_images.iter().enumerate() {
            self.context.set_object_name(image, &format!("{}[{}]", self.debug_name, index));
        }

        self.current_image = 0;
        self.state.set(ImageState::Released);
        Ok(())
    }

    fn destroy_views(&mut self) {
        unsafe {
            for view in self.swapchain_image_views.drain(..) {
                self.context.device.destroy_image_view(view, None);
            }
        }
    }

    /// Rebuild after the surface reported out-of-date
    fn rebuild(&mut self, width: u32, height: u32) -> Result<()> {
        self.drain_pending_semaphore()?;
        self.context.wait_idle()?;
        self.destroy_views();
        self.build(width, height)
    }

    /// Queue a batch that waits on `wait` and optionally signals `signal`
    fn submit_semaphores(&self, wait: vk::Semaphore, signal: Option<vk::Semaphore>) -> Result<()> {
        let wait_semaphores = [wait];
        let wait_stages = [vk::PipelineStageFlags::ALL_COMMANDS];
        let signal_semaphores: Vec<vk::Semaphore> = signal.into_iter().collect();
        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .signal_semaphores(&signal_semaphores);
        unsafe {
            self.context
                .device
                .queue_submit(self.context.graphics_queue, &[submit_info], vk::Fence::null())
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to submit swapchain semaphore batch: {:?}", e))
        }
    }

    /// Unsignal whichever semaphore the held image left signaled, before a rebuild
    fn drain_pending_semaphore(&self) -> Result<()> {
        match self.state.get() {
            ImageState::Released => Ok(()),
            ImageState::Acquired => self.submit_semaphores(self.image_available_semaphores[self.current_frame], None),
            ImageState::Rendered => {
                self.submit_semaphores(self.render_finished_semaphores[self.current_image as usize], None)
            }
        }
    }

    /// Image acquired last, target of `clear_swapchain`
    pub fn current_vk_image(&self) -> vk::Image {
        self.swapchain_images[self.current_image as usize]
    }

    pub fn current_image_view(&self) -> vk::ImageView {
        self.swapchain_image_views[self.current_image as usize]
    }

    pub fn vk_format(&self) -> vk::Format {
        self.surface_format.format
    }

    pub fn vk_present_mode(&self) -> vk::PresentModeKHR {
        self.present_mode
    }

    /// (wait, signal) semaphores for a submit that renders to the current image
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` unless an image is acquired and not yet submitted.
    pub(crate) fn sync_info(&self) -> Result<(vk::Semaphore, vk::Semaphore)> {
        self.state.get().check_submit()?;
        Ok((
            self.image_available_semaphores[self.current_frame],
            self.render_finished_semaphores[self.current_image as usize],
        ))
    }

    pub(crate) fn mark_rendered(&self) {
        self.state.set(ImageState::Rendered);
    }
}

impl Swapchain for VulkanSwapchain {
    fn width(&self) -> u32 {
        self.extent.width
    }

    fn height(&self) -> u32 {
        self.extent.height
    }

    fn buffer_count(&self) -> u32 {
        self.swapchain_images.len() as u32
    }

    fn format(&self) -> Format {
        vk_to_format(self.surface_format.format)
    }

    fn present_flags(&self) -> PresentFlags {
        self.present_flags
    }

    fn acquire_next_image(&mut self) -> Result<u32> {
        // A failed frame keeps its image until present; hand it out again
        if self.state.get() != ImageState::Released {
            engine_debug!("aurora::vulkan", "Image {} not presented yet, reusing it", self.current_image);
            return Ok(self.current_image);
        }

        for attempt in 0..2 {
            let result = unsafe {
                self.swapchain_loader.acquire_next_image(
                    self.swapchain,
                    u64::MAX,
                    self.image_available_semaphores[self.current_frame],
                    vk::Fence::null(),
                )
            };

            match result {
                Ok((image_index, _suboptimal)) => {
                    self.current_image = image_index;
                    self.state.set(ImageState::Acquired);
                    return Ok(image_index);
                }
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) if attempt == 0 => {
                    engine_warn!("aurora::vulkan", "Swapchain out of date during acquire, rebuilding");
                    self.rebuild(self.extent.width, self.extent.height)?;
                }
                Err(e) => {
                    return Err(engine_err!("aurora::vulkan", "Failed to acquire next swapchain image: {:?}", e));
                }
            }
        }
        Err(engine_err!("aurora::vulkan", "Swapchain still out of date after rebuild"))
    }

    fn current_image(&self) -> u32 {
        self.current_image
    }

    fn present(&mut self) -> Result<()> {
        match self.state.get() {
            ImageState::Released => {
                return Err(Error::InvalidArgument("present called without an acquired image".to_string()));
            }
            // Nothing rendered this image: pass the acquire wait through to present
            ImageState::Acquired => {
                let (wait, signal) = self.sync_info()?;
                self.submit_semaphores(wait, Some(signal))?;
                self.mark_rendered();
            }
            ImageState::Rendered => {}
        }

        let swapchains = [self.swapchain];
        let image_indices = [self.current_image];
        let wait_semaphores = [self.render_finished_semaphores[self.current_image as usize]];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe { self.swapchain_loader.queue_present(self.context.graphics_queue, &present_info) };
        self.state.set(ImageState::Released);
        self.current_frame = (self.current_frame + 1) % MAX_FRAMES_IN_FLIGHT;

        match result {
            Ok(false) => Ok(()),
            Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                engine_warn!("aurora::vulkan", "Swapchain suboptimal or out of date after present, rebuilding");
                self.rebuild(self.extent.width, self.extent.height)
            }
            Err(e) => Err(engine_err!("aurora::vulkan", "Failed to present swapchain image: {:?}", e)),
        }
    }

    fn resize(&mut self, width: u32, height: u32, force: bool) -> Result<bool> {
        if !needs_resize((self.extent.width, self.extent.height), (width, height), force) {
            return Ok(false);
        }
        if !is_valid_resolution(width, height, self.max_dimension) {
            return Err(Error::InvalidArgument(format!(
                "swapchain size {}x{} is outside 1..={}",
                width, height, self.max_dimension
            )));
        }

        self.rebuild(width, height)?;
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for VulkanSwapchain {
    fn drop(&mut self) {
        unsafe {
            // Wait for device to finish
            self.context.device.device_wait_idle().ok();

            for &semaphore in self.image_available_semaphores.iter().chain(&self.render_finished_semaphores) {
                self.context.device.destroy_semaphore(semaphore, None);
            }
        }
        self.destroy_views();
        unsafe {
            if self.swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(self.swapchain, None);
            }
            self.context.instance.surface_loader.destroy_surface(self.surface, None);
        }
    }
}

pub(crate) fn color_range() -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask: vk::ImageAspectFlags::COLOR,
        base_mip_level: 0,
        level_count: 1,
        base_array_layer: 0,
        layer_count: 1,
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;

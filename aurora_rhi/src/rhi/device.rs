/// Device trait, device configuration and adapter registration

use std::any::Any;

use crate::error::Result;
use crate::rhi::{
    AdapterHandle, BlendState, BlendStateDesc, CommandList, DepthStencilState,
    DepthStencilStateDesc, Display, DisplayMode, Format, Gpu, GpuList, GpuType,
    RasterizerState, RasterizerStateDesc, RenderApi, Swapchain, SwapchainDesc, Texture,
    TextureDesc, WindowTarget,
};

// ============================================================================
// Configuration
// ============================================================================

/// Device creation options
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Application name (reported to the driver where the API allows it)
    pub app_name: String,
    /// Enable validation / debug layers (retried without them when missing)
    pub enable_debug_layer: bool,
    /// D3D11: serialize immediate-context calls in the driver
    pub enable_multithread_protection: bool,
    /// Format used to query display modes
    pub display_format: Format,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            app_name: "Crescent Application".to_string(),
            enable_debug_layer: cfg!(debug_assertions),
            enable_multithread_protection: false,
            display_format: Format::R8G8B8A8_UNORM,
        }
    }
}

/// Capabilities read from the selected adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    pub max_texture_dimension_2d: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        // D3D_FL11_0 guarantee, also the Vulkan floor on desktop drivers
        Self { max_texture_dimension_2d: 16384 }
    }
}

/// False for a zero dimension or one above `max_dimension`
pub fn is_valid_resolution(width: u32, height: u32, max_dimension: u32) -> bool {
    width > 0 && height > 0 && width <= max_dimension && height <= max_dimension
}

// ============================================================================
// Adapter registration
// ============================================================================

/// One adapter as reported by the native enumeration API
#[derive(Debug, Clone)]
pub struct AdapterDesc {
    pub vendor_id: u32,
    pub name: String,
    pub memory_bytes: u64,
    pub gpu_type: GpuType,
    pub handle: AdapterHandle,
    /// `None` when display-mode enumeration failed for this adapter
    pub display_modes: Option<Vec<DisplayMode>>,
}

/// Register enumerated adapters and select the primary one
///
/// Every adapter whose display modes could be enumerated registers them in
/// the returned [`Display`] and counts as presentable.
///
/// # Errors
///
/// `Error::NoAdapter` when `adapters` is empty.
pub fn register_adapters<I>(adapters: I) -> Result<(GpuList, Display)>
where
    I: IntoIterator<Item = AdapterDesc>,
{
    let mut gpus = GpuList::new();
    let mut display = Display::new();

    for adapter in adapters {
        let presentable = match &adapter.display_modes {
            Some(modes) => {
                for mode in modes {
                    display.register_display_mode(*mode);
                }
                true
            }
            None => false,
        };
        gpus.register_gpu(Gpu::new(
            adapter.vendor_id,
            adapter.name,
            adapter.memory_bytes,
            adapter.gpu_type,
            adapter.handle,
            presentable,
        ));
    }

    gpus.select_primary()?;
    Ok((gpus, display))
}

// ============================================================================
// Device trait
// ============================================================================

/// Logical device of one backend
///
/// Owns the adapter list and the display modes, and is the factory for every
/// other RHI object. Dropping it releases the native device once every child
/// object is gone.
pub trait Device {
    fn render_api(&self) -> RenderApi;

    /// All adapters, largest memory first
    fn gpus(&self) -> &GpuList;

    /// Adapter the device was created on
    fn primary_gpu(&self) -> Option<&Gpu> {
        self.gpus().primary()
    }

    /// Display modes gathered during adapter enumeration
    fn display(&self) -> &Display;

    fn limits(&self) -> DeviceLimits;

    fn is_valid_resolution(&self, width: u32, height: u32) -> bool {
        is_valid_resolution(width, height, self.limits().max_texture_dimension_2d)
    }

    /// Create a swapchain bound to `window`
    ///
    /// The resolution and buffer count are validated before any native call.
    fn create_swapchain(
        &mut self,
        desc: &SwapchainDesc,
        window: &WindowTarget,
    ) -> Result<Box<dyn Swapchain>>;

    /// Create a texture and the views its flags request
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Box<dyn Texture>>;

    fn create_rasterizer_state(
        &mut self,
        desc: &RasterizerStateDesc,
    ) -> Result<Box<dyn RasterizerState>>;

    fn create_depth_stencil_state(
        &mut self,
        desc: &DepthStencilStateDesc,
    ) -> Result<Box<dyn DepthStencilState>>;

    fn create_blend_state(&mut self, desc: &BlendStateDesc) -> Result<Box<dyn BlendState>>;

    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>>;

    /// Submit a closed command list
    ///
    /// With a swapchain, the submission waits for the image acquired by
    /// `Swapchain::acquire_next_image` and signals its presentation.
    fn submit(
        &mut self,
        command_list: &mut dyn CommandList,
        swapchain: Option<&dyn Swapchain>,
    ) -> Result<()>;

    /// Block until the GPU finished every submitted command
    fn wait_idle(&self) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;

/// Renderer - selects the backend and drives frames
///
/// The renderer is the composition root of the RHI: it builds the backend
/// named in its configuration, the device, the swapchain, the default state
/// objects and one command list, then records and presents frames.

use glam::Vec4;

use crate::error::{Error, Result};
use crate::{engine_error, engine_info};
use crate::rhi::{
    Backend, BackendRegistry, BlendState, BlendStateDesc, CommandList, DepthStencilState,
    DepthStencilStateDesc, Device, DeviceConfig, Format, PresentFlags, RasterizerState,
    RasterizerStateDesc, RenderApi, ScissorRect, Swapchain, SwapchainDesc, Viewport,
    WindowTarget,
};

// ============================================================================
// Configuration
// ============================================================================

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Graphics API, read once at creation
    pub render_api: RenderApi,
    pub device: DeviceConfig,
    pub swapchain_buffer_count: u32,
    pub present_flags: PresentFlags,
    pub swapchain_format: Format,
    /// Clamp the frame-rate ceiling to the fastest registered display mode
    pub update_fps_limit_to_highest_hertz: bool,
    pub clear_color: Vec4,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            render_api: RenderApi::default(),
            device: DeviceConfig::default(),
            swapchain_buffer_count: 2,
            present_flags: PresentFlags::default(),
            swapchain_format: Format::B8G8R8A8_UNORM,
            update_fps_limit_to_highest_hertz: true,
            clear_color: Vec4::new(0.1, 0.1, 0.15, 1.0),
        }
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Top-level frame orchestrator
///
/// Field order is drop order: GPU objects go before the device that made them.
pub struct Renderer {
    command_list: Box<dyn CommandList>,
    rasterizer_state: Box<dyn RasterizerState>,
    depth_stencil_state: Box<dyn DepthStencilState>,
    blend_state: Box<dyn BlendState>,
    swapchain: Box<dyn Swapchain>,
    device: Box<dyn Device>,
    backend: Box<dyn Backend>,
    config: RendererConfig,
    viewport: Viewport,
    fps_limit: Option<u32>,
    frame_count: u64,
}

impl Renderer {
    /// Build the whole RHI stack for `window`
    ///
    /// # Errors
    ///
    /// Backend selection, device creation and every object creation are
    /// fatal; the first failure is returned.
    pub fn new(registry: &BackendRegistry, config: RendererConfig, window: &WindowTarget) -> Result<Self> {
        let backend = registry.create_backend(config.render_api)?;
        let mut device = backend.create_device(&config.device, window).map_err(|e| {
            engine_error!("aurora::Renderer", "{} device creation failed: {}", backend.name(), e);
            e
        })?;

        if let Some(gpu) = device.primary_gpu() {
            engine_info!(
                "aurora::Renderer",
                "{} device on {} ({} MB, {})",
                backend.name(),
                gpu.name(),
                gpu.memory_mb(),
                gpu.vendor().name()
            );
        }

        let fps_limit = if config.update_fps_limit_to_highest_hertz {
            let hertz = device.display().highest_hertz();
            (hertz > 0).then_some(hertz)
        } else {
            None
        };

        let (width, height) = (window.width(), window.height());
        if !device.is_valid_resolution(width, height) {
            return Err(Error::InvalidArgument(format!(
                "window size {}x{} is not a valid back buffer resolution",
                width, height
            )));
        }

        let swapchain_desc = SwapchainDesc {
            width,
            height,
            buffer_count: config.swapchain_buffer_count,
            format: config.swapchain_format,
            flags: config.present_flags,
            debug_name: "main_swapchain".to_string(),
        };
        let swapchain = device.create_swapchain(&swapchain_desc, window)?;

        let rasterizer_state = device.create_rasterizer_state(&RasterizerStateDesc::cull_back())?;
        let depth_stencil_state = device.create_depth_stencil_state(&DepthStencilStateDesc::read_write())?;
        let blend_state = device.create_blend_state(&BlendStateDesc::disabled())?;
        let command_list = device.create_command_list()?;

        engine_info!(
            "aurora::Renderer",
            "Renderer ready: {}x{}, {} buffers, present {:?}",
            swapchain.width(),
            swapchain.height(),
            swapchain.buffer_count(),
            swapchain.present_flags().present_mode()
        );

        Ok(Self {
            command_list,
            rasterizer_state,
            depth_stencil_state,
            blend_state,
            swapchain,
            device,
            backend,
            config,
            viewport: Viewport::new(width, height),
            fps_limit,
            frame_count: 0,
        })
    }

    pub fn render_api(&self) -> RenderApi {
        self.backend.render_api()
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn device(&self) -> &dyn Device {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> &mut dyn Device {
        self.device.as_mut()
    }

    pub fn swapchain(&self) -> &dyn Swapchain {
        self.swapchain.as_ref()
    }

    pub fn command_list(&self) -> &dyn CommandList {
        self.command_list.as_ref()
    }

    pub fn rasterizer_state(&self) -> &dyn RasterizerState {
        self.rasterizer_state.as_ref()
    }

    pub fn depth_stencil_state(&self) -> &dyn DepthStencilState {
        self.depth_stencil_state.as_ref()
    }

    pub fn blend_state(&self) -> &dyn BlendState {
        self.blend_state.as_ref()
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frame-rate ceiling in Hz, `None` when unlimited
    pub fn fps_limit(&self) -> Option<u32> {
        self.fps_limit
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.config.clear_color = color;
    }

    /// Follow a window resize
    ///
    /// A zero dimension (minimized window) only empties the viewport; frames
    /// are skipped until the window has a size again. Returns whether the
    /// swapchain was rebuilt.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<bool> {
        if width == 0 || height == 0 {
            self.viewport = Viewport::new(0, 0);
            return Ok(false);
        }
        let rebuilt = self.swapchain.resize(width, height, false)?;
        self.viewport = Viewport::new(width, height);
        if rebuilt {
            engine_info!("aurora::Renderer", "Swapchain resized to {}x{}", width, height);
        }
        Ok(rebuilt)
    }

    /// Acquire, clear, submit and present one frame
    pub fn render_frame(&mut self) -> Result<()> {
        if !self.viewport.is_defined() {
            return Ok(());
        }

        self.swapchain.acquire_next_image()?;

        let cmd = self.command_list.as_mut();
        cmd.begin()?;
        cmd.set_viewport(&self.viewport)?;
        cmd.set_scissor(&ScissorRect::from(&self.viewport))?;
        cmd.clear_swapchain(self.swapchain.as_ref(), self.config.clear_color)?;
        cmd.end()?;

        self.device.submit(cmd, Some(self.swapchain.as_ref()))?;
        self.swapchain.present()?;

        self.frame_count += 1;
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            engine_error!("aurora::Renderer", "wait_idle failed during shutdown: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;

/// Mock backend for unit tests (no GPU required)
///
/// Implements every RHI trait in memory so the registry, the adapter
/// selection and the renderer frame loop can be tested without a driver.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;
use glam::Vec4;

use crate::error::{Error, Result};
use crate::rhi::{
    no_pipeline_bound, not_recording, needs_resize, register_adapters, AdapterDesc, AdapterHandle, Backend,
    BackendRegistry, BlendState, BlendStateDesc, CommandList, DepthStencilState,
    DepthStencilStateDesc, Device, DeviceConfig, DeviceLimits, Display, DisplayMode, Format,
    GpuList, GpuType, PresentFlags, RasterizerState, RasterizerStateDesc, RenderApi,
    ScissorRect, Swapchain, SwapchainDesc, Texture, TextureDesc, TextureInfo, TextureViews,
    Viewport, WindowTarget,
};

// ============================================================================
// Mock Backend
// ============================================================================

/// Adapter reported by the mock enumeration
#[derive(Debug, Clone)]
pub struct MockAdapter {
    pub name: String,
    pub memory_mb: u64,
    /// `None` simulates a failed display-mode enumeration
    pub display_modes: Option<Vec<DisplayMode>>,
}

impl MockAdapter {
    pub fn new(name: &str, memory_mb: u64, display_modes: Option<Vec<DisplayMode>>) -> Self {
        Self { name: name.to_string(), memory_mb, display_modes }
    }
}

pub struct MockBackend {
    pub api: RenderApi,
    pub adapters: Vec<MockAdapter>,
    pub limits: DeviceLimits,
    pub tearing_supported: bool,
    pub fail_device: bool,
}

impl MockBackend {
    pub fn new(api: RenderApi) -> Self {
        Self {
            api,
            adapters: vec![MockAdapter::new(
                "Mock GPU",
                4096,
                Some(vec![
                    DisplayMode::from_hertz(1920, 1080, 60),
                    DisplayMode::from_hertz(1920, 1080, 144),
                ]),
            )],
            limits: DeviceLimits::default(),
            tearing_supported: true,
            fail_device: false,
        }
    }

    /// Registry with a default mock backend for each API in `apis`
    pub fn registry(apis: &[RenderApi]) -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        for &api in apis {
            registry.register(api, move || Box::new(MockBackend::new(api)));
        }
        registry
    }
}

impl Backend for MockBackend {
    fn render_api(&self) -> RenderApi {
        self.api
    }

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn create_device(&self, _config: &DeviceConfig, _window: &WindowTarget) -> Result<Box<dyn Device>> {
        if self.fail_device {
            return Err(Error::InitializationFailed("mock device creation failed".to_string()));
        }
        let adapters = self.adapters.iter().enumerate().map(|(index, adapter)| AdapterDesc {
            vendor_id: 0x1414,
            name: adapter.name.clone(),
            memory_bytes: adapter.memory_mb * 1024 * 1024,
            gpu_type: GpuType::Virtual,
            handle: AdapterHandle(index as u64),
            display_modes: adapter.display_modes.clone(),
        });
        let (gpus, display) = register_adapters(adapters)?;
        Ok(Box::new(MockDevice {
            api: self.api,
            gpus,
            display,
            limits: self.limits,
            tearing_supported: self.tearing_supported,
            submissions: 0,
            presented_submissions: 0,
            idle_waits: Rc::new(Cell::new(0)),
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock Device
// ============================================================================

pub struct MockDevice {
    pub api: RenderApi,
    pub gpus: GpuList,
    pub display: Display,
    pub limits: DeviceLimits,
    pub tearing_supported: bool,
    pub submissions: u32,
    pub presented_submissions: u32,
    /// Shared with the swapchains so resizes can be checked for a GPU wait
    pub idle_waits: Rc<Cell<u32>>,
}

impl Device for MockDevice {
    fn render_api(&self) -> RenderApi {
        self.api
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

    fn create_swapchain(&mut self, desc: &SwapchainDesc, _window: &WindowTarget) -> Result<Box<dyn Swapchain>> {
        desc.validate()?;
        if !self.is_valid_resolution(desc.width, desc.height) {
            return Err(Error::InvalidArgument(format!(
                "invalid swapchain resolution {}x{}",
                desc.width, desc.height
            )));
        }
        Ok(Box::new(MockSwapchain {
            width: desc.width,
            height: desc.height,
            buffer_count: desc.buffer_count,
            format: desc.format,
            flags: desc.flags.validated(self.tearing_supported, "aurora::mock"),
            max_dimension: self.limits.max_texture_dimension_2d,
            current: 0,
            acquires: 0,
            presents: 0,
            rebuilds: 0,
            idle_waits: self.idle_waits.clone(),
        }))
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Box<dyn Texture>> {
        let views = desc.validate()?;
        Ok(Box::new(MockTexture {
            info: TextureInfo::from(desc),
            views,
            name: desc.debug_name.clone(),
            uploaded_bytes: desc.data.as_ref().map(Vec::len).unwrap_or(0),
        }))
    }

    fn create_rasterizer_state(&mut self, desc: &RasterizerStateDesc) -> Result<Box<dyn RasterizerState>> {
        Ok(Box::new(MockRasterizerState { desc: *desc }))
    }

    fn create_depth_stencil_state(&mut self, desc: &DepthStencilStateDesc) -> Result<Box<dyn DepthStencilState>> {
        Ok(Box::new(MockDepthStencilState { desc: *desc }))
    }

    fn create_blend_state(&mut self, desc: &BlendStateDesc) -> Result<Box<dyn BlendState>> {
        Ok(Box::new(MockBlendState { desc: *desc }))
    }

    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(MockCommandList::new()))
    }

    fn submit(&mut self, command_list: &mut dyn CommandList, swapchain: Option<&dyn Swapchain>) -> Result<()> {
        if command_list.is_recording() {
            return Err(Error::InvalidArgument("command list submitted while recording".to_string()));
        }
        if command_list.as_any().downcast_ref::<MockCommandList>().is_none() {
            return Err(Error::InvalidResource("command list from another backend".to_string()));
        }
        self.submissions += 1;
        if swapchain.is_some() {
            self.presented_submissions += 1;
        }
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.idle_waits.set(self.idle_waits.get() + 1);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock Swapchain
// ============================================================================

pub struct MockSwapchain {
    pub width: u32,
    pub height: u32,
    pub buffer_count: u32,
    pub format: Format,
    pub flags: PresentFlags,
    pub max_dimension: u32,
    pub current: u32,
    pub acquires: u32,
    pub presents: u32,
    pub rebuilds: u32,
    pub idle_waits: Rc<Cell<u32>>,
}

impl Swapchain for MockSwapchain {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn buffer_count(&self) -> u32 {
        self.buffer_count
    }

    fn format(&self) -> Format {
        self.format
    }

    fn present_flags(&self) -> PresentFlags {
        self.flags
    }

    fn acquire_next_image(&mut self) -> Result<u32> {
        self.current = self.acquires % self.buffer_count;
        self.acquires += 1;
        Ok(self.current)
    }

    fn current_image(&self) -> u32 {
        self.current
    }

    fn present(&mut self) -> Result<()> {
        self.presents += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32, force: bool) -> Result<bool> {
        if !needs_resize((self.width, self.height), (width, height), force) {
            return Ok(false);
        }
        if !crate::rhi::is_valid_resolution(width, height, self.max_dimension) {
            return Err(Error::InvalidArgument(format!("invalid swapchain resolution {}x{}", width, height)));
        }
        self.idle_waits.set(self.idle_waits.get() + 1);
        self.width = width;
        self.height = height;
        self.rebuilds += 1;
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub views: TextureViews,
    pub name: String,
    pub uploaded_bytes: usize,
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn views(&self) -> TextureViews {
        self.views
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock States
// ============================================================================

pub struct MockRasterizerState {
    pub desc: RasterizerStateDesc,
}

impl RasterizerState for MockRasterizerState {
    fn desc(&self) -> &RasterizerStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct MockDepthStencilState {
    pub desc: DepthStencilStateDesc,
}

impl DepthStencilState for MockDepthStencilState {
    fn desc(&self) -> &DepthStencilStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct MockBlendState {
    pub desc: BlendStateDesc,
}

impl BlendState for MockBlendState {
    fn desc(&self) -> &BlendStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    Begin,
    End,
    SetViewport(Viewport),
    SetScissor(ScissorRect),
    ClearRenderTarget(Vec4),
    ClearDepthStencil(f32, u8),
    ClearSwapchain { image: u32, color: Vec4 },
}

#[derive(Debug, Default)]
pub struct MockCommandList {
    pub recording: bool,
    pub commands: Vec<MockCommand>,
}

impl MockCommandList {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_recording(&self, operation: &str) -> Result<()> {
        if self.recording {
            Ok(())
        } else {
            Err(not_recording(operation))
        }
    }

    fn record(&mut self, operation: &str, command: MockCommand) -> Result<()> {
        self.ensure_recording(operation)?;
        self.commands.push(command);
        Ok(())
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        self.commands.clear();
        self.recording = true;
        self.commands.push(MockCommand::Begin);
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.record("end", MockCommand::End)?;
        self.recording = false;
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn set_viewport(&mut self, viewport: &Viewport) -> Result<()> {
        self.record("set_viewport", MockCommand::SetViewport(*viewport))
    }

    fn set_scissor(&mut self, rect: &ScissorRect) -> Result<()> {
        self.record("set_scissor", MockCommand::SetScissor(*rect))
    }

    fn clear_render_target(&mut self, texture: &dyn Texture, color: Vec4) -> Result<()> {
        if !texture.views().rtv {
            return Err(Error::InvalidResource("texture has no render target view".to_string()));
        }
        self.record("clear_render_target", MockCommand::ClearRenderTarget(color))
    }

    fn clear_depth_stencil(&mut self, texture: &dyn Texture, depth: f32, stencil: u8) -> Result<()> {
        if !texture.views().dsv {
            return Err(Error::InvalidResource("texture has no depth stencil view".to_string()));
        }
        self.record("clear_depth_stencil", MockCommand::ClearDepthStencil(depth, stencil))
    }

    fn clear_swapchain(&mut self, swapchain: &dyn Swapchain, color: Vec4) -> Result<()> {
        let image = swapchain.current_image();
        self.record("clear_swapchain", MockCommand::ClearSwapchain { image, color })
    }

    fn draw(&mut self, _vertex_count: u32, _instance_count: u32, _first_vertex: u32, _first_instance: u32) -> Result<()> {
        self.ensure_recording("draw")?;
        Err(no_pipeline_bound("draw"))
    }

    fn draw_indexed(
        &mut self,
        _index_count: u32,
        _instance_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _first_instance: u32,
    ) -> Result<()> {
        self.ensure_recording("draw_indexed")?;
        Err(no_pipeline_bound("draw_indexed"))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Headless window target (no native window behind the handles)
pub fn headless_window(width: u32, height: u32) -> WindowTarget {
    use raw_window_handle::{RawDisplayHandle, RawWindowHandle, WebDisplayHandle, WebWindowHandle};
    WindowTarget::from_raw(
        RawDisplayHandle::Web(WebDisplayHandle::new()),
        RawWindowHandle::Web(WebWindowHandle::new(1)),
        width,
        height,
    )
}

#[cfg(test)]
#[path = "mock_backend_tests.rs"]
mod tests;

/// Direct3D 11 device
///
/// The immediate context lives in [`D3D11Context`], shared through an `Arc`
/// with every swapchain, texture and command list of the device.

use std::any::Any;
use std::sync::Arc;

use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{
    BlendState, BlendStateDesc, CommandList, DepthStencilState, DepthStencilStateDesc, Device,
    DeviceConfig, DeviceLimits, Display, GpuList, RasterizerState, RasterizerStateDesc, RenderApi,
    Swapchain, SwapchainDesc, Texture, TextureDesc, WindowTarget,
};
use aurora_rhi::{engine_info, engine_warn};
use windows::core::Interface;
use windows::Win32::Foundation::{BOOL, E_INVALIDARG, HMODULE};
use windows::Win32::Graphics::Direct3D::{D3D_DRIVER_TYPE_UNKNOWN, D3D_FEATURE_LEVEL, WKPDID_D3DDebugObjectName};
use windows::Win32::Graphics::Direct3D11::{
    D3D11CreateDevice, ID3D11Device, ID3D11DeviceChild, ID3D11DeviceContext, ID3D11Multithread,
    D3D11_CREATE_DEVICE_BGRA_SUPPORT, D3D11_CREATE_DEVICE_DEBUG, D3D11_CREATE_DEVICE_FLAG,
    D3D11_QUERY_DESC, D3D11_QUERY_EVENT, D3D11_SDK_VERSION,
};
use windows::Win32::Graphics::Dxgi::{IDXGIAdapter1, IDXGIFactory1, DXGI_ERROR_SDK_COMPONENT_MISSING};

use crate::d3d11_command_list::D3D11CommandList;
use crate::d3d11_state::{D3D11BlendState, D3D11DepthStencilState, D3D11RasterizerState};
use crate::d3d11_swapchain::D3D11Swapchain;
use crate::d3d11_texture::D3D11Texture;
use crate::dxgi::{self, hr_error, init_error};
use crate::dxgi_tables::{feature_level_name, max_texture_dimension, D3D11_FEATURE_LEVELS};

pub(crate) const SOURCE: &str = "aurora::d3d11";

/// Native objects shared by a D3D11 device and its children
pub struct D3D11Context {
    pub device: ID3D11Device,
    pub immediate_context: ID3D11DeviceContext,
    pub factory: IDXGIFactory1,
    pub feature_level: D3D_FEATURE_LEVEL,
    pub tearing_supported: bool,
    pub debug_layer: bool,
}

impl D3D11Context {
    /// Flush the immediate context and block until the GPU reaches the flush point
    pub fn wait_idle(&self) -> Result<()> {
        let desc = D3D11_QUERY_DESC { Query: D3D11_QUERY_EVENT, MiscFlags: 0 };
        let mut query = None;
        unsafe { self.device.CreateQuery(&desc, Some(&mut query)) }
            .map_err(|e| hr_error(SOURCE, "Failed to create idle query", e))?;
        let query = query.ok_or_else(|| Error::BackendError("CreateQuery returned no query".to_string()))?;

        unsafe {
            self.immediate_context.End(&query);
            self.immediate_context.Flush();
        }
        loop {
            let mut done = BOOL::default();
            unsafe {
                self.immediate_context.GetData(
                    &query,
                    Some(&mut done as *mut BOOL as *mut std::ffi::c_void),
                    std::mem::size_of::<BOOL>() as u32,
                    0,
                )
            }
            .map_err(|e| hr_error(SOURCE, "Failed to wait for the GPU", e))?;
            if done.as_bool() {
                return Ok(());
            }
            std::thread::yield_now();
        }
    }

    /// Attach a debug name to a device child (visible in graphics debuggers)
    pub fn set_debug_name<T: Interface>(&self, object: &T, name: &str) {
        if name.is_empty() {
            return;
        }
        let Ok(child) = object.cast::<ID3D11DeviceChild>() else {
            return;
        };
        let result = unsafe {
            child.SetPrivateData(
                &WKPDID_D3DDebugObjectName,
                name.len() as u32,
                Some(name.as_ptr() as *const std::ffi::c_void),
            )
        };
        if let Err(e) = result {
            engine_warn!(SOURCE, "Failed to set debug name '{}': {}", name, e.message());
        }
    }
}

/// Direct3D 11 implementation of the RHI device
pub struct D3D11Device {
    context: Arc<D3D11Context>,
    gpus: GpuList,
    display: Display,
    limits: DeviceLimits,
}

impl D3D11Device {
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        let factory = dxgi::create_factory()?;
        let (adapter, gpus, display) = dxgi::select_adapter(&factory, config.display_format)?;

        let (device, immediate_context, feature_level, debug_layer) =
            create_device(&adapter, config.enable_debug_layer)?;

        if config.enable_multithread_protection {
            enable_multithread_protection(&immediate_context);
        }

        let tearing_supported = dxgi::tearing_supported(&factory);
        let limits = DeviceLimits {
            max_texture_dimension_2d: max_texture_dimension(feature_level.0),
        };

        if let Some(gpu) = gpus.primary() {
            engine_info!(
                SOURCE,
                "Device created on {} ({} MB, feature level {}, debug layer {})",
                gpu.name(),
                gpu.memory_mb(),
                feature_level_name(feature_level.0),
                if debug_layer { "on" } else { "off" }
            );
        }

        Ok(Self {
            context: Arc::new(D3D11Context {
                device,
                immediate_context,
                factory,
                feature_level,
                tearing_supported,
                debug_layer,
            }),
            gpus,
            display,
            limits,
        })
    }

    pub fn context(&self) -> &Arc<D3D11Context> {
        &self.context
    }
}

/// Create the device with the best feature level available
///
/// Retried without the debug layer when the SDK layers are not installed, and
/// without 11_1 on runtimes that do not know it.
fn create_device(
    adapter: &IDXGIAdapter1,
    debug: bool,
) -> Result<(ID3D11Device, ID3D11DeviceContext, D3D_FEATURE_LEVEL, bool)> {
    let levels: Vec<D3D_FEATURE_LEVEL> = D3D11_FEATURE_LEVELS.iter().map(|level| D3D_FEATURE_LEVEL(*level)).collect();

    let attempt = |levels: &[D3D_FEATURE_LEVEL], debug: bool| {
        let mut flags: D3D11_CREATE_DEVICE_FLAG = D3D11_CREATE_DEVICE_BGRA_SUPPORT;
        if debug {
            flags |= D3D11_CREATE_DEVICE_DEBUG;
        }
        let mut device = None;
        let mut context = None;
        let mut feature_level = D3D_FEATURE_LEVEL::default();
        unsafe {
            D3D11CreateDevice(
                adapter,
                D3D_DRIVER_TYPE_UNKNOWN,
                HMODULE::default(),
                flags,
                Some(levels),
                D3D11_SDK_VERSION,
                Some(&mut device),
                Some(&mut feature_level),
                Some(&mut context),
            )
        }
        .map(|()| (device, context, feature_level))
    };

    let mut debug = debug;
    let mut levels: &[D3D_FEATURE_LEVEL] = &levels;
    let created = loop {
        match attempt(levels, debug) {
            Ok(created) => break created,
            Err(e) if debug && e.code() == DXGI_ERROR_SDK_COMPONENT_MISSING => {
                engine_warn!(SOURCE, "D3D11 debug layer is not installed, continuing without it");
                debug = false;
            }
            Err(e) if e.code() == E_INVALIDARG && levels.len() > 1 => {
                // Pre-11.1 runtimes reject the whole list when it contains 11_1
                levels = &levels[1..];
            }
            Err(e) => return Err(init_error(SOURCE, "D3D11CreateDevice failed", e)),
        }
    };

    match created {
        (Some(device), Some(context), feature_level) => Ok((device, context, feature_level, debug)),
        _ => Err(Error::InitializationFailed("D3D11CreateDevice returned no device".to_string())),
    }
}

/// Serialize immediate-context calls in the driver, or warn and go on without it
fn enable_multithread_protection(context: &ID3D11DeviceContext) {
    match context.cast::<ID3D11Multithread>() {
        Ok(multithread) => unsafe {
            multithread.SetMultithreadProtected(BOOL::from(true));
        },
        Err(e) => {
            engine_warn!(SOURCE, "ID3D11Multithread unavailable, multithread protection disabled: {}", e.message());
        }
    }
}

impl Device for D3D11Device {
    fn render_api(&self) -> RenderApi {
        RenderApi::DirectX11
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
        Ok(Box::new(D3D11Swapchain::new(Arc::clone(&self.context), desc, window, self.limits)?))
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Box<dyn Texture>> {
        if !self.is_valid_resolution(desc.width, desc.height) {
            return Err(Error::InvalidArgument(format!(
                "texture '{}' size {}x{} is outside 1..={}",
                desc.debug_name, desc.width, desc.height, self.limits.max_texture_dimension_2d
            )));
        }
        Ok(Box::new(D3D11Texture::new(&self.context, desc)?))
    }

    fn create_rasterizer_state(&mut self, desc: &RasterizerStateDesc) -> Result<Box<dyn RasterizerState>> {
        Ok(Box::new(D3D11RasterizerState::new(&self.context, desc)?))
    }

    fn create_depth_stencil_state(&mut self, desc: &DepthStencilStateDesc) -> Result<Box<dyn DepthStencilState>> {
        Ok(Box::new(D3D11DepthStencilState::new(&self.context, desc)?))
    }

    fn create_blend_state(&mut self, desc: &BlendStateDesc) -> Result<Box<dyn BlendState>> {
        Ok(Box::new(D3D11BlendState::new(&self.context, desc)?))
    }

    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(D3D11CommandList::new(&self.context)?))
    }

    fn submit(&mut self, command_list: &mut dyn CommandList, _swapchain: Option<&dyn Swapchain>) -> Result<()> {
        let cmd = command_list
            .as_any_mut()
            .downcast_mut::<D3D11CommandList>()
            .ok_or_else(|| Error::InvalidResource("command list was not created by the D3D11 device".to_string()))?;
        if cmd.is_recording() {
            return Err(Error::InvalidArgument("submit called on a command list still recording".to_string()));
        }

        // The immediate context orders the work before the next Present
        let recorded = cmd
            .take_recorded()
            .ok_or_else(|| Error::InvalidArgument("command list has nothing recorded".to_string()))?;
        unsafe {
            self.context.immediate_context.ExecuteCommandList(&recorded, BOOL::from(false));
        }
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.context.wait_idle()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Swapchain - Direct3D 11 implementation of the RHI Swapchain trait
///
/// D3D11 always renders into buffer 0; DXGI rotates the buffers on Present.
/// The acquired index only counts frames around the chain.

use std::any::Any;
use std::sync::Arc;

use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{
    is_valid_resolution, needs_resize, DeviceLimits, Format, PresentFlags, Swapchain,
    SwapchainDesc, WindowTarget,
};
use aurora_rhi::{engine_debug, engine_warn};
use windows::core::Interface;
use windows::Win32::Foundation::BOOL;
use windows::Win32::Graphics::Direct3D11::{
    ID3D11RenderTargetView, ID3D11Texture2D, D3D11_RENDER_TARGET_VIEW_DESC,
    D3D11_RENDER_TARGET_VIEW_DESC_0, D3D11_RTV_DIMENSION_TEXTURE2D, D3D11_TEX2D_RTV,
};
use windows::Win32::Graphics::Dxgi::Common::{
    DXGI_ALPHA_MODE_UNSPECIFIED, DXGI_FORMAT, DXGI_SAMPLE_DESC,
};
use windows::Win32::Graphics::Dxgi::{
    IDXGIFactory2, IDXGIOutput, IDXGISwapChain1, DXGI_PRESENT, DXGI_SCALING_STRETCH, DXGI_SWAP_CHAIN_DESC1,
    DXGI_SWAP_CHAIN_FLAG, DXGI_SWAP_EFFECT, DXGI_USAGE_RENDER_TARGET_OUTPUT,
};

use crate::d3d11_device::{D3D11Context, SOURCE};
use crate::dxgi::{self, hr_error, init_error};
use crate::dxgi_tables::{present_parameters, swap_chain_flags, swap_effect_value, swapchain_formats};

/// Direct3D 11 swapchain implementation
pub struct D3D11Swapchain {
    context: Arc<D3D11Context>,
    swapchain: IDXGISwapChain1,
    rtv: Option<ID3D11RenderTargetView>,
    width: u32,
    height: u32,
    buffer_count: u32,
    format: Format,
    buffer_format: DXGI_FORMAT,
    view_format: DXGI_FORMAT,
    present_flags: PresentFlags,
    max_dimension: u32,
    debug_name: String,
    current_image: u32,
}

impl D3D11Swapchain {
    pub fn new(
        context: Arc<D3D11Context>,
        desc: &SwapchainDesc,
        window: &WindowTarget,
        limits: DeviceLimits,
    ) -> Result<Self> {
        let hwnd = dxgi::hwnd(window)?;
        let present_flags = desc.flags.validated(context.tearing_supported, SOURCE);
        let flip = present_flags.swap_effect().is_flip();

        // Flip-model chains need at least two buffers
        let buffer_count = if flip && desc.buffer_count < 2 {
            engine_debug!(SOURCE, "Flip-model swapchain raised from {} to 2 buffers", desc.buffer_count);
            2
        } else {
            desc.buffer_count
        };

        let (buffer_format, view_format) = swapchain_formats(desc.format, flip);
        let native_desc = DXGI_SWAP_CHAIN_DESC1 {
            Width: desc.width,
            Height: desc.height,
            Format: DXGI_FORMAT(buffer_format),
            Stereo: BOOL::from(false),
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: buffer_count,
            Scaling: DXGI_SCALING_STRETCH,
            SwapEffect: DXGI_SWAP_EFFECT(swap_effect_value(present_flags.swap_effect())),
            AlphaMode: DXGI_ALPHA_MODE_UNSPECIFIED,
            Flags: swap_chain_flags(present_flags),
        };

        let factory = context
            .factory
            .cast::<IDXGIFactory2>()
            .map_err(|e| init_error(SOURCE, "IDXGIFactory2 is not available", e))?;
        let swapchain = unsafe { factory.CreateSwapChainForHwnd(&context.device, hwnd, &native_desc, None, None::<&IDXGIOutput>) }
            .map_err(|e| init_error(SOURCE, "CreateSwapChainForHwnd failed", e))?;

        let mut swapchain = Self {
            context,
            swapchain,
            rtv: None,
            width: desc.width,
            height: desc.height,
            buffer_count,
            format: desc.format,
            buffer_format: DXGI_FORMAT(buffer_format),
            view_format: DXGI_FORMAT(view_format),
            present_flags,
            max_dimension: limits.max_texture_dimension_2d,
            debug_name: desc.debug_name.clone(),
            current_image: 0,
        };
        swapchain.create_back_buffer_view()?;
        Ok(swapchain)
    }

    fn create_back_buffer_view(&mut self) -> Result<()> {
        let buffer: ID3D11Texture2D = unsafe { self.swapchain.GetBuffer(0) }
            .map_err(|e| hr_error(SOURCE, "Failed to get swapchain back buffer", e))?;

        let view_desc = D3D11_RENDER_TARGET_VIEW_DESC {
            Format: self.view_format,
            ViewDimension: D3D11_RTV_DIMENSION_TEXTURE2D,
            Anonymous: D3D11_RENDER_TARGET_VIEW_DESC_0 { Texture2D: D3D11_TEX2D_RTV { MipSlice: 0 } },
        };
        let mut rtv = None;
        unsafe { self.context.device.CreateRenderTargetView(&buffer, Some(&view_desc), Some(&mut rtv)) }
            .map_err(|e| hr_error(SOURCE, "Failed to create back buffer view", e))?;

        self.context.set_debug_name(&buffer, &self.debug_name);
        self.rtv = rtv;
        Ok(())
    }

    /// View of the back buffer, target of `clear_swapchain`
    pub fn rtv(&self) -> Option<&ID3D11RenderTargetView> {
        self.rtv.as_ref()
    }

    pub fn native(&self) -> &IDXGISwapChain1 {
        &self.swapchain
    }
}

impl Swapchain for D3D11Swapchain {
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
        self.present_flags
    }

    fn acquire_next_image(&mut self) -> Result<u32> {
        Ok(self.current_image)
    }

    fn current_image(&self) -> u32 {
        self.current_image
    }

    fn present(&mut self) -> Result<()> {
        let (sync_interval, flags) = present_parameters(self.present_flags);
        unsafe { self.swapchain.Present(sync_interval, DXGI_PRESENT(flags)) }
            .ok()
            .map_err(|e| hr_error(SOURCE, "Present failed", e))?;
        self.current_image = (self.current_image + 1) % self.buffer_count;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32, force: bool) -> Result<bool> {
        if !needs_resize((self.width, self.height), (width, height), force) {
            return Ok(false);
        }
        if !is_valid_resolution(width, height, self.max_dimension) {
            return Err(Error::InvalidArgument(format!(
                "swapchain size {}x{} is outside 1..={}",
                width, height, self.max_dimension
            )));
        }

        // Every reference to the back buffers must be gone before ResizeBuffers
        unsafe {
            self.context.immediate_context.ClearState();
        }
        self.rtv = None;
        self.context.wait_idle()?;

        let flags = swap_chain_flags(self.present_flags);
        if let Err(e) = unsafe {
            self.swapchain.ResizeBuffers(
                self.buffer_count,
                width,
                height,
                self.buffer_format,
                DXGI_SWAP_CHAIN_FLAG(flags as i32),
            )
        } {
            engine_warn!(SOURCE, "ResizeBuffers to {}x{} failed, keeping {}x{}", width, height, self.width, self.height);
            self.create_back_buffer_view()?;
            return Err(hr_error(SOURCE, "ResizeBuffers failed", e));
        }

        self.width = width;
        self.height = height;
        self.current_image = 0;
        self.create_back_buffer_view()?;
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

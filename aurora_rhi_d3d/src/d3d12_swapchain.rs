/// Swapchain - Direct3D 12 implementation of the RHI Swapchain trait
///
/// Always a flip-model chain created on the direct queue. Each back buffer
/// has its own RTV; the acquired index is `GetCurrentBackBufferIndex`.

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
use windows::Win32::Graphics::Direct3D12::{
    ID3D12Resource, D3D12_RENDER_TARGET_VIEW_DESC, D3D12_RENDER_TARGET_VIEW_DESC_0,
    D3D12_RTV_DIMENSION_TEXTURE2D, D3D12_TEX2D_RTV,
};
use windows::Win32::Graphics::Dxgi::Common::{DXGI_ALPHA_MODE_UNSPECIFIED, DXGI_FORMAT, DXGI_SAMPLE_DESC};
use windows::Win32::Graphics::Dxgi::{
    IDXGIFactory2, IDXGIOutput, IDXGISwapChain3, DXGI_PRESENT, DXGI_SCALING_STRETCH, DXGI_SWAP_CHAIN_DESC1,
    DXGI_SWAP_CHAIN_FLAG, DXGI_SWAP_EFFECT, DXGI_USAGE_RENDER_TARGET_OUTPUT,
};

use crate::d3d12_device::{D3D12Context, Descriptor, SOURCE};
use crate::dxgi::{self, hr_error, init_error};
use crate::dxgi_tables::{flip_only, present_parameters, swap_chain_flags, swap_effect_value, swapchain_formats};

/// Back buffer and the RTV pointing at it
struct BackBuffer {
    resource: ID3D12Resource,
    rtv: Descriptor,
}

/// Direct3D 12 swapchain implementation
pub struct D3D12Swapchain {
    context: Arc<D3D12Context>,
    swapchain: IDXGISwapChain3,
    buffers: Vec<BackBuffer>,
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

/// Replace a bitblt swap effect with flip-discard
fn force_flip_model(flags: PresentFlags) -> PresentFlags {
    let requested = flags.swap_effect();
    if flip_only(requested) == requested {
        return flags;
    }
    engine_warn!(SOURCE, "D3D12 swapchains use the flip model, {:?} replaced by FlipDiscard", requested);
    (flags - (PresentFlags::SWAP_DISCARD | PresentFlags::SWAP_SEQUENTIAL)) | PresentFlags::SWAP_FLIP_DISCARD
}

impl D3D12Swapchain {
    pub fn new(
        context: Arc<D3D12Context>,
        desc: &SwapchainDesc,
        window: &WindowTarget,
        limits: DeviceLimits,
    ) -> Result<Self> {
        let hwnd = dxgi::hwnd(window)?;
        let present_flags = force_flip_model(desc.flags.validated(context.tearing_supported, SOURCE));

        let buffer_count = if desc.buffer_count < 2 {
            engine_debug!(SOURCE, "Flip-model swapchain raised from {} to 2 buffers", desc.buffer_count);
            2
        } else {
            desc.buffer_count
        };

        let (buffer_format, view_format) = swapchain_formats(desc.format, true);
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
        // D3D12 swapchains are created against the queue that presents them
        let swapchain = unsafe { factory.CreateSwapChainForHwnd(&context.queue, hwnd, &native_desc, None, None::<&IDXGIOutput>) }
            .map_err(|e| init_error(SOURCE, "CreateSwapChainForHwnd failed", e))?;
        let swapchain: IDXGISwapChain3 = swapchain
            .cast()
            .map_err(|e| init_error(SOURCE, "IDXGISwapChain3 is not available", e))?;

        let mut swapchain = Self {
            context,
            current_image: unsafe { swapchain.GetCurrentBackBufferIndex() },
            swapchain,
            buffers: Vec::new(),
            width: desc.width,
            height: desc.height,
            buffer_count,
            format: desc.format,
            buffer_format: DXGI_FORMAT(buffer_format),
            view_format: DXGI_FORMAT(view_format),
            present_flags,
            max_dimension: limits.max_texture_dimension_2d,
            debug_name: desc.debug_name.clone(),
        };
        swapchain.create_back_buffers()?;
        Ok(swapchain)
    }

    fn create_back_buffers(&mut self) -> Result<()> {
        let view_desc = D3D12_RENDER_TARGET_VIEW_DESC {
            Format: self.view_format,
            ViewDimension: D3D12_RTV_DIMENSION_TEXTURE2D,
            Anonymous: D3D12_RENDER_TARGET_VIEW_DESC_0 { Texture2D: D3D12_TEX2D_RTV { MipSlice: 0, PlaneSlice: 0 } },
        };

        for index in 0..self.buffer_count {
            let resource: ID3D12Resource = unsafe { self.swapchain.GetBuffer(index) }
                .map_err(|e| hr_error(SOURCE, "Failed to get swapchain back buffer", e))?;
            let rtv = self.context.rtv_heap.allocate()?;
            unsafe {
                self.context.device.CreateRenderTargetView(&resource, Some(&view_desc), rtv.handle);
            }
            self.context.set_debug_name(&resource, &format!("{} [{}]", self.debug_name, index));
            self.buffers.push(BackBuffer { resource, rtv });
        }
        Ok(())
    }

    fn release_back_buffers(&mut self) {
        for buffer in self.buffers.drain(..) {
            self.context.rtv_heap.free(buffer.rtv);
        }
    }

    fn current_buffer_entry(&self) -> Result<&BackBuffer> {
        self.buffers
            .get(self.current_image as usize)
            .ok_or_else(|| Error::InvalidResource("swapchain has no back buffer for the current image".to_string()))
    }

    /// Back buffer of the acquired image
    pub fn current_buffer(&self) -> Result<&ID3D12Resource> {
        self.current_buffer_entry().map(|b| &b.resource)
    }

    /// RTV of the acquired image, target of `clear_swapchain`
    pub fn current_rtv(&self) -> Result<Descriptor> {
        self.current_buffer_entry().map(|b| b.rtv)
    }

    pub fn native(&self) -> &IDXGISwapChain3 {
        &self.swapchain
    }
}

impl Swapchain for D3D12Swapchain {
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
        self.current_image = unsafe { self.swapchain.GetCurrentBackBufferIndex() };
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
        self.current_image = unsafe { self.swapchain.GetCurrentBackBufferIndex() };
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
        self.context.wait_idle()?;
        self.release_back_buffers();

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
            self.create_back_buffers()?;
            return Err(hr_error(SOURCE, "ResizeBuffers failed", e));
        }

        self.width = width;
        self.height = height;
        self.current_image = unsafe { self.swapchain.GetCurrentBackBufferIndex() };
        self.create_back_buffers()?;
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for D3D12Swapchain {
    fn drop(&mut self) {
        if let Err(e) = self.context.wait_idle() {
            engine_warn!(SOURCE, "Queue did not drain before swapchain destruction: {}", e);
        }
        self.release_back_buffers();
    }
}

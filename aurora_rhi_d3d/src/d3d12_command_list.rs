/// CommandList - Direct3D 12 implementation of the RHI CommandList trait
///
/// One allocator per list. `begin` waits for the previous submission of the
/// list before resetting the allocator, so a list may be re-recorded every
/// frame. Textures rest in `COMMON` and back buffers in `PRESENT`; clears
/// wrap themselves in the transitions they need.

use std::any::Any;
use std::sync::Arc;

use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{no_pipeline_bound, not_recording, CommandList, ScissorRect, Swapchain, Texture, Viewport};
use aurora_rhi::engine_warn;
use aurora_rhi::glam::Vec4;
use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D12::{
    ID3D12CommandAllocator, ID3D12GraphicsCommandList, ID3D12PipelineState, ID3D12Resource,
    D3D12_CLEAR_FLAGS, D3D12_CLEAR_FLAG_DEPTH, D3D12_CLEAR_FLAG_STENCIL, D3D12_COMMAND_LIST_TYPE_DIRECT,
    D3D12_RESOURCE_STATES, D3D12_RESOURCE_STATE_COMMON, D3D12_RESOURCE_STATE_DEPTH_WRITE,
    D3D12_RESOURCE_STATE_PRESENT, D3D12_RESOURCE_STATE_RENDER_TARGET, D3D12_VIEWPORT,
};

use crate::d3d12_device::{transition_barrier, D3D12Context, SOURCE};
use crate::d3d12_swapchain::D3D12Swapchain;
use crate::d3d12_texture::D3D12Texture;
use crate::dxgi::hr_error;

/// Direct3D 12 command list implementation
pub struct D3D12CommandList {
    context: Arc<D3D12Context>,
    allocator: ID3D12CommandAllocator,
    list: ID3D12GraphicsCommandList,
    last_submitted: u64,
    ready: bool,
    is_recording: bool,
}

impl D3D12CommandList {
    pub fn new(context: Arc<D3D12Context>) -> Result<Self> {
        let allocator: ID3D12CommandAllocator = unsafe { context.device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT) }
            .map_err(|e| hr_error(SOURCE, "Failed to create command allocator", e))?;
        let list: ID3D12GraphicsCommandList = unsafe {
            context.device.CreateCommandList(0, D3D12_COMMAND_LIST_TYPE_DIRECT, &allocator, None::<&ID3D12PipelineState>)
        }
        .map_err(|e| hr_error(SOURCE, "Failed to create command list", e))?;
        // Lists are created open; `begin` expects a closed one
        unsafe { list.Close() }.map_err(|e| hr_error(SOURCE, "Failed to close new command list", e))?;

        Ok(Self {
            context,
            allocator,
            list,
            last_submitted: 0,
            ready: false,
            is_recording: false,
        })
    }

    pub fn native(&self) -> &ID3D12GraphicsCommandList {
        &self.list
    }

    /// Closed with commands that have not been submitted yet
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Record the fence value the queue signals once this list has executed
    pub(crate) fn mark_submitted(&mut self, fence_value: u64) {
        self.last_submitted = fence_value;
        self.ready = false;
    }

    fn ensure_recording(&self, operation: &str) -> Result<()> {
        if self.is_recording {
            Ok(())
        } else {
            Err(not_recording(operation))
        }
    }

    fn downcast_texture<'a>(texture: &'a dyn Texture) -> Result<&'a D3D12Texture> {
        texture
            .as_any()
            .downcast_ref::<D3D12Texture>()
            .ok_or_else(|| Error::InvalidResource("texture was not created by the D3D12 device".to_string()))
    }

    fn transition(&self, resource: &ID3D12Resource, before: D3D12_RESOURCE_STATES, after: D3D12_RESOURCE_STATES) {
        unsafe {
            self.list.ResourceBarrier(&[transition_barrier(resource, before, after)]);
        }
    }
}

impl CommandList for D3D12CommandList {
    fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(Error::InvalidArgument("command list already recording".to_string()));
        }

        // The allocator may only be reset once the GPU is done with it
        self.context.wait_for(self.last_submitted)?;
        unsafe { self.allocator.Reset() }.map_err(|e| hr_error(SOURCE, "Failed to reset command allocator", e))?;
        unsafe { self.list.Reset(&self.allocator, None::<&ID3D12PipelineState>) }
            .map_err(|e| hr_error(SOURCE, "Failed to reset command list", e))?;

        self.ready = false;
        self.is_recording = true;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.ensure_recording("end")?;
        self.is_recording = false;
        unsafe { self.list.Close() }.map_err(|e| hr_error(SOURCE, "Failed to close command list", e))?;
        self.ready = true;
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.is_recording
    }

    fn set_viewport(&mut self, viewport: &Viewport) -> Result<()> {
        self.ensure_recording("set_viewport")?;
        if !viewport.is_defined() {
            return Ok(());
        }

        let native = D3D12_VIEWPORT {
            TopLeftX: viewport.x,
            TopLeftY: viewport.y,
            Width: viewport.width,
            Height: viewport.height,
            MinDepth: viewport.min_depth,
            MaxDepth: viewport.max_depth,
        };
        unsafe {
            self.list.RSSetViewports(&[native]);
        }
        Ok(())
    }

    fn set_scissor(&mut self, rect: &ScissorRect) -> Result<()> {
        self.ensure_recording("set_scissor")?;

        let native = RECT {
            left: rect.x,
            top: rect.y,
            right: rect.x + rect.width as i32,
            bottom: rect.y + rect.height as i32,
        };
        unsafe {
            self.list.RSSetScissorRects(&[native]);
        }
        Ok(())
    }

    fn clear_render_target(&mut self, texture: &dyn Texture, color: Vec4) -> Result<()> {
        self.ensure_recording("clear_render_target")?;
        let texture = Self::downcast_texture(texture)?;
        let rtv = texture.rtv_handle().ok_or_else(|| {
            Error::InvalidArgument("clear_render_target needs a texture created with RT_COLOR".to_string())
        })?;

        let rgba = color.to_array();
        self.transition(texture.resource(), D3D12_RESOURCE_STATE_COMMON, D3D12_RESOURCE_STATE_RENDER_TARGET);
        unsafe {
            self.list.ClearRenderTargetView(rtv, rgba.as_ptr(), None);
        }
        self.transition(texture.resource(), D3D12_RESOURCE_STATE_RENDER_TARGET, D3D12_RESOURCE_STATE_COMMON);
        Ok(())
    }

    fn clear_depth_stencil(&mut self, texture: &dyn Texture, depth: f32, stencil: u8) -> Result<()> {
        self.ensure_recording("clear_depth_stencil")?;
        let texture = Self::downcast_texture(texture)?;
        let dsv = texture.dsv_handle().ok_or_else(|| {
            Error::InvalidArgument("clear_depth_stencil needs a texture created with RT_DEPTH_STENCIL".to_string())
        })?;

        let mut flags = D3D12_CLEAR_FLAG_DEPTH.0;
        if texture.info().format.has_stencil() {
            flags |= D3D12_CLEAR_FLAG_STENCIL.0;
        }
        self.transition(texture.resource(), D3D12_RESOURCE_STATE_COMMON, D3D12_RESOURCE_STATE_DEPTH_WRITE);
        unsafe {
            self.list.ClearDepthStencilView(dsv, D3D12_CLEAR_FLAGS(flags), depth, stencil, None);
        }
        self.transition(texture.resource(), D3D12_RESOURCE_STATE_DEPTH_WRITE, D3D12_RESOURCE_STATE_COMMON);
        Ok(())
    }

    fn clear_swapchain(&mut self, swapchain: &dyn Swapchain, color: Vec4) -> Result<()> {
        self.ensure_recording("clear_swapchain")?;
        let swapchain = swapchain
            .as_any()
            .downcast_ref::<D3D12Swapchain>()
            .ok_or_else(|| Error::InvalidResource("swapchain was not created by the D3D12 device".to_string()))?;
        let buffer = swapchain.current_buffer()?;
        let rtv = swapchain.current_rtv()?;

        let rgba = color.to_array();
        self.transition(buffer, D3D12_RESOURCE_STATE_PRESENT, D3D12_RESOURCE_STATE_RENDER_TARGET);
        unsafe {
            self.list.ClearRenderTargetView(rtv.handle, rgba.as_ptr(), None);
        }
        self.transition(buffer, D3D12_RESOURCE_STATE_RENDER_TARGET, D3D12_RESOURCE_STATE_PRESENT);
        Ok(())
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

impl Drop for D3D12CommandList {
    fn drop(&mut self) {
        if let Err(e) = self.context.wait_for(self.last_submitted) {
            engine_warn!(SOURCE, "Command list dropped while in flight: {}", e);
        }
    }
}

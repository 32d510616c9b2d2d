/// CommandList - Direct3D 11 implementation of the RHI CommandList trait
///
/// Records on a deferred context; `end` bakes an `ID3D11CommandList` that the
/// device executes on the immediate context at submit.

use std::any::Any;

use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{no_pipeline_bound, not_recording, CommandList, ScissorRect, Swapchain, Texture, Viewport};
use aurora_rhi::engine_debug;
use aurora_rhi::glam::Vec4;
use windows::Win32::Foundation::{BOOL, RECT};
use windows::Win32::Graphics::Direct3D11::{
    ID3D11CommandList, ID3D11DeviceContext, D3D11_CLEAR_DEPTH, D3D11_CLEAR_STENCIL, D3D11_VIEWPORT,
};

use crate::d3d11_device::{D3D11Context, SOURCE};
use crate::d3d11_swapchain::D3D11Swapchain;
use crate::d3d11_texture::D3D11Texture;
use crate::dxgi::hr_error;

/// Direct3D 11 command list implementation
pub struct D3D11CommandList {
    deferred: ID3D11DeviceContext,
    recorded: Option<ID3D11CommandList>,
    is_recording: bool,
}

impl D3D11CommandList {
    pub fn new(context: &D3D11Context) -> Result<Self> {
        let mut deferred = None;
        unsafe { context.device.CreateDeferredContext(0, Some(&mut deferred)) }
            .map_err(|e| hr_error(SOURCE, "CreateDeferredContext failed", e))?;
        let deferred = deferred
            .ok_or_else(|| Error::BackendError("CreateDeferredContext returned no context".to_string()))?;

        Ok(Self { deferred, recorded: None, is_recording: false })
    }

    /// Deferred context the list records on
    pub fn context(&self) -> &ID3D11DeviceContext {
        &self.deferred
    }

    /// Hand the baked list to the device; `None` until `end` succeeds
    pub(crate) fn take_recorded(&mut self) -> Option<ID3D11CommandList> {
        self.recorded.take()
    }

    fn ensure_recording(&self, operation: &str) -> Result<()> {
        if self.is_recording {
            Ok(())
        } else {
            Err(not_recording(operation))
        }
    }

    fn downcast_texture<'a>(texture: &'a dyn Texture) -> Result<&'a D3D11Texture> {
        texture
            .as_any()
            .downcast_ref::<D3D11Texture>()
            .ok_or_else(|| Error::InvalidResource("texture was not created by the D3D11 device".to_string()))
    }
}

impl CommandList for D3D11CommandList {
    fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(Error::InvalidArgument("command list already recording".to_string()));
        }
        if self.recorded.take().is_some() {
            engine_debug!(SOURCE, "Discarding a recorded command list that was never submitted");
        }

        unsafe {
            self.deferred.ClearState();
        }
        self.is_recording = true;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.ensure_recording("end")?;

        let mut recorded = None;
        let result = unsafe { self.deferred.FinishCommandList(BOOL::from(false), Some(&mut recorded)) };
        self.is_recording = false;
        result.map_err(|e| hr_error(SOURCE, "FinishCommandList failed", e))?;

        self.recorded = recorded;
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

        let native = D3D11_VIEWPORT {
            TopLeftX: viewport.x,
            TopLeftY: viewport.y,
            Width: viewport.width,
            Height: viewport.height,
            MinDepth: viewport.min_depth,
            MaxDepth: viewport.max_depth,
        };
        unsafe {
            self.deferred.RSSetViewports(Some(&[native]));
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
            self.deferred.RSSetScissorRects(Some(&[native]));
        }
        Ok(())
    }

    fn clear_render_target(&mut self, texture: &dyn Texture, color: Vec4) -> Result<()> {
        self.ensure_recording("clear_render_target")?;
        let texture = Self::downcast_texture(texture)?;
        let rtv = texture.rtv().ok_or_else(|| {
            Error::InvalidArgument("clear_render_target needs a texture created with RT_COLOR".to_string())
        })?;

        let rgba = color.to_array();
        unsafe {
            self.deferred.ClearRenderTargetView(rtv, rgba.as_ptr());
        }
        Ok(())
    }

    fn clear_depth_stencil(&mut self, texture: &dyn Texture, depth: f32, stencil: u8) -> Result<()> {
        self.ensure_recording("clear_depth_stencil")?;
        let texture = Self::downcast_texture(texture)?;
        let dsv = texture.dsv().ok_or_else(|| {
            Error::InvalidArgument("clear_depth_stencil needs a texture created with RT_DEPTH_STENCIL".to_string())
        })?;

        let mut flags = D3D11_CLEAR_DEPTH.0 as u32;
        if texture.info().format.has_stencil() {
            flags |= D3D11_CLEAR_STENCIL.0 as u32;
        }
        unsafe {
            self.deferred.ClearDepthStencilView(dsv, flags, depth, stencil);
        }
        Ok(())
    }

    fn clear_swapchain(&mut self, swapchain: &dyn Swapchain, color: Vec4) -> Result<()> {
        self.ensure_recording("clear_swapchain")?;
        let swapchain = swapchain
            .as_any()
            .downcast_ref::<D3D11Swapchain>()
            .ok_or_else(|| Error::InvalidResource("swapchain was not created by the D3D11 device".to_string()))?;
        let rtv = swapchain
            .rtv()
            .ok_or_else(|| Error::InvalidResource("swapchain has no back buffer view".to_string()))?;

        let rgba = color.to_array();
        unsafe {
            self.deferred.ClearRenderTargetView(rtv, rgba.as_ptr());
        }
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

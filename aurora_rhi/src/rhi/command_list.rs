/// Command list trait - GPU command recording

use std::any::Any;
use glam::Vec4;

use crate::error::Result;
use crate::rhi::{ScissorRect, Swapchain, Texture, Viewport};

/// Records GPU work for [`crate::rhi::Device::submit`]
///
/// Recording happens between `begin` and `end`; every recording call outside
/// that window fails. The RHI has no pipeline binding or render pass yet, so
/// `draw` and `draw_indexed` check the recording state and then fail with
/// [`no_pipeline_bound`] instead of recording an unbound draw.
pub trait CommandList {
    /// Reset the list and start recording
    fn begin(&mut self) -> Result<()>;

    /// Finish recording
    fn end(&mut self) -> Result<()>;

    fn is_recording(&self) -> bool;

    fn set_viewport(&mut self, viewport: &Viewport) -> Result<()>;

    fn set_scissor(&mut self, rect: &ScissorRect) -> Result<()>;

    /// Clear a texture created with `RT_COLOR`
    fn clear_render_target(&mut self, texture: &dyn Texture, color: Vec4) -> Result<()>;

    /// Clear a texture created with `RT_DEPTH_STENCIL`
    fn clear_depth_stencil(&mut self, texture: &dyn Texture, depth: f32, stencil: u8) -> Result<()>;

    /// Clear the back buffer acquired last on `swapchain`
    fn clear_swapchain(&mut self, swapchain: &dyn Swapchain, color: Vec4) -> Result<()>;

    /// Fails with [`no_pipeline_bound`] while recording
    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) -> Result<()>;

    /// Fails with [`no_pipeline_bound`] while recording
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Error returned by recording calls outside `begin`/`end`
pub fn not_recording(operation: &str) -> crate::error::Error {
    crate::error::Error::InvalidArgument(format!("{} called outside begin/end", operation))
}

/// Error returned by draw calls, which need a bound pipeline and render target
pub fn no_pipeline_bound(operation: &str) -> crate::error::Error {
    crate::error::Error::InvalidArgument(format!("{} needs a bound pipeline and render target", operation))
}

#[cfg(test)]
#[path = "command_list_tests.rs"]
mod tests;

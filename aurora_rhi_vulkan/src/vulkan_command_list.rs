/// CommandList - Vulkan implementation of the RHI CommandList trait
///
/// Owns one primary command buffer and the fence of its last submission.

use std::any::Any;
use std::sync::Arc;

use ash::vk;
use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{no_pipeline_bound, not_recording, CommandList, ScissorRect, Swapchain, Texture, Viewport};
use aurora_rhi::engine_err;
use aurora_rhi::glam::Vec4;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::full_aspect;
use crate::vulkan_swapchain::{color_range, VulkanSwapchain};
use crate::vulkan_texture::VulkanTexture;

/// Vulkan command list implementation
pub struct VulkanCommandList {
    context: Arc<GpuContext>,
    /// Command pool for allocating command buffers
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    /// Signaled once the last submission has finished (created signaled)
    fence: vk::Fence,
    is_recording: bool,
}

impl VulkanCommandList {
    pub fn new(context: Arc<GpuContext>) -> Result<Self> {
        let device = &context.device;
        unsafe {
            let command_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(context.graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = device
                .create_command_pool(&command_pool_create_info, None)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to create command pool: {:?}", e))?;

            let command_buffer_allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffer = match device.allocate_command_buffers(&command_buffer_allocate_info) {
                Ok(buffers) if !buffers.is_empty() => buffers[0],
                Ok(_) => {
                    device.destroy_command_pool(command_pool, None);
                    return Err(engine_err!("aurora::vulkan", "Driver returned no command buffer"));
                }
                Err(e) => {
                    device.destroy_command_pool(command_pool, None);
                    return Err(engine_err!("aurora::vulkan", "Failed to allocate command buffer: {:?}", e));
                }
            };

            let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);
            let fence = match device.create_fence(&fence_info, None) {
                Ok(fence) => fence,
                Err(e) => {
                    device.destroy_command_pool(command_pool, None);
                    return Err(engine_err!("aurora::vulkan", "Failed to create command list fence: {:?}", e));
                }
            };

            Ok(Self {
                context,
                command_pool,
                command_buffer,
                fence,
                is_recording: false,
            })
        }
    }

    /// Get the underlying Vulkan command buffer
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    pub(crate) fn fence(&self) -> vk::Fence {
        self.fence
    }

    /// Called by the device once the buffer is queued
    pub(crate) fn mark_submitted(&mut self) {
        self.is_recording = false;
    }

    /// Swap in a fresh signaled fence after a failed submission reset the old one
    pub(crate) fn recover_fence(&mut self) -> Result<()> {
        let device = &self.context.device;
        unsafe {
            let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);
            let fence = device
                .create_fence(&fence_info, None)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to recreate command list fence: {:?}", e))?;
            device.destroy_fence(self.fence, None);
            self.fence = fence;
        }
        Ok(())
    }

    fn ensure_recording(&self, operation: &str) -> Result<()> {
        if self.is_recording {
            Ok(())
        } else {
            Err(not_recording(operation))
        }
    }

    /// Barrier on a GENERAL image around a transfer clear
    fn general_barrier(
        &self,
        image: vk::Image,
        range: vk::ImageSubresourceRange,
        src_access: vk::AccessFlags,
        dst_access: vk::AccessFlags,
    ) {
        let barrier = vk::ImageMemoryBarrier::default()
            .old_layout(vk::ImageLayout::GENERAL)
            .new_layout(vk::ImageLayout::GENERAL)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image)
            .subresource_range(range)
            .src_access_mask(src_access)
            .dst_access_mask(dst_access);
        unsafe {
            self.context.device.cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }
    }

    fn downcast_texture<'a>(texture: &'a dyn Texture) -> Result<&'a VulkanTexture> {
        texture
            .as_any()
            .downcast_ref::<VulkanTexture>()
            .ok_or_else(|| Error::InvalidResource("texture was not created by the Vulkan device".to_string()))
    }
}

impl CommandList for VulkanCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(Error::InvalidArgument("command list already recording".to_string()));
        }

        let device = &self.context.device;
        unsafe {
            // The buffer may still be in flight from the previous frame
            device
                .wait_for_fences(&[self.fence], true, u64::MAX)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to wait for command list fence: {:?}", e))?;

            device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to reset command buffer: {:?}", e))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to begin command buffer: {:?}", e))?;
        }

        self.is_recording = true;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.ensure_recording("end")?;

        unsafe {
            self.context
                .device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to end command buffer: {:?}", e))?;
        }

        self.is_recording = false;
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.is_recording
    }

    fn set_viewport(&mut self, viewport: &Viewport) -> Result<()> {
        self.ensure_recording("set_viewport")?;
        // Vulkan rejects zero-sized viewports; a minimized window records nothing
        if !viewport.is_defined() {
            return Ok(());
        }

        let vk_viewport = vk::Viewport {
            x: viewport.x,
            y: viewport.y,
            width: viewport.width,
            height: viewport.height,
            min_depth: viewport.min_depth,
            max_depth: viewport.max_depth,
        };
        unsafe {
            self.context.device.cmd_set_viewport(self.command_buffer, 0, &[vk_viewport]);
        }
        Ok(())
    }

    fn set_scissor(&mut self, rect: &ScissorRect) -> Result<()> {
        self.ensure_recording("set_scissor")?;

        let vk_rect = vk::Rect2D {
            offset: vk::Offset2D { x: rect.x, y: rect.y },
            extent: vk::Extent2D { width: rect.width, height: rect.height },
        };
        unsafe {
            self.context.device.cmd_set_scissor(self.command_buffer, 0, &[vk_rect]);
        }
        Ok(())
    }

    fn clear_render_target(&mut self, texture: &dyn Texture, color: Vec4) -> Result<()> {
        self.ensure_recording("clear_render_target")?;
        let texture = Self::downcast_texture(texture)?;
        if !texture.views().rtv {
            return Err(Error::InvalidArgument("clear_render_target needs a texture created with RT_COLOR".to_string()));
        }

        let info = texture.info();
        let range = vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: info.array_layers,
        };
        let clear_color = vk::ClearColorValue { float32: color.to_array() };

        self.general_barrier(
            texture.image(),
            range,
            vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
            vk::AccessFlags::TRANSFER_WRITE,
        );
        unsafe {
            self.context.device.cmd_clear_color_image(
                self.command_buffer,
                texture.image(),
                vk::ImageLayout::GENERAL,
                &clear_color,
                &[range],
            );
        }
        self.general_barrier(
            texture.image(),
            range,
            vk::AccessFlags::TRANSFER_WRITE,
            vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
        );
        Ok(())
    }

    fn clear_depth_stencil(&mut self, texture: &dyn Texture, depth: f32, stencil: u8) -> Result<()> {
        self.ensure_recording("clear_depth_stencil")?;
        let texture = Self::downcast_texture(texture)?;
        if !texture.views().dsv {
            return Err(Error::InvalidArgument(
                "clear_depth_stencil needs a texture created with RT_DEPTH_STENCIL".to_string(),
            ));
        }

        let info = texture.info();
        let range = vk::ImageSubresourceRange {
            aspect_mask: full_aspect(info.format),
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: info.array_layers,
        };
        let clear_value = vk::ClearDepthStencilValue { depth, stencil: stencil as u32 };

        self.general_barrier(
            texture.image(),
            range,
            vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
            vk::AccessFlags::TRANSFER_WRITE,
        );
        unsafe {
            self.context.device.cmd_clear_depth_stencil_image(
                self.command_buffer,
                texture.image(),
                vk::ImageLayout::GENERAL,
                &clear_value,
                &[range],
            );
        }
        self.general_barrier(
            texture.image(),
            range,
            vk::AccessFlags::TRANSFER_WRITE,
            vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
        );
        Ok(())
    }

    fn clear_swapchain(&mut self, swapchain: &dyn Swapchain, color: Vec4) -> Result<()> {
        self.ensure_recording("clear_swapchain")?;
        let swapchain = swapchain
            .as_any()
            .downcast_ref::<VulkanSwapchain>()
            .ok_or_else(|| Error::InvalidResource("swapchain was not created by the Vulkan device".to_string()))?;

        let image = swapchain.current_vk_image();
        let range = color_range();
        let clear_color = vk::ClearColorValue { float32: color.to_array() };

        // Previous content is discarded, the whole image gets cleared
        let to_transfer = vk::ImageMemoryBarrier::default()
            .old_layout(vk::ImageLayout::UNDEFINED)
            .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image)
            .subresource_range(range)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE);
        let to_present = vk::ImageMemoryBarrier::default()
            .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
            .new_layout(vk::ImageLayout::PRESENT_SRC_KHR)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image)
            .subresource_range(range)
            .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
            .dst_access_mask(vk::AccessFlags::empty());

        let device = &self.context.device;
        unsafe {
            device.cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::TRANSFER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[to_transfer],
            );
            device.cmd_clear_color_image(
                self.command_buffer,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &clear_color,
                &[range],
            );
            device.cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::BOTTOM_OF_PIPE,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[to_present],
            );
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

impl Drop for VulkanCommandList {
    fn drop(&mut self) {
        unsafe {
            let device = &self.context.device;
            device.wait_for_fences(&[self.fence], true, u64::MAX).ok();
            device.destroy_fence(self.fence, None);
            // Frees the command buffer with it
            device.destroy_command_pool(self.command_pool, None);
        }
    }
}

/// Texture - Vulkan implementation of the RHI Texture trait
///
/// One image plus the views its flags request. Textures stay in the
/// `GENERAL` layout after creation, so clears and shader access need no
/// per-use transition tracking.

use std::any::Any;
use std::sync::Arc;

use ash::vk;
use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{Texture, TextureDesc, TextureInfo, TextureType, TextureViews};
use aurora_rhi::{engine_err, engine_error, engine_warn};
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{format_to_vk, full_aspect, sampled_aspect};

/// Image usage needed by the planned views
///
/// Always a transfer destination: uploads and clears both write through it.
pub fn image_usage(views: TextureViews) -> vk::ImageUsageFlags {
    let mut usage = vk::ImageUsageFlags::TRANSFER_DST;
    if views.srv {
        usage |= vk::ImageUsageFlags::SAMPLED;
    }
    if views.uav {
        usage |= vk::ImageUsageFlags::STORAGE;
    }
    if views.rtv {
        usage |= vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if views.dsv {
        usage |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
    }
    usage
}

/// View type for sampling; attachments and storage always see a 2D array for cubes
pub fn view_type(texture_type: TextureType, sampled: bool) -> vk::ImageViewType {
    match (texture_type, sampled) {
        (TextureType::Texture2D, _) => vk::ImageViewType::TYPE_2D,
        (TextureType::TextureCube, true) => vk::ImageViewType::CUBE,
        (TextureType::TextureCube, false) => vk::ImageViewType::TYPE_2D_ARRAY,
    }
}

/// Vulkan texture implementation
pub struct VulkanTexture {
    context: Arc<GpuContext>,
    image: vk::Image,
    allocation: Option<Allocation>,
    format: vk::Format,
    srv: Option<vk::ImageView>,
    uav: Option<vk::ImageView>,
    rtv: Option<vk::ImageView>,
    dsv: Option<vk::ImageView>,
    views: TextureViews,
    info: TextureInfo,
}

impl VulkanTexture {
    pub fn new(context: Arc<GpuContext>, desc: &TextureDesc) -> Result<Self> {
        let views = desc.validate()?;
        let info = TextureInfo::from(desc);
        let format = format_to_vk(desc.format);

        let flags = if desc.texture_type == TextureType::TextureCube {
            vk::ImageCreateFlags::CUBE_COMPATIBLE
        } else {
            vk::ImageCreateFlags::empty()
        };

        let image_create_info = vk::ImageCreateInfo::default()
            .flags(flags)
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .extent(vk::Extent3D { width: desc.width, height: desc.height, depth: 1 })
            .mip_levels(desc.mip_levels)
            .array_layers(info.array_layers)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(image_usage(views))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let device = &context.device;
        let image = unsafe {
            device
                .create_image(&image_create_info, None)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to create texture image '{}': {:?}", desc.debug_name, e))?
        };

        // Views and memory are released by Drop from here on
        let mut texture = Self {
            context: Arc::clone(&context),
            image,
            allocation: None,
            format,
            srv: None,
            uav: None,
            rtv: None,
            dsv: None,
            views,
            info,
        };

        let requirements = unsafe { device.get_image_memory_requirements(image) };
        let allocation = context
            .lock_allocator()?
            .allocate(&AllocationCreateDesc {
                name: "texture",
                requirements,
                location: MemoryLocation::GpuOnly,
                linear: false,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|_e| {
                let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                engine_error!(
                    "aurora::vulkan",
                    "Out of GPU memory for texture '{}' ({}x{}, {:.2} MB)",
                    desc.debug_name,
                    desc.width,
                    desc.height,
                    size_mb
                );
                Error::OutOfMemory
            })?;

        unsafe {
            device
                .bind_image_memory(image, allocation.memory(), allocation.offset())
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to bind texture image memory: {:?}", e))?;
        }
        texture.allocation = Some(allocation);

        // Any failing view fails the whole texture
        if views.srv {
            texture.srv = Some(texture.create_view(desc, sampled_aspect(desc.format), true)?);
        }
        if views.uav {
            texture.uav = Some(texture.create_view(desc, vk::ImageAspectFlags::COLOR, false)?);
        }
        if views.rtv {
            texture.rtv = Some(texture.create_view(desc, vk::ImageAspectFlags::COLOR, false)?);
        }
        if views.dsv {
            texture.dsv = Some(texture.create_view(desc, full_aspect(desc.format), false)?);
        }

        texture.initialize(desc)?;
        context.set_object_name(image, &desc.debug_name);

        Ok(texture)
    }

    fn create_view(&self, desc: &TextureDesc, aspect_mask: vk::ImageAspectFlags, sampled: bool) -> Result<vk::ImageView> {
        // Attachment views cover the top mip only
        let level_count = if sampled { self.info.mip_levels } else { 1 };
        let create_info = vk::ImageViewCreateInfo::default()
            .image(self.image)
            .view_type(view_type(desc.texture_type, sampled))
            .format(self.format)
            .components(vk::ComponentMapping::default())
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask,
                base_mip_level: 0,
                level_count,
                base_array_layer: 0,
                layer_count: self.info.array_layers,
            });

        unsafe {
            self.context
                .device
                .create_image_view(&create_info, None)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to create view for texture '{}': {:?}", desc.debug_name, e))
        }
    }

    /// Upload the initial data (if any) and move every subresource to GENERAL
    fn initialize(&self, desc: &TextureDesc) -> Result<()> {
        let aspect_mask = full_aspect(desc.format);
        let range = vk::ImageSubresourceRange {
            aspect_mask,
            base_mip_level: 0,
            level_count: self.info.mip_levels,
            base_array_layer: 0,
            layer_count: self.info.array_layers,
        };

        let staging = match &desc.data {
            Some(data) => Some(self.create_staging_buffer(data)?),
            None => None,
        };

        let result = self.context.immediate_submit(|device, command_buffer| {
            unsafe {
                if let Some((buffer, _)) = &staging {
                    let to_transfer = vk::ImageMemoryBarrier::default()
                        .old_layout(vk::ImageLayout::UNDEFINED)
                        .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                        .image(self.image)
                        .subresource_range(range)
                        .src_access_mask(vk::AccessFlags::empty())
                        .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE);
                    device.cmd_pipeline_barrier(
                        command_buffer,
                        vk::PipelineStageFlags::TOP_OF_PIPE,
                        vk::PipelineStageFlags::TRANSFER,
                        vk::DependencyFlags::empty(),
                        &[],
                        &[],
                        &[to_transfer],
                    );

                    // Layers are packed one after another, top mip only
                    let region = vk::BufferImageCopy::default()
                        .buffer_offset(0)
                        .image_subresource(vk::ImageSubresourceLayers {
                            aspect_mask: sampled_aspect(desc.format),
                            mip_level: 0,
                            base_array_layer: 0,
                            layer_count: self.info.array_layers,
                        })
                        .image_extent(vk::Extent3D { width: desc.width, height: desc.height, depth: 1 });
                    device.cmd_copy_buffer_to_image(
                        command_buffer,
                        *buffer,
                        self.image,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        &[region],
                    );
                }

                let old_layout = if staging.is_some() {
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL
                } else {
                    vk::ImageLayout::UNDEFINED
                };
                let to_general = vk::ImageMemoryBarrier::default()
                    .old_layout(old_layout)
                    .new_layout(vk::ImageLayout::GENERAL)
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(self.image)
                    .subresource_range(range)
                    .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                    .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE);
                device.cmd_pipeline_barrier(
                    command_buffer,
                    vk::PipelineStageFlags::TRANSFER,
                    vk::PipelineStageFlags::ALL_COMMANDS,
                    vk::DependencyFlags::empty(),
                    &[],
                    &[],
                    &[to_general],
                );
            }
            Ok(())
        });

        if let Some((buffer, allocation)) = staging {
            unsafe {
                self.context.device.destroy_buffer(buffer, None);
            }
            if let Err(e) = self.context.lock_allocator()?.free(allocation) {
                engine_warn!("aurora::vulkan", "Failed to free texture staging allocation: {:?}", e);
            }
        }
        result
    }

    fn create_staging_buffer(&self, data: &[u8]) -> Result<(vk::Buffer, Allocation)> {
        let device = &self.context.device;
        let create_info = vk::BufferCreateInfo::default()
            .size(data.len() as u64)
            .usage(vk::BufferUsageFlags::TRANSFER_SRC)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        unsafe {
            let buffer = device
                .create_buffer(&create_info, None)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to create staging buffer: {:?}", e))?;

            let requirements = device.get_buffer_memory_requirements(buffer);
            let allocation = self.context.lock_allocator().and_then(|mut allocator| {
                allocator
                    .allocate(&AllocationCreateDesc {
                        name: "texture_staging_buffer",
                        requirements,
                        location: MemoryLocation::CpuToGpu,
                        linear: true,
                        allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                    })
                    .map_err(|_e| {
                        let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                        engine_error!("aurora::vulkan", "Out of GPU memory for texture staging buffer ({:.2} MB)", size_mb);
                        Error::OutOfMemory
                    })
            });
            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(e) => {
                    device.destroy_buffer(buffer, None);
                    return Err(e);
                }
            };

            let filled = (|| {
                device
                    .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
                    .map_err(|e| engine_err!("aurora::vulkan", "Failed to bind staging buffer memory: {:?}", e))?;
                let mapped_ptr = allocation
                    .mapped_ptr()
                    .ok_or_else(|| engine_err!("aurora::vulkan", "Staging buffer is not mapped"))?
                    .as_ptr() as *mut u8;
                std::ptr::copy_nonoverlapping(data.as_ptr(), mapped_ptr, data.len());
                Ok(())
            })();

            match filled {
                Ok(()) => Ok((buffer, allocation)),
                Err(e) => {
                    device.destroy_buffer(buffer, None);
                    if let Ok(mut allocator) = self.context.lock_allocator() {
                        allocator.free(allocation).ok();
                    }
                    Err(e)
                }
            }
        }
    }

    pub fn image(&self) -> vk::Image {
        self.image
    }

    pub fn vk_format(&self) -> vk::Format {
        self.format
    }

    pub fn srv(&self) -> Option<vk::ImageView> {
        self.srv
    }

    pub fn uav(&self) -> Option<vk::ImageView> {
        self.uav
    }

    pub fn rtv(&self) -> Option<vk::ImageView> {
        self.rtv
    }

    pub fn dsv(&self) -> Option<vk::ImageView> {
        self.dsv
    }
}

impl Texture for VulkanTexture {
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

impl Drop for VulkanTexture {
    fn drop(&mut self) {
        unsafe {
            // Views first, then the resource
            for view in [self.srv.take(), self.uav.take(), self.rtv.take(), self.dsv.take()].into_iter().flatten() {
                self.context.device.destroy_image_view(view, None);
            }

            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                if let Ok(mut allocator) = self.context.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            // Destroy image
            self.context.device.destroy_image(self.image, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_texture_tests.rs"]
mod tests;

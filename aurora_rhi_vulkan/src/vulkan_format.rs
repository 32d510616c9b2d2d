/// Format tables between the RHI `Format` and `vk::Format`

use aurora_rhi::aurora::rhi::Format;
use ash::vk;

/// Convert an RHI format to its Vulkan equivalent
pub fn format_to_vk(format: Format) -> vk::Format {
    match format {
        Format::Unknown => vk::Format::UNDEFINED,
        Format::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        Format::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        Format::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        Format::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        Format::R10G10B10A2_UNORM => vk::Format::A2B10G10R10_UNORM_PACK32,
        Format::R11G11B10_FLOAT => vk::Format::B10G11R11_UFLOAT_PACK32,
        Format::R16G16B16A16_FLOAT => vk::Format::R16G16B16A16_SFLOAT,
        Format::R16G16_FLOAT => vk::Format::R16G16_SFLOAT,
        Format::R16_FLOAT => vk::Format::R16_SFLOAT,
        Format::R32G32B32A32_FLOAT => vk::Format::R32G32B32A32_SFLOAT,
        Format::R32G32_FLOAT => vk::Format::R32G32_SFLOAT,
        Format::R32_FLOAT => vk::Format::R32_SFLOAT,
        Format::R8_UNORM => vk::Format::R8_UNORM,
        Format::D16_UNORM => vk::Format::D16_UNORM,
        Format::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
        Format::D32_FLOAT => vk::Format::D32_SFLOAT,
        Format::D32_FLOAT_S8X24_UINT => vk::Format::D32_SFLOAT_S8_UINT,
    }
}

/// Convert a Vulkan format back to the RHI, `Format::Unknown` when unmapped
pub fn vk_to_format(format: vk::Format) -> Format {
    match format {
        vk::Format::R8G8B8A8_UNORM => Format::R8G8B8A8_UNORM,
        vk::Format::R8G8B8A8_SRGB => Format::R8G8B8A8_SRGB,
        vk::Format::B8G8R8A8_UNORM => Format::B8G8R8A8_UNORM,
        vk::Format::B8G8R8A8_SRGB => Format::B8G8R8A8_SRGB,
        vk::Format::A2B10G10R10_UNORM_PACK32 => Format::R10G10B10A2_UNORM,
        vk::Format::B10G11R11_UFLOAT_PACK32 => Format::R11G11B10_FLOAT,
        vk::Format::R16G16B16A16_SFLOAT => Format::R16G16B16A16_FLOAT,
        vk::Format::R16G16_SFLOAT => Format::R16G16_FLOAT,
        vk::Format::R16_SFLOAT => Format::R16_FLOAT,
        vk::Format::R32G32B32A32_SFLOAT => Format::R32G32B32A32_FLOAT,
        vk::Format::R32G32_SFLOAT => Format::R32G32_FLOAT,
        vk::Format::R32_SFLOAT => Format::R32_FLOAT,
        vk::Format::R8_UNORM => Format::R8_UNORM,
        vk::Format::D16_UNORM => Format::D16_UNORM,
        vk::Format::D24_UNORM_S8_UINT => Format::D24_UNORM_S8_UINT,
        vk::Format::D32_SFLOAT => Format::D32_FLOAT,
        vk::Format::D32_SFLOAT_S8_UINT => Format::D32_FLOAT_S8X24_UINT,
        _ => Format::Unknown,
    }
}

/// Aspect of the whole image (barriers, clears, uploads)
pub fn full_aspect(format: Format) -> vk::ImageAspectFlags {
    if format.has_stencil() {
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    } else if format.is_depth() {
        vk::ImageAspectFlags::DEPTH
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

/// Aspect of a sampled view: depth only for depth formats
pub fn sampled_aspect(format: Format) -> vk::ImageAspectFlags {
    if format.is_depth() {
        vk::ImageAspectFlags::DEPTH
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;

//! Unit tests for Vulkan format conversion functions
//!
//! Pure table lookups, no GPU required.

use aurora_rhi::aurora::rhi::Format;
use ash::vk;

use super::{format_to_vk, full_aspect, sampled_aspect, vk_to_format};

const ALL_FORMATS: [Format; 18] = [
    Format::R8G8B8A8_UNORM,
    Format::R8G8B8A8_SRGB,
    Format::B8G8R8A8_UNORM,
    Format::B8G8R8A8_SRGB,
    Format::R10G10B10A2_UNORM,
    Format::R11G11B10_FLOAT,
    Format::R16G16B16A16_FLOAT,
    Format::R16G16_FLOAT,
    Format::R16_FLOAT,
    Format::R32G32B32A32_FLOAT,
    Format::R32G32_FLOAT,
    Format::R32_FLOAT,
    Format::R8_UNORM,
    Format::D16_UNORM,
    Format::D24_UNORM_S8_UINT,
    Format::D32_FLOAT,
    Format::D32_FLOAT_S8X24_UINT,
    Format::Unknown,
];

#[test]
fn test_swapchain_formats() {
    assert_eq!(format_to_vk(Format::B8G8R8A8_UNORM), vk::Format::B8G8R8A8_UNORM);
    assert_eq!(format_to_vk(Format::R8G8B8A8_SRGB), vk::Format::R8G8B8A8_SRGB);
}

#[test]
fn test_packed_formats_use_vulkan_component_order() {
    assert_eq!(format_to_vk(Format::R10G10B10A2_UNORM), vk::Format::A2B10G10R10_UNORM_PACK32);
    assert_eq!(format_to_vk(Format::R11G11B10_FLOAT), vk::Format::B10G11R11_UFLOAT_PACK32);
}

#[test]
fn test_depth_formats() {
    assert_eq!(format_to_vk(Format::D32_FLOAT), vk::Format::D32_SFLOAT);
    assert_eq!(format_to_vk(Format::D32_FLOAT_S8X24_UINT), vk::Format::D32_SFLOAT_S8_UINT);
    assert_eq!(format_to_vk(Format::D24_UNORM_S8_UINT), vk::Format::D24_UNORM_S8_UINT);
}

#[test]
fn test_every_format_maps_back() {
    for format in ALL_FORMATS {
        assert_eq!(vk_to_format(format_to_vk(format)), format, "{:?}", format);
    }
}

#[test]
fn test_unmapped_vk_format_is_unknown() {
    assert_eq!(vk_to_format(vk::Format::ASTC_4X4_SRGB_BLOCK), Format::Unknown);
}

#[test]
fn test_aspects() {
    assert_eq!(full_aspect(Format::R8G8B8A8_UNORM), vk::ImageAspectFlags::COLOR);
    assert_eq!(full_aspect(Format::D32_FLOAT), vk::ImageAspectFlags::DEPTH);
    assert_eq!(
        full_aspect(Format::D24_UNORM_S8_UINT),
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    );
    // Shadow-map sampling reads depth only
    assert_eq!(sampled_aspect(Format::D24_UNORM_S8_UINT), vk::ImageAspectFlags::DEPTH);
    assert_eq!(sampled_aspect(Format::R16G16B16A16_FLOAT), vk::ImageAspectFlags::COLOR);
}

//! Unit tests for texture.rs

use crate::error::Error;
use crate::rhi::{Format, TextureDesc, TextureFlags, TextureInfo, TextureType, TextureViews};

// ============================================================================
// VIEW PLAN
// ============================================================================

#[test]
fn test_plan_srv_only() {
    let views = TextureViews::plan(TextureFlags::SRV, Format::R8G8B8A8_UNORM).unwrap();
    assert_eq!(views, TextureViews { srv: true, ..Default::default() });
    assert_eq!(views.count(), 1);
}

#[test]
fn test_plan_color_target_with_srv() {
    let views = TextureViews::plan(TextureFlags::RT_COLOR | TextureFlags::SRV, Format::R16G16B16A16_FLOAT).unwrap();
    assert!(views.rtv);
    assert!(views.srv);
    assert!(!views.dsv);
    assert_eq!(views.count(), 2);
}

#[test]
fn test_plan_depth_target_has_no_rtv() {
    let views = TextureViews::plan(TextureFlags::RT_DEPTH_STENCIL, Format::D24_UNORM_S8_UINT).unwrap();
    assert!(views.dsv);
    assert!(!views.rtv);
    assert!(!views.srv);
}

#[test]
fn test_plan_sampled_depth_gets_dsv_and_srv() {
    let views = TextureViews::plan(TextureFlags::RT_DEPTH_STENCIL | TextureFlags::SRV, Format::D32_FLOAT).unwrap();
    assert!(views.dsv);
    assert!(views.srv);
    assert!(!views.rtv);
}

#[test]
fn test_plan_rejects_color_and_depth_targets() {
    let result = TextureViews::plan(TextureFlags::RT_COLOR | TextureFlags::RT_DEPTH_STENCIL, Format::D32_FLOAT);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_plan_rejects_depth_flag_on_color_format() {
    assert!(TextureViews::plan(TextureFlags::RT_DEPTH_STENCIL, Format::R8G8B8A8_UNORM).is_err());
}

#[test]
fn test_plan_rejects_uav_on_depth_format() {
    assert!(TextureViews::plan(TextureFlags::UAV, Format::D32_FLOAT).is_err());
    assert!(TextureViews::plan(TextureFlags::RT_COLOR, Format::D16_UNORM).is_err());
}

#[test]
fn test_plan_empty_flags_is_resource_only() {
    let views = TextureViews::plan(TextureFlags::empty(), Format::R8_UNORM).unwrap();
    assert_eq!(views.count(), 0);
}

// ============================================================================
// DESCRIPTOR
// ============================================================================

#[test]
fn test_with_data_is_sampled() {
    let desc = TextureDesc::with_data(2, 2, Format::R8G8B8A8_UNORM, vec![0; 16]);
    assert_eq!(desc.flags, TextureFlags::SRV);
    assert_eq!(desc.mip_levels, 1);
    assert!(desc.validate().is_ok());
}

#[test]
fn test_validate_rejects_wrong_data_size() {
    let desc = TextureDesc::with_data(2, 2, Format::R8G8B8A8_UNORM, vec![0; 15]);
    assert!(matches!(desc.validate(), Err(Error::InvalidArgument(msg)) if msg.contains("expected 16")));
}

#[test]
fn test_cube_data_covers_six_faces() {
    let desc = TextureDesc::with_data(4, 4, Format::R8_UNORM, vec![0; 96])
        .with_type(TextureType::TextureCube);
    assert_eq!(desc.array_layers(), 6);
    assert_eq!(desc.expected_data_size(), 96);
    assert!(desc.validate().is_ok());
}

#[test]
fn test_cube_must_be_square() {
    let desc = TextureDesc::new(8, 4, Format::R8G8B8A8_UNORM, TextureFlags::SRV)
        .with_type(TextureType::TextureCube);
    assert!(desc.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_size_and_unknown_format() {
    assert!(TextureDesc::new(0, 4, Format::R8_UNORM, TextureFlags::SRV).validate().is_err());
    assert!(TextureDesc::new(4, 4, Format::Unknown, TextureFlags::SRV).validate().is_err());
    assert!(TextureDesc::new(4, 4, Format::R8_UNORM, TextureFlags::SRV)
        .with_mip_levels(0)
        .validate()
        .is_err());
}

#[test]
fn test_info_from_desc() {
    let desc = TextureDesc::new(512, 512, Format::D32_FLOAT, TextureFlags::RT_DEPTH_STENCIL | TextureFlags::SRV)
        .with_debug_name("shadow_map");
    let info = TextureInfo::from(&desc);
    assert_eq!(info.width, 512);
    assert_eq!(info.array_layers, 1);
    assert_eq!(info.format, Format::D32_FLOAT);
    assert_eq!(info.texture_type, TextureType::Texture2D);
}

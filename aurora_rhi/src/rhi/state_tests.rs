//! Unit tests for state.rs

use crate::rhi::{
    BlendFactor, BlendStateDesc, ColorWriteMask, ComparisonFunction, CullMode, DepthAccess,
    DepthStencilStateDesc, FillMode, RasterizerStateDesc,
};

// ============================================================================
// RASTERIZER PRESETS
// ============================================================================

#[test]
fn test_rasterizer_presets() {
    assert_eq!(RasterizerStateDesc::default().cull_mode, CullMode::Back);
    assert_eq!(RasterizerStateDesc::cull_front().cull_mode, CullMode::Front);
    assert_eq!(RasterizerStateDesc::cull_none().cull_mode, CullMode::None);

    let wireframe = RasterizerStateDesc::wireframe();
    assert_eq!(wireframe.fill_mode, FillMode::Wireframe);
    assert_eq!(wireframe.cull_mode, CullMode::None);
    assert!(wireframe.depth_clip_enable);
}

// ============================================================================
// DEPTH COUPLING
// ============================================================================

#[test]
fn test_depth_access_of_presets() {
    assert_eq!(DepthStencilStateDesc::read_write().depth_access(), DepthAccess::ReadWrite);
    assert_eq!(DepthStencilStateDesc::read_only().depth_access(), DepthAccess::ReadOnly);
    assert_eq!(DepthStencilStateDesc::disabled().depth_access(), DepthAccess::Disabled);
}

#[test]
fn test_write_only_behaves_as_always_pass() {
    let desc = DepthStencilStateDesc {
        depth_test_enable: false,
        depth_write_enable: true,
        depth_function: ComparisonFunction::Greater,
        ..DepthStencilStateDesc::read_write()
    };
    assert_eq!(desc.depth_access(), DepthAccess::ReadWrite);
    assert!(desc.depth_enabled());
    assert_eq!(desc.effective_depth_function(), ComparisonFunction::Always);
}

#[test]
fn test_effective_function_keeps_test_function() {
    let desc = DepthStencilStateDesc {
        depth_function: ComparisonFunction::GreaterEqual,
        ..DepthStencilStateDesc::read_only()
    };
    assert_eq!(desc.effective_depth_function(), ComparisonFunction::GreaterEqual);
}

#[test]
fn test_disabled_depth_is_not_enabled() {
    assert!(!DepthStencilStateDesc::disabled().depth_enabled());
    assert!(DepthStencilStateDesc::read_only().depth_enabled());
}

// ============================================================================
// BLEND PRESETS
// ============================================================================

#[test]
fn test_blend_presets() {
    let disabled = BlendStateDesc::default();
    assert!(!disabled.render_target.blend_enable);
    assert_eq!(disabled.render_target.write_mask, ColorWriteMask::ALL);

    let alpha = BlendStateDesc::alpha_blend();
    assert!(alpha.render_target.blend_enable);
    assert_eq!(alpha.render_target.src_color, BlendFactor::SrcAlpha);
    assert_eq!(alpha.render_target.dst_color, BlendFactor::InvSrcAlpha);

    let additive = BlendStateDesc::additive();
    assert_eq!(additive.render_target.dst_color, BlendFactor::One);
}

#[test]
fn test_color_write_mask_all() {
    assert_eq!(ColorWriteMask::ALL.bits(), 0b1111);
}

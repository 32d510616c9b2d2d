//! Unit tests for vulkan_state.rs (no GPU required)

use aurora_rhi::aurora::rhi::{
    BlendFactor, BlendStateDesc, ColorWriteMask, ComparisonFunction, CullMode,
    DepthStencilStateDesc, RasterizerStateDesc, StencilOperation,
};
use ash::vk;

use super::*;

const ALL_FEATURES: RasterizerFeatures = RasterizerFeatures { depth_clamp: true, fill_mode_non_solid: true };

#[test]
fn test_cull_modes() {
    assert_eq!(cull_mode_to_vk(CullMode::None), vk::CullModeFlags::NONE);
    assert_eq!(cull_mode_to_vk(CullMode::Front), vk::CullModeFlags::FRONT);
    assert_eq!(cull_mode_to_vk(CullMode::Back), vk::CullModeFlags::BACK);
}

#[test]
fn test_compare_and_stencil_ops() {
    assert_eq!(compare_op_to_vk(ComparisonFunction::LessEqual), vk::CompareOp::LESS_OR_EQUAL);
    assert_eq!(compare_op_to_vk(ComparisonFunction::GreaterEqual), vk::CompareOp::GREATER_OR_EQUAL);
    assert_eq!(stencil_op_to_vk(StencilOperation::IncrementWrap), vk::StencilOp::INCREMENT_AND_WRAP);
    assert_eq!(stencil_op_to_vk(StencilOperation::DecrementClamp), vk::StencilOp::DECREMENT_AND_CLAMP);
}

#[test]
fn test_blend_factors() {
    assert_eq!(blend_factor_to_vk(BlendFactor::InvSrcAlpha), vk::BlendFactor::ONE_MINUS_SRC_ALPHA);
    assert_eq!(blend_factor_to_vk(BlendFactor::InvDstColor), vk::BlendFactor::ONE_MINUS_DST_COLOR);
}

#[test]
fn test_color_write_mask() {
    assert_eq!(color_write_mask_to_vk(ColorWriteMask::ALL), vk::ColorComponentFlags::RGBA);
    assert_eq!(
        color_write_mask_to_vk(ColorWriteMask::RED | ColorWriteMask::ALPHA),
        vk::ColorComponentFlags::R | vk::ColorComponentFlags::A
    );
    assert!(color_write_mask_to_vk(ColorWriteMask::empty()).is_empty());
}

#[test]
fn test_rasterizer_wireframe() {
    let state = VulkanRasterizerState::new(&RasterizerStateDesc::wireframe(), ALL_FEATURES);
    let info = state.create_info();
    assert_eq!(info.polygon_mode, vk::PolygonMode::LINE);
    assert_eq!(info.cull_mode, vk::CullModeFlags::NONE);
    assert_eq!(info.front_face, vk::FrontFace::CLOCKWISE);
    assert_eq!(info.depth_bias_enable, vk::FALSE);
    assert_eq!(info.line_width, 1.0);
}

#[test]
fn test_rasterizer_depth_bias() {
    let desc = RasterizerStateDesc { depth_bias: 100, slope_scaled_depth_bias: 1.5, ..RasterizerStateDesc::cull_front() };
    let state = VulkanRasterizerState::new(&desc, ALL_FEATURES);
    assert_eq!(state.create_info().depth_bias_enable, vk::TRUE);
    assert_eq!(state.create_info().depth_bias_constant_factor, 100.0);
}

#[test]
fn test_depth_clamp_needs_device_feature() {
    let unclipped = RasterizerStateDesc { depth_clip_enable: false, ..RasterizerStateDesc::default() };
    assert!(depth_clamp_enable(&unclipped, ALL_FEATURES));
    assert!(!depth_clamp_enable(&RasterizerStateDesc::default(), ALL_FEATURES));

    // Without depthClamp the state keeps clipping instead of enabling an unsupported feature
    let state = VulkanRasterizerState::new(&unclipped, RasterizerFeatures::default());
    assert_eq!(state.create_info().depth_clamp_enable, vk::FALSE);
    let state = VulkanRasterizerState::new(&unclipped, ALL_FEATURES);
    assert_eq!(state.create_info().depth_clamp_enable, vk::TRUE);
}

#[test]
fn test_wireframe_falls_back_to_fill() {
    let state = VulkanRasterizerState::new(&RasterizerStateDesc::wireframe(), RasterizerFeatures::default());
    assert_eq!(state.create_info().polygon_mode, vk::PolygonMode::FILL);
}

#[test]
fn test_rasterizer_features_follow_support() {
    let supported = vk::PhysicalDeviceFeatures { depth_clamp: vk::TRUE, ..Default::default() };
    let features = RasterizerFeatures::from_supported(&supported);
    assert_eq!(features, RasterizerFeatures { depth_clamp: true, fill_mode_non_solid: false });

    let enabled = features.to_vk();
    assert_eq!(enabled.depth_clamp, vk::TRUE);
    assert_eq!(enabled.fill_mode_non_solid, vk::FALSE);
}

#[test]
fn test_depth_read_only() {
    let state = VulkanDepthStencilState::new(&DepthStencilStateDesc::read_only());
    let info = state.create_info();
    assert_eq!(info.depth_test_enable, vk::TRUE);
    assert_eq!(info.depth_write_enable, vk::FALSE);
    assert_eq!(info.depth_compare_op, vk::CompareOp::LESS);
}

#[test]
fn test_depth_write_only_tests_always() {
    let desc = DepthStencilStateDesc { depth_test_enable: false, ..DepthStencilStateDesc::read_write() };
    let state = VulkanDepthStencilState::new(&desc);
    let info = state.create_info();
    assert_eq!(info.depth_test_enable, vk::TRUE);
    assert_eq!(info.depth_write_enable, vk::TRUE);
    assert_eq!(info.depth_compare_op, vk::CompareOp::ALWAYS);
}

#[test]
fn test_depth_disabled() {
    let state = VulkanDepthStencilState::new(&DepthStencilStateDesc::disabled());
    assert_eq!(state.create_info().depth_test_enable, vk::FALSE);
    assert_eq!(state.create_info().stencil_test_enable, vk::FALSE);
    assert_eq!(state.create_info().front.compare_mask, 0xFF);
}

#[test]
fn test_alpha_blend_attachment() {
    let state = VulkanBlendState::new(&BlendStateDesc::alpha_blend());
    let attachment = state.attachment();
    assert_eq!(attachment.blend_enable, vk::TRUE);
    assert_eq!(attachment.src_color_blend_factor, vk::BlendFactor::SRC_ALPHA);
    assert_eq!(attachment.dst_color_blend_factor, vk::BlendFactor::ONE_MINUS_SRC_ALPHA);
    assert_eq!(attachment.color_write_mask, vk::ColorComponentFlags::RGBA);
    assert!(!state.alpha_to_coverage_enable());
}

/// Fixed-function state objects - Vulkan encodings
///
/// Vulkan has no standalone state objects: these fold into a graphics
/// pipeline. Each state keeps its descriptor and the pre-translated
/// `vk::Pipeline*StateCreateInfo` a pipeline builder plugs in as-is.

use std::any::Any;

use aurora_rhi::aurora::rhi::{
    BlendFactor, BlendOperation, BlendState, BlendStateDesc, ColorWriteMask, ComparisonFunction,
    CullMode, DepthStencilState, DepthStencilStateDesc, FillMode, RasterizerState,
    RasterizerStateDesc, StencilFaceDesc, StencilOperation,
};
use aurora_rhi::engine_warn;
use ash::vk;

// ===== Conversions =====

pub fn cull_mode_to_vk(mode: CullMode) -> vk::CullModeFlags {
    match mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

pub fn fill_mode_to_vk(mode: FillMode) -> vk::PolygonMode {
    match mode {
        FillMode::Solid => vk::PolygonMode::FILL,
        FillMode::Wireframe => vk::PolygonMode::LINE,
    }
}

pub fn compare_op_to_vk(function: ComparisonFunction) -> vk::CompareOp {
    match function {
        ComparisonFunction::Never => vk::CompareOp::NEVER,
        ComparisonFunction::Less => vk::CompareOp::LESS,
        ComparisonFunction::Equal => vk::CompareOp::EQUAL,
        ComparisonFunction::LessEqual => vk::CompareOp::LESS_OR_EQUAL,
        ComparisonFunction::Greater => vk::CompareOp::GREATER,
        ComparisonFunction::NotEqual => vk::CompareOp::NOT_EQUAL,
        ComparisonFunction::GreaterEqual => vk::CompareOp::GREATER_OR_EQUAL,
        ComparisonFunction::Always => vk::CompareOp::ALWAYS,
    }
}

pub fn stencil_op_to_vk(op: StencilOperation) -> vk::StencilOp {
    match op {
        StencilOperation::Keep => vk::StencilOp::KEEP,
        StencilOperation::Zero => vk::StencilOp::ZERO,
        StencilOperation::Replace => vk::StencilOp::REPLACE,
        StencilOperation::IncrementClamp => vk::StencilOp::INCREMENT_AND_CLAMP,
        StencilOperation::DecrementClamp => vk::StencilOp::DECREMENT_AND_CLAMP,
        StencilOperation::Invert => vk::StencilOp::INVERT,
        StencilOperation::IncrementWrap => vk::StencilOp::INCREMENT_AND_WRAP,
        StencilOperation::DecrementWrap => vk::StencilOp::DECREMENT_AND_WRAP,
    }
}

fn stencil_face_to_vk(face: &StencilFaceDesc, read_mask: u8, write_mask: u8) -> vk::StencilOpState {
    vk::StencilOpState {
        fail_op: stencil_op_to_vk(face.fail_op),
        pass_op: stencil_op_to_vk(face.pass_op),
        depth_fail_op: stencil_op_to_vk(face.depth_fail_op),
        compare_op: compare_op_to_vk(face.function),
        compare_mask: read_mask as u32,
        write_mask: write_mask as u32,
        // Set dynamically at draw time
        reference: 0,
    }
}

pub fn blend_factor_to_vk(factor: BlendFactor) -> vk::BlendFactor {
    match factor {
        BlendFactor::Zero => vk::BlendFactor::ZERO,
        BlendFactor::One => vk::BlendFactor::ONE,
        BlendFactor::SrcColor => vk::BlendFactor::SRC_COLOR,
        BlendFactor::InvSrcColor => vk::BlendFactor::ONE_MINUS_SRC_COLOR,
        BlendFactor::SrcAlpha => vk::BlendFactor::SRC_ALPHA,
        BlendFactor::InvSrcAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstColor => vk::BlendFactor::DST_COLOR,
        BlendFactor::InvDstColor => vk::BlendFactor::ONE_MINUS_DST_COLOR,
        BlendFactor::DstAlpha => vk::BlendFactor::DST_ALPHA,
        BlendFactor::InvDstAlpha => vk::BlendFactor::ONE_MINUS_DST_ALPHA,
    }
}

pub fn blend_op_to_vk(op: BlendOperation) -> vk::BlendOp {
    match op {
        BlendOperation::Add => vk::BlendOp::ADD,
        BlendOperation::Subtract => vk::BlendOp::SUBTRACT,
        BlendOperation::ReverseSubtract => vk::BlendOp::REVERSE_SUBTRACT,
        BlendOperation::Min => vk::BlendOp::MIN,
        BlendOperation::Max => vk::BlendOp::MAX,
    }
}

pub fn color_write_mask_to_vk(mask: ColorWriteMask) -> vk::ColorComponentFlags {
    let mut flags = vk::ColorComponentFlags::empty();
    if mask.contains(ColorWriteMask::RED) { flags |= vk::ColorComponentFlags::R; }
    if mask.contains(ColorWriteMask::GREEN) { flags |= vk::ColorComponentFlags::G; }
    if mask.contains(ColorWriteMask::BLUE) { flags |= vk::ColorComponentFlags::B; }
    if mask.contains(ColorWriteMask::ALPHA) { flags |= vk::ColorComponentFlags::A; }
    flags
}

// ===== Rasterizer =====

/// Optional device features the rasterizer encoding depends on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterizerFeatures {
    /// `depthClamp`, needed to turn depth clipping off
    pub depth_clamp: bool,
    /// `fillModeNonSolid`, needed for wireframe
    pub fill_mode_non_solid: bool,
}

impl RasterizerFeatures {
    pub fn from_supported(supported: &vk::PhysicalDeviceFeatures) -> Self {
        Self {
            depth_clamp: supported.depth_clamp == vk::TRUE,
            fill_mode_non_solid: supported.fill_mode_non_solid == vk::TRUE,
        }
    }

    /// Feature struct to enable at device creation
    pub fn to_vk(self) -> vk::PhysicalDeviceFeatures {
        vk::PhysicalDeviceFeatures::default()
            .depth_clamp(self.depth_clamp)
            .fill_mode_non_solid(self.fill_mode_non_solid)
    }
}

/// Depth clamping replaces clipping, when the device can clamp
pub fn depth_clamp_enable(desc: &RasterizerStateDesc, features: RasterizerFeatures) -> bool {
    !desc.depth_clip_enable && features.depth_clamp
}

pub struct VulkanRasterizerState {
    desc: RasterizerStateDesc,
    create_info: vk::PipelineRasterizationStateCreateInfo<'static>,
}

impl VulkanRasterizerState {
    pub fn new(desc: &RasterizerStateDesc, features: RasterizerFeatures) -> Self {
        let front_face = if desc.front_counter_clockwise {
            vk::FrontFace::COUNTER_CLOCKWISE
        } else {
            vk::FrontFace::CLOCKWISE
        };
        let depth_bias_enable = desc.depth_bias != 0 || desc.slope_scaled_depth_bias != 0.0;

        if !desc.depth_clip_enable && !features.depth_clamp {
            engine_warn!("aurora::vulkan", "depthClamp is not supported, depth clipping stays on");
        }
        let polygon_mode = if matches!(desc.fill_mode, FillMode::Wireframe) && !features.fill_mode_non_solid {
            engine_warn!("aurora::vulkan", "fillModeNonSolid is not supported, wireframe drawn solid");
            vk::PolygonMode::FILL
        } else {
            fill_mode_to_vk(desc.fill_mode)
        };

        let create_info = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(depth_clamp_enable(desc, features))
            .rasterizer_discard_enable(false)
            .polygon_mode(polygon_mode)
            .cull_mode(cull_mode_to_vk(desc.cull_mode))
            .front_face(front_face)
            .depth_bias_enable(depth_bias_enable)
            .depth_bias_constant_factor(desc.depth_bias as f32)
            .depth_bias_clamp(desc.depth_bias_clamp)
            .depth_bias_slope_factor(desc.slope_scaled_depth_bias)
            .line_width(1.0);

        Self { desc: *desc, create_info }
    }

    pub fn create_info(&self) -> &vk::PipelineRasterizationStateCreateInfo<'static> {
        &self.create_info
    }
}

impl RasterizerState for VulkanRasterizerState {
    fn desc(&self) -> &RasterizerStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ===== Depth / stencil =====

pub struct VulkanDepthStencilState {
    desc: DepthStencilStateDesc,
    create_info: vk::PipelineDepthStencilStateCreateInfo<'static>,
}

impl VulkanDepthStencilState {
    pub fn new(desc: &DepthStencilStateDesc) -> Self {
        let create_info = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(desc.depth_enabled())
            .depth_write_enable(desc.depth_write_enable)
            .depth_compare_op(compare_op_to_vk(desc.effective_depth_function()))
            .depth_bounds_test_enable(false)
            .stencil_test_enable(desc.stencil_enable)
            .front(stencil_face_to_vk(&desc.front_face, desc.stencil_read_mask, desc.stencil_write_mask))
            .back(stencil_face_to_vk(&desc.back_face, desc.stencil_read_mask, desc.stencil_write_mask))
            .min_depth_bounds(0.0)
            .max_depth_bounds(1.0);

        Self { desc: *desc, create_info }
    }

    pub fn create_info(&self) -> &vk::PipelineDepthStencilStateCreateInfo<'static> {
        &self.create_info
    }
}

impl DepthStencilState for VulkanDepthStencilState {
    fn desc(&self) -> &DepthStencilStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ===== Blend =====

pub struct VulkanBlendState {
    desc: BlendStateDesc,
    attachment: vk::PipelineColorBlendAttachmentState,
}

impl VulkanBlendState {
    pub fn new(desc: &BlendStateDesc) -> Self {
        let rt = &desc.render_target;
        let attachment = vk::PipelineColorBlendAttachmentState {
            blend_enable: rt.blend_enable as vk::Bool32,
            src_color_blend_factor: blend_factor_to_vk(rt.src_color),
            dst_color_blend_factor: blend_factor_to_vk(rt.dst_color),
            color_blend_op: blend_op_to_vk(rt.color_op),
            src_alpha_blend_factor: blend_factor_to_vk(rt.src_alpha),
            dst_alpha_blend_factor: blend_factor_to_vk(rt.dst_alpha),
            alpha_blend_op: blend_op_to_vk(rt.alpha_op),
            color_write_mask: color_write_mask_to_vk(rt.write_mask),
        };
        Self { desc: *desc, attachment }
    }

    /// Color attachment blend state for the single render target
    pub fn attachment(&self) -> vk::PipelineColorBlendAttachmentState {
        self.attachment
    }

    /// Goes into `VkPipelineMultisampleStateCreateInfo`
    pub fn alpha_to_coverage_enable(&self) -> bool {
        self.desc.alpha_to_coverage_enable
    }
}

impl BlendState for VulkanBlendState {
    fn desc(&self) -> &BlendStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "vulkan_state_tests.rs"]
mod tests;

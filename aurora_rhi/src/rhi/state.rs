/// Fixed-function state descriptors and their traits
///
/// Descriptors are plain values; each backend encodes them into its native
/// objects (D3D11 state objects, Vulkan create-info structs, D3D12 desc structs).

use std::any::Any;
use bitflags::bitflags;

// ============================================================================
// Shared enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    #[default]
    Solid,
    Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonFunction {
    Never,
    #[default]
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StencilOperation {
    #[default]
    Keep,
    Zero,
    Replace,
    IncrementClamp,
    DecrementClamp,
    Invert,
    IncrementWrap,
    DecrementWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DstColor,
    InvDstColor,
    DstAlpha,
    InvDstAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendOperation {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

bitflags! {
    /// Channels written to the render target
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWriteMask: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
        const ALL = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

// ============================================================================
// Rasterizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerStateDesc {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_counter_clockwise: bool,
    pub depth_bias: i32,
    pub depth_bias_clamp: f32,
    pub slope_scaled_depth_bias: f32,
    pub depth_clip_enable: bool,
    pub scissor_enable: bool,
    pub multisample_enable: bool,
    pub antialiased_line_enable: bool,
}

impl RasterizerStateDesc {
    pub fn cull_back() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_counter_clockwise: false,
            depth_bias: 0,
            depth_bias_clamp: 0.0,
            slope_scaled_depth_bias: 0.0,
            depth_clip_enable: true,
            scissor_enable: false,
            multisample_enable: false,
            antialiased_line_enable: false,
        }
    }

    pub fn cull_front() -> Self {
        Self { cull_mode: CullMode::Front, ..Self::cull_back() }
    }

    pub fn cull_none() -> Self {
        Self { cull_mode: CullMode::None, ..Self::cull_back() }
    }

    pub fn wireframe() -> Self {
        Self { fill_mode: FillMode::Wireframe, cull_mode: CullMode::None, ..Self::cull_back() }
    }
}

impl Default for RasterizerStateDesc {
    fn default() -> Self {
        Self::cull_back()
    }
}

// ============================================================================
// Depth / stencil
// ============================================================================

/// Stencil behaviour of one face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StencilFaceDesc {
    pub fail_op: StencilOperation,
    pub depth_fail_op: StencilOperation,
    pub pass_op: StencilOperation,
    pub function: ComparisonFunction,
}

/// How a depth-stencil state uses the depth buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthAccess {
    Disabled,
    ReadOnly,
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilStateDesc {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_function: ComparisonFunction,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front_face: StencilFaceDesc,
    pub back_face: StencilFaceDesc,
}

impl DepthStencilStateDesc {
    pub fn read_write() -> Self {
        let face = StencilFaceDesc { function: ComparisonFunction::Always, ..Default::default() };
        Self {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_function: ComparisonFunction::Less,
            stencil_enable: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front_face: face,
            back_face: face,
        }
    }

    pub fn read_only() -> Self {
        Self { depth_write_enable: false, ..Self::read_write() }
    }

    pub fn disabled() -> Self {
        Self { depth_test_enable: false, depth_write_enable: false, ..Self::read_write() }
    }

    /// Writing depth requires the test stage, so write-only counts as read-write
    pub fn depth_access(&self) -> DepthAccess {
        match (self.depth_test_enable, self.depth_write_enable) {
            (false, false) => DepthAccess::Disabled,
            (true, false) => DepthAccess::ReadOnly,
            (_, true) => DepthAccess::ReadWrite,
        }
    }

    /// Native depth-test enable
    pub fn depth_enabled(&self) -> bool {
        self.depth_test_enable || self.depth_write_enable
    }

    /// Comparison to program natively: `Always` for a write-only request
    pub fn effective_depth_function(&self) -> ComparisonFunction {
        if self.depth_write_enable && !self.depth_test_enable {
            ComparisonFunction::Always
        } else {
            self.depth_function
        }
    }
}

impl Default for DepthStencilStateDesc {
    fn default() -> Self {
        Self::read_write()
    }
}

// ============================================================================
// Blend
// ============================================================================

/// Blend equation of the render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetBlendDesc {
    pub blend_enable: bool,
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub color_op: BlendOperation,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub alpha_op: BlendOperation,
    pub write_mask: ColorWriteMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendStateDesc {
    pub alpha_to_coverage_enable: bool,
    pub render_target: RenderTargetBlendDesc,
}

impl BlendStateDesc {
    pub fn disabled() -> Self {
        Self {
            alpha_to_coverage_enable: false,
            render_target: RenderTargetBlendDesc {
                blend_enable: false,
                src_color: BlendFactor::One,
                dst_color: BlendFactor::Zero,
                color_op: BlendOperation::Add,
                src_alpha: BlendFactor::One,
                dst_alpha: BlendFactor::Zero,
                alpha_op: BlendOperation::Add,
                write_mask: ColorWriteMask::ALL,
            },
        }
    }

    /// Straight alpha: `src * a + dst * (1 - a)`
    pub fn alpha_blend() -> Self {
        let mut desc = Self::disabled();
        desc.render_target.blend_enable = true;
        desc.render_target.src_color = BlendFactor::SrcAlpha;
        desc.render_target.dst_color = BlendFactor::InvSrcAlpha;
        desc.render_target.src_alpha = BlendFactor::One;
        desc.render_target.dst_alpha = BlendFactor::InvSrcAlpha;
        desc
    }

    pub fn additive() -> Self {
        let mut desc = Self::disabled();
        desc.render_target.blend_enable = true;
        desc.render_target.src_color = BlendFactor::One;
        desc.render_target.dst_color = BlendFactor::One;
        desc.render_target.src_alpha = BlendFactor::One;
        desc.render_target.dst_alpha = BlendFactor::One;
        desc
    }
}

impl Default for BlendStateDesc {
    fn default() -> Self {
        Self::disabled()
    }
}

// ============================================================================
// Traits
// ============================================================================

pub trait RasterizerState {
    fn desc(&self) -> &RasterizerStateDesc;
    fn as_any(&self) -> &dyn Any;
}

pub trait DepthStencilState {
    fn desc(&self) -> &DepthStencilStateDesc;
    fn as_any(&self) -> &dyn Any;
}

pub trait BlendState {
    fn desc(&self) -> &BlendStateDesc;
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

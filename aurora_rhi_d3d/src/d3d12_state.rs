/// Fixed-function state - Direct3D 12
///
/// D3D12 has no state objects outside pipeline state objects. Each state
/// keeps its descriptor and the native desc a PSO builder copies in.

use std::any::Any;

use aurora_rhi::aurora::rhi::{
    BlendState, BlendStateDesc, DepthStencilState, DepthStencilStateDesc, RasterizerState,
    RasterizerStateDesc, StencilFaceDesc,
};
use windows::Win32::Foundation::BOOL;
use windows::Win32::Graphics::Direct3D12::{
    D3D12_BLEND, D3D12_BLEND_DESC, D3D12_BLEND_OP, D3D12_COMPARISON_FUNC,
    D3D12_CONSERVATIVE_RASTERIZATION_MODE_OFF, D3D12_CULL_MODE, D3D12_DEPTH_STENCILOP_DESC,
    D3D12_DEPTH_STENCIL_DESC, D3D12_DEPTH_WRITE_MASK, D3D12_FILL_MODE, D3D12_LOGIC_OP_NOOP,
    D3D12_RASTERIZER_DESC, D3D12_RENDER_TARGET_BLEND_DESC, D3D12_STENCIL_OP,
};

use crate::d3d_state_tables::{
    blend_op_value, blend_value, comparison_value, cull_mode_value, depth_write_mask_value,
    fill_mode_value, stencil_op_value,
};

/// Scissoring is always on in D3D12; `scissor_enable` has no native field
pub fn rasterizer_desc(desc: &RasterizerStateDesc) -> D3D12_RASTERIZER_DESC {
    D3D12_RASTERIZER_DESC {
        FillMode: D3D12_FILL_MODE(fill_mode_value(desc.fill_mode)),
        CullMode: D3D12_CULL_MODE(cull_mode_value(desc.cull_mode)),
        FrontCounterClockwise: BOOL::from(desc.front_counter_clockwise),
        DepthBias: desc.depth_bias,
        DepthBiasClamp: desc.depth_bias_clamp,
        SlopeScaledDepthBias: desc.slope_scaled_depth_bias,
        DepthClipEnable: BOOL::from(desc.depth_clip_enable),
        MultisampleEnable: BOOL::from(desc.multisample_enable),
        AntialiasedLineEnable: BOOL::from(desc.antialiased_line_enable),
        ForcedSampleCount: 0,
        ConservativeRaster: D3D12_CONSERVATIVE_RASTERIZATION_MODE_OFF,
    }
}

fn stencil_face(face: &StencilFaceDesc) -> D3D12_DEPTH_STENCILOP_DESC {
    D3D12_DEPTH_STENCILOP_DESC {
        StencilFailOp: D3D12_STENCIL_OP(stencil_op_value(face.fail_op)),
        StencilDepthFailOp: D3D12_STENCIL_OP(stencil_op_value(face.depth_fail_op)),
        StencilPassOp: D3D12_STENCIL_OP(stencil_op_value(face.pass_op)),
        StencilFunc: D3D12_COMPARISON_FUNC(comparison_value(face.function)),
    }
}

pub fn depth_stencil_desc(desc: &DepthStencilStateDesc) -> D3D12_DEPTH_STENCIL_DESC {
    D3D12_DEPTH_STENCIL_DESC {
        DepthEnable: BOOL::from(desc.depth_enabled()),
        DepthWriteMask: D3D12_DEPTH_WRITE_MASK(depth_write_mask_value(desc.depth_write_enable)),
        DepthFunc: D3D12_COMPARISON_FUNC(comparison_value(desc.effective_depth_function())),
        StencilEnable: BOOL::from(desc.stencil_enable),
        StencilReadMask: desc.stencil_read_mask,
        StencilWriteMask: desc.stencil_write_mask,
        FrontFace: stencil_face(&desc.front_face),
        BackFace: stencil_face(&desc.back_face),
    }
}

pub fn blend_desc(desc: &BlendStateDesc) -> D3D12_BLEND_DESC {
    let rt = &desc.render_target;
    let mut native = D3D12_BLEND_DESC {
        AlphaToCoverageEnable: BOOL::from(desc.alpha_to_coverage_enable),
        IndependentBlendEnable: BOOL::from(false),
        ..Default::default()
    };
    native.RenderTarget[0] = D3D12_RENDER_TARGET_BLEND_DESC {
        BlendEnable: BOOL::from(rt.blend_enable),
        LogicOpEnable: BOOL::from(false),
        SrcBlend: D3D12_BLEND(blend_value(rt.src_color)),
        DestBlend: D3D12_BLEND(blend_value(rt.dst_color)),
        BlendOp: D3D12_BLEND_OP(blend_op_value(rt.color_op)),
        SrcBlendAlpha: D3D12_BLEND(blend_value(rt.src_alpha)),
        DestBlendAlpha: D3D12_BLEND(blend_value(rt.dst_alpha)),
        BlendOpAlpha: D3D12_BLEND_OP(blend_op_value(rt.alpha_op)),
        LogicOp: D3D12_LOGIC_OP_NOOP,
        RenderTargetWriteMask: rt.write_mask.bits(),
    };
    native
}

pub struct D3D12RasterizerState {
    desc: RasterizerStateDesc,
    native: D3D12_RASTERIZER_DESC,
}

impl D3D12RasterizerState {
    pub fn new(desc: &RasterizerStateDesc) -> Self {
        Self { desc: *desc, native: rasterizer_desc(desc) }
    }

    pub fn native(&self) -> &D3D12_RASTERIZER_DESC {
        &self.native
    }
}

impl RasterizerState for D3D12RasterizerState {
    fn desc(&self) -> &RasterizerStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct D3D12DepthStencilState {
    desc: DepthStencilStateDesc,
    native: D3D12_DEPTH_STENCIL_DESC,
}

impl D3D12DepthStencilState {
    pub fn new(desc: &DepthStencilStateDesc) -> Self {
        Self { desc: *desc, native: depth_stencil_desc(desc) }
    }

    pub fn native(&self) -> &D3D12_DEPTH_STENCIL_DESC {
        &self.native
    }
}

impl DepthStencilState for D3D12DepthStencilState {
    fn desc(&self) -> &DepthStencilStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct D3D12BlendState {
    desc: BlendStateDesc,
    native: D3D12_BLEND_DESC,
}

impl D3D12BlendState {
    pub fn new(desc: &BlendStateDesc) -> Self {
        Self { desc: *desc, native: blend_desc(desc) }
    }

    pub fn native(&self) -> &D3D12_BLEND_DESC {
        &self.native
    }
}

impl BlendState for D3D12BlendState {
    fn desc(&self) -> &BlendStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

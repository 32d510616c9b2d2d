/// Fixed-function state objects - Direct3D 11
///
/// D3D11 is the only backend with standalone state objects; each type keeps
/// its descriptor next to the native interface bound at draw time.

use std::any::Any;

use aurora_rhi::aurora::Result;
use aurora_rhi::aurora::rhi::{
    BlendState, BlendStateDesc, DepthStencilState, DepthStencilStateDesc, RasterizerState,
    RasterizerStateDesc, StencilFaceDesc,
};
use windows::Win32::Foundation::BOOL;
use windows::Win32::Graphics::Direct3D11::{
    ID3D11BlendState, ID3D11DepthStencilState, ID3D11RasterizerState, D3D11_BLEND,
    D3D11_BLEND_DESC, D3D11_BLEND_OP, D3D11_COMPARISON_FUNC, D3D11_CULL_MODE,
    D3D11_DEPTH_STENCILOP_DESC, D3D11_DEPTH_STENCIL_DESC, D3D11_DEPTH_WRITE_MASK, D3D11_FILL_MODE,
    D3D11_RASTERIZER_DESC, D3D11_RENDER_TARGET_BLEND_DESC, D3D11_STENCIL_OP,
};

use crate::d3d11_device::{D3D11Context, SOURCE};
use crate::d3d_state_tables::{
    blend_op_value, blend_value, comparison_value, cull_mode_value, depth_write_mask_value,
    fill_mode_value, stencil_op_value,
};
use crate::dxgi::hr_error;

// ===== Native descriptors =====

pub fn rasterizer_desc(desc: &RasterizerStateDesc) -> D3D11_RASTERIZER_DESC {
    D3D11_RASTERIZER_DESC {
        FillMode: D3D11_FILL_MODE(fill_mode_value(desc.fill_mode)),
        CullMode: D3D11_CULL_MODE(cull_mode_value(desc.cull_mode)),
        FrontCounterClockwise: BOOL::from(desc.front_counter_clockwise),
        DepthBias: desc.depth_bias,
        DepthBiasClamp: desc.depth_bias_clamp,
        SlopeScaledDepthBias: desc.slope_scaled_depth_bias,
        DepthClipEnable: BOOL::from(desc.depth_clip_enable),
        ScissorEnable: BOOL::from(desc.scissor_enable),
        MultisampleEnable: BOOL::from(desc.multisample_enable),
        AntialiasedLineEnable: BOOL::from(desc.antialiased_line_enable),
    }
}

fn stencil_face(face: &StencilFaceDesc) -> D3D11_DEPTH_STENCILOP_DESC {
    D3D11_DEPTH_STENCILOP_DESC {
        StencilFailOp: D3D11_STENCIL_OP(stencil_op_value(face.fail_op)),
        StencilDepthFailOp: D3D11_STENCIL_OP(stencil_op_value(face.depth_fail_op)),
        StencilPassOp: D3D11_STENCIL_OP(stencil_op_value(face.pass_op)),
        StencilFunc: D3D11_COMPARISON_FUNC(comparison_value(face.function)),
    }
}

/// A write-only request enables the depth stage with an `ALWAYS` comparison
pub fn depth_stencil_desc(desc: &DepthStencilStateDesc) -> D3D11_DEPTH_STENCIL_DESC {
    D3D11_DEPTH_STENCIL_DESC {
        DepthEnable: BOOL::from(desc.depth_enabled()),
        DepthWriteMask: D3D11_DEPTH_WRITE_MASK(depth_write_mask_value(desc.depth_write_enable)),
        DepthFunc: D3D11_COMPARISON_FUNC(comparison_value(desc.effective_depth_function())),
        StencilEnable: BOOL::from(desc.stencil_enable),
        StencilReadMask: desc.stencil_read_mask,
        StencilWriteMask: desc.stencil_write_mask,
        FrontFace: stencil_face(&desc.front_face),
        BackFace: stencil_face(&desc.back_face),
    }
}

/// Render target 0 carries the equation, the other seven stay disabled
pub fn blend_desc(desc: &BlendStateDesc) -> D3D11_BLEND_DESC {
    let rt = &desc.render_target;
    let mut native = D3D11_BLEND_DESC {
        AlphaToCoverageEnable: BOOL::from(desc.alpha_to_coverage_enable),
        IndependentBlendEnable: BOOL::from(false),
        ..Default::default()
    };
    native.RenderTarget[0] = D3D11_RENDER_TARGET_BLEND_DESC {
        BlendEnable: BOOL::from(rt.blend_enable),
        SrcBlend: D3D11_BLEND(blend_value(rt.src_color)),
        DestBlend: D3D11_BLEND(blend_value(rt.dst_color)),
        BlendOp: D3D11_BLEND_OP(blend_op_value(rt.color_op)),
        SrcBlendAlpha: D3D11_BLEND(blend_value(rt.src_alpha)),
        DestBlendAlpha: D3D11_BLEND(blend_value(rt.dst_alpha)),
        BlendOpAlpha: D3D11_BLEND_OP(blend_op_value(rt.alpha_op)),
        // ColorWriteMask bits match D3D11_COLOR_WRITE_ENABLE
        RenderTargetWriteMask: rt.write_mask.bits(),
    };
    native
}

// ===== Rasterizer =====

pub struct D3D11RasterizerState {
    desc: RasterizerStateDesc,
    state: ID3D11RasterizerState,
}

impl D3D11RasterizerState {
    pub fn new(context: &D3D11Context, desc: &RasterizerStateDesc) -> Result<Self> {
        let mut state = None;
        unsafe { context.device.CreateRasterizerState(&rasterizer_desc(desc), Some(&mut state)) }
            .map_err(|e| hr_error(SOURCE, "CreateRasterizerState failed", e))?;
        let state = state.ok_or_else(|| missing_object("rasterizer state"))?;
        Ok(Self { desc: *desc, state })
    }

    pub fn native(&self) -> &ID3D11RasterizerState {
        &self.state
    }
}

impl RasterizerState for D3D11RasterizerState {
    fn desc(&self) -> &RasterizerStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ===== Depth / stencil =====

pub struct D3D11DepthStencilState {
    desc: DepthStencilStateDesc,
    state: ID3D11DepthStencilState,
}

impl D3D11DepthStencilState {
    pub fn new(context: &D3D11Context, desc: &DepthStencilStateDesc) -> Result<Self> {
        let mut state = None;
        unsafe { context.device.CreateDepthStencilState(&depth_stencil_desc(desc), Some(&mut state)) }
            .map_err(|e| hr_error(SOURCE, "CreateDepthStencilState failed", e))?;
        let state = state.ok_or_else(|| missing_object("depth-stencil state"))?;
        Ok(Self { desc: *desc, state })
    }

    pub fn native(&self) -> &ID3D11DepthStencilState {
        &self.state
    }
}

impl DepthStencilState for D3D11DepthStencilState {
    fn desc(&self) -> &DepthStencilStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ===== Blend =====

pub struct D3D11BlendState {
    desc: BlendStateDesc,
    state: ID3D11BlendState,
}

impl D3D11BlendState {
    pub fn new(context: &D3D11Context, desc: &BlendStateDesc) -> Result<Self> {
        let mut state = None;
        unsafe { context.device.CreateBlendState(&blend_desc(desc), Some(&mut state)) }
            .map_err(|e| hr_error(SOURCE, "CreateBlendState failed", e))?;
        let state = state.ok_or_else(|| missing_object("blend state"))?;
        Ok(Self { desc: *desc, state })
    }

    pub fn native(&self) -> &ID3D11BlendState {
        &self.state
    }
}

impl BlendState for D3D11BlendState {
    fn desc(&self) -> &BlendStateDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn missing_object(what: &str) -> aurora_rhi::aurora::Error {
    aurora_rhi::aurora::Error::BackendError(format!("D3D11 returned no {}", what))
}

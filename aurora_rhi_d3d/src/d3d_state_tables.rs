/// Fixed-function state tables shared by the D3D11 and D3D12 backends
///
/// D3D11 and D3D12 number their state enumerants identically, so one table
/// serves both: `D3D11_BLEND(blend_value(f))` and `D3D12_BLEND(blend_value(f))`.

use aurora_rhi::aurora::rhi::{
    BlendFactor, BlendOperation, ComparisonFunction, CullMode, FillMode, StencilOperation,
};

pub fn fill_mode_value(mode: FillMode) -> i32 {
    match mode {
        FillMode::Wireframe => 2,
        FillMode::Solid => 3,
    }
}

pub fn cull_mode_value(mode: CullMode) -> i32 {
    match mode {
        CullMode::None => 1,
        CullMode::Front => 2,
        CullMode::Back => 3,
    }
}

pub fn comparison_value(function: ComparisonFunction) -> i32 {
    match function {
        ComparisonFunction::Never => 1,
        ComparisonFunction::Less => 2,
        ComparisonFunction::Equal => 3,
        ComparisonFunction::LessEqual => 4,
        ComparisonFunction::Greater => 5,
        ComparisonFunction::NotEqual => 6,
        ComparisonFunction::GreaterEqual => 7,
        ComparisonFunction::Always => 8,
    }
}

pub fn stencil_op_value(op: StencilOperation) -> i32 {
    match op {
        StencilOperation::Keep => 1,
        StencilOperation::Zero => 2,
        StencilOperation::Replace => 3,
        StencilOperation::IncrementClamp => 4,
        StencilOperation::DecrementClamp => 5,
        StencilOperation::Invert => 6,
        StencilOperation::IncrementWrap => 7,
        StencilOperation::DecrementWrap => 8,
    }
}

pub fn blend_value(factor: BlendFactor) -> i32 {
    match factor {
        BlendFactor::Zero => 1,
        BlendFactor::One => 2,
        BlendFactor::SrcColor => 3,
        BlendFactor::InvSrcColor => 4,
        BlendFactor::SrcAlpha => 5,
        BlendFactor::InvSrcAlpha => 6,
        BlendFactor::DstAlpha => 7,
        BlendFactor::InvDstAlpha => 8,
        BlendFactor::DstColor => 9,
        BlendFactor::InvDstColor => 10,
    }
}

pub fn blend_op_value(op: BlendOperation) -> i32 {
    match op {
        BlendOperation::Add => 1,
        BlendOperation::Subtract => 2,
        BlendOperation::ReverseSubtract => 3,
        BlendOperation::Min => 4,
        BlendOperation::Max => 5,
    }
}

/// `D3D*_DEPTH_WRITE_MASK_ALL` or `_ZERO`
pub fn depth_write_mask_value(write: bool) -> i32 {
    if write {
        1
    } else {
        0
    }
}

#[cfg(test)]
#[path = "d3d_state_tables_tests.rs"]
mod tests;

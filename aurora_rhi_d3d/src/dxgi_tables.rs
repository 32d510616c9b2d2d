/// DXGI translation tables shared by the D3D11 and D3D12 backends
///
/// Values are the raw DXGI enumerants, so the tables build and test on every
/// host. The native modules wrap them (`DXGI_FORMAT(value)`, ...).

use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{Format, GpuType, PresentFlags, PresentMode, SwapEffect, TextureViews};

/// Raw `DXGI_FORMAT` values
pub mod format {
    pub const UNKNOWN: i32 = 0;
    pub const R32G32B32A32_FLOAT: i32 = 2;
    pub const R16G16B16A16_FLOAT: i32 = 10;
    pub const R32G32_FLOAT: i32 = 16;
    pub const R32G8X24_TYPELESS: i32 = 19;
    pub const D32_FLOAT_S8X24_UINT: i32 = 20;
    pub const R32_FLOAT_X8X24_TYPELESS: i32 = 21;
    pub const R10G10B10A2_UNORM: i32 = 24;
    pub const R11G11B10_FLOAT: i32 = 26;
    pub const R8G8B8A8_UNORM: i32 = 28;
    pub const R8G8B8A8_UNORM_SRGB: i32 = 29;
    pub const R16G16_FLOAT: i32 = 34;
    pub const R32_TYPELESS: i32 = 39;
    pub const D32_FLOAT: i32 = 40;
    pub const R32_FLOAT: i32 = 41;
    pub const R24G8_TYPELESS: i32 = 44;
    pub const D24_UNORM_S8_UINT: i32 = 45;
    pub const R24_UNORM_X8_TYPELESS: i32 = 46;
    pub const R16_TYPELESS: i32 = 53;
    pub const R16_FLOAT: i32 = 54;
    pub const D16_UNORM: i32 = 55;
    pub const R16_UNORM: i32 = 56;
    pub const R8_UNORM: i32 = 61;
    pub const B8G8R8A8_UNORM: i32 = 87;
    pub const B8G8R8A8_UNORM_SRGB: i32 = 91;
}

// ===== FORMATS =====

/// The three DXGI formats a texture of one RHI format is built from
///
/// Color formats use the same value everywhere. Depth formats get a typeless
/// resource, a readable single-channel SRV format and the concrete DSV
/// format, so a shadow map can be both written as depth and sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DxgiFormats {
    pub resource: i32,
    pub srv: i32,
    pub dsv: i32,
}

impl DxgiFormats {
    fn same(value: i32) -> Self {
        Self { resource: value, srv: value, dsv: format::UNKNOWN }
    }
}

pub fn dxgi_formats(value: Format) -> DxgiFormats {
    match value {
        Format::Unknown => DxgiFormats::same(format::UNKNOWN),
        Format::R8G8B8A8_UNORM => DxgiFormats::same(format::R8G8B8A8_UNORM),
        Format::R8G8B8A8_SRGB => DxgiFormats::same(format::R8G8B8A8_UNORM_SRGB),
        Format::B8G8R8A8_UNORM => DxgiFormats::same(format::B8G8R8A8_UNORM),
        Format::B8G8R8A8_SRGB => DxgiFormats::same(format::B8G8R8A8_UNORM_SRGB),
        Format::R10G10B10A2_UNORM => DxgiFormats::same(format::R10G10B10A2_UNORM),
        Format::R11G11B10_FLOAT => DxgiFormats::same(format::R11G11B10_FLOAT),
        Format::R16G16B16A16_FLOAT => DxgiFormats::same(format::R16G16B16A16_FLOAT),
        Format::R16G16_FLOAT => DxgiFormats::same(format::R16G16_FLOAT),
        Format::R16_FLOAT => DxgiFormats::same(format::R16_FLOAT),
        Format::R32G32B32A32_FLOAT => DxgiFormats::same(format::R32G32B32A32_FLOAT),
        Format::R32G32_FLOAT => DxgiFormats::same(format::R32G32_FLOAT),
        Format::R32_FLOAT => DxgiFormats::same(format::R32_FLOAT),
        Format::R8_UNORM => DxgiFormats::same(format::R8_UNORM),
        Format::D16_UNORM => DxgiFormats {
            resource: format::R16_TYPELESS,
            srv: format::R16_UNORM,
            dsv: format::D16_UNORM,
        },
        Format::D24_UNORM_S8_UINT => DxgiFormats {
            resource: format::R24G8_TYPELESS,
            srv: format::R24_UNORM_X8_TYPELESS,
            dsv: format::D24_UNORM_S8_UINT,
        },
        Format::D32_FLOAT => DxgiFormats {
            resource: format::R32_TYPELESS,
            srv: format::R32_FLOAT,
            dsv: format::D32_FLOAT,
        },
        Format::D32_FLOAT_S8X24_UINT => DxgiFormats {
            resource: format::R32G8X24_TYPELESS,
            srv: format::R32_FLOAT_X8X24_TYPELESS,
            dsv: format::D32_FLOAT_S8X24_UINT,
        },
    }
}

/// Concrete DXGI format for views and mode queries
pub fn dxgi_format(value: Format) -> i32 {
    let formats = dxgi_formats(value);
    if value.is_depth() {
        formats.dsv
    } else {
        formats.srv
    }
}

/// Back buffer and render-target-view formats of a swapchain
///
/// Flip-model buffers cannot be sRGB: the buffer stays UNORM and the sRGB
/// encoding moves to the view.
pub fn swapchain_formats(value: Format, flip: bool) -> (i32, i32) {
    let view = dxgi_format(value);
    if !flip {
        return (view, view);
    }
    let buffer = match value {
        Format::R8G8B8A8_SRGB => format::R8G8B8A8_UNORM,
        Format::B8G8R8A8_SRGB => format::B8G8R8A8_UNORM,
        _ => view,
    };
    (buffer, view)
}

// ===== TEXTURES =====

/// Raw `D3D11_BIND_FLAG` bits for the planned views
pub fn d3d11_bind_flags(views: TextureViews) -> u32 {
    let mut flags = 0;
    if views.srv {
        flags |= 0x8;
    }
    if views.rtv {
        flags |= 0x20;
    }
    if views.dsv {
        flags |= 0x40;
    }
    if views.uav {
        flags |= 0x80;
    }
    flags
}

/// Raw `D3D12_RESOURCE_FLAGS` for the planned views
///
/// A depth target nobody samples is created with `DENY_SHADER_RESOURCE`.
pub fn d3d12_resource_flags(views: TextureViews) -> i32 {
    let mut flags = 0;
    if views.rtv {
        flags |= 0x1;
    }
    if views.dsv {
        flags |= 0x2;
        if !views.srv {
            flags |= 0x8;
        }
    }
    if views.uav {
        flags |= 0x4;
    }
    flags
}

/// Subresource index of a mip of an array layer (`D3D11CalcSubresource`)
pub fn subresource_index(mip: u32, layer: u32, mip_levels: u32) -> u32 {
    mip + layer * mip_levels
}

/// Row and layer sizes in bytes of tightly packed top-mip upload data
///
/// Full-size float textures pass 4 GiB per layer, so the products are
/// checked instead of computed in `u32`.
pub fn upload_layout(width: u32, height: u32, bytes_per_pixel: u32) -> Result<(usize, usize)> {
    let row_size = (width as usize)
        .checked_mul(bytes_per_pixel as usize)
        .filter(|size| *size > 0);
    let layer_size = row_size.and_then(|row| row.checked_mul(height as usize)).filter(|size| *size > 0);
    match (row_size, layer_size) {
        (Some(row), Some(layer)) => Ok((row, layer)),
        _ => Err(Error::InvalidArgument(format!(
            "upload of {}x{} at {} bytes per pixel has no addressable size",
            width, height, bytes_per_pixel
        ))),
    }
}

// ===== SWAP EFFECTS & PRESENTATION =====

/// Raw `DXGI_SWAP_EFFECT` value
pub fn swap_effect_value(effect: SwapEffect) -> i32 {
    match effect {
        SwapEffect::Discard => 0,
        SwapEffect::Sequential => 1,
        SwapEffect::FlipSequential => 3,
        SwapEffect::FlipDiscard => 4,
    }
}

/// D3D12 only presents through the flip model
pub fn flip_only(effect: SwapEffect) -> SwapEffect {
    if effect.is_flip() {
        effect
    } else {
        SwapEffect::FlipDiscard
    }
}

pub const SWAP_CHAIN_FLAG_ALLOW_MODE_SWITCH: u32 = 2;
pub const SWAP_CHAIN_FLAG_ALLOW_TEARING: u32 = 2048;
pub const PRESENT_ALLOW_TEARING: u32 = 0x200;

/// Raw `DXGI_SWAP_CHAIN_FLAG` bits for validated present flags
///
/// Tearing needs a flip-model swapchain.
pub fn swap_chain_flags(flags: PresentFlags) -> u32 {
    let mut value = 0;
    if flags.contains(PresentFlags::ALLOW_MODE_SWITCH) {
        value |= SWAP_CHAIN_FLAG_ALLOW_MODE_SWITCH;
    }
    if flags.contains(PresentFlags::IMMEDIATE) && flags.swap_effect().is_flip() {
        value |= SWAP_CHAIN_FLAG_ALLOW_TEARING;
    }
    value
}

/// Sync interval and `Present` flags for a present mode
///
/// DXGI has no relaxed FIFO; it presents on vertical sync. Mailbox is a
/// flip-model present with a zero interval and no tearing. A bitblt chain
/// tears at interval 0, so mailbox falls back to vertical sync there.
pub fn present_parameters(flags: PresentFlags) -> (u32, u32) {
    let flip = flags.swap_effect().is_flip();
    match flags.present_mode() {
        PresentMode::Immediate if flip => (0, PRESENT_ALLOW_TEARING),
        PresentMode::Immediate => (0, 0),
        PresentMode::Mailbox if flip => (0, 0),
        PresentMode::Mailbox | PresentMode::Fifo | PresentMode::FifoRelaxed => (1, 0),
    }
}

// ===== FEATURE LEVELS =====

/// Raw `D3D_FEATURE_LEVEL` values
pub mod feature_level {
    pub const LEVEL_10_0: i32 = 0xa000;
    pub const LEVEL_10_1: i32 = 0xa100;
    pub const LEVEL_11_0: i32 = 0xb000;
    pub const LEVEL_11_1: i32 = 0xb100;
    pub const LEVEL_12_0: i32 = 0xc000;
    pub const LEVEL_12_1: i32 = 0xc100;
}

/// D3D11 device creation order, best first
pub const D3D11_FEATURE_LEVELS: [i32; 4] = [
    feature_level::LEVEL_11_1,
    feature_level::LEVEL_11_0,
    feature_level::LEVEL_10_1,
    feature_level::LEVEL_10_0,
];

/// D3D12 device creation order, best first
pub const D3D12_FEATURE_LEVELS: [i32; 4] = [
    feature_level::LEVEL_12_1,
    feature_level::LEVEL_12_0,
    feature_level::LEVEL_11_1,
    feature_level::LEVEL_11_0,
];

/// Largest 2D texture side guaranteed by a feature level
pub fn max_texture_dimension(level: i32) -> u32 {
    if level >= feature_level::LEVEL_11_0 {
        16384
    } else {
        8192
    }
}

pub fn feature_level_name(level: i32) -> &'static str {
    match level {
        feature_level::LEVEL_12_1 => "12_1",
        feature_level::LEVEL_12_0 => "12_0",
        feature_level::LEVEL_11_1 => "11_1",
        feature_level::LEVEL_11_0 => "11_0",
        feature_level::LEVEL_10_1 => "10_1",
        feature_level::LEVEL_10_0 => "10_0",
        _ => "unknown",
    }
}

// ===== ADAPTERS =====

/// DXGI does not report the adapter kind; software adapters are flagged and
/// anything with at least 512 MB of dedicated memory counts as discrete
pub fn gpu_type_from_adapter(software: bool, dedicated_bytes: u64) -> GpuType {
    if software {
        GpuType::Cpu
    } else if dedicated_bytes >= 512 * 1024 * 1024 {
        GpuType::Discrete
    } else {
        GpuType::Integrated
    }
}

/// Adapter description string, cut at the first NUL
pub fn adapter_name(description: &[u16]) -> String {
    let len = description.iter().position(|c| *c == 0).unwrap_or(description.len());
    String::from_utf16_lossy(&description[..len])
}

/// Adapter LUID packed into the RHI adapter handle
pub fn luid_to_handle(low_part: u32, high_part: i32) -> u64 {
    ((high_part as u32 as u64) << 32) | low_part as u64
}

#[cfg(test)]
#[path = "dxgi_tables_tests.rs"]
mod tests;

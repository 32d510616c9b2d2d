/// Pixel formats shared by every backend

/// Texture and swapchain pixel format
///
/// Backends translate it through their own tables (`VkFormat`, `DXGI_FORMAT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(non_camel_case_types)]
pub enum Format {
    #[default]
    Unknown,

    // Color formats
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    R10G10B10A2_UNORM,
    R11G11B10_FLOAT,
    R16G16B16A16_FLOAT,
    R16G16_FLOAT,
    R16_FLOAT,
    R32G32B32A32_FLOAT,
    R32G32_FLOAT,
    R32_FLOAT,
    R8_UNORM,

    // Depth/stencil formats
    D16_UNORM,
    D24_UNORM_S8_UINT,
    D32_FLOAT,
    D32_FLOAT_S8X24_UINT,
}

impl Format {
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            Format::D16_UNORM | Format::D24_UNORM_S8_UINT | Format::D32_FLOAT | Format::D32_FLOAT_S8X24_UINT
        )
    }

    pub fn has_stencil(&self) -> bool {
        matches!(self, Format::D24_UNORM_S8_UINT | Format::D32_FLOAT_S8X24_UINT)
    }

    pub fn is_srgb(&self) -> bool {
        matches!(self, Format::R8G8B8A8_SRGB | Format::B8G8R8A8_SRGB)
    }

    /// Size of one texel, 0 for `Unknown`
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Format::Unknown => 0,
            Format::R8_UNORM => 1,
            Format::R16_FLOAT | Format::D16_UNORM => 2,
            Format::R8G8B8A8_UNORM
            | Format::R8G8B8A8_SRGB
            | Format::B8G8R8A8_UNORM
            | Format::B8G8R8A8_SRGB
            | Format::R10G10B10A2_UNORM
            | Format::R11G11B10_FLOAT
            | Format::R16G16_FLOAT
            | Format::R32_FLOAT
            | Format::D24_UNORM_S8_UINT
            | Format::D32_FLOAT => 4,
            Format::R16G16B16A16_FLOAT | Format::R32G32_FLOAT | Format::D32_FLOAT_S8X24_UINT => 8,
            Format::R32G32B32A32_FLOAT => 16,
        }
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;

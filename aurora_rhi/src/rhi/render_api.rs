/// Graphics API selector

use std::fmt;
use std::str::FromStr;
use crate::error::Error;

/// Graphics API a backend is built on
///
/// Read once when the renderer is created. `OpenGl` is recognised so that a
/// configuration naming it fails with a clear error, but no backend exists for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RenderApi {
    DirectX11,
    DirectX12,
    #[default]
    Vulkan,
    OpenGl,
    Unknown,
}

impl RenderApi {
    /// Every selectable API, `Unknown` excluded
    pub const ALL: [RenderApi; 4] = [
        RenderApi::DirectX11,
        RenderApi::DirectX12,
        RenderApi::Vulkan,
        RenderApi::OpenGl,
    ];

    /// True for the APIs reached through DXGI
    pub fn is_direct3d(&self) -> bool {
        matches!(self, RenderApi::DirectX11 | RenderApi::DirectX12)
    }
}

impl fmt::Display for RenderApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderApi::DirectX11 => "DirectX11",
            RenderApi::DirectX12 => "DirectX12",
            RenderApi::Vulkan => "Vulkan",
            RenderApi::OpenGl => "OpenGL",
            RenderApi::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

impl FromStr for RenderApi {
    type Err = Error;

    /// Case-insensitive; accepts the display names and the usual short forms
    /// (`dx11`, `d3d12`, `vk`, `gl`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "directx11" | "dx11" | "d3d11" => Ok(RenderApi::DirectX11),
            "directx12" | "dx12" | "d3d12" => Ok(RenderApi::DirectX12),
            "vulkan" | "vk" => Ok(RenderApi::Vulkan),
            "opengl" | "gl" => Ok(RenderApi::OpenGl),
            "unknown" => Ok(RenderApi::Unknown),
            other => Err(Error::InvalidArgument(format!("unknown render API '{}'", other))),
        }
    }
}

#[cfg(test)]
#[path = "render_api_tests.rs"]
mod tests;

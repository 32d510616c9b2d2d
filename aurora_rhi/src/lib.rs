/*!
# Aurora RHI

Render Hardware Interface of the Crescent engine.

This crate defines the graphics-API-agnostic side of the renderer: adapter and
display enumeration, swapchains, textures, fixed-function state objects and
command lists, all expressed as traits. Backend crates (`aurora_rhi_vulkan`,
`aurora_rhi_d3d`) implement those traits and register themselves in a
[`rhi::BackendRegistry`]; the [`aurora::Renderer`] picks one at runtime from a
[`rhi::RenderApi`] value.

## Architecture

- **Backend**: entry point of a graphics API, creates the device
- **Device**: owns the GPU list and the display modes, factory for everything else
- **Swapchain**: window-bound chain of presentable images
- **Texture**: resource plus the views requested by its flags
- **RasterizerState / DepthStencilState / BlendState**: immutable state objects
- **CommandList**: recording and submission of GPU work
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod rhi;
pub mod renderer;

// Main aurora namespace module
pub mod aurora {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Frame orchestrator
    pub use crate::renderer::{Renderer, RendererConfig};

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // RHI sub-module with every backend-facing type and trait
    pub mod rhi {
        pub use crate::rhi::*;
    }
}

// Re-export math library at crate root
pub use glam;

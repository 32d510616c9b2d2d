/// RHI module - backend-facing types and traits

// Module declarations
pub mod render_api;
pub mod gpu;
pub mod display;
pub mod format;
pub mod viewport;
pub mod window;
pub mod backend;
pub mod device;
pub mod swapchain;
pub mod texture;
pub mod state;
pub mod command_list;

#[cfg(test)]
pub(crate) mod mock_backend;

// Re-export everything
pub use render_api::*;
pub use gpu::*;
pub use display::*;
pub use format::*;
pub use viewport::*;
pub use window::*;
pub use backend::*;
pub use device::*;
pub use swapchain::*;
pub use texture::*;
pub use state::*;
pub use command_list::*;

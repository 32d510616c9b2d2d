/*!
# Aurora RHI - Vulkan Backend

Vulkan implementation of the Aurora render hardware interface.

This crate implements the `aurora_rhi` device, swapchain, texture, state and
command-list traits on top of Ash for the Vulkan bindings and gpu-allocator
for memory management.

The backend is registered at the composition root and selected at runtime:

```no_run
use aurora_rhi::aurora::rhi::{BackendRegistry, RenderApi};

let mut registry = BackendRegistry::new();
aurora_rhi_vulkan::register(&mut registry);
assert!(registry.is_registered(RenderApi::Vulkan));
```

Validation layers are compiled in with the `vulkan-validation` feature and
turned on per device with `DeviceConfig::enable_debug_layer`.
*/

mod debug;
mod vulkan_format;
mod vulkan_state;
mod vulkan_context;
mod vulkan_device;
mod vulkan_swapchain;
mod vulkan_texture;
mod vulkan_command_list;
mod vulkan_backend;

use aurora_rhi::aurora::rhi::{BackendRegistry, RenderApi};

pub use debug::{print_validation_stats_report, ValidationStats};
pub use vulkan_backend::VulkanBackend;
pub use vulkan_command_list::VulkanCommandList;
pub use vulkan_context::{GpuContext, VulkanInstance};
pub use vulkan_device::VulkanDevice;
pub use vulkan_format::{format_to_vk, vk_to_format};
pub use vulkan_state::{RasterizerFeatures, VulkanBlendState, VulkanDepthStencilState, VulkanRasterizerState};
pub use vulkan_swapchain::VulkanSwapchain;
pub use vulkan_texture::VulkanTexture;

/// Register the Vulkan backend factory
pub fn register(registry: &mut BackendRegistry) {
    registry.register(RenderApi::Vulkan, || Box::new(VulkanBackend::new()));
}

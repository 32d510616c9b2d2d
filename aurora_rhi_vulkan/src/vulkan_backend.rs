/// Backend - Vulkan entry point registered in the RHI backend registry

use std::any::Any;

use aurora_rhi::aurora::Result;
use aurora_rhi::aurora::rhi::{Backend, Device, DeviceConfig, RenderApi, WindowTarget};

use crate::vulkan_device::VulkanDevice;

/// Vulkan backend
///
/// Stateless: the loader, instance and device are all created by
/// [`Backend::create_device`].
#[derive(Debug, Default)]
pub struct VulkanBackend;

impl VulkanBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for VulkanBackend {
    fn render_api(&self) -> RenderApi {
        RenderApi::Vulkan
    }

    fn name(&self) -> &'static str {
        "Vulkan"
    }

    fn create_device(&self, config: &DeviceConfig, window: &WindowTarget) -> Result<Box<dyn Device>> {
        Ok(Box::new(VulkanDevice::new(config, window)?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

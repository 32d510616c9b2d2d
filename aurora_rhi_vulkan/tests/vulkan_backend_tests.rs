//! Backend registration tests, no GPU required
//!
//! Run with: cargo test --test vulkan_backend_tests

use aurora_rhi::aurora::rhi::{BackendRegistry, RenderApi};
use aurora_rhi_vulkan::VulkanBackend;

#[test]
fn test_register_adds_vulkan_only() {
    let mut registry = BackendRegistry::new();
    aurora_rhi_vulkan::register(&mut registry);

    assert!(registry.is_registered(RenderApi::Vulkan));
    assert!(!registry.is_registered(RenderApi::DirectX11));
    assert!(!registry.is_registered(RenderApi::DirectX12));
}

#[test]
fn test_registry_builds_vulkan_backend() {
    let mut registry = BackendRegistry::new();
    aurora_rhi_vulkan::register(&mut registry);

    let backend = registry.create_backend(RenderApi::Vulkan).unwrap();
    assert_eq!(backend.render_api(), RenderApi::Vulkan);
    assert_eq!(backend.name(), "Vulkan");
    assert!(backend.as_any().downcast_ref::<VulkanBackend>().is_some());
}

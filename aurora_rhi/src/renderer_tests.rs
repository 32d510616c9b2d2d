//! Unit tests for renderer.rs (mock backend, no GPU)

use glam::Vec4;

use crate::aurora::{Renderer, RendererConfig};
use crate::error::Error;
use crate::rhi::mock_backend::{
    headless_window, MockAdapter, MockBackend, MockCommand, MockCommandList, MockDevice,
    MockSwapchain,
};
use crate::rhi::{
    BackendRegistry, CullMode, DepthAccess, DisplayMode, PresentFlags, RenderApi, Viewport,
};

fn config(api: RenderApi) -> RendererConfig {
    RendererConfig { render_api: api, ..Default::default() }
}

fn renderer(api: RenderApi) -> Renderer {
    let registry = MockBackend::registry(&[api]);
    Renderer::new(&registry, config(api), &headless_window(1280, 720)).unwrap()
}

// ============================================================================
// CREATION
// ============================================================================

#[test]
fn test_renderer_builds_full_stack() {
    let renderer = renderer(RenderApi::DirectX11);

    assert_eq!(renderer.render_api(), RenderApi::DirectX11);
    assert_eq!(renderer.swapchain().width(), 1280);
    assert_eq!(renderer.swapchain().buffer_count(), 2);
    assert_eq!(renderer.rasterizer_state().desc().cull_mode, CullMode::Back);
    assert_eq!(renderer.depth_stencil_state().desc().depth_access(), DepthAccess::ReadWrite);
    assert!(!renderer.blend_state().desc().render_target.blend_enable);
    assert_eq!(renderer.viewport(), Viewport::new(1280, 720));
}

#[test]
fn test_unregistered_backend_is_fatal() {
    let registry = MockBackend::registry(&[RenderApi::Vulkan]);
    let result = Renderer::new(&registry, config(RenderApi::DirectX12), &headless_window(1280, 720));
    assert!(matches!(result, Err(Error::UnsupportedBackend(_))));
}

#[test]
fn test_device_failure_propagates() {
    let mut registry = BackendRegistry::new();
    registry.register(RenderApi::Vulkan, || {
        let mut backend = MockBackend::new(RenderApi::Vulkan);
        backend.fail_device = true;
        Box::new(backend)
    });
    let result = Renderer::new(&registry, config(RenderApi::Vulkan), &headless_window(1280, 720));
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}

#[test]
fn test_zero_sized_window_is_rejected() {
    let registry = MockBackend::registry(&[RenderApi::Vulkan]);
    let result = Renderer::new(&registry, config(RenderApi::Vulkan), &headless_window(0, 720));
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_invalid_buffer_count_is_rejected() {
    let registry = MockBackend::registry(&[RenderApi::Vulkan]);
    let mut cfg = config(RenderApi::Vulkan);
    cfg.swapchain_buffer_count = 12;
    assert!(Renderer::new(&registry, cfg, &headless_window(1280, 720)).is_err());
}

// ============================================================================
// FPS LIMIT
// ============================================================================

#[test]
fn test_fps_limit_follows_highest_hertz() {
    let renderer = renderer(RenderApi::Vulkan);
    assert_eq!(renderer.fps_limit(), Some(144));
}

#[test]
fn test_fps_limit_disabled_by_config() {
    let registry = MockBackend::registry(&[RenderApi::Vulkan]);
    let mut cfg = config(RenderApi::Vulkan);
    cfg.update_fps_limit_to_highest_hertz = false;
    let renderer = Renderer::new(&registry, cfg, &headless_window(1280, 720)).unwrap();
    assert_eq!(renderer.fps_limit(), None);
}

#[test]
fn test_fps_limit_none_without_display_modes() {
    let mut registry = BackendRegistry::new();
    registry.register(RenderApi::Vulkan, || {
        let mut backend = MockBackend::new(RenderApi::Vulkan);
        backend.adapters = vec![MockAdapter::new("headless", 2048, None)];
        Box::new(backend)
    });
    let renderer = Renderer::new(&registry, config(RenderApi::Vulkan), &headless_window(1280, 720)).unwrap();
    assert_eq!(renderer.fps_limit(), None);
    assert_eq!(renderer.device().primary_gpu().unwrap().name(), "headless");
}

#[test]
fn test_fps_limit_uses_fastest_adapter_mode() {
    let mut registry = BackendRegistry::new();
    registry.register(RenderApi::DirectX11, || {
        let mut backend = MockBackend::new(RenderApi::DirectX11);
        backend.adapters = vec![
            MockAdapter::new("a", 2048, Some(vec![DisplayMode::from_hertz(1920, 1080, 75)])),
            MockAdapter::new("b", 4096, Some(vec![DisplayMode::new(2560, 1440, 239760, 1000)])),
        ];
        Box::new(backend)
    });
    let renderer = Renderer::new(&registry, config(RenderApi::DirectX11), &headless_window(1280, 720)).unwrap();
    assert_eq!(renderer.fps_limit(), Some(240));
}

// ============================================================================
// FRAMES
// ============================================================================

#[test]
fn test_render_frame_records_clear_and_presents() {
    let mut renderer = renderer(RenderApi::Vulkan);
    renderer.set_clear_color(Vec4::new(1.0, 0.0, 0.0, 1.0));
    renderer.render_frame().unwrap();

    let cmd = renderer.command_list().as_any().downcast_ref::<MockCommandList>().unwrap();
    assert_eq!(cmd.commands.first(), Some(&MockCommand::Begin));
    assert_eq!(cmd.commands.last(), Some(&MockCommand::End));
    assert!(cmd.commands.contains(&MockCommand::ClearSwapchain {
        image: 0,
        color: Vec4::new(1.0, 0.0, 0.0, 1.0),
    }));

    let device = renderer.device().as_any().downcast_ref::<MockDevice>().unwrap();
    assert_eq!(device.presented_submissions, 1);
    let swapchain = renderer.swapchain().as_any().downcast_ref::<MockSwapchain>().unwrap();
    assert_eq!(swapchain.presents, 1);
    assert_eq!(renderer.frame_count(), 1);
}

#[test]
fn test_frames_alternate_back_buffers() {
    let mut renderer = renderer(RenderApi::Vulkan);
    renderer.render_frame().unwrap();
    renderer.render_frame().unwrap();

    let cmd = renderer.command_list().as_any().downcast_ref::<MockCommandList>().unwrap();
    assert!(cmd
        .commands
        .iter()
        .any(|c| matches!(c, MockCommand::ClearSwapchain { image: 1, .. })));
    assert_eq!(renderer.frame_count(), 2);
}

// ============================================================================
// RESIZE
// ============================================================================

#[test]
fn test_resize_same_size_is_noop() {
    let mut renderer = renderer(RenderApi::Vulkan);
    assert!(!renderer.resize(1280, 720).unwrap());
}

#[test]
fn test_resize_rebuilds_and_updates_viewport() {
    let mut renderer = renderer(RenderApi::Vulkan);
    assert!(renderer.resize(1920, 1080).unwrap());
    assert_eq!(renderer.viewport(), Viewport::new(1920, 1080));
    assert_eq!(renderer.swapchain().width(), 1920);

    let device = renderer.device().as_any().downcast_ref::<MockDevice>().unwrap();
    assert_eq!(device.idle_waits.get(), 1);
}

#[test]
fn test_minimized_window_skips_frames() {
    let mut renderer = renderer(RenderApi::Vulkan);
    assert!(!renderer.resize(0, 0).unwrap());
    assert!(!renderer.viewport().is_defined());

    renderer.render_frame().unwrap();
    assert_eq!(renderer.frame_count(), 0);

    renderer.resize(1280, 720).unwrap();
    renderer.render_frame().unwrap();
    assert_eq!(renderer.frame_count(), 1);
}

#[test]
fn test_immediate_flag_dropped_without_tearing() {
    let mut registry = BackendRegistry::new();
    registry.register(RenderApi::DirectX11, || {
        let mut backend = MockBackend::new(RenderApi::DirectX11);
        backend.tearing_supported = false;
        Box::new(backend)
    });
    let mut cfg = config(RenderApi::DirectX11);
    cfg.present_flags = PresentFlags::IMMEDIATE | PresentFlags::SWAP_FLIP_DISCARD;

    let renderer = Renderer::new(&registry, cfg, &headless_window(1280, 720)).unwrap();
    assert!(!renderer.swapchain().present_flags().contains(PresentFlags::IMMEDIATE));
}

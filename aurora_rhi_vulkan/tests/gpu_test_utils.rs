#![allow(dead_code)]
//! GPU test utilities - one hidden window shared by every GPU test
//!
//! winit refuses a second `EventLoop` in the same process, so the window is
//! created once and its event loop leaked. Each test builds its own device on
//! top of it; the tests run `#[serial]` so only one surface exists at a time.

use std::sync::OnceLock;

use aurora_rhi::aurora::rhi::{DeviceConfig, WindowTarget};
use aurora_rhi_vulkan::VulkanDevice;
use winit::event_loop::{EventLoop, EventLoopBuilder};
use winit::window::Window;

// Platform-specific imports for EventLoop threading
#[cfg(target_os = "windows")]
use winit::platform::windows::EventLoopBuilderExtWindows;

/// Global Window (kept alive for every device)
static GPU_WINDOW: OnceLock<Window> = OnceLock::new();

/// Window target of the shared hidden test window
pub fn test_window_target() -> WindowTarget {
    let window = GPU_WINDOW.get_or_init(|| {
        let (window, event_loop) = create_test_window();
        // Leak EventLoop intentionally to keep Window valid
        std::mem::forget(event_loop);
        window
    });
    WindowTarget::from_winit(window).expect("test window has no handles")
}

/// Vulkan device on the shared test window, validation on when compiled in
pub fn create_test_device() -> VulkanDevice {
    let config = DeviceConfig {
        app_name: "Aurora GPU Tests".to_string(),
        enable_debug_layer: true,
        ..Default::default()
    };
    VulkanDevice::new(&config, &test_window_target()).expect("Failed to create VulkanDevice for tests")
}

/// Create a hidden test window
///
/// The EventLoop supports any_thread on Windows (cargo test runs off the main thread).
#[allow(deprecated)]
fn create_test_window() -> (Window, EventLoop<()>) {
    let event_loop = {
        #[cfg(target_os = "windows")]
        {
            EventLoopBuilder::new()
                .with_any_thread(true)
                .build()
                .unwrap()
        }
        #[cfg(not(target_os = "windows"))]
        {
            EventLoopBuilder::new().build().unwrap()
        }
    };

    let window_attrs = Window::default_attributes()
        .with_title("GPU Test Window")
        .with_inner_size(winit::dpi::PhysicalSize::new(800, 600))
        .with_visible(false);

    let window = event_loop.create_window(window_attrs).unwrap();
    (window, event_loop)
}

//! Device, swapchain, texture and command list tests on real hardware
//!
//! All tests require a GPU and a display and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_device_tests -- --ignored

mod gpu_test_utils;

use aurora_rhi::aurora::Error;
use aurora_rhi::aurora::rhi::{
    BlendStateDesc, CommandList, DepthStencilStateDesc, Device, Format, PresentFlags,
    RasterizerStateDesc, RenderApi, ScissorRect, Swapchain, SwapchainDesc, Texture, TextureDesc,
    TextureFlags, TextureType, Viewport,
};
use aurora_rhi::glam::Vec4;
use gpu_test_utils::{create_test_device, test_window_target};
use serial_test::serial;

// ============================================================================
// DEVICE
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_device_selects_primary_gpu() {
    let device = create_test_device();

    assert_eq!(device.render_api(), RenderApi::Vulkan);
    assert!(!device.gpus().is_empty());
    let primary = device.primary_gpu().expect("no primary GPU");
    assert!(primary.is_presentable());
    assert!(device.limits().max_texture_dimension_2d >= 4096);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_resolution_limits() {
    let device = create_test_device();
    let max = device.limits().max_texture_dimension_2d;

    assert!(device.is_valid_resolution(1920, 1080));
    assert!(!device.is_valid_resolution(0, 1080));
    assert!(!device.is_valid_resolution(max + 1, 16));
}

// ============================================================================
// SWAPCHAIN
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_swapchain_clear_and_present() {
    let mut device = create_test_device();
    let window = test_window_target();
    let desc = SwapchainDesc::new(window.width(), window.height());
    let mut swapchain = device.create_swapchain(&desc, &window).unwrap();
    let mut cmd = device.create_command_list().unwrap();

    for _ in 0..3 {
        swapchain.acquire_next_image().unwrap();
        cmd.begin().unwrap();
        cmd.set_viewport(&Viewport::new(swapchain.width(), swapchain.height())).unwrap();
        cmd.set_scissor(&ScissorRect::new(0, 0, swapchain.width(), swapchain.height())).unwrap();
        cmd.clear_swapchain(swapchain.as_ref(), Vec4::new(0.1, 0.2, 0.3, 1.0)).unwrap();
        cmd.end().unwrap();
        device.submit(cmd.as_mut(), Some(swapchain.as_ref())).unwrap();
        swapchain.present().unwrap();
    }
    device.wait_idle().unwrap();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_swapchain_frames_without_submit() {
    let mut device = create_test_device();
    let window = test_window_target();
    let mut swapchain = device
        .create_swapchain(&SwapchainDesc::new(window.width(), window.height()), &window)
        .unwrap();
    let mut cmd = device.create_command_list().unwrap();

    assert!(matches!(swapchain.present(), Err(Error::InvalidArgument(_))));

    // Acquired images that were never submitted still present cleanly
    for _ in 0..4 {
        swapchain.acquire_next_image().unwrap();
        swapchain.present().unwrap();
    }

    // A frame whose work never reached the queue keeps its image
    let image = swapchain.acquire_next_image().unwrap();
    assert_eq!(swapchain.acquire_next_image().unwrap(), image);

    cmd.begin().unwrap();
    cmd.clear_swapchain(swapchain.as_ref(), Vec4::ONE).unwrap();
    cmd.end().unwrap();
    device.submit(cmd.as_mut(), Some(swapchain.as_ref())).unwrap();

    // The acquire wait is consumed: a second submit to the same image is refused
    cmd.begin().unwrap();
    cmd.end().unwrap();
    assert!(matches!(device.submit(cmd.as_mut(), Some(swapchain.as_ref())), Err(Error::InvalidArgument(_))));
    device.submit(cmd.as_mut(), None).unwrap();

    swapchain.present().unwrap();
    device.wait_idle().unwrap();

    if let Some(stats) = device.validation_stats() {
        assert_eq!(stats.errors, 0);
    }
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_swapchain_resize() {
    let mut device = create_test_device();
    let window = test_window_target();
    let mut swapchain = device
        .create_swapchain(&SwapchainDesc::new(window.width(), window.height()), &window)
        .unwrap();

    let (width, height) = (swapchain.width(), swapchain.height());
    assert!(!swapchain.resize(width, height, false).unwrap());
    assert!(swapchain.resize(width, height, true).unwrap());
    assert!(swapchain.resize(0, height, false).is_err());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_swapchain_present_mode_is_reported() {
    let mut device = create_test_device();
    let window = test_window_target();
    let mut desc = SwapchainDesc::new(window.width(), window.height());
    desc.flags = PresentFlags::MAILBOX | PresentFlags::SWAP_FLIP_DISCARD;

    let swapchain = device.create_swapchain(&desc, &window).unwrap();
    let flags = swapchain.present_flags();
    // Either honored or replaced by FIFO
    assert!(flags.contains(PresentFlags::MAILBOX) || flags.contains(PresentFlags::FIFO));
}

// ============================================================================
// TEXTURES
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_create_texture_with_data() {
    let mut device = create_test_device();
    let data = vec![255u8; 64 * 64 * 4];
    let desc = TextureDesc::with_data(64, 64, Format::R8G8B8A8_UNORM, data).with_debug_name("white");

    let texture = device.create_texture(&desc).unwrap();
    assert_eq!(texture.info().width, 64);
    assert!(texture.views().srv);
    assert!(!texture.views().rtv);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_create_cube_texture() {
    let mut device = create_test_device();
    let desc = TextureDesc::new(32, 32, Format::R16G16B16A16_FLOAT, TextureFlags::SRV)
        .with_type(TextureType::TextureCube);

    let texture = device.create_texture(&desc).unwrap();
    assert_eq!(texture.info().array_layers, 6);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_shadow_map_gets_dsv_and_srv() {
    let mut device = create_test_device();
    let desc = TextureDesc::new(1024, 1024, Format::D32_FLOAT, TextureFlags::RT_DEPTH_STENCIL | TextureFlags::SRV);

    let texture = device.create_texture(&desc).unwrap();
    let views = texture.views();
    assert!(views.dsv && views.srv);
    assert!(!views.rtv);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_texture_data_size_mismatch_rejected() {
    let mut device = create_test_device();
    let desc = TextureDesc::with_data(16, 16, Format::R8G8B8A8_UNORM, vec![0u8; 10]);

    assert!(matches!(device.create_texture(&desc), Err(Error::InvalidArgument(_))));
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_clear_offscreen_targets() {
    let mut device = create_test_device();
    let color = device
        .create_texture(&TextureDesc::new(128, 128, Format::R8G8B8A8_UNORM, TextureFlags::RT_COLOR))
        .unwrap();
    let depth = device
        .create_texture(&TextureDesc::new(128, 128, Format::D24_UNORM_S8_UINT, TextureFlags::RT_DEPTH_STENCIL))
        .unwrap();
    let mut cmd = device.create_command_list().unwrap();

    cmd.begin().unwrap();
    cmd.clear_render_target(color.as_ref(), Vec4::new(1.0, 0.0, 0.0, 1.0)).unwrap();
    cmd.clear_depth_stencil(depth.as_ref(), 1.0, 0).unwrap();
    // Wrong view kind
    assert!(cmd.clear_render_target(depth.as_ref(), Vec4::ZERO).is_err());
    cmd.end().unwrap();

    device.submit(cmd.as_mut(), None).unwrap();
    device.wait_idle().unwrap();
}

// ============================================================================
// STATES AND COMMAND LISTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_create_default_states() {
    let mut device = create_test_device();

    assert!(device.create_rasterizer_state(&RasterizerStateDesc::default()).is_ok());
    assert!(device.create_depth_stencil_state(&DepthStencilStateDesc::default()).is_ok());
    assert!(device.create_blend_state(&BlendStateDesc::default()).is_ok());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_recording_outside_begin_fails() {
    let mut device = create_test_device();
    let mut cmd = device.create_command_list().unwrap();

    assert!(!cmd.is_recording());
    assert!(cmd.draw(3, 1, 0, 0).is_err());
    assert!(cmd.end().is_err());

    cmd.begin().unwrap();
    assert!(cmd.is_recording());
    assert!(cmd.begin().is_err());
    // No pipeline or render pass is bound, draws are refused
    assert!(matches!(cmd.draw(3, 1, 0, 0), Err(Error::InvalidArgument(_))));
    assert!(matches!(cmd.draw_indexed(3, 1, 0, 0, 0), Err(Error::InvalidArgument(_))));
    // Still recording: submit must refuse it
    assert!(device.submit(cmd.as_mut(), None).is_err());
    cmd.end().unwrap();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_command_list_reuse_across_submits() {
    let mut device = create_test_device();
    let mut cmd = device.create_command_list().unwrap();

    for _ in 0..4 {
        cmd.begin().unwrap();
        cmd.end().unwrap();
        device.submit(cmd.as_mut(), None).unwrap();
    }
    device.wait_idle().unwrap();
}

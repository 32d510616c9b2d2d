//! Unit tests for swapchain.rs

use crate::error::Error;
use crate::rhi::{needs_resize, Format, PresentFlags, PresentMode, SwapEffect, SwapchainDesc};

// ============================================================================
// PRESENT FLAGS
// ============================================================================

#[test]
fn test_present_mode_priority() {
    assert_eq!(PresentFlags::empty().present_mode(), PresentMode::Fifo);
    assert_eq!(PresentFlags::FIFO_RELAXED.present_mode(), PresentMode::FifoRelaxed);
    assert_eq!((PresentFlags::MAILBOX | PresentFlags::FIFO).present_mode(), PresentMode::Mailbox);
    assert_eq!(
        (PresentFlags::IMMEDIATE | PresentFlags::MAILBOX).present_mode(),
        PresentMode::Immediate
    );
}

#[test]
fn test_swap_effect_selection() {
    assert_eq!(PresentFlags::empty().swap_effect(), SwapEffect::FlipDiscard);
    assert_eq!(PresentFlags::SWAP_DISCARD.swap_effect(), SwapEffect::Discard);
    assert_eq!(PresentFlags::SWAP_SEQUENTIAL.swap_effect(), SwapEffect::Sequential);
    assert_eq!(PresentFlags::SWAP_FLIP_SEQUENTIAL.swap_effect(), SwapEffect::FlipSequential);
    assert!(SwapEffect::FlipSequential.is_flip());
    assert!(!SwapEffect::Discard.is_flip());
}

#[test]
fn test_validated_drops_immediate_without_tearing() {
    let flags = PresentFlags::IMMEDIATE | PresentFlags::SWAP_FLIP_DISCARD;
    let validated = flags.validated(false, "aurora::test");
    assert!(!validated.contains(PresentFlags::IMMEDIATE));
    assert!(validated.contains(PresentFlags::SWAP_FLIP_DISCARD));
    assert_eq!(validated.present_mode(), PresentMode::Fifo);
}

#[test]
fn test_validated_keeps_immediate_with_tearing() {
    let flags = PresentFlags::IMMEDIATE;
    assert_eq!(flags.validated(true, "aurora::test"), flags);
}

// ============================================================================
// DESCRIPTOR
// ============================================================================

#[test]
fn test_desc_defaults_are_valid() {
    let desc = SwapchainDesc::new(1280, 720);
    assert_eq!(desc.buffer_count, 2);
    assert_eq!(desc.format, Format::B8G8R8A8_UNORM);
    assert!(desc.validate().is_ok());
}

#[test]
fn test_desc_rejects_buffer_count_out_of_range() {
    let mut desc = SwapchainDesc::new(1280, 720);
    desc.buffer_count = 0;
    assert!(matches!(desc.validate(), Err(Error::InvalidArgument(_))));
    desc.buffer_count = 9;
    assert!(matches!(desc.validate(), Err(Error::InvalidArgument(_))));
    desc.buffer_count = 8;
    assert!(desc.validate().is_ok());
}

#[test]
fn test_desc_flip_needs_two_buffers() {
    let mut desc = SwapchainDesc::new(1280, 720);
    desc.buffer_count = 1;
    assert!(desc.validate().is_err());

    desc.flags = PresentFlags::FIFO | PresentFlags::SWAP_DISCARD;
    assert!(desc.validate().is_ok());
}

#[test]
fn test_desc_rejects_depth_format() {
    let mut desc = SwapchainDesc::new(1280, 720);
    desc.format = Format::D32_FLOAT;
    assert!(desc.validate().is_err());
}

// ============================================================================
// RESIZE
// ============================================================================

#[test]
fn test_needs_resize() {
    assert!(!needs_resize((800, 600), (800, 600), false));
    assert!(needs_resize((800, 600), (800, 600), true));
    assert!(needs_resize((800, 600), (1024, 600), false));
}

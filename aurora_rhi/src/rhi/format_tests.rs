//! Unit tests for format.rs

use crate::rhi::Format;

#[test]
fn test_depth_formats() {
    assert!(Format::D16_UNORM.is_depth());
    assert!(Format::D24_UNORM_S8_UINT.is_depth());
    assert!(Format::D32_FLOAT.is_depth());
    assert!(Format::D32_FLOAT_S8X24_UINT.is_depth());
    assert!(!Format::R32_FLOAT.is_depth());
    assert!(!Format::Unknown.is_depth());
}

#[test]
fn test_stencil_formats() {
    assert!(Format::D24_UNORM_S8_UINT.has_stencil());
    assert!(Format::D32_FLOAT_S8X24_UINT.has_stencil());
    assert!(!Format::D32_FLOAT.has_stencil());
    assert!(!Format::D16_UNORM.has_stencil());
}

#[test]
fn test_srgb_formats() {
    assert!(Format::R8G8B8A8_SRGB.is_srgb());
    assert!(Format::B8G8R8A8_SRGB.is_srgb());
    assert!(!Format::B8G8R8A8_UNORM.is_srgb());
}

#[test]
fn test_bytes_per_pixel() {
    assert_eq!(Format::R8_UNORM.bytes_per_pixel(), 1);
    assert_eq!(Format::D16_UNORM.bytes_per_pixel(), 2);
    assert_eq!(Format::R8G8B8A8_UNORM.bytes_per_pixel(), 4);
    assert_eq!(Format::R11G11B10_FLOAT.bytes_per_pixel(), 4);
    assert_eq!(Format::R16G16B16A16_FLOAT.bytes_per_pixel(), 8);
    assert_eq!(Format::D32_FLOAT_S8X24_UINT.bytes_per_pixel(), 8);
    assert_eq!(Format::R32G32B32A32_FLOAT.bytes_per_pixel(), 16);
    assert_eq!(Format::Unknown.bytes_per_pixel(), 0);
}

#[test]
fn test_default_is_unknown() {
    assert_eq!(Format::default(), Format::Unknown);
}

//! Unit tests for render_api.rs

use crate::error::Error;
use crate::rhi::RenderApi;

#[test]
fn test_default_is_vulkan() {
    assert_eq!(RenderApi::default(), RenderApi::Vulkan);
}

#[test]
fn test_parse_display_names_round_trip() {
    for api in RenderApi::ALL {
        let parsed: RenderApi = api.to_string().parse().unwrap();
        assert_eq!(parsed, api);
    }
}

#[test]
fn test_parse_short_forms_case_insensitive() {
    assert_eq!("DX11".parse::<RenderApi>().unwrap(), RenderApi::DirectX11);
    assert_eq!("d3d12".parse::<RenderApi>().unwrap(), RenderApi::DirectX12);
    assert_eq!(" Vk ".parse::<RenderApi>().unwrap(), RenderApi::Vulkan);
    assert_eq!("gl".parse::<RenderApi>().unwrap(), RenderApi::OpenGl);
}

#[test]
fn test_parse_rejects_garbage() {
    let err = "metal".parse::<RenderApi>().unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(msg) if msg.contains("metal")));
}

#[test]
fn test_is_direct3d() {
    assert!(RenderApi::DirectX11.is_direct3d());
    assert!(RenderApi::DirectX12.is_direct3d());
    assert!(!RenderApi::Vulkan.is_direct3d());
    assert!(!RenderApi::Unknown.is_direct3d());
}

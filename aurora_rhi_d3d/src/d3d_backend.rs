/// Backends - Direct3D 11 and Direct3D 12 entry points
///
/// Both backend types exist on every platform so a registry can always be
/// filled; outside Windows `create_device` fails with `UnsupportedBackend`.

use std::any::Any;

use aurora_rhi::aurora::Result;
use aurora_rhi::aurora::rhi::{Backend, Device, DeviceConfig, RenderApi, WindowTarget};

#[cfg(not(windows))]
use aurora_rhi::aurora::Error;
#[cfg(not(windows))]
use aurora_rhi::engine_error;

#[cfg(not(windows))]
fn unavailable(api: RenderApi) -> Result<Box<dyn Device>> {
    engine_error!("aurora::d3d", "{} is only available on Windows", api);
    Err(Error::UnsupportedBackend(api.to_string()))
}

/// Direct3D 11 backend
#[derive(Debug, Default)]
pub struct D3D11Backend;

impl D3D11Backend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for D3D11Backend {
    fn render_api(&self) -> RenderApi {
        RenderApi::DirectX11
    }

    fn name(&self) -> &'static str {
        "Direct3D 11"
    }

    #[cfg(windows)]
    fn create_device(&self, config: &DeviceConfig, _window: &WindowTarget) -> Result<Box<dyn Device>> {
        Ok(Box::new(crate::d3d11_device::D3D11Device::new(config)?))
    }

    #[cfg(not(windows))]
    fn create_device(&self, _config: &DeviceConfig, _window: &WindowTarget) -> Result<Box<dyn Device>> {
        unavailable(RenderApi::DirectX11)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Direct3D 12 backend
#[derive(Debug, Default)]
pub struct D3D12Backend;

impl D3D12Backend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for D3D12Backend {
    fn render_api(&self) -> RenderApi {
        RenderApi::DirectX12
    }

    fn name(&self) -> &'static str {
        "Direct3D 12"
    }

    #[cfg(windows)]
    fn create_device(&self, config: &DeviceConfig, _window: &WindowTarget) -> Result<Box<dyn Device>> {
        Ok(Box::new(crate::d3d12_device::D3D12Device::new(config)?))
    }

    #[cfg(not(windows))]
    fn create_device(&self, _config: &DeviceConfig, _window: &WindowTarget) -> Result<Box<dyn Device>> {
        unavailable(RenderApi::DirectX12)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

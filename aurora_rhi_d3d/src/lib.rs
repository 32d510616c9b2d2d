/*!
# Aurora RHI - Direct3D Backends

Direct3D 11 and Direct3D 12 implementations of the Aurora render hardware
interface, sharing DXGI adapter enumeration and presentation.

The native code is compiled on Windows only. The backend types, the DXGI
translation tables and the descriptor free list build everywhere, so a
registry can list the Direct3D backends on any platform; creating a device
outside Windows returns `Error::UnsupportedBackend`.

```no_run
use aurora_rhi::aurora::rhi::{BackendRegistry, RenderApi};

let mut registry = BackendRegistry::new();
aurora_rhi_d3d::register(&mut registry);
assert!(registry.is_registered(RenderApi::DirectX11));
assert!(registry.is_registered(RenderApi::DirectX12));
```
*/

pub mod d3d_state_tables;
pub mod dxgi_tables;
mod d3d_backend;
mod descriptor_slots;

#[cfg(windows)]
mod dxgi;
#[cfg(windows)]
mod d3d11_device;
#[cfg(windows)]
mod d3d11_state;
#[cfg(windows)]
mod d3d11_swapchain;
#[cfg(windows)]
mod d3d11_texture;
#[cfg(windows)]
mod d3d11_command_list;
#[cfg(windows)]
mod d3d12_device;
#[cfg(windows)]
mod d3d12_state;
#[cfg(windows)]
mod d3d12_swapchain;
#[cfg(windows)]
mod d3d12_texture;
#[cfg(windows)]
mod d3d12_command_list;

use aurora_rhi::aurora::rhi::{BackendRegistry, RenderApi};

pub use d3d_backend::{D3D11Backend, D3D12Backend};
pub use descriptor_slots::DescriptorSlots;

#[cfg(windows)]
pub use d3d11_command_list::D3D11CommandList;
#[cfg(windows)]
pub use d3d11_device::{D3D11Context, D3D11Device};
#[cfg(windows)]
pub use d3d11_state::{D3D11BlendState, D3D11DepthStencilState, D3D11RasterizerState};
#[cfg(windows)]
pub use d3d11_swapchain::D3D11Swapchain;
#[cfg(windows)]
pub use d3d11_texture::D3D11Texture;
#[cfg(windows)]
pub use d3d12_command_list::D3D12CommandList;
#[cfg(windows)]
pub use d3d12_device::{D3D12Context, D3D12Device, Descriptor, DescriptorHeap};
#[cfg(windows)]
pub use d3d12_state::{D3D12BlendState, D3D12DepthStencilState, D3D12RasterizerState};
#[cfg(windows)]
pub use d3d12_swapchain::D3D12Swapchain;
#[cfg(windows)]
pub use d3d12_texture::D3D12Texture;

/// Register the Direct3D 11 and Direct3D 12 backend factories
pub fn register(registry: &mut BackendRegistry) {
    registry.register(RenderApi::DirectX11, || Box::new(D3D11Backend::new()));
    registry.register(RenderApi::DirectX12, || Box::new(D3D12Backend::new()));
}

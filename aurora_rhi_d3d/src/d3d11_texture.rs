/// Texture - Direct3D 11 implementation of the RHI Texture trait
///
/// The resource is created typeless for depth formats so the DSV and the SRV
/// of a shadow map can read the same memory through different formats.

use std::any::Any;

use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{Texture, TextureDesc, TextureInfo, TextureType, TextureViews};
use aurora_rhi::engine_error;
use windows::Win32::Foundation::E_OUTOFMEMORY;
use windows::Win32::Graphics::Direct3D::{D3D_SRV_DIMENSION_TEXTURE2D, D3D_SRV_DIMENSION_TEXTURECUBE};
use windows::Win32::Graphics::Direct3D11::{
    ID3D11DepthStencilView, ID3D11RenderTargetView, ID3D11ShaderResourceView, ID3D11Texture2D,
    ID3D11UnorderedAccessView, D3D11_DEPTH_STENCIL_VIEW_DESC, D3D11_DEPTH_STENCIL_VIEW_DESC_0,
    D3D11_DSV_DIMENSION_TEXTURE2D, D3D11_DSV_DIMENSION_TEXTURE2DARRAY,
    D3D11_RENDER_TARGET_VIEW_DESC, D3D11_RENDER_TARGET_VIEW_DESC_0, D3D11_RESOURCE_MISC_TEXTURECUBE,
    D3D11_RTV_DIMENSION_TEXTURE2D, D3D11_RTV_DIMENSION_TEXTURE2DARRAY,
    D3D11_SHADER_RESOURCE_VIEW_DESC, D3D11_SHADER_RESOURCE_VIEW_DESC_0, D3D11_TEX2D_ARRAY_DSV,
    D3D11_TEX2D_ARRAY_RTV, D3D11_TEX2D_ARRAY_UAV, D3D11_TEX2D_DSV, D3D11_TEX2D_RTV,
    D3D11_TEX2D_SRV, D3D11_TEX2D_UAV, D3D11_TEXCUBE_SRV, D3D11_TEXTURE2D_DESC,
    D3D11_UAV_DIMENSION_TEXTURE2D, D3D11_UAV_DIMENSION_TEXTURE2DARRAY,
    D3D11_UNORDERED_ACCESS_VIEW_DESC, D3D11_UNORDERED_ACCESS_VIEW_DESC_0, D3D11_USAGE_DEFAULT,
};
use windows::Win32::Graphics::Dxgi::Common::{DXGI_FORMAT, DXGI_SAMPLE_DESC};

use crate::d3d11_device::{D3D11Context, SOURCE};
use crate::dxgi::hr_error;
use crate::dxgi_tables::{d3d11_bind_flags, dxgi_formats, subresource_index, upload_layout};

/// Direct3D 11 texture implementation
pub struct D3D11Texture {
    resource: ID3D11Texture2D,
    srv: Option<ID3D11ShaderResourceView>,
    uav: Option<ID3D11UnorderedAccessView>,
    rtv: Option<ID3D11RenderTargetView>,
    dsv: Option<ID3D11DepthStencilView>,
    views: TextureViews,
    info: TextureInfo,
}

impl D3D11Texture {
    pub fn new(context: &D3D11Context, desc: &TextureDesc) -> Result<Self> {
        let views = desc.validate()?;
        let info = TextureInfo::from(desc);
        let formats = dxgi_formats(desc.format);
        let layers = desc.array_layers();
        let cube = desc.texture_type == TextureType::TextureCube;

        let native_desc = D3D11_TEXTURE2D_DESC {
            Width: desc.width,
            Height: desc.height,
            MipLevels: desc.mip_levels,
            ArraySize: layers,
            Format: DXGI_FORMAT(formats.resource),
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: d3d11_bind_flags(views),
            CPUAccessFlags: 0,
            MiscFlags: if cube { D3D11_RESOURCE_MISC_TEXTURECUBE.0 as u32 } else { 0 },
        };

        let mut resource = None;
        if let Err(e) = unsafe { context.device.CreateTexture2D(&native_desc, None, Some(&mut resource)) } {
            if e.code() == E_OUTOFMEMORY {
                engine_error!(SOURCE, "Out of memory creating texture '{}'", desc.debug_name);
                return Err(Error::OutOfMemory);
            }
            return Err(hr_error(SOURCE, "CreateTexture2D failed", e));
        }
        let resource = resource
            .ok_or_else(|| Error::BackendError("CreateTexture2D returned no texture".to_string()))?;
        context.set_debug_name(&resource, &desc.debug_name);

        if let Some(data) = &desc.data {
            upload_top_mips(context, &resource, desc, data)?;
        }

        let mut texture = Self { resource, srv: None, uav: None, rtv: None, dsv: None, views, info };
        texture.create_views(context, desc)?;
        Ok(texture)
    }

    fn create_views(&mut self, context: &D3D11Context, desc: &TextureDesc) -> Result<()> {
        let formats = dxgi_formats(desc.format);
        let layers = desc.array_layers();
        let cube = desc.texture_type == TextureType::TextureCube;
        let device = &context.device;

        if self.views.srv {
            let view_desc = D3D11_SHADER_RESOURCE_VIEW_DESC {
                Format: DXGI_FORMAT(formats.srv),
                ViewDimension: if cube { D3D_SRV_DIMENSION_TEXTURECUBE } else { D3D_SRV_DIMENSION_TEXTURE2D },
                Anonymous: if cube {
                    D3D11_SHADER_RESOURCE_VIEW_DESC_0 {
                        TextureCube: D3D11_TEXCUBE_SRV { MostDetailedMip: 0, MipLevels: desc.mip_levels },
                    }
                } else {
                    D3D11_SHADER_RESOURCE_VIEW_DESC_0 {
                        Texture2D: D3D11_TEX2D_SRV { MostDetailedMip: 0, MipLevels: desc.mip_levels },
                    }
                },
            };
            let mut view = None;
            unsafe { device.CreateShaderResourceView(&self.resource, Some(&view_desc), Some(&mut view)) }
                .map_err(|e| hr_error(SOURCE, "CreateShaderResourceView failed", e))?;
            self.srv = view;
        }

        if self.views.uav {
            let view_desc = D3D11_UNORDERED_ACCESS_VIEW_DESC {
                Format: DXGI_FORMAT(formats.srv),
                ViewDimension: if cube { D3D11_UAV_DIMENSION_TEXTURE2DARRAY } else { D3D11_UAV_DIMENSION_TEXTURE2D },
                Anonymous: if cube {
                    D3D11_UNORDERED_ACCESS_VIEW_DESC_0 {
                        Texture2DArray: D3D11_TEX2D_ARRAY_UAV { MipSlice: 0, FirstArraySlice: 0, ArraySize: layers },
                    }
                } else {
                    D3D11_UNORDERED_ACCESS_VIEW_DESC_0 { Texture2D: D3D11_TEX2D_UAV { MipSlice: 0 } }
                },
            };
            let mut view = None;
            unsafe { device.CreateUnorderedAccessView(&self.resource, Some(&view_desc), Some(&mut view)) }
                .map_err(|e| hr_error(SOURCE, "CreateUnorderedAccessView failed", e))?;
            self.uav = view;
        }

        if self.views.rtv {
            let view_desc = D3D11_RENDER_TARGET_VIEW_DESC {
                Format: DXGI_FORMAT(formats.srv),
                ViewDimension: if cube { D3D11_RTV_DIMENSION_TEXTURE2DARRAY } else { D3D11_RTV_DIMENSION_TEXTURE2D },
                Anonymous: if cube {
                    D3D11_RENDER_TARGET_VIEW_DESC_0 {
                        Texture2DArray: D3D11_TEX2D_ARRAY_RTV { MipSlice: 0, FirstArraySlice: 0, ArraySize: layers },
                    }
                } else {
                    D3D11_RENDER_TARGET_VIEW_DESC_0 { Texture2D: D3D11_TEX2D_RTV { MipSlice: 0 } }
                },
            };
            let mut view = None;
            unsafe { device.CreateRenderTargetView(&self.resource, Some(&view_desc), Some(&mut view)) }
                .map_err(|e| hr_error(SOURCE, "CreateRenderTargetView failed", e))?;
            self.rtv = view;
        }

        if self.views.dsv {
            let view_desc = D3D11_DEPTH_STENCIL_VIEW_DESC {
                Format: DXGI_FORMAT(formats.dsv),
                ViewDimension: if cube { D3D11_DSV_DIMENSION_TEXTURE2DARRAY } else { D3D11_DSV_DIMENSION_TEXTURE2D },
                Flags: 0,
                Anonymous: if cube {
                    D3D11_DEPTH_STENCIL_VIEW_DESC_0 {
                        Texture2DArray: D3D11_TEX2D_ARRAY_DSV { MipSlice: 0, FirstArraySlice: 0, ArraySize: layers },
                    }
                } else {
                    D3D11_DEPTH_STENCIL_VIEW_DESC_0 { Texture2D: D3D11_TEX2D_DSV { MipSlice: 0 } }
                },
            };
            let mut view = None;
            unsafe { device.CreateDepthStencilView(&self.resource, Some(&view_desc), Some(&mut view)) }
                .map_err(|e| hr_error(SOURCE, "CreateDepthStencilView failed", e))?;
            self.dsv = view;
        }

        Ok(())
    }

    pub fn resource(&self) -> &ID3D11Texture2D {
        &self.resource
    }

    pub fn srv(&self) -> Option<&ID3D11ShaderResourceView> {
        self.srv.as_ref()
    }

    pub fn uav(&self) -> Option<&ID3D11UnorderedAccessView> {
        self.uav.as_ref()
    }

    pub fn rtv(&self) -> Option<&ID3D11RenderTargetView> {
        self.rtv.as_ref()
    }

    pub fn dsv(&self) -> Option<&ID3D11DepthStencilView> {
        self.dsv.as_ref()
    }
}

/// Copy the tightly packed top mip of every layer into the resource
fn upload_top_mips(context: &D3D11Context, resource: &ID3D11Texture2D, desc: &TextureDesc, data: &[u8]) -> Result<()> {
    let (row_size, layer_size) = upload_layout(desc.width, desc.height, desc.format.bytes_per_pixel())?;
    let row_pitch = u32::try_from(row_size)
        .map_err(|_| Error::InvalidArgument(format!("row of {} bytes is too large to upload", row_size)))?;

    for (layer, bytes) in data.chunks_exact(layer_size).enumerate() {
        unsafe {
            // Depth pitch is only read for 3D textures
            context.immediate_context.UpdateSubresource(
                resource,
                subresource_index(0, layer as u32, desc.mip_levels),
                None,
                bytes.as_ptr() as *const std::ffi::c_void,
                row_pitch,
                0,
            );
        }
    }
    Ok(())
}

impl Texture for D3D11Texture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn views(&self) -> TextureViews {
        self.views
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for D3D11Texture {
    fn drop(&mut self) {
        // Views hold a reference on the resource; release them first
        self.srv = None;
        self.uav = None;
        self.rtv = None;
        self.dsv = None;
    }
}

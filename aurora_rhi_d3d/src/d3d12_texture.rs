/// Texture - Direct3D 12 implementation of the RHI Texture trait
///
/// A committed resource on the default heap that rests in the `COMMON`
/// state; clears transition it and back. Views live in the device's CPU
/// descriptor heaps and return their slots on drop.

use std::any::Any;
use std::sync::Arc;

use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{Texture, TextureDesc, TextureInfo, TextureType, TextureViews};
use aurora_rhi::engine_error;
use windows::Win32::Foundation::E_OUTOFMEMORY;
use windows::Win32::Graphics::Direct3D12::{
    ID3D12GraphicsCommandList, ID3D12Resource, D3D12_CPU_DESCRIPTOR_HANDLE,
    D3D12_DEFAULT_SHADER_4_COMPONENT_MAPPING, D3D12_DEPTH_STENCIL_VIEW_DESC,
    D3D12_DEPTH_STENCIL_VIEW_DESC_0, D3D12_DSV_DIMENSION_TEXTURE2D,
    D3D12_DSV_DIMENSION_TEXTURE2DARRAY, D3D12_DSV_FLAG_NONE, D3D12_HEAP_FLAG_NONE,
    D3D12_HEAP_PROPERTIES, D3D12_HEAP_TYPE, D3D12_HEAP_TYPE_DEFAULT, D3D12_HEAP_TYPE_UPLOAD,
    D3D12_PLACED_SUBRESOURCE_FOOTPRINT, D3D12_RENDER_TARGET_VIEW_DESC,
    D3D12_RENDER_TARGET_VIEW_DESC_0, D3D12_RESOURCE_DESC, D3D12_RESOURCE_DIMENSION_BUFFER,
    D3D12_RESOURCE_DIMENSION_TEXTURE2D, D3D12_RESOURCE_FLAGS, D3D12_RESOURCE_FLAG_NONE,
    D3D12_RESOURCE_STATES, D3D12_RESOURCE_STATE_COMMON, D3D12_RESOURCE_STATE_COPY_DEST,
    D3D12_RESOURCE_STATE_GENERIC_READ, D3D12_RTV_DIMENSION_TEXTURE2D,
    D3D12_RTV_DIMENSION_TEXTURE2DARRAY, D3D12_SHADER_RESOURCE_VIEW_DESC,
    D3D12_SHADER_RESOURCE_VIEW_DESC_0, D3D12_SRV_DIMENSION_TEXTURE2D,
    D3D12_SRV_DIMENSION_TEXTURECUBE, D3D12_TEX2D_ARRAY_DSV, D3D12_TEX2D_ARRAY_RTV,
    D3D12_TEX2D_ARRAY_UAV, D3D12_TEX2D_DSV, D3D12_TEX2D_RTV, D3D12_TEX2D_SRV, D3D12_TEX2D_UAV,
    D3D12_TEXCUBE_SRV, D3D12_TEXTURE_COPY_LOCATION, D3D12_TEXTURE_COPY_LOCATION_0,
    D3D12_TEXTURE_COPY_TYPE_PLACED_FOOTPRINT, D3D12_TEXTURE_COPY_TYPE_SUBRESOURCE_INDEX,
    D3D12_TEXTURE_LAYOUT_ROW_MAJOR, D3D12_TEXTURE_LAYOUT_UNKNOWN, D3D12_UAV_DIMENSION_TEXTURE2D,
    D3D12_UAV_DIMENSION_TEXTURE2DARRAY, D3D12_UNORDERED_ACCESS_VIEW_DESC,
    D3D12_UNORDERED_ACCESS_VIEW_DESC_0,
};
use windows::Win32::Graphics::Dxgi::Common::{DXGI_FORMAT, DXGI_FORMAT_UNKNOWN, DXGI_SAMPLE_DESC};

use crate::d3d12_device::{transition_barrier, D3D12Context, Descriptor, SOURCE};
use crate::dxgi::hr_error;
use crate::dxgi_tables::{d3d12_resource_flags, dxgi_formats, subresource_index, upload_layout};

/// Direct3D 12 texture implementation
pub struct D3D12Texture {
    context: Arc<D3D12Context>,
    resource: ID3D12Resource,
    srv: Option<Descriptor>,
    uav: Option<Descriptor>,
    rtv: Option<Descriptor>,
    dsv: Option<Descriptor>,
    views: TextureViews,
    info: TextureInfo,
}

impl D3D12Texture {
    pub fn new(context: Arc<D3D12Context>, desc: &TextureDesc) -> Result<Self> {
        let views = desc.validate()?;
        let info = TextureInfo::from(desc);
        let formats = dxgi_formats(desc.format);

        let resource_desc = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
            Alignment: 0,
            Width: desc.width as u64,
            Height: desc.height,
            DepthOrArraySize: desc.array_layers() as u16,
            MipLevels: desc.mip_levels as u16,
            Format: DXGI_FORMAT(formats.resource),
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            Layout: D3D12_TEXTURE_LAYOUT_UNKNOWN,
            Flags: D3D12_RESOURCE_FLAGS(d3d12_resource_flags(views)),
        };
        let resource = create_committed(&context, D3D12_HEAP_TYPE_DEFAULT, &resource_desc, D3D12_RESOURCE_STATE_COMMON)
            .map_err(|e| {
                if matches!(e, Error::OutOfMemory) {
                    engine_error!(SOURCE, "Out of memory creating texture '{}'", desc.debug_name);
                }
                e
            })?;
        context.set_debug_name(&resource, &desc.debug_name);

        if let Some(data) = &desc.data {
            upload_top_mips(&context, &resource, &resource_desc, desc, data)?;
        }

        // Descriptors allocated from here on are returned by Drop
        let mut texture = Self { context, resource, srv: None, uav: None, rtv: None, dsv: None, views, info };
        texture.create_views(desc)?;
        Ok(texture)
    }

    fn create_views(&mut self, desc: &TextureDesc) -> Result<()> {
        let formats = dxgi_formats(desc.format);
        let layers = desc.array_layers();
        let cube = desc.texture_type == TextureType::TextureCube;
        let context = Arc::clone(&self.context);
        let device = &context.device;

        if self.views.srv {
            let view_desc = D3D12_SHADER_RESOURCE_VIEW_DESC {
                Format: DXGI_FORMAT(formats.srv),
                ViewDimension: if cube { D3D12_SRV_DIMENSION_TEXTURECUBE } else { D3D12_SRV_DIMENSION_TEXTURE2D },
                Shader4ComponentMapping: D3D12_DEFAULT_SHADER_4_COMPONENT_MAPPING,
                Anonymous: if cube {
                    D3D12_SHADER_RESOURCE_VIEW_DESC_0 {
                        TextureCube: D3D12_TEXCUBE_SRV {
                            MostDetailedMip: 0,
                            MipLevels: desc.mip_levels,
                            ResourceMinLODClamp: 0.0,
                        },
                    }
                } else {
                    D3D12_SHADER_RESOURCE_VIEW_DESC_0 {
                        Texture2D: D3D12_TEX2D_SRV {
                            MostDetailedMip: 0,
                            MipLevels: desc.mip_levels,
                            PlaneSlice: 0,
                            ResourceMinLODClamp: 0.0,
                        },
                    }
                },
            };
            let descriptor = context.srv_uav_heap.allocate()?;
            self.srv = Some(descriptor);
            unsafe { device.CreateShaderResourceView(&self.resource, Some(&view_desc), descriptor.handle) };
        }

        if self.views.uav {
            let view_desc = D3D12_UNORDERED_ACCESS_VIEW_DESC {
                Format: DXGI_FORMAT(formats.srv),
                ViewDimension: if cube { D3D12_UAV_DIMENSION_TEXTURE2DARRAY } else { D3D12_UAV_DIMENSION_TEXTURE2D },
                Anonymous: if cube {
                    D3D12_UNORDERED_ACCESS_VIEW_DESC_0 {
                        Texture2DArray: D3D12_TEX2D_ARRAY_UAV {
                            MipSlice: 0,
                            FirstArraySlice: 0,
                            ArraySize: layers,
                            PlaneSlice: 0,
                        },
                    }
                } else {
                    D3D12_UNORDERED_ACCESS_VIEW_DESC_0 { Texture2D: D3D12_TEX2D_UAV { MipSlice: 0, PlaneSlice: 0 } }
                },
            };
            let descriptor = context.srv_uav_heap.allocate()?;
            self.uav = Some(descriptor);
            unsafe {
                device.CreateUnorderedAccessView(&self.resource, None::<&ID3D12Resource>, Some(&view_desc), descriptor.handle)
            };
        }

        if self.views.rtv {
            let view_desc = D3D12_RENDER_TARGET_VIEW_DESC {
                Format: DXGI_FORMAT(formats.srv),
                ViewDimension: if cube { D3D12_RTV_DIMENSION_TEXTURE2DARRAY } else { D3D12_RTV_DIMENSION_TEXTURE2D },
                Anonymous: if cube {
                    D3D12_RENDER_TARGET_VIEW_DESC_0 {
                        Texture2DArray: D3D12_TEX2D_ARRAY_RTV {
                            MipSlice: 0,
                            FirstArraySlice: 0,
                            ArraySize: layers,
                            PlaneSlice: 0,
                        },
                    }
                } else {
                    D3D12_RENDER_TARGET_VIEW_DESC_0 { Texture2D: D3D12_TEX2D_RTV { MipSlice: 0, PlaneSlice: 0 } }
                },
            };
            let descriptor = context.rtv_heap.allocate()?;
            self.rtv = Some(descriptor);
            unsafe { device.CreateRenderTargetView(&self.resource, Some(&view_desc), descriptor.handle) };
        }

        if self.views.dsv {
            let view_desc = D3D12_DEPTH_STENCIL_VIEW_DESC {
                Format: DXGI_FORMAT(formats.dsv),
                ViewDimension: if cube { D3D12_DSV_DIMENSION_TEXTURE2DARRAY } else { D3D12_DSV_DIMENSION_TEXTURE2D },
                Flags: D3D12_DSV_FLAG_NONE,
                Anonymous: if cube {
                    D3D12_DEPTH_STENCIL_VIEW_DESC_0 {
                        Texture2DArray: D3D12_TEX2D_ARRAY_DSV { MipSlice: 0, FirstArraySlice: 0, ArraySize: layers },
                    }
                } else {
                    D3D12_DEPTH_STENCIL_VIEW_DESC_0 { Texture2D: D3D12_TEX2D_DSV { MipSlice: 0 } }
                },
            };
            let descriptor = context.dsv_heap.allocate()?;
            self.dsv = Some(descriptor);
            unsafe { device.CreateDepthStencilView(&self.resource, Some(&view_desc), descriptor.handle) };
        }

        Ok(())
    }

    pub fn resource(&self) -> &ID3D12Resource {
        &self.resource
    }

    pub fn srv_handle(&self) -> Option<D3D12_CPU_DESCRIPTOR_HANDLE> {
        self.srv.map(|d| d.handle)
    }

    pub fn uav_handle(&self) -> Option<D3D12_CPU_DESCRIPTOR_HANDLE> {
        self.uav.map(|d| d.handle)
    }

    pub fn rtv_handle(&self) -> Option<D3D12_CPU_DESCRIPTOR_HANDLE> {
        self.rtv.map(|d| d.handle)
    }

    pub fn dsv_handle(&self) -> Option<D3D12_CPU_DESCRIPTOR_HANDLE> {
        self.dsv.map(|d| d.handle)
    }
}

/// Committed resource on `heap_type`, with E_OUTOFMEMORY mapped to `Error::OutOfMemory`
fn create_committed(
    context: &D3D12Context,
    heap_type: D3D12_HEAP_TYPE,
    desc: &D3D12_RESOURCE_DESC,
    state: D3D12_RESOURCE_STATES,
) -> Result<ID3D12Resource> {
    let heap = D3D12_HEAP_PROPERTIES { Type: heap_type, ..Default::default() };
    let mut resource: Option<ID3D12Resource> = None;
    if let Err(e) = unsafe {
        context
            .device
            .CreateCommittedResource(&heap, D3D12_HEAP_FLAG_NONE, desc, state, None, &mut resource)
    } {
        if e.code() == E_OUTOFMEMORY {
            return Err(Error::OutOfMemory);
        }
        return Err(hr_error(SOURCE, "CreateCommittedResource failed", e));
    }
    resource.ok_or_else(|| Error::BackendError("CreateCommittedResource returned no resource".to_string()))
}

/// Stage the tightly packed top mip of every layer and copy it into `resource`
fn upload_top_mips(
    context: &D3D12Context,
    resource: &ID3D12Resource,
    resource_desc: &D3D12_RESOURCE_DESC,
    desc: &TextureDesc,
    data: &[u8],
) -> Result<()> {
    let (row_size, layer_size) = upload_layout(desc.width, desc.height, desc.format.bytes_per_pixel())?;
    let layers = desc.array_layers();
    let subresources = layers * desc.mip_levels;
    let mut footprints = vec![D3D12_PLACED_SUBRESOURCE_FOOTPRINT::default(); subresources as usize];
    let mut total_bytes = 0u64;
    unsafe {
        context.device.GetCopyableFootprints(
            resource_desc,
            0,
            subresources,
            0,
            Some(footprints.as_mut_ptr()),
            None,
            None,
            Some(&mut total_bytes),
        );
    }

    let staging_desc = D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
        Alignment: 0,
        Width: total_bytes,
        Height: 1,
        DepthOrArraySize: 1,
        MipLevels: 1,
        Format: DXGI_FORMAT_UNKNOWN,
        SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
        Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
        Flags: D3D12_RESOURCE_FLAG_NONE,
    };
    let staging = create_committed(context, D3D12_HEAP_TYPE_UPLOAD, &staging_desc, D3D12_RESOURCE_STATE_GENERIC_READ)?;

    let mut mapped: *mut std::ffi::c_void = std::ptr::null_mut();
    unsafe { staging.Map(0, None, Some(&mut mapped)) }
        .map_err(|e| hr_error(SOURCE, "Failed to map texture staging buffer", e))?;
    for (layer, bytes) in data.chunks_exact(layer_size).enumerate() {
        let footprint = &footprints[subresource_index(0, layer as u32, desc.mip_levels) as usize];
        let row_pitch = footprint.Footprint.RowPitch as usize;
        for (row, src) in bytes.chunks_exact(row_size).enumerate() {
            unsafe {
                let dst = (mapped as *mut u8).add(footprint.Offset as usize + row * row_pitch);
                std::ptr::copy_nonoverlapping(src.as_ptr(), dst, row_size);
            }
        }
    }
    unsafe { staging.Unmap(0, None) };

    context.immediate_submit(|list: &ID3D12GraphicsCommandList| {
        unsafe {
            list.ResourceBarrier(&[transition_barrier(resource, D3D12_RESOURCE_STATE_COMMON, D3D12_RESOURCE_STATE_COPY_DEST)]);
            for layer in 0..layers {
                let subresource = subresource_index(0, layer, desc.mip_levels);
                let dst = D3D12_TEXTURE_COPY_LOCATION {
                    pResource: std::mem::transmute_copy(resource),
                    Type: D3D12_TEXTURE_COPY_TYPE_SUBRESOURCE_INDEX,
                    Anonymous: D3D12_TEXTURE_COPY_LOCATION_0 { SubresourceIndex: subresource },
                };
                let src = D3D12_TEXTURE_COPY_LOCATION {
                    pResource: std::mem::transmute_copy(&staging),
                    Type: D3D12_TEXTURE_COPY_TYPE_PLACED_FOOTPRINT,
                    Anonymous: D3D12_TEXTURE_COPY_LOCATION_0 { PlacedFootprint: footprints[subresource as usize] },
                };
                list.CopyTextureRegion(&dst, 0, 0, 0, &src, None);
            }
            list.ResourceBarrier(&[transition_barrier(resource, D3D12_RESOURCE_STATE_COPY_DEST, D3D12_RESOURCE_STATE_COMMON)]);
        }
        Ok(())
    })
}

impl Texture for D3D12Texture {
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

impl Drop for D3D12Texture {
    fn drop(&mut self) {
        if let Some(descriptor) = self.srv.take() {
            self.context.srv_uav_heap.free(descriptor);
        }
        if let Some(descriptor) = self.uav.take() {
            self.context.srv_uav_heap.free(descriptor);
        }
        if let Some(descriptor) = self.rtv.take() {
            self.context.rtv_heap.free(descriptor);
        }
        if let Some(descriptor) = self.dsv.take() {
            self.context.dsv_heap.free(descriptor);
        }
    }
}

/// Texture trait, texture descriptor and view planning

use std::any::Any;
use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::rhi::Format;

bitflags! {
    /// Views a texture is created with
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureFlags: u32 {
        /// Shader resource view (sampled)
        const SRV = 1 << 0;
        /// Unordered access view (storage)
        const UAV = 1 << 1;
        /// Color render target view
        const RT_COLOR = 1 << 2;
        /// Depth/stencil view
        const RT_DEPTH_STENCIL = 1 << 3;
    }
}

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureType {
    #[default]
    Texture2D,
    /// Six square faces (+X, -X, +Y, -Y, +Z, -Z)
    TextureCube,
}

impl TextureType {
    pub fn array_layers(&self) -> u32 {
        match self {
            TextureType::Texture2D => 1,
            TextureType::TextureCube => 6,
        }
    }
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    pub format: Format,
    pub flags: TextureFlags,
    pub texture_type: TextureType,
    pub debug_name: String,
    /// Tightly packed top mip of every layer, layer after layer
    pub data: Option<Vec<u8>>,
}

impl TextureDesc {
    /// Sized texture without initial content (render targets, generated resources)
    pub fn new(width: u32, height: u32, format: Format, flags: TextureFlags) -> Self {
        Self {
            width,
            height,
            mip_levels: 1,
            format,
            flags,
            texture_type: TextureType::Texture2D,
            debug_name: String::new(),
            data: None,
        }
    }

    /// Sampled texture filled from decoded image data
    pub fn with_data(width: u32, height: u32, format: Format, data: Vec<u8>) -> Self {
        Self {
            data: Some(data),
            ..Self::new(width, height, format, TextureFlags::SRV)
        }
    }

    pub fn with_type(mut self, texture_type: TextureType) -> Self {
        self.texture_type = texture_type;
        self
    }

    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    pub fn with_debug_name(mut self, name: impl Into<String>) -> Self {
        self.debug_name = name.into();
        self
    }

    pub fn array_layers(&self) -> u32 {
        self.texture_type.array_layers()
    }

    /// Byte size expected for `data`
    pub fn expected_data_size(&self) -> usize {
        self.width as usize
            * self.height as usize
            * self.format.bytes_per_pixel() as usize
            * self.array_layers() as usize
    }

    /// Validate the descriptor and plan its views
    pub fn validate(&self) -> Result<TextureViews> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidArgument(format!(
                "texture '{}' has a zero dimension ({}x{})",
                self.debug_name, self.width, self.height
            )));
        }
        if self.format == Format::Unknown {
            return Err(Error::InvalidArgument(format!("texture '{}' has no format", self.debug_name)));
        }
        if self.mip_levels == 0 {
            return Err(Error::InvalidArgument(format!("texture '{}' needs at least one mip", self.debug_name)));
        }
        if self.texture_type == TextureType::TextureCube && self.width != self.height {
            return Err(Error::InvalidArgument(format!(
                "cube texture '{}' faces must be square",
                self.debug_name
            )));
        }
        if let Some(data) = &self.data {
            if data.len() != self.expected_data_size() {
                return Err(Error::InvalidArgument(format!(
                    "texture '{}' data is {} bytes, expected {}",
                    self.debug_name,
                    data.len(),
                    self.expected_data_size()
                )));
            }
        }
        TextureViews::plan(self.flags, self.format)
    }
}

// ===== VIEW PLAN =====

/// Views composed on top of the texture resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureViews {
    pub srv: bool,
    pub uav: bool,
    pub rtv: bool,
    pub dsv: bool,
}

impl TextureViews {
    /// One view per flag: SRV, UAV, RT_COLOR -> RTV, RT_DEPTH_STENCIL -> DSV
    ///
    /// A depth texture with SRV gets both a DSV and a depth-only SRV over the
    /// same resource (shadow maps).
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` when RT_COLOR and RT_DEPTH_STENCIL are
    /// combined, or when a flag does not suit the format.
    pub fn plan(flags: TextureFlags, format: Format) -> Result<Self> {
        if flags.contains(TextureFlags::RT_COLOR | TextureFlags::RT_DEPTH_STENCIL) {
            return Err(Error::InvalidArgument(
                "RT_COLOR and RT_DEPTH_STENCIL are mutually exclusive".to_string(),
            ));
        }
        if flags.contains(TextureFlags::RT_DEPTH_STENCIL) && !format.is_depth() {
            return Err(Error::InvalidArgument(format!(
                "RT_DEPTH_STENCIL needs a depth format, got {:?}",
                format
            )));
        }
        if format.is_depth() && flags.intersects(TextureFlags::RT_COLOR | TextureFlags::UAV) {
            return Err(Error::InvalidArgument(format!(
                "{:?} cannot back a color target or an unordered access view",
                format
            )));
        }
        Ok(Self {
            srv: flags.contains(TextureFlags::SRV),
            uav: flags.contains(TextureFlags::UAV),
            rtv: flags.contains(TextureFlags::RT_COLOR),
            dsv: flags.contains(TextureFlags::RT_DEPTH_STENCIL),
        })
    }

    pub fn count(&self) -> usize {
        [self.srv, self.uav, self.rtv, self.dsv].iter().filter(|v| **v).count()
    }
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    pub array_layers: u32,
    pub format: Format,
    pub flags: TextureFlags,
    pub texture_type: TextureType,
}

impl From<&TextureDesc> for TextureInfo {
    fn from(desc: &TextureDesc) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            mip_levels: desc.mip_levels,
            array_layers: desc.array_layers(),
            format: desc.format,
            flags: desc.flags,
            texture_type: desc.texture_type,
        }
    }
}

// ===== TEXTURE TRAIT =====

/// Texture resource trait
///
/// Dropping a texture releases its views first, then the resource.
pub trait Texture {
    fn info(&self) -> &TextureInfo;

    /// Views that were actually created
    fn views(&self) -> TextureViews;

    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;

/// Swapchain trait, present flags and swapchain descriptor

use std::any::Any;
use bitflags::bitflags;

use crate::engine_warn;
use crate::error::{Error, Result};
use crate::rhi::Format;

// ===== PRESENT FLAGS =====

bitflags! {
    /// Presentation options requested for a swapchain
    ///
    /// One present mode and one swap effect are picked from the set; see
    /// [`PresentFlags::present_mode`] and [`PresentFlags::swap_effect`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PresentFlags: u32 {
        /// No vertical sync (requires tearing support on DXGI)
        const IMMEDIATE = 1 << 0;
        /// Replace the queued image, never tear
        const MAILBOX = 1 << 1;
        /// Vertical sync
        const FIFO = 1 << 2;
        /// Vertical sync, late images tear
        const FIFO_RELAXED = 1 << 3;
        const SWAP_DISCARD = 1 << 4;
        const SWAP_SEQUENTIAL = 1 << 5;
        const SWAP_FLIP_DISCARD = 1 << 6;
        const SWAP_FLIP_SEQUENTIAL = 1 << 7;
        /// DXGI: allow fullscreen mode switches
        const ALLOW_MODE_SWITCH = 1 << 8;
    }
}

/// Presentation timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    Immediate,
    Mailbox,
    Fifo,
    FifoRelaxed,
}

/// DXGI swap effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapEffect {
    Discard,
    Sequential,
    FlipDiscard,
    FlipSequential,
}

impl SwapEffect {
    pub fn is_flip(&self) -> bool {
        matches!(self, SwapEffect::FlipDiscard | SwapEffect::FlipSequential)
    }
}

impl PresentFlags {
    /// Requested present mode (IMMEDIATE > MAILBOX > FIFO_RELAXED > FIFO, FIFO by default)
    pub fn present_mode(&self) -> PresentMode {
        if self.contains(PresentFlags::IMMEDIATE) {
            PresentMode::Immediate
        } else if self.contains(PresentFlags::MAILBOX) {
            PresentMode::Mailbox
        } else if self.contains(PresentFlags::FIFO_RELAXED) {
            PresentMode::FifoRelaxed
        } else {
            PresentMode::Fifo
        }
    }

    /// Requested swap effect (flip-discard by default)
    pub fn swap_effect(&self) -> SwapEffect {
        if self.contains(PresentFlags::SWAP_FLIP_DISCARD) {
            SwapEffect::FlipDiscard
        } else if self.contains(PresentFlags::SWAP_FLIP_SEQUENTIAL) {
            SwapEffect::FlipSequential
        } else if self.contains(PresentFlags::SWAP_SEQUENTIAL) {
            SwapEffect::Sequential
        } else if self.contains(PresentFlags::SWAP_DISCARD) {
            SwapEffect::Discard
        } else {
            SwapEffect::FlipDiscard
        }
    }

    /// Drop IMMEDIATE when the presentation engine cannot tear
    ///
    /// Logs a warning under `source` when the flag is removed.
    pub fn validated(self, tearing_supported: bool, source: &str) -> Self {
        if self.contains(PresentFlags::IMMEDIATE) && !tearing_supported {
            engine_warn!(source, "Tearing is not supported, IMMEDIATE present flag ignored");
            return self - PresentFlags::IMMEDIATE;
        }
        self
    }
}

impl Default for PresentFlags {
    fn default() -> Self {
        PresentFlags::FIFO | PresentFlags::SWAP_FLIP_DISCARD
    }
}

// ===== SWAPCHAIN DESC =====

/// Maximum number of back buffers
pub const MAX_SWAPCHAIN_BUFFERS: u32 = 8;

/// Descriptor for creating a swapchain
#[derive(Debug, Clone)]
pub struct SwapchainDesc {
    pub width: u32,
    pub height: u32,
    /// Back buffer count, 1..=8 (at least 2 with a flip swap effect)
    pub buffer_count: u32,
    pub format: Format,
    pub flags: PresentFlags,
    pub debug_name: String,
}

impl SwapchainDesc {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buffer_count: 2,
            format: Format::B8G8R8A8_UNORM,
            flags: PresentFlags::default(),
            debug_name: String::new(),
        }
    }

    /// Check the buffer count against the swap effect
    pub fn validate(&self) -> Result<()> {
        if self.buffer_count == 0 || self.buffer_count > MAX_SWAPCHAIN_BUFFERS {
            return Err(Error::InvalidArgument(format!(
                "swapchain buffer count {} outside 1..={}",
                self.buffer_count, MAX_SWAPCHAIN_BUFFERS
            )));
        }
        if self.flags.swap_effect().is_flip() && self.buffer_count < 2 {
            return Err(Error::InvalidArgument(
                "flip swap effects need at least 2 buffers".to_string(),
            ));
        }
        if self.format.is_depth() || self.format == Format::Unknown {
            return Err(Error::InvalidArgument(format!(
                "{:?} is not a presentable format",
                self.format
            )));
        }
        Ok(())
    }
}

/// True when a resize request must rebuild the swapchain
pub fn needs_resize(current: (u32, u32), requested: (u32, u32), force: bool) -> bool {
    force || current != requested
}

// ===== SWAPCHAIN TRAIT =====

/// Window-bound chain of presentable images
pub trait Swapchain {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn buffer_count(&self) -> u32;

    fn format(&self) -> Format;

    /// Flags after validation (unsupported options removed)
    fn present_flags(&self) -> PresentFlags;

    /// Acquire the next back buffer and return its index
    fn acquire_next_image(&mut self) -> Result<u32>;

    /// Index returned by the last `acquire_next_image`
    fn current_image(&self) -> u32;

    /// Present the current back buffer
    fn present(&mut self) -> Result<()>;

    /// Resize the back buffers
    ///
    /// Returns `Ok(false)` without touching the GPU when the size is unchanged
    /// and `force` is not set. Otherwise waits for the GPU to release the old
    /// buffers, rebuilds the chain and its views and returns `Ok(true)`.
    fn resize(&mut self, width: u32, height: u32, force: bool) -> Result<bool>;

    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
#[path = "swapchain_tests.rs"]
mod tests;

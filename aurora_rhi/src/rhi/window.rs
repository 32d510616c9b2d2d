/// Window description handed to backends

use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};
use winit::window::Window;

use crate::error::{Error, Result};
use crate::rhi::display::{monitor_modes, DisplayMode};

/// Native window a device or swapchain presents to
///
/// Holds raw handles only: the window itself must outlive every device and
/// swapchain created from this target.
#[derive(Debug, Clone)]
pub struct WindowTarget {
    display_handle: RawDisplayHandle,
    window_handle: RawWindowHandle,
    width: u32,
    height: u32,
    monitor_modes: Vec<DisplayMode>,
}

impl WindowTarget {
    /// Capture the handles of any window type
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` when the window cannot provide its handles
    /// (for example when it is not yet created or already destroyed).
    pub fn new<W>(window: &W, width: u32, height: u32) -> Result<Self>
    where
        W: HasDisplayHandle + HasWindowHandle + ?Sized,
    {
        let display_handle = window
            .display_handle()
            .map_err(|e| Error::InvalidArgument(format!("display handle unavailable: {}", e)))?
            .as_raw();
        let window_handle = window
            .window_handle()
            .map_err(|e| Error::InvalidArgument(format!("window handle unavailable: {}", e)))?
            .as_raw();
        Ok(Self::from_raw(display_handle, window_handle, width, height))
    }

    /// Capture a winit window with its client size and the video modes of
    /// the monitor it is on
    pub fn from_winit(window: &Window) -> Result<Self> {
        let size = window.inner_size();
        let modes = window
            .current_monitor()
            .map(|monitor| monitor_modes(&monitor))
            .unwrap_or_default();
        Ok(Self::new(window, size.width, size.height)?.with_monitor_modes(modes))
    }

    pub fn from_raw(
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            display_handle,
            window_handle,
            width,
            height,
            monitor_modes: Vec::new(),
        }
    }

    pub fn with_monitor_modes(mut self, modes: Vec<DisplayMode>) -> Self {
        self.monitor_modes = modes;
        self
    }

    pub fn raw_display_handle(&self) -> RawDisplayHandle {
        self.display_handle
    }

    pub fn raw_window_handle(&self) -> RawWindowHandle {
        self.window_handle
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Update the client size after the window was resized
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn monitor_modes(&self) -> &[DisplayMode] {
        &self.monitor_modes
    }
}

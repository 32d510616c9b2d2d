/// Display modes and per-device display list

use winit::monitor::MonitorHandle;
use winit::window::Window;

// ===== DISPLAY MODE =====

/// Resolution plus refresh rate as a rational
///
/// Two modes are equal when width, height and the rounded refresh rate match,
/// so 60000/1001 and 60/1 count as the same mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub refresh_numerator: u32,
    pub refresh_denominator: u32,
    hertz: u32,
}

impl DisplayMode {
    pub fn new(width: u32, height: u32, refresh_numerator: u32, refresh_denominator: u32) -> Self {
        let hertz = if refresh_denominator == 0 {
            0
        } else {
            (refresh_numerator as f64 / refresh_denominator as f64).round() as u32
        };
        Self { width, height, refresh_numerator, refresh_denominator, hertz }
    }

    pub fn from_hertz(width: u32, height: u32, hertz: u32) -> Self {
        Self::new(width, height, hertz, 1)
    }

    /// winit reports refresh rates in millihertz
    pub fn from_millihertz(width: u32, height: u32, millihertz: u32) -> Self {
        Self::new(width, height, millihertz, 1000)
    }

    pub fn hertz(&self) -> u32 {
        self.hertz
    }
}

impl PartialEq for DisplayMode {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.hertz == other.hertz
    }
}

impl Eq for DisplayMode {}

// ===== DISPLAY =====

/// Display modes reported by the adapters of a device
///
/// Modes are kept sorted by refresh rate, highest first. The active mode only
/// moves to a mode that is strictly wider or taller and at least as fast.
#[derive(Debug, Clone, Default)]
pub struct Display {
    modes: Vec<DisplayMode>,
    active: DisplayMode,
}

impl Display {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mode
    ///
    /// Returns false when an equal mode was already present.
    pub fn register_display_mode(&mut self, mode: DisplayMode) -> bool {
        if self.modes.contains(&mode) {
            return false;
        }
        self.modes.push(mode);
        self.modes.sort_by(|a, b| b.hertz.cmp(&a.hertz));

        let larger = mode.width > self.active.width || mode.height > self.active.height;
        if larger && mode.hertz >= self.active.hertz {
            self.active = mode;
        }
        true
    }

    /// Highest registered refresh rate, 0 when nothing is registered
    pub fn highest_hertz(&self) -> u32 {
        self.modes.first().map(DisplayMode::hertz).unwrap_or(0)
    }

    pub fn active_mode(&self) -> DisplayMode {
        self.active
    }

    pub fn modes(&self) -> &[DisplayMode] {
        &self.modes
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

// ===== OS QUERIES =====

/// Size of the primary monitor (falls back to the window's monitor)
pub fn primary_dimensions(window: &Window) -> (u32, u32) {
    window
        .primary_monitor()
        .or_else(|| window.current_monitor())
        .map(|monitor| {
            let size = monitor.size();
            (size.width, size.height)
        })
        .unwrap_or((0, 0))
}

/// Bounding box of every monitor of the desktop
pub fn virtual_dimensions(window: &Window) -> (u32, u32) {
    bounding_box(window.available_monitors().map(|monitor| {
        let position = monitor.position();
        let size = monitor.size();
        (position.x, position.y, size.width, size.height)
    }))
}

/// Size of the box enclosing a set of `(x, y, width, height)` rectangles
pub fn bounding_box<I>(rects: I) -> (u32, u32)
where
    I: IntoIterator<Item = (i32, i32, u32, u32)>,
{
    let mut bounds: Option<(i64, i64, i64, i64)> = None;
    for (x, y, width, height) in rects {
        let (left, top) = (x as i64, y as i64);
        let (right, bottom) = (left + width as i64, top + height as i64);
        bounds = Some(match bounds {
            None => (left, top, right, bottom),
            Some((l, t, r, b)) => (l.min(left), t.min(top), r.max(right), b.max(bottom)),
        });
    }
    bounds
        .map(|(l, t, r, b)| ((r - l) as u32, (b - t) as u32))
        .unwrap_or((0, 0))
}

/// Video modes of a monitor as display modes
pub fn monitor_modes(monitor: &MonitorHandle) -> Vec<DisplayMode> {
    monitor
        .video_modes()
        .map(|mode| {
            let size = mode.size();
            DisplayMode::from_millihertz(size.width, size.height, mode.refresh_rate_millihertz())
        })
        .collect()
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;

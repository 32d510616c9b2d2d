/// Viewport and scissor rectangles

/// Render rectangle with its depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-target viewport at the origin with the [0, 1] depth range
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Width over height, 0 when the viewport has no height
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        }
    }

    /// A minimized window yields an undefined (empty) viewport
    pub fn is_defined(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Integer scissor rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScissorRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScissorRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

impl From<&Viewport> for ScissorRect {
    fn from(viewport: &Viewport) -> Self {
        Self {
            x: viewport.x as i32,
            y: viewport.y as i32,
            width: viewport.width.max(0.0) as u32,
            height: viewport.height.max(0.0) as u32,
        }
    }
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;

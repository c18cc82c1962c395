/// Viewport dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Create a viewport, clamping each side to at least one pixel
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Width over height
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Viewport {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_aspect() {
        let viewport = Viewport::new(1920, 1080);
        assert_eq!(viewport.aspect(), 1920.0 / 1080.0);
    }

    #[test]
    fn test_viewport_clamps_zero_sides() {
        let viewport = Viewport::new(0, 0);
        assert_eq!(viewport.width, 1);
        assert_eq!(viewport.height, 1);
        assert_eq!(viewport.aspect(), 1.0);
    }

    #[test]
    fn test_viewport_from_physical_size() {
        let viewport = Viewport::from(winit::dpi::PhysicalSize::new(800, 600));
        assert_eq!(viewport, Viewport::new(800, 600));
    }
}

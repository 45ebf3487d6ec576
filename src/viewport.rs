//! Surface size shared by the render surface and the camera projection.

/// Physical size of the drawable surface in pixels.
///
/// A size with a zero dimension is valid to hold (minimised windows report
/// one) but is never drawable: [`SurfaceSize::is_drawable`] returns `false`
/// and resize operations skip it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Convert a logical (CSS pixel) size into a physical one.
    ///
    /// `scale_factor` is the device pixel ratio. Fractional results are
    /// rounded to the nearest pixel.
    pub fn from_logical(width: f64, height: f64, scale_factor: f64) -> Self {
        let to_px = |v: f64| (v * scale_factor).round().max(0.0) as u32;
        Self {
            width: to_px(width),
            height: to_px(height),
        }
    }

    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width over height. Only meaningful for drawable sizes.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for SurfaceSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

impl From<SurfaceSize> for winit::dpi::PhysicalSize<u32> {
    fn from(size: SurfaceSize) -> Self {
        winit::dpi::PhysicalSize::new(size.width, size.height)
    }
}

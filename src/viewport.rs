//! Viewport size and render surface dimensions.

use winit::dpi::PhysicalSize;

/// Upper bound on device pixels per logical pixel
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Render surface size in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

/// Logical viewport size plus the display scale factor
///
/// Only resize notifications mutate it. The camera reads [`Viewport::aspect`]
/// and the render surface reads [`Viewport::surface_size`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    scale_factor: f64,
}

impl Viewport {
    /// Creates a viewport; degenerate sizes are raised to one logical pixel
    pub fn new(width: f64, height: f64, scale_factor: f64) -> Self {
        Self {
            width: sanitize(width, 1.0),
            height: sanitize(height, 1.0),
            scale_factor: sanitize(scale_factor, 1.0),
        }
    }

    /// Builds a viewport from a window's physical size
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(sanitize(scale_factor, 1.0));
        Self::new(logical.width, logical.height, scale_factor)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// Device pixel ratio used for the surface, capped at [`MAX_PIXEL_RATIO`]
    pub fn pixel_ratio(&self) -> f64 {
        self.scale_factor.min(MAX_PIXEL_RATIO)
    }

    pub fn surface_size(&self) -> SurfaceSize {
        let ratio = self.pixel_ratio();
        SurfaceSize {
            width: ((self.width * ratio).round() as u32).max(1),
            height: ((self.height * ratio).round() as u32).max(1),
        }
    }

    /// Applies a resize notification with logical dimensions
    ///
    /// Returns `false` when nothing changed or when the new size is not
    /// positive (a minimised window), in which case the viewport keeps its
    /// previous value.
    pub fn resize(&mut self, width: f64, height: f64, scale_factor: f64) -> bool {
        if !(is_positive(width) && is_positive(height)) {
            return false;
        }

        let next = Self::new(width, height, scale_factor);
        if next == *self {
            return false;
        }

        *self = next;
        true
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn sanitize(value: f64, fallback: f64) -> f64 {
    if is_positive(value) {
        value
    } else {
        fallback
    }
}

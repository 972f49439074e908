//! Seams between a render session and whatever actually draws pixels.
//!
//! [`RenderSurface`] is implemented by [`crate::gpu::GpuSurface`] for real
//! windows; tests substitute an in-memory surface so the frame loop and the
//! transition engine can be exercised without a GPU.

use std::fmt;

use crate::uniforms::EffectUniforms;

/// Backing buffer size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Something that hosts a drawable surface and has a measurable box.
pub trait Container {
    /// Current box of the container in physical pixels.
    fn measure(&self) -> Result<SurfaceSize, GeometryError>;
}

/// Why a container's geometry could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("container collapsed to {0}")]
    Collapsed(SurfaceSize),
    #[error("container is no longer available")]
    Detached,
}

/// Per-frame presentation failure reported by a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceFault {
    /// The swapchain is lost or outdated and must be reconfigured.
    Reconfigure,
    /// The frame could not be acquired in time; try again next frame.
    Timeout,
    /// The device cannot continue.
    Fatal(String),
}

/// A drawable target plus the compiled effect pipeline that renders into it.
pub trait RenderSurface {
    fn size(&self) -> SurfaceSize;

    /// Reallocates the backing buffer. Callers never pass an empty size.
    fn resize(&mut self, size: SurfaceSize);

    /// Uploads `uniforms` and issues exactly one full-surface draw.
    fn render(&mut self, uniforms: &EffectUniforms) -> Result<(), SurfaceFault>;

    /// Releases every GPU resource. Called once, during unmount.
    fn release(&mut self);
}

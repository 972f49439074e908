//! wgpu-backed implementation of [`RenderSurface`].
//!
//! - `context` owns the instance, device and swapchain for one container and
//!   reconfigures the swapchain on resize.
//! - `pipeline` links the effect program against a single uniform bind group
//!   and records the one draw per frame.

mod context;
mod pipeline;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::error::SessionError;
use crate::surface::{RenderSurface, SurfaceFault, SurfaceSize};
use crate::uniforms::EffectUniforms;

use self::context::GpuContext;
use self::pipeline::EffectPipeline;

/// Swapchain plus compiled effect for one window.
pub struct GpuSurface {
    pipeline: EffectPipeline,
    context: GpuContext,
    released: bool,
}

impl GpuSurface {
    /// Acquires a GPU context for `target` and compiles the effect.
    ///
    /// `target` must outlive the returned surface.
    pub fn create<T>(target: &T, size: SurfaceSize) -> Result<Self, SessionError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, size)
            .map_err(|err| SessionError::Unsupported(format!("{err:#}")))?;
        let pipeline = match EffectPipeline::new(&context.device, context.surface_format) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                context.destroy();
                return Err(err);
            }
        };
        tracing::info!(size = %context.size, format = ?context.surface_format, "GPU surface ready");
        Ok(Self {
            pipeline,
            context,
            released: false,
        })
    }
}

impl RenderSurface for GpuSurface {
    fn size(&self) -> SurfaceSize {
        self.context.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        if self.released {
            return;
        }
        self.context.resize(size);
    }

    fn render(&mut self, uniforms: &EffectUniforms) -> Result<(), SurfaceFault> {
        if self.released {
            return Err(SurfaceFault::Fatal("surface already released".into()));
        }

        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                return Err(SurfaceFault::Reconfigure)
            }
            Err(wgpu::SurfaceError::Timeout) => return Err(SurfaceFault::Timeout),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(SurfaceFault::Fatal("out of GPU memory".into()))
            }
            Err(err) => return Err(SurfaceFault::Fatal(err.to_string())),
        };

        self.pipeline.write_uniforms(&self.context.queue, uniforms);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("backdrop frame"),
            });
        self.pipeline.encode_draw(&mut encoder, &view);
        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.context.destroy();
        tracing::debug!("GPU surface released");
    }
}

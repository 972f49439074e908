//! winit bindings: a window is both the container and the frame clock.

use std::sync::Arc;
use std::time::Instant;

use winit::window::Window;

use crate::error::SessionError;
use crate::gpu::GpuSurface;
use crate::params::EffectParameters;
use crate::runtime::{FrameClock, FrameHandle};
use crate::session::RenderSession;
use crate::surface::{Container, GeometryError, SurfaceSize};

/// Session type used by windowed hosts.
pub type WindowSession = RenderSession<GpuSurface, WindowClock>;

impl Container for Window {
    fn measure(&self) -> Result<SurfaceSize, GeometryError> {
        let inner = self.inner_size();
        let size = SurfaceSize::new(inner.width, inner.height);
        if size.is_empty() {
            return Err(GeometryError::Collapsed(size));
        }
        Ok(size)
    }
}

/// Frame clock backed by `Window::request_redraw`.
///
/// winit coalesces redraw requests and cannot withdraw one, so cancelling
/// only forgets the handle; the session refuses the stray
/// `RedrawRequested` that may still arrive.
pub struct WindowClock {
    window: Arc<Window>,
    next_id: u64,
    outstanding: Option<FrameHandle>,
}

impl WindowClock {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            outstanding: None,
        }
    }
}

impl FrameClock for WindowClock {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle::new(self.next_id);
        self.outstanding = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.outstanding == Some(handle) {
            self.outstanding = None;
        }
    }
}

/// Mounts a backdrop covering the whole client area of `window`.
pub fn mount_window(
    window: Arc<Window>,
    parameters: EffectParameters,
) -> Result<WindowSession, SessionError> {
    let clock = WindowClock::new(Arc::clone(&window));
    RenderSession::mount(window.as_ref(), clock, parameters, Instant::now(), |size| {
        GpuSurface::create(window.as_ref(), size)
    })
}

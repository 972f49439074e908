//! Animated GPU backdrop for shardsky.
//!
//! A [`RenderSession`] owns one drawable surface and keeps a procedural paint
//! swirl running behind the application. The overall flow is:
//!
//! ```text
//!   host (shardsky)
//!          │ EffectParameters
//!          ▼
//!   RenderSession::mount ──▶ GpuSurface (context + pipeline)
//!          │
//!          ▼
//!   FrameClock::request_frame ──▶ RenderSession::frame()
//!          ▲                            │
//!          │                            ├─▶ ColorTransition::tick() ─▶ uColor1..3
//!          │                            ├─▶ iTime / uMouse
//!          └──── re-armed first ◀───────┴─▶ RenderSurface::render() ─▶ GPU UBO + draw
//! ```
//!
//! Color changes arrive through [`RenderSession::on_colors_changed`] and fade
//! with an ease-out cubic curve; every other parameter applies on the next
//! frame. [`RenderSession::unmount`] cancels the pending frame and destroys
//! the device; dropping the session does the same.

mod color;
mod compile;
mod error;
mod gpu;
mod host;
mod params;
mod runtime;
mod session;
mod surface;
mod transition;
mod uniforms;

pub use color::Rgba;
pub use compile::fragment_fingerprint;
pub use error::SessionError;
pub use gpu::GpuSurface;
pub use host::{mount_window, WindowClock, WindowSession};
pub use params::{EffectParameters, DEFAULT_COLOR1, DEFAULT_COLOR2, DEFAULT_COLOR3};
pub use runtime::{FrameClock, FrameHandle, FrameScheduler, LoopState, TimeSample};
pub use session::{FrameStatus, PointerState, RenderSession};
pub use surface::{Container, GeometryError, RenderSurface, SurfaceFault, SurfaceSize};
pub use transition::{
    ease_out_cubic, linear_progress, ColorSet, ColorTransition, TransitionPhase, COLOR_SLOTS,
};
pub use uniforms::{EffectUniforms, UniformError, UniformKind, UniformSlot, UniformValue};

use std::time::Instant;

use crate::color::Rgba;
use crate::error::SessionError;
use crate::params::EffectParameters;
use crate::runtime::{FrameClock, FrameScheduler, LoopState};
use crate::surface::{Container, RenderSurface, SurfaceFault, SurfaceSize};
use crate::transition::{ColorSet, ColorTransition};
use crate::uniforms::{EffectUniforms, UniformError, UniformSlot, UniformValue};

/// Outcome of one frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// One frame was drawn and presented.
    Rendered,
    /// The swapchain was lost and has been reconfigured; nothing was drawn.
    Reconfigured,
    /// The frame could not be acquired in time and was skipped.
    Dropped,
    /// The session did not expect a frame (not running or already unmounted).
    Skipped,
}

/// Last pointer position in normalized surface coordinates, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    position: [f32; 2],
}

impl PointerState {
    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    /// Stores a raw pixel position measured from the top-left of `size`.
    pub fn update(&mut self, x: f64, y: f64, size: SurfaceSize) {
        if size.is_empty() {
            return;
        }
        let nx = (x / f64::from(size.width)) as f32;
        let ny = 1.0 - (y / f64::from(size.height)) as f32;
        self.position = [nx.clamp(0.0, 1.0), ny.clamp(0.0, 1.0)];
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            position: [0.5, 0.5],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Listeners {
    resize: bool,
    pointer: bool,
}

/// A mounted backdrop: surface, pipeline, animation state and frame loop.
///
/// Everything runs on the host's event-loop thread. The host forwards its
/// frame callbacks to [`RenderSession::frame`] and its resize and pointer
/// events to the matching methods; after [`RenderSession::unmount`] all of
/// them are ignored.
pub struct RenderSession<S: RenderSurface, K: FrameClock> {
    surface: Option<S>,
    /// Container box as last measured. The backing buffer may be smaller when
    /// it exceeds the GPU texture limit; resolution and pointer use this box.
    geometry: SurfaceSize,
    uniforms: EffectUniforms,
    parameters: EffectParameters,
    transition: ColorTransition,
    pointer: PointerState,
    scheduler: FrameScheduler,
    listeners: Listeners,
    render_count: u64,
    clock: K,
}

impl<S: RenderSurface, K: FrameClock> RenderSession<S, K> {
    /// Measures `container`, creates a surface through `create` and starts the
    /// frame loop on `clock`.
    ///
    /// Nothing is left running when this fails.
    pub fn mount<C, F>(
        container: &C,
        mut clock: K,
        parameters: EffectParameters,
        now: Instant,
        create: F,
    ) -> Result<Self, SessionError>
    where
        C: Container + ?Sized,
        F: FnOnce(SurfaceSize) -> Result<S, SessionError>,
    {
        let size = container.measure()?;
        let surface = create(size)?;
        let uniforms = EffectUniforms::new(&parameters, size);
        let transition = ColorTransition::new(parameters.colors(), parameters.transition);

        let mut scheduler = FrameScheduler::new();
        scheduler.start(&mut clock, now);
        tracing::debug!(
            size = %surface.size(),
            transition_ms = parameters.transition.as_millis() as u64,
            mouse_interaction = parameters.mouse_interaction,
            "render session mounted"
        );

        Ok(Self {
            surface: Some(surface),
            geometry: size,
            uniforms,
            parameters,
            transition,
            pointer: PointerState::default(),
            scheduler,
            listeners: Listeners {
                resize: true,
                pointer: true,
            },
            render_count: 0,
            clock,
        })
    }

    /// Cancels the pending frame, detaches listeners and releases the surface.
    /// Safe to call more than once.
    pub fn unmount(&mut self) {
        if self.scheduler.state() != LoopState::Stopped {
            self.scheduler.stop(&mut self.clock);
        }
        self.listeners = Listeners::default();
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            tracing::debug!(frames = self.render_count, "render session unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Runs one tick: the next frame is requested first, then time, colors and
    /// pointer are pushed into the uniforms and a single draw is issued.
    pub fn frame(&mut self, now: Instant) -> Result<FrameStatus, SessionError> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(FrameStatus::Skipped);
        };
        let Some(sample) = self.scheduler.begin_frame(&mut self.clock, now) else {
            return Ok(FrameStatus::Skipped);
        };

        self.uniforms.set_time(sample.seconds);
        let live = *self.transition.tick(now);
        self.uniforms.set_colors(&live);
        if self.parameters.mouse_interaction {
            self.uniforms.set_pointer(self.pointer.position());
        }

        match surface.render(&self.uniforms) {
            Ok(()) => {
                self.render_count += 1;
                if let Some(fps) = self.scheduler.mark_rendered(now) {
                    tracing::debug!(
                        fps = fps.round(),
                        frame_index = sample.frame_index,
                        elapsed = sample.seconds,
                        fade = self.transition.eased_progress(now),
                        transitioning = self.transition.is_active(),
                        "render stats"
                    );
                }
                Ok(FrameStatus::Rendered)
            }
            Err(SurfaceFault::Reconfigure) => {
                let size = surface.size();
                tracing::debug!(%size, "surface lost; reconfiguring");
                surface.resize(size);
                Ok(FrameStatus::Reconfigured)
            }
            Err(SurfaceFault::Timeout) => {
                tracing::warn!(frame_index = sample.frame_index, "surface timeout; dropping frame");
                Ok(FrameStatus::Dropped)
            }
            Err(SurfaceFault::Fatal(reason)) => Err(SessionError::Device(reason)),
        }
    }

    /// Applies a new container size. Empty sizes are ignored.
    ///
    /// `iResolution` always reflects `size` exactly, even when the surface
    /// clamps its backing buffer to the GPU texture limit.
    pub fn resize(&mut self, size: SurfaceSize) {
        if !self.listeners.resize {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if size.is_empty() {
            tracing::debug!(%size, "ignoring empty resize");
            return;
        }
        surface.resize(size);
        self.geometry = size;
        self.uniforms.set_resolution(size);
    }

    /// Re-measures `container`; a failed measurement keeps the current size.
    pub fn resize_to_container<C: Container + ?Sized>(&mut self, container: &C) {
        match container.measure() {
            Ok(size) => self.resize(size),
            Err(err) => tracing::warn!(error = %err, "failed to measure container; keeping previous size"),
        }
    }

    /// Records a pointer position in surface pixels, origin top-left.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if !self.listeners.pointer || !self.parameters.mouse_interaction {
            return;
        }
        if self.is_mounted() {
            self.pointer.update(x, y, self.geometry);
        }
    }

    /// Retargets the first two colors from hex strings. `uColor3` keeps its
    /// current target. Returns whether a fade started.
    pub fn on_colors_changed(&mut self, color1: &str, color2: &str, now: Instant) -> bool {
        if !self.is_mounted() {
            return false;
        }
        let mut colors = *self.transition.target();
        colors[0] = Rgba::from_hex_or_transparent(color1);
        colors[1] = Rgba::from_hex_or_transparent(color2);
        self.retarget(colors, now)
    }

    /// Replaces every parameter. Non-color values take effect on the next
    /// frame; colors fade over the new transition length.
    pub fn set_parameters(&mut self, parameters: EffectParameters, now: Instant) {
        if !self.is_mounted() {
            return;
        }
        self.uniforms.apply_parameters(&parameters);
        self.transition.set_duration(parameters.transition);
        let colors = parameters.colors();
        self.parameters = parameters;
        self.retarget(colors, now);
    }

    /// Writes one uniform by name. Color slots are routed through the
    /// cross-fade so the live colors still settle on the requested value.
    pub fn set_uniform(
        &mut self,
        name: &str,
        value: UniformValue,
        now: Instant,
    ) -> Result<(), UniformError> {
        let slot =
            UniformSlot::from_name(name).ok_or_else(|| UniformError::Unknown(name.to_string()))?;
        let Some(index) = slot.color_index() else {
            return self.uniforms.set(name, value);
        };
        let UniformValue::Vec4(channels) = value else {
            return Err(UniformError::TypeMismatch {
                name: slot.name(),
                expected: slot.kind(),
                found: value.kind(),
            });
        };
        let mut colors = *self.transition.target();
        colors[index] = Rgba(channels);
        self.retarget(colors, now);
        Ok(())
    }

    fn retarget(&mut self, colors: ColorSet, now: Instant) -> bool {
        self.parameters.set_colors(colors);
        let started = self.transition.retarget(colors, now);
        if started {
            tracing::debug!(
                color1 = %colors[0],
                color2 = %colors[1],
                color3 = %colors[2],
                duration_ms = self.transition.duration().as_millis() as u64,
                "color transition started"
            );
        }
        started
    }

    pub fn uniforms(&self) -> &EffectUniforms {
        &self.uniforms
    }

    pub fn parameters(&self) -> &EffectParameters {
        &self.parameters
    }

    pub fn transition(&self) -> &ColorTransition {
        &self.transition
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn loop_state(&self) -> LoopState {
        self.scheduler.state()
    }

    /// Frames successfully presented since mount.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }
}

impl<S: RenderSurface, K: FrameClock> Drop for RenderSession<S, K> {
    fn drop(&mut self) {
        self.unmount();
    }
}

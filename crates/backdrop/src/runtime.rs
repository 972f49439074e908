use std::time::{Duration, Instant};

/// Identifies one outstanding frame request issued by a [`FrameClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Host timer synchronized with display refresh.
///
/// The session never assumes a concrete host: it asks for one callback at a
/// time and withdraws the request on teardown. The host answers a request by
/// calling [`crate::RenderSession::frame`].
pub trait FrameClock {
    /// Requests a single frame callback at the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraws a request. Hosts that cannot withdraw may ignore this; the
    /// scheduler drops callbacks it no longer expects.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Seconds elapsed since the loop started.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// Bookkeeping for the self-rescheduling frame loop.
///
/// At most one frame request is outstanding. [`FrameScheduler::begin_frame`]
/// re-arms the next request before the caller does any work, so a frame that
/// fails half-way never breaks the loop. Once stopped, the scheduler refuses
/// every further frame, including callbacks the host had already queued.
#[derive(Debug)]
pub struct FrameScheduler {
    state: LoopState,
    pending: Option<FrameHandle>,
    origin: Option<Instant>,
    frame_index: u64,
    stats: FrameStats,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running)
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Arms the first frame request. Has no effect unless the loop is idle.
    pub fn start<K: FrameClock + ?Sized>(&mut self, clock: &mut K, now: Instant) {
        if self.state != LoopState::Idle {
            return;
        }
        self.origin = Some(now);
        self.stats = FrameStats::new(now);
        self.pending = Some(clock.request_frame());
        self.state = LoopState::Running;
    }

    /// Consumes the outstanding request, re-arms the next one and reports the
    /// time to render at. Returns `None` when no frame is expected.
    pub fn begin_frame<K: FrameClock + ?Sized>(
        &mut self,
        clock: &mut K,
        now: Instant,
    ) -> Option<TimeSample> {
        if !self.is_running() {
            return None;
        }
        self.pending.take()?;
        self.pending = Some(clock.request_frame());

        let origin = *self.origin.get_or_insert(now);
        let sample = TimeSample::new(
            now.saturating_duration_since(origin).as_secs_f32(),
            self.frame_index,
        );
        self.frame_index = self.frame_index.saturating_add(1);
        Some(sample)
    }

    /// Records a presented frame; returns the refreshed FPS roughly once per second.
    pub fn mark_rendered(&mut self, now: Instant) -> Option<f32> {
        self.stats.record(now)
    }

    /// Cancels the outstanding request and refuses all later frames.
    pub fn stop<K: FrameClock + ?Sized>(&mut self, clock: &mut K) {
        if let Some(handle) = self.pending.take() {
            clock.cancel_frame(handle);
        }
        self.state = LoopState::Stopped;
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self {
            state: LoopState::Idle,
            pending: None,
            origin: None,
            frame_index: 0,
            stats: FrameStats::new(Instant::now()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FrameStats {
    last_update: Instant,
    frames_since_update: u32,
}

impl FrameStats {
    const WINDOW: Duration = Duration::from_secs(1);

    fn new(now: Instant) -> Self {
        Self {
            last_update: now,
            frames_since_update: 0,
        }
    }

    fn record(&mut self, now: Instant) -> Option<f32> {
        self.frames_since_update += 1;
        let elapsed = now.saturating_duration_since(self.last_update);
        if elapsed < Self::WINDOW {
            return None;
        }
        let fps = self.frames_since_update as f32 / elapsed.as_secs_f32();
        self.frames_since_update = 0;
        self.last_update = now;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingClock {
        issued: u64,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameClock for CountingClock {
        fn request_frame(&mut self) -> FrameHandle {
            self.issued += 1;
            FrameHandle::new(self.issued)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
        }
    }

    #[test]
    fn frames_are_refused_before_start() {
        let mut clock = CountingClock::default();
        let mut scheduler = FrameScheduler::new();
        assert!(scheduler.begin_frame(&mut clock, Instant::now()).is_none());
        assert_eq!(clock.issued, 0);
    }

    #[test]
    fn begin_frame_rearms_before_returning() {
        let mut clock = CountingClock::default();
        let mut scheduler = FrameScheduler::new();
        let start = Instant::now();
        scheduler.start(&mut clock, start);
        assert_eq!(scheduler.pending(), Some(FrameHandle::new(1)));

        let sample = scheduler
            .begin_frame(&mut clock, start + Duration::from_millis(500))
            .expect("frame expected");
        assert_eq!(sample.frame_index, 0);
        assert!((sample.seconds - 0.5).abs() < 1e-6);
        assert_eq!(scheduler.pending(), Some(FrameHandle::new(2)));

        let next = scheduler
            .begin_frame(&mut clock, start + Duration::from_secs(1))
            .expect("frame expected");
        assert_eq!(next.frame_index, 1);
    }

    #[test]
    fn start_is_a_no_op_once_running() {
        let mut clock = CountingClock::default();
        let mut scheduler = FrameScheduler::new();
        let now = Instant::now();
        scheduler.start(&mut clock, now);
        scheduler.start(&mut clock, now);
        assert_eq!(clock.issued, 1);
    }

    #[test]
    fn stop_cancels_pending_and_refuses_late_callbacks() {
        let mut clock = CountingClock::default();
        let mut scheduler = FrameScheduler::new();
        let now = Instant::now();
        scheduler.start(&mut clock, now);
        scheduler.stop(&mut clock);

        assert_eq!(clock.cancelled, vec![FrameHandle::new(1)]);
        assert_eq!(scheduler.state(), LoopState::Stopped);
        assert!(scheduler.begin_frame(&mut clock, now).is_none());
        assert_eq!(clock.issued, 1);

        scheduler.stop(&mut clock);
        assert_eq!(clock.cancelled.len(), 1);
    }

    #[test]
    fn stats_report_once_per_window() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        for frame in 1..60u64 {
            assert!(stats
                .record(start + Duration::from_millis(frame * 16))
                .is_none());
        }
        let fps = stats
            .record(start + Duration::from_secs(1))
            .expect("window elapsed");
        assert!((fps - 60.0).abs() < 1e-3);
    }
}

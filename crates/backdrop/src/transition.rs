//! Cross-fade between color sets.
//!
//! All three colors move in lockstep on one clock. Progress is measured in
//! wall-clock time from the moment a new target arrives, so a slow or stalled
//! host still lands on the target once the duration has passed.

use std::time::{Duration, Instant};

use crate::color::Rgba;

pub const COLOR_SLOTS: usize = 3;

/// `uColor1`, `uColor2`, `uColor3`, in that order.
pub type ColorSet = [Rgba; COLOR_SLOTS];

/// Ease-out cubic: `1 - (1 - t)^3`, starts fast and settles into the endpoint.
pub fn ease_out_cubic(t: f32) -> f32 {
    let clamped = t.clamp(0.0, 1.0);
    1.0 - (1.0 - clamped).powi(3)
}

/// Fraction of `duration` covered by `elapsed`, saturated to `0.0..=1.0`.
/// A zero duration is always complete.
pub fn linear_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Transitioning,
}

/// Previous/target/live color state owned by a render session.
#[derive(Debug, Clone)]
pub struct ColorTransition {
    previous: ColorSet,
    target: ColorSet,
    live: ColorSet,
    started: Option<Instant>,
    duration: Duration,
}

impl ColorTransition {
    pub fn new(colors: ColorSet, duration: Duration) -> Self {
        Self {
            previous: colors,
            target: colors,
            live: colors,
            started: None,
            duration,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        if self.started.is_some() {
            TransitionPhase::Transitioning
        } else {
            TransitionPhase::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    pub fn previous(&self) -> &ColorSet {
        &self.previous
    }

    pub fn target(&self) -> &ColorSet {
        &self.target
    }

    /// Colors produced by the most recent [`ColorTransition::tick`].
    pub fn live(&self) -> &ColorSet {
        &self.live
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Changes the fade length; an in-flight fade keeps its start time.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Starts fading towards `colors`.
    ///
    /// Returns `false` when `colors` already equals the current target, in
    /// which case nothing changes. Otherwise the colors visible at `now`
    /// become the new baseline, so an interrupted fade continues from where it
    /// was instead of jumping back.
    pub fn retarget(&mut self, colors: ColorSet, now: Instant) -> bool {
        if colors == self.target {
            return false;
        }

        let baseline = self.sample(now);
        self.previous = baseline;
        self.live = baseline;
        self.target = colors;

        if self.duration.is_zero() {
            self.converge();
        } else {
            self.started = Some(now);
        }
        true
    }

    /// Advances the fade to `now` and returns the colors to upload.
    pub fn tick(&mut self, now: Instant) -> &ColorSet {
        if let Some(linear) = self.progress_at(now) {
            if linear >= 1.0 {
                self.converge();
            } else {
                self.live = blend(&self.previous, &self.target, ease_out_cubic(linear));
            }
        }
        &self.live
    }

    /// Eased progress at `now`; `1.0` when idle.
    pub fn eased_progress(&self, now: Instant) -> f32 {
        self.progress_at(now).map(ease_out_cubic).unwrap_or(1.0)
    }

    fn progress_at(&self, now: Instant) -> Option<f32> {
        self.started
            .map(|started| linear_progress(now.saturating_duration_since(started), self.duration))
    }

    fn sample(&self, now: Instant) -> ColorSet {
        match self.progress_at(now) {
            Some(linear) if linear >= 1.0 => self.target,
            Some(linear) => blend(&self.previous, &self.target, ease_out_cubic(linear)),
            None => self.live,
        }
    }

    fn converge(&mut self) {
        self.previous = self.target;
        self.live = self.target;
        self.started = None;
    }
}

fn blend(from: &ColorSet, to: &ColorSet, t: f32) -> ColorSet {
    std::array::from_fn(|slot| from[slot].lerp(to[slot], t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(hex: [&str; 3]) -> ColorSet {
        hex.map(|value| Rgba::from_hex(value).expect("valid color"))
    }

    fn start_colors() -> ColorSet {
        colors(["#DE443B", "#006BB4", "#162325"])
    }

    fn next_colors() -> ColorSet {
        colors(["#0891B2", "#7C3AED", "#162325"])
    }

    #[test]
    fn ease_out_cubic_pins_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn eased_progress_is_monotonic_over_the_duration() {
        for millis in [1u64, 16, 250, 800, 5_000] {
            let duration = Duration::from_millis(millis);
            assert_eq!(ease_out_cubic(linear_progress(Duration::ZERO, duration)), 0.0);
            assert_eq!(ease_out_cubic(linear_progress(duration, duration)), 1.0);

            let mut last = 0.0;
            for step in 0..=100u32 {
                let elapsed = duration * step / 100;
                let eased = ease_out_cubic(linear_progress(elapsed, duration));
                assert!(eased >= last, "eased progress regressed at step {step}");
                last = eased;
            }
        }
    }

    #[test]
    fn zero_duration_is_always_complete() {
        assert_eq!(linear_progress(Duration::ZERO, Duration::ZERO), 1.0);
    }

    #[test]
    fn fade_starts_at_previous_and_lands_on_target() {
        let start = Instant::now();
        let duration = Duration::from_millis(800);
        let mut transition = ColorTransition::new(start_colors(), duration);

        assert!(transition.retarget(next_colors(), start));
        assert_eq!(transition.phase(), TransitionPhase::Transitioning);
        assert_eq!(transition.eased_progress(start), 0.0);
        assert!((transition.eased_progress(start + duration / 2) - 0.875).abs() < 1e-6);
        assert_eq!(transition.tick(start), &start_colors());

        let midway = *transition.tick(start + duration / 2);
        assert_ne!(midway, start_colors());
        assert_ne!(midway, next_colors());

        assert_eq!(transition.tick(start + duration), &next_colors());
        assert_eq!(transition.phase(), TransitionPhase::Idle);
        assert_eq!(transition.previous(), &next_colors());
        assert_eq!(transition.eased_progress(start + duration), 1.0);
    }

    #[test]
    fn identical_colors_do_not_restart() {
        let start = Instant::now();
        let mut transition = ColorTransition::new(start_colors(), Duration::from_millis(800));
        assert!(!transition.retarget(start_colors(), start));
        assert_eq!(transition.phase(), TransitionPhase::Idle);

        assert!(transition.retarget(next_colors(), start));
        transition.tick(start + Duration::from_secs(1));
        assert!(!transition.retarget(next_colors(), start + Duration::from_secs(2)));
        assert_eq!(transition.phase(), TransitionPhase::Idle);
    }

    #[test]
    fn interruption_uses_live_colors_as_baseline() {
        let start = Instant::now();
        let duration = Duration::from_millis(800);
        let mut transition = ColorTransition::new(start_colors(), duration);
        transition.retarget(next_colors(), start);

        let interrupt_at = start + Duration::from_millis(300);
        let expected = blend(
            &start_colors(),
            &next_colors(),
            ease_out_cubic(linear_progress(Duration::from_millis(300), duration)),
        );
        let third = colors(["#FFFFFF", "#000000", "#162325"]);
        assert!(transition.retarget(third, interrupt_at));

        assert_eq!(transition.previous(), &expected);
        assert_ne!(transition.previous(), &start_colors());
        assert_ne!(transition.previous(), &next_colors());
        assert_eq!(transition.started_at(), Some(interrupt_at));
        assert_eq!(transition.tick(interrupt_at), &expected);
    }

    #[test]
    fn stalled_host_snaps_to_target() {
        let start = Instant::now();
        let mut transition = ColorTransition::new(start_colors(), Duration::from_millis(800));
        transition.retarget(next_colors(), start);
        assert_eq!(transition.tick(start + Duration::from_secs(30)), &next_colors());
        assert!(!transition.is_active());
    }

    #[test]
    fn zero_duration_snaps_immediately() {
        let start = Instant::now();
        let mut transition = ColorTransition::new(start_colors(), Duration::ZERO);
        assert!(transition.retarget(next_colors(), start));
        assert_eq!(transition.phase(), TransitionPhase::Idle);
        assert_eq!(transition.live(), &next_colors());
    }

    #[test]
    fn idle_live_colors_equal_target() {
        let start = Instant::now();
        let mut transition = ColorTransition::new(start_colors(), Duration::from_millis(100));
        transition.retarget(next_colors(), start);
        transition.tick(start + Duration::from_millis(50));
        transition.tick(start + Duration::from_millis(100));
        assert!(!transition.is_active());
        assert_eq!(transition.live(), transition.target());
    }
}

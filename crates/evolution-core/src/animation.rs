// File: crates/evolution-core/src/animation.rs
// Summary: Per-property transitions (idle -> transitioning -> idle) with easing and completion continuations.

use crate::geometry::Path;
use crate::types::{Color, Point};

/// Easing curves applied to normalized transition time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Slow start and end; the default for every chart transition.
    #[default]
    CubicInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * t * t * t
                } else {
                    let t = t - 2.0;
                    0.5 * (t * t * t + 2.0)
                }
            }
        }
    }
}

/// Values a transition can blend between.
pub trait Interpolate: Clone {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self { from + (to - from) * t }
}

impl Interpolate for Point {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self { from.lerp(*to, t) }
}

impl Interpolate for Color {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        let ch = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8;
        Color::rgba(ch(from.r, to.r), ch(from.g, to.g), ch(from.b, to.b), ch(from.a, to.a))
    }
}

impl Interpolate for Path {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self { Path::lerp(from, to, t) }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenState {
    Idle,
    Transitioning { elapsed_ms: f64, duration_ms: f64 },
}

/// One animated property.
///
/// A transition may carry a continuation `C` that [`Tween::advance`] hands
/// back exactly once, on the step that completes the transition. Retargeting
/// mid-flight starts from the current blended value and drops the pending
/// continuation (last writer wins).
#[derive(Clone, Debug)]
pub struct Tween<T, C = ()> {
    from: T,
    to: T,
    state: TweenState,
    easing: Easing,
    then: Option<C>,
}

impl<T: Interpolate, C> Tween<T, C> {
    /// Idle at `value`.
    pub fn new(value: T) -> Self {
        Self { from: value.clone(), to: value, state: TweenState::Idle, easing: Easing::default(), then: None }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn state(&self) -> TweenState { self.state }
    pub fn is_idle(&self) -> bool { self.state == TweenState::Idle }

    /// Value the property is heading to.
    pub fn target(&self) -> &T { &self.to }

    /// Eased progress in [0, 1].
    pub fn progress(&self) -> f32 {
        match self.state {
            TweenState::Idle => 1.0,
            TweenState::Transitioning { duration_ms, .. } if duration_ms <= 0.0 => 1.0,
            TweenState::Transitioning { elapsed_ms, duration_ms } => {
                self.easing.apply((elapsed_ms / duration_ms) as f32)
            }
        }
    }

    /// Current blended value.
    pub fn value(&self) -> T {
        match self.state {
            TweenState::Idle => self.to.clone(),
            TweenState::Transitioning { .. } => T::interpolate(&self.from, &self.to, self.progress()),
        }
    }

    /// Jump to `value` without a transition; any pending continuation is dropped.
    pub fn set(&mut self, value: T) {
        self.from = value.clone();
        self.to = value;
        self.state = TweenState::Idle;
        self.then = None;
    }

    /// Start a transition from the current value to `target`.
    pub fn animate_to(&mut self, target: T, duration_ms: f64) {
        self.from = self.value();
        self.to = target;
        self.state = TweenState::Transitioning { elapsed_ms: 0.0, duration_ms: duration_ms.max(0.0) };
        self.then = None;
    }

    /// Like [`Tween::animate_to`], handing `then` back when the transition completes.
    pub fn animate_then(&mut self, target: T, duration_ms: f64, then: C) {
        self.animate_to(target, duration_ms);
        self.then = Some(then);
    }

    /// Move the clock forward by `dt_ms`. Returns the continuation on the
    /// step that finishes the transition.
    pub fn advance(&mut self, dt_ms: f64) -> Option<C> {
        let TweenState::Transitioning { elapsed_ms, duration_ms } = self.state else { return None };
        let elapsed_ms = elapsed_ms + dt_ms.max(0.0);
        if elapsed_ms >= duration_ms {
            self.from = self.to.clone();
            self.state = TweenState::Idle;
            self.then.take()
        } else {
            self.state = TweenState::Transitioning { elapsed_ms, duration_ms };
            None
        }
    }
}

/// Anything driven by the shared animation clock.
pub trait Animated {
    fn advance(&mut self, dt_ms: f64);
    fn is_idle(&self) -> bool;
}

/// Upper bound on chained continuations resolved by [`settle`].
const MAX_SETTLE_STEPS: usize = 64;

/// Run every transition, continuations included, to completion.
pub fn settle<A: Animated + ?Sized>(target: &mut A) {
    let mut steps = 0;
    while !target.is_idle() && steps < MAX_SETTLE_STEPS {
        target.advance(f64::INFINITY);
        steps += 1;
    }
    tracing::trace!(steps, "animations settled");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Step {
        Swap(&'static str),
    }

    #[test]
    fn cubic_in_out_endpoints_and_midpoint() {
        let e = Easing::CubicInOut;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(0.5), 0.5);
        assert_eq!(e.apply(1.0), 1.0);
        assert!(e.apply(0.25) < 0.25);
        assert!(e.apply(0.75) > 0.75);
    }

    #[test]
    fn tween_runs_idle_to_idle() {
        let mut t: Tween<f32> = Tween::new(0.0);
        assert!(t.is_idle());
        t.animate_to(10.0, 100.0);
        assert!(!t.is_idle());
        assert_eq!(t.value(), 0.0);
        t.advance(50.0);
        assert!((t.value() - 5.0).abs() < 1e-4);
        t.advance(50.0);
        assert!(t.is_idle());
        assert_eq!(t.value(), 10.0);
    }

    #[test]
    fn continuation_fires_once_on_completion() {
        let mut t: Tween<f32, Step> = Tween::new(1.0);
        t.animate_then(0.0, 100.0, Step::Swap("next"));
        assert_eq!(t.advance(60.0), None);
        assert_eq!(t.advance(60.0), Some(Step::Swap("next")));
        assert_eq!(t.advance(60.0), None);
    }

    #[test]
    fn retarget_starts_from_current_value_and_drops_continuation() {
        let mut t: Tween<f32, Step> = Tween::new(0.0).with_easing(Easing::Linear);
        t.animate_then(10.0, 100.0, Step::Swap("stale"));
        t.advance(30.0);
        t.animate_to(0.0, 100.0);
        assert!((t.value() - 3.0).abs() < 1e-4);
        assert_eq!(t.advance(200.0), None);
        assert_eq!(t.value(), 0.0);
    }

    #[test]
    fn zero_duration_shows_target_immediately() {
        let mut t: Tween<f32, Step> = Tween::new(0.0);
        t.animate_then(4.0, 0.0, Step::Swap("now"));
        assert_eq!(t.value(), 4.0);
        assert_eq!(t.advance(0.0), Some(Step::Swap("now")));
    }

    #[test]
    fn colors_blend_per_channel() {
        let c = Color::interpolate(&Color::rgb(0, 0, 0), &Color::rgb(200, 100, 50), 0.5);
        assert_eq!(c, Color::rgb(100, 50, 25));
    }
}

// File: crates/evolution-core/src/axis.rs
// Summary: Axis tick generation, label formatting, log-label collision filtering and animated tick views.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::animation::{Animated, Tween};
use crate::reconcile::{reconcile, Exit, Join};
use crate::scale::{ScaleManager, ScaleTransform};
use crate::time::{format_tick, time_ticks};

/// Minimum vertical distance between two labelled log ticks, in pixels.
pub const MIN_LABEL_INTERVAL_PX: f32 = 15.0;
/// Requested tick count on the time axis.
pub const X_TICK_COUNT: usize = 10;
/// Requested tick count on the value axis.
pub const Y_TICK_COUNT: usize = 5;

/// Tick identity: the tick value, totally ordered.
#[derive(Clone, Copy, Debug)]
pub struct TickKey(pub f64);

impl PartialEq for TickKey {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}
impl Eq for TickKey {}
impl PartialOrd for TickKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}
impl Ord for TickKey {
    fn cmp(&self, other: &Self) -> Ordering { self.0.total_cmp(&other.0) }
}

/// A tick to show: value and label text. Empty labels draw the mark only.
#[derive(Clone, Debug, PartialEq)]
pub struct TickSpec {
    pub value: f64,
    pub label: String,
}

impl TickSpec {
    pub fn new(value: f64, label: impl Into<String>) -> Self { Self { value, label: label.into() } }
}

/// Compact number label: trailing zeros trimmed, k/M/G suffixes from a thousand up.
pub fn format_number(v: f64) -> String {
    let a = v.abs();
    let (scaled, suffix) = if a >= 1e9 {
        (v / 1e9, "G")
    } else if a >= 1e6 {
        (v / 1e6, "M")
    } else if a >= 1e3 {
        (v / 1e3, "k")
    } else {
        (v, "")
    };
    let digits = if suffix.is_empty() { 6 } else { 3 };
    let mut s = format!("{scaled:.digits$}");
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s + suffix
}

/// Whole-percent label (`0.25` -> `25%`).
pub fn format_percent(v: f64) -> String {
    let p = (v * 100.0).round();
    format!("{}%", if p == 0.0 { 0.0 } else { p })
}

/// Format a value-axis label in the active mode.
pub fn format_value(v: f64, percentage: bool) -> String {
    if percentage { format_percent(v) } else { format_number(v) }
}

/// True when `v` is within relative tolerance of `10^round(log10 v)`.
pub fn is_power_of_ten(v: f64) -> bool {
    if !(v > 0.0) || !v.is_finite() { return false; }
    let p = 10f64.powf(v.log10().round());
    (p - v).abs() < 1e-6 * p
}

/// Decide which log ticks keep their label.
///
/// Walks `values` in increasing order starting from `start_px` (the zero line).
/// Powers of ten are always labelled. Any other tick is hidden when it lies
/// within [`MIN_LABEL_INTERVAL_PX`] of the previously labelled tick, or of the
/// power of ten just below or above it.
pub fn log_label_mask(values: &[f64], px: impl Fn(f64) -> f32, start_px: f32) -> Vec<bool> {
    let mut prev = start_px;
    values
        .iter()
        .map(|&d| {
            let y = px(d);
            if !is_power_of_ten(d) {
                let e = d.log10();
                let near_pow = [e.floor(), e.ceil()]
                    .iter()
                    .any(|&k| (px(10f64.powf(k)) - y).abs() < MIN_LABEL_INTERVAL_PX);
                if near_pow || (prev - y).abs() < MIN_LABEL_INTERVAL_PX {
                    return false;
                }
            }
            prev = y;
            true
        })
        .collect()
}

/// Time-axis ticks for the current x domain.
pub fn x_tick_specs(scales: &ScaleManager) -> Vec<TickSpec> {
    let (a, b) = scales.x.domain;
    time_ticks(a, b, X_TICK_COUNT).into_iter().map(|t| TickSpec::new(t, format_tick(t))).collect()
}

/// Value-axis ticks for the current y axis scale.
///
/// Falls back to the two extent endpoints when the scale yields no ticks; in
/// log mode colliding labels are blanked.
pub fn y_tick_specs(scales: &ScaleManager, percentage: bool) -> Vec<TickSpec> {
    let mut values = scales.y_axis.ticks(Y_TICK_COUNT);
    if values.is_empty() {
        tracing::debug!(extent = ?scales.extent, "no axis ticks generated, labelling extent endpoints");
        let (lo, hi) = scales.extent;
        values = if lo == hi { vec![lo] } else { vec![lo, hi] };
    }
    if scales.y_axis.is_log() {
        let mask = log_label_mask(&values, |v| scales.y_axis.to_px(v), scales.plot_height);
        values
            .into_iter()
            .zip(mask)
            .map(|(v, show)| TickSpec::new(v, if show { format_value(v, percentage) } else { String::new() }))
            .collect()
    } else {
        values.into_iter().map(|v| TickSpec::new(v, format_value(v, percentage))).collect()
    }
}

/// Label of the separate zero mark drawn on the zero line.
pub fn zero_label(percentage: bool) -> String { format_value(0.0, percentage) }

/// Retained tick: animated position (along the axis) and opacity.
#[derive(Clone, Debug)]
pub struct TickElement {
    pub value: f64,
    pub label: String,
    pub pos: Tween<f32>,
    pub opacity: Tween<f32>,
    pub exiting: bool,
}

/// Tick resolved at the current clock.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedTick {
    pub value: f64,
    pub pos: f32,
    pub label: String,
    pub opacity: f32,
}

/// One axis' tick set, reconciled by value across updates.
#[derive(Clone, Debug, Default)]
pub struct AxisView {
    ticks: BTreeMap<TickKey, TickElement>,
}

impl AxisView {
    pub fn new() -> Self { Self::default() }

    /// Move to a new tick set. Entering ticks start at their position under
    /// the `old` scale and fade in; exiting ticks slide to their position under
    /// the `new` scale, fade out and are dropped; surviving ticks slide.
    pub fn update(
        &mut self,
        specs: Vec<TickSpec>,
        old: impl Fn(f64) -> f32,
        new: impl Fn(f64) -> f32,
        duration_ms: f64,
    ) -> Join<TickKey> {
        let start = |v: f64| {
            let p = old(v);
            if p.is_finite() { p } else { new(v) }
        };
        let join = reconcile(
            &mut self.ticks,
            specs.into_iter().map(|s| (TickKey(s.value), s)),
            |_, s| {
                let mut pos = Tween::new(start(s.value));
                pos.animate_to(new(s.value), duration_ms);
                let mut opacity = Tween::new(0.0);
                opacity.animate_to(1.0, duration_ms);
                TickElement { value: s.value, label: s.label, pos, opacity, exiting: false }
            },
            |_, el, s| {
                el.label = s.label;
                el.pos.animate_to(new(s.value), duration_ms);
                if el.exiting || *el.opacity.target() != 1.0 {
                    el.opacity.animate_to(1.0, duration_ms);
                }
                el.exiting = false;
            },
            |_, el| {
                el.exiting = true;
                el.pos.animate_to(new(el.value), duration_ms);
                el.opacity.animate_then(0.0, duration_ms, ());
                Exit::Retain
            },
        );
        tracing::trace!(enter = join.enter.len(), update = join.update.len(), exit = join.exit.len(), "axis ticks reconciled");
        join
    }

    pub fn len(&self) -> usize { self.ticks.len() }
    pub fn is_empty(&self) -> bool { self.ticks.is_empty() }

    /// Ticks at the current clock, in value order.
    pub fn resolve(&self) -> Vec<ResolvedTick> {
        self.ticks
            .values()
            .map(|t| ResolvedTick { value: t.value, pos: t.pos.value(), label: t.label.clone(), opacity: t.opacity.value() })
            .collect()
    }
}

impl Animated for AxisView {
    fn advance(&mut self, dt_ms: f64) {
        let mut done = Vec::new();
        for (key, t) in self.ticks.iter_mut() {
            t.pos.advance(dt_ms);
            if t.opacity.advance(dt_ms).is_some() && t.exiting {
                done.push(*key);
            }
        }
        for key in done {
            self.ticks.remove(&key);
        }
    }

    fn is_idle(&self) -> bool {
        self.ticks.values().all(|t| t.pos.is_idle() && t.opacity.is_idle())
    }
}

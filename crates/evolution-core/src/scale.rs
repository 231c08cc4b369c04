// File: crates/evolution-core/src/scale.rs
// Summary: Linear and logarithmic value scales, tick generation, and the scale manager that recomputes domains.

use crate::config::{ChartType, ScaleKind};
use crate::series::{extent, StackedSample};

/// Domain used when a log extent has no positive values.
pub const LOG_FALLBACK_DOMAIN: (f64, f64) = (0.0095, 0.0105);
/// Pixel offset between the log zero line and the smallest plotted value.
pub const LOG_ZERO_GAP_PX: f32 = 30.0;

/// Mapping between data values and pixels.
pub trait ScaleTransform {
    fn to_px(&self, v: f64) -> f32;
    fn from_px(&self, px: f32) -> f64;
    fn ticks(&self, count: usize) -> Vec<f64>;
}

#[inline]
fn lerp_px(range: (f32, f32), t: f64) -> f32 {
    range.0 + (range.1 - range.0) * t as f32
}

#[inline]
fn unlerp_px(range: (f32, f32), px: f32) -> f64 {
    let span = range.1 - range.0;
    if span == 0.0 { 0.5 } else { ((px - range.0) / span) as f64 }
}

/// Continuous linear scale. A zero-width domain maps to the range midpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self { Self { domain, range } }
}

impl ScaleTransform for LinearScale {
    #[inline]
    fn to_px(&self, v: f64) -> f32 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 { return lerp_px(self.range, 0.5); }
        lerp_px(self.range, (v - self.domain.0) / span)
    }
    #[inline]
    fn from_px(&self, px: f32) -> f64 {
        self.domain.0 + unlerp_px(self.range, px) * (self.domain.1 - self.domain.0)
    }
    fn ticks(&self, count: usize) -> Vec<f64> {
        linear_ticks(self.domain.0, self.domain.1, count)
    }
}

/// Base-10 logarithmic scale over a strictly positive domain.
///
/// With `clamp`, values outside the domain pin to the range ends and
/// non-positive values pin to the floor end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogScale {
    pub domain: (f64, f64),
    pub range: (f32, f32),
    pub clamp: bool,
}

impl LogScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self { Self { domain, range, clamp: false } }

    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    fn log_span(&self) -> (f64, f64) { (self.domain.0.log10(), self.domain.1.log10()) }
}

impl ScaleTransform for LogScale {
    #[inline]
    fn to_px(&self, v: f64) -> f32 {
        if v <= 0.0 { return self.range.0; }
        let (l0, l1) = self.log_span();
        let span = l1 - l0;
        if span == 0.0 || !span.is_finite() { return lerp_px(self.range, 0.5); }
        let mut t = (v.log10() - l0) / span;
        if self.clamp { t = t.clamp(0.0, 1.0); }
        lerp_px(self.range, t)
    }
    #[inline]
    fn from_px(&self, px: f32) -> f64 {
        let (l0, l1) = self.log_span();
        10f64.powf(l0 + unlerp_px(self.range, px) * (l1 - l0))
    }
    fn ticks(&self, count: usize) -> Vec<f64> {
        log_ticks(self.domain.0, self.domain.1, count)
    }
}

/// Value-axis scale of either family.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueScale {
    Linear(LinearScale),
    Log(LogScale),
}

impl ValueScale {
    pub fn domain(&self) -> (f64, f64) {
        match self { Self::Linear(s) => s.domain, Self::Log(s) => s.domain }
    }
    pub fn range(&self) -> (f32, f32) {
        match self { Self::Linear(s) => s.range, Self::Log(s) => s.range }
    }
    pub fn is_log(&self) -> bool { matches!(self, Self::Log(_)) }
}

impl ScaleTransform for ValueScale {
    fn to_px(&self, v: f64) -> f32 {
        match self { Self::Linear(s) => s.to_px(v), Self::Log(s) => s.to_px(v) }
    }
    fn from_px(&self, px: f32) -> f64 {
        match self { Self::Linear(s) => s.from_px(px), Self::Log(s) => s.from_px(px) }
    }
    fn ticks(&self, count: usize) -> Vec<f64> {
        match self { Self::Linear(s) => s.ticks(count), Self::Log(s) => s.ticks(count) }
    }
}

/// Step between "nice" ticks (1, 2 or 5 times a power of ten). A negative
/// result `-k` means a step of `1/k`, which keeps small steps exact.
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 { factor * 10f64.powf(power) } else { -(10f64.powf(-power)) / factor }
}

/// Signed tick step between `start` and `stop` (as a plain number).
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let step0 = (stop - start).abs() / count.max(1) as f64;
    let mut step1 = 10f64.powf(step0.log10().floor());
    let error = step0 / step1;
    if error >= 50f64.sqrt() {
        step1 *= 10.0;
    } else if error >= 10f64.sqrt() {
        step1 *= 5.0;
    } else if error >= 2f64.sqrt() {
        step1 *= 2.0;
    }
    if stop < start { -step1 } else { step1 }
}

/// Roughly `count` nice values covering `[start, stop]`, in the domain's order.
pub fn linear_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() { return Vec::new(); }
    if start == stop { return vec![start]; }
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let inc = tick_increment(lo, hi, count);
    if inc == 0.0 || !inc.is_finite() { return Vec::new(); }
    let mut ticks: Vec<f64> = if inc > 0.0 {
        let (i0, i1) = ((lo / inc).ceil() as i64, (hi / inc).floor() as i64);
        (i0..=i1).map(|i| i as f64 * inc).collect()
    } else {
        let inc = -inc;
        let (i0, i1) = ((lo * inc).ceil() as i64, (hi * inc).floor() as i64);
        (i0..=i1).map(|i| i as f64 / inc).collect()
    };
    if reverse { ticks.reverse(); }
    ticks
}

/// Exact power of ten for integral exponents.
pub fn pow10(k: i32) -> f64 {
    if k >= 0 { 10f64.powi(k) } else { 1.0 / 10f64.powi(-k) }
}

/// Log ticks: every `k × 10ⁿ` (k = 1..9) inside the domain when it spans fewer
/// than `count` decades, otherwise nice decade ticks. Very close extents can
/// legitimately produce no ticks at all.
pub fn log_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !(start > 0.0 && stop > 0.0) || !start.is_finite() || !stop.is_finite() { return Vec::new(); }
    let reverse = stop < start;
    let (u, v) = if reverse { (stop, start) } else { (start, stop) };
    let (i, j) = (u.log10(), v.log10());
    let n = if count == 0 { 10 } else { count };
    let mut z = Vec::new();
    if j - i < n as f64 {
        let (lo, hi) = (i.floor() as i32, j.ceil() as i32);
        for e in lo..=hi {
            let p = pow10(e);
            for k in 1..10 {
                let t = p * k as f64;
                if t < u { continue; }
                if t > v { break; }
                z.push(t);
            }
        }
    } else {
        let decades = ((j - i).floor() as usize).min(n);
        z = linear_ticks(i, j, decades).into_iter().map(|e| 10f64.powf(e)).collect();
    }
    if reverse { z.reverse(); }
    z
}

/// Time (x) scale plus the plotted and axis value (y) scales, rebuilt as data
/// or scale kind change.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleManager {
    pub kind: ScaleKind,
    pub plot_width: f32,
    pub plot_height: f32,
    /// Epoch milliseconds to `[0, plot_width]`.
    pub x: LinearScale,
    /// Scale used to place samples.
    pub y: ValueScale,
    /// Scale used to place y-axis ticks; differs from `y` in log mode.
    pub y_axis: ValueScale,
    /// Last value extent, after fallbacks.
    pub extent: (f64, f64),
}

impl ScaleManager {
    pub fn new(kind: ScaleKind, plot_width: f32, plot_height: f32) -> Self {
        let x = LinearScale::new((0.0, 1.0), (0.0, plot_width));
        let (y, y_axis) = Self::make_y(kind, plot_height);
        Self { kind, plot_width, plot_height, x, y, y_axis, extent: (0.0, 1.0) }
    }

    fn make_y(kind: ScaleKind, h: f32) -> (ValueScale, ValueScale) {
        match kind {
            ScaleKind::Lin => {
                let y = ValueScale::Linear(LinearScale::new((0.0, 1.0), (h, 0.0)));
                (y, y)
            }
            ScaleKind::Log => (
                ValueScale::Log(LogScale::new(LOG_FALLBACK_DOMAIN, (h, 0.0)).clamped()),
                ValueScale::Log(LogScale::new(LOG_FALLBACK_DOMAIN, (h - LOG_ZERO_GAP_PX, 0.0))),
            ),
        }
    }

    /// Replace both value scales with fresh ones of `kind`.
    pub fn rebuild(&mut self, kind: ScaleKind) {
        self.kind = kind;
        let (y, y_axis) = Self::make_y(kind, self.plot_height);
        self.y = y;
        self.y_axis = y_axis;
    }

    /// Set the time domain in epoch milliseconds. A single instant widens by one second.
    pub fn set_time_domain(&mut self, x_extent: Option<(f64, f64)>) {
        let (lo, hi) = x_extent.unwrap_or((0.0, 1000.0));
        self.x.domain = if hi > lo { (lo, hi) } else { (lo, lo + 1000.0) };
    }

    /// Recompute value domains from stacked samples.
    pub fn recompute_domain(&mut self, data: &[Vec<StackedSample>], chart_type: ChartType) {
        let plotted = |d: &StackedSample| match chart_type {
            ChartType::Area => d.top(),
            ChartType::Line => d.y,
        };
        let values = data.iter().flatten().filter_map(plotted);
        match self.kind {
            ScaleKind::Lin => {
                let (lo, hi) = match extent(values) {
                    Some(e) => e,
                    None => {
                        tracing::warn!("empty value extent, using [0, 1]");
                        (0.0, 1.0)
                    }
                };
                let lo = if lo > 0.0 { 0.0 } else { lo };
                let hi = if hi > lo { hi } else { lo + 1.0 };
                self.extent = (lo, hi);
                let y = ValueScale::Linear(LinearScale::new((lo, hi), (self.plot_height, 0.0)));
                self.y = y;
                self.y_axis = y;
            }
            ScaleKind::Log => {
                let (mut lo, hi) = match extent(values.filter(|v| *v > 0.0)) {
                    Some(e) => e,
                    None => {
                        tracing::warn!("no positive values on log scale, using fallback domain");
                        LOG_FALLBACK_DOMAIN
                    }
                };
                if lo == hi { lo *= 0.9; }
                self.extent = (lo, hi);
                let axis = LogScale::new((lo, hi), (self.plot_height - LOG_ZERO_GAP_PX, 0.0));
                let floor = axis.from_px(self.plot_height);
                self.y_axis = ValueScale::Log(axis);
                self.y = ValueScale::Log(LogScale::new((floor, hi), (self.plot_height, 0.0)).clamped());
            }
        }
        tracing::trace!(kind = %self.kind, domain = ?self.y.domain(), "value domain recomputed");
    }

    /// The value a log scale treats as visual zero; `None` on a linear scale.
    pub fn zero_floor(&self) -> Option<f64> {
        match self.y {
            ValueScale::Log(s) => Some(s.domain.0),
            ValueScale::Linear(_) => None,
        }
    }

    /// Pixel row of the zero line.
    pub fn zero_px(&self) -> f32 {
        match self.y {
            ValueScale::Log(_) => self.plot_height,
            ValueScale::Linear(s) => s.to_px(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stacked(vals: &[Option<f64>]) -> Vec<StackedSample> {
        vals.iter().enumerate().map(|(i, &y)| StackedSample { x: i as f64, y, y0: 0.0 }).collect()
    }

    #[test]
    fn linear_ticks_are_nice() {
        assert_eq!(linear_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(linear_ticks(0.0, 1.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(linear_ticks(10.0, 0.0, 2), vec![10.0, 5.0, 0.0]);
    }

    #[test]
    fn log_ticks_enumerate_sub_decades() {
        let t = log_ticks(1.0, 100.0, 5);
        assert_eq!(t.first(), Some(&1.0));
        assert_eq!(t.last(), Some(&100.0));
        assert_eq!(t.len(), 19);
    }

    #[test]
    fn log_ticks_can_be_empty_for_close_extents() {
        assert!(log_ticks(0.00011, 0.00019, 5).is_empty());
    }

    #[test]
    fn log_ticks_many_decades_use_powers() {
        let t = log_ticks(1.0, 1e12, 5);
        assert!(t.iter().all(|v| (v.log10() - v.log10().round()).abs() < 1e-9));
    }

    #[test]
    fn linear_domain_includes_zero_baseline() {
        let mut m = ScaleManager::new(ScaleKind::Lin, 100.0, 100.0);
        m.recompute_domain(&[stacked(&[Some(5.0), Some(9.0), None])], ChartType::Line);
        assert_eq!(m.y.domain(), (0.0, 9.0));
        assert_eq!(m.y, m.y_axis);
        m.recompute_domain(&[stacked(&[Some(-5.0), Some(9.0)])], ChartType::Line);
        assert_eq!(m.y.domain(), (-5.0, 9.0));
    }

    #[test]
    fn linear_all_null_falls_back() {
        let mut m = ScaleManager::new(ScaleKind::Lin, 100.0, 100.0);
        m.recompute_domain(&[stacked(&[None, None])], ChartType::Area);
        assert_eq!(m.y.domain(), (0.0, 1.0));
    }

    #[test]
    fn area_mode_uses_cumulative_tops() {
        let mut m = ScaleManager::new(ScaleKind::Lin, 100.0, 100.0);
        let data = vec![vec![StackedSample { x: 0.0, y: Some(2.0), y0: 7.0 }]];
        m.recompute_domain(&data, ChartType::Area);
        assert_eq!(m.y.domain(), (0.0, 9.0));
        m.recompute_domain(&data, ChartType::Line);
        assert_eq!(m.y.domain(), (0.0, 2.0));
    }

    #[test]
    fn log_zero_only_uses_fallback_domain() {
        let mut m = ScaleManager::new(ScaleKind::Log, 100.0, 100.0);
        m.recompute_domain(&[stacked(&[Some(0.0)])], ChartType::Line);
        assert_eq!(m.extent, LOG_FALLBACK_DOMAIN);
        assert_eq!(m.y_axis.domain(), LOG_FALLBACK_DOMAIN);
        let floor = m.zero_floor().unwrap();
        assert!(floor > 0.0 && floor < LOG_FALLBACK_DOMAIN.0);
        assert!((m.y.to_px(floor) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn log_equal_extent_shrinks_min() {
        let mut m = ScaleManager::new(ScaleKind::Log, 100.0, 100.0);
        m.recompute_domain(&[stacked(&[Some(50.0), Some(50.0)])], ChartType::Line);
        assert!((m.extent.0 - 45.0).abs() < 1e-9);
        assert_eq!(m.extent.1, 50.0);
    }

    #[test]
    fn log_plot_and_axis_scales_agree_inside_domain() {
        let mut m = ScaleManager::new(ScaleKind::Log, 200.0, 300.0);
        m.recompute_domain(&[stacked(&[Some(1.0), Some(1000.0)])], ChartType::Line);
        for v in [1.0, 3.0, 10.0, 500.0, 1000.0] {
            assert!((m.y.to_px(v) - m.y_axis.to_px(v)).abs() < 1e-2, "{v}");
        }
        assert!((m.y_axis.to_px(1.0) - 270.0).abs() < 1e-3);
        assert_eq!(m.y.to_px(0.0), 300.0);
        assert_eq!(m.zero_px(), 300.0);
    }

    #[test]
    fn rebuild_switches_family() {
        let mut m = ScaleManager::new(ScaleKind::Lin, 100.0, 100.0);
        assert!(m.zero_floor().is_none());
        m.rebuild(ScaleKind::Log);
        assert!(m.y.is_log() && m.y_axis.is_log());
    }
}

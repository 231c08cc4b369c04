// File: crates/evolution-core/src/scene.rs
// Summary: Retained chart elements (series, null regions, legend, axes, labels) and the per-frame display list.

use std::collections::BTreeMap;

use crate::animation::{Animated, Tween};
use crate::axis::{zero_label, AxisView, ResolvedTick};
use crate::config::{ChartOptions, ChartType};
use crate::curve::Curve;
use crate::geometry::{area_path, line_path, Path, Rect, Vertex};
use crate::legend::{LegendLayout, SeriesStyle, Visibility, SWATCH_OPACITY_BOOST};
use crate::reconcile::{reconcile, Exit, Join};
use crate::scale::{ScaleManager, ScaleTransform};
use crate::series::{Sample, SeriesKey, StackedSample};
use crate::types::{Color, Point};

/// Plot-local vertices of one series.
pub fn series_vertices(data: &[StackedSample], scales: &ScaleManager, chart_type: ChartType) -> Vec<Vertex> {
    data.iter()
        .map(|d| {
            let x = scales.x.to_px(d.x);
            let (y, y0) = match chart_type {
                ChartType::Area => (d.top().map_or(0.0, |t| scales.y.to_px(t)), scales.y.to_px(d.y0)),
                ChartType::Line => (d.y.map_or(0.0, |v| scales.y.to_px(v)), scales.zero_px()),
            };
            Vertex { x, y, y0, defined: d.y.is_some() }
        })
        .collect()
}

/// Series geometry for the active chart type and curve.
pub fn series_path(vertices: &[Vertex], chart_type: ChartType, curve: Curve) -> Path {
    match chart_type {
        ChartType::Area => area_path(vertices, curve),
        ChartType::Line => line_path(vertices, curve),
    }
}

/// Step-shaped region covering the full plot height wherever a sample is
/// missing. Empty when the series has no gaps.
pub fn null_region_path(samples: &[Sample], scales: &ScaleManager) -> Path {
    if samples.iter().all(|d| d.y.is_some()) {
        return Path::new();
    }
    let h = scales.plot_height;
    let vertices: Vec<Vertex> = samples
        .iter()
        .map(|d| Vertex { x: scales.x.to_px(d.x), y: if d.y.is_none() { 0.0 } else { h }, y0: h, defined: true })
        .collect();
    area_path(&vertices, Curve::Step)
}

/// Continuation of the null-region fade: swap geometry while invisible.
#[derive(Clone, Debug, PartialEq)]
pub enum NullFade {
    Redraw(Path),
}

/// Continuation of the y-label fade: swap text while invisible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelFade {
    Reveal,
}

/// Everything a series needs on one render pass.
#[derive(Clone, Debug)]
pub struct SeriesUpdate {
    pub key: SeriesKey,
    pub index: usize,
    pub style: SeriesStyle,
    pub path: Path,
    /// New null-region geometry; `None` leaves the current one alone.
    pub null_path: Option<Path>,
    pub legend_cx: f32,
}

/// Retained elements of one series: path, null region and legend entry.
#[derive(Clone, Debug)]
pub struct SeriesElement {
    pub index: usize,
    pub label: String,
    pub color: Tween<Color>,
    pub path: Tween<Path>,
    pub opacity: Tween<f32>,
    pub null_path: Path,
    pub null_opacity: Tween<f32, NullFade>,
    pub legend_cx: Tween<f32>,
    pub swatch_opacity: Tween<f32>,
}

impl SeriesElement {
    fn enter(u: SeriesUpdate, opacity: f32, duration_ms: f64) -> Self {
        let mut el = SeriesElement {
            index: u.index,
            label: u.style.label,
            color: Tween::new(u.style.color),
            path: Tween::new(Path::new()),
            opacity: Tween::new(opacity),
            null_path: Path::new(),
            null_opacity: Tween::new(0.0),
            legend_cx: Tween::new(u.legend_cx),
            swatch_opacity: Tween::new(opacity + SWATCH_OPACITY_BOOST),
        };
        el.path.animate_to(u.path, duration_ms);
        el.fade_null_region(u.null_path.unwrap_or_default(), duration_ms);
        el
    }

    fn update(&mut self, u: SeriesUpdate, duration_ms: f64) {
        self.index = u.index;
        self.label = u.style.label;
        if *self.color.target() != u.style.color {
            self.color.animate_to(u.style.color, duration_ms);
        }
        self.path.animate_to(u.path, duration_ms);
        self.legend_cx.animate_to(u.legend_cx, duration_ms);
        if let Some(path) = u.null_path {
            self.fade_null_region(path, duration_ms);
        }
    }

    /// Fade out over half the duration, swap geometry, fade back in.
    fn fade_null_region(&mut self, path: Path, duration_ms: f64) {
        self.null_opacity.animate_then(0.0, duration_ms / 2.0, NullFade::Redraw(path));
    }

    fn advance(&mut self, dt_ms: f64, duration_ms: f64) {
        self.color.advance(dt_ms);
        self.path.advance(dt_ms);
        self.opacity.advance(dt_ms);
        self.legend_cx.advance(dt_ms);
        self.swatch_opacity.advance(dt_ms);
        if let Some(NullFade::Redraw(path)) = self.null_opacity.advance(dt_ms) {
            self.null_path = path;
            self.null_opacity.animate_to(1.0, duration_ms / 2.0);
        }
    }

    fn is_idle(&self) -> bool {
        self.color.is_idle()
            && self.path.is_idle()
            && self.opacity.is_idle()
            && self.null_opacity.is_idle()
            && self.legend_cx.is_idle()
            && self.swatch_opacity.is_idle()
    }
}

/// Fill or stroke, by chart type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Paint {
    Fill,
    Stroke,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesItem {
    pub key: SeriesKey,
    pub color: Color,
    pub paint: Paint,
    /// Plot-local geometry.
    pub path: Path,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NullRegionItem {
    /// Plot-local geometry.
    pub path: Path,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendItem {
    pub key: SeriesKey,
    pub label: String,
    pub center: Point,
    pub radius: f32,
    pub color: Color,
    pub fill_opacity: f32,
    pub label_pos: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub pos: Point,
    pub opacity: f32,
}

/// Immutable display list resolved at the current animation clock.
///
/// Series paths, null regions and ticks are plot-local (origin at
/// `plot.x, plot.y`); title and legend are in surface pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub plot: Rect,
    pub title: String,
    pub time_range: String,
    pub title_anchor: Point,
    /// y-axis label, plot-local.
    pub y_label: TextItem,
    /// Tick `pos` is an x offset.
    pub x_ticks: Vec<ResolvedTick>,
    /// Tick `pos` is a y offset.
    pub y_ticks: Vec<ResolvedTick>,
    pub zero_tick: ResolvedTick,
    pub null_regions: Vec<NullRegionItem>,
    pub series: Vec<SeriesItem>,
    pub legend: Vec<LegendItem>,
}

/// Pointer tolerance around a stroked series, in pixels.
pub const LINE_HIT_TOLERANCE: f32 = 4.0;

/// What a surface position lands on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hit {
    LegendSwatch(SeriesKey),
    LegendLabel(SeriesKey),
    Series(SeriesKey),
}

impl Hit {
    pub fn key(&self) -> &SeriesKey {
        match self {
            Hit::LegendSwatch(k) | Hit::LegendLabel(k) | Hit::Series(k) => k,
        }
    }
}

impl Frame {
    /// Topmost interactive element under surface point `p`: legend entries
    /// first, then series from the last drawn down.
    pub fn hit_test(&self, p: Point) -> Option<Hit> {
        for item in &self.legend {
            if p.distance(item.center) <= item.radius {
                return Some(Hit::LegendSwatch(item.key.clone()));
            }
            if LegendLayout::label_box(item.label_pos.x, item.label_pos.y, &item.label).contains(p) {
                return Some(Hit::LegendLabel(item.key.clone()));
            }
        }
        let local = Point::new(p.x - self.plot.x, p.y - self.plot.y);
        self.series
            .iter()
            .rev()
            .find(|s| match s.paint {
                Paint::Fill => s.path.contains(local),
                Paint::Stroke => s.path.distance_to(local) <= LINE_HIT_TOLERANCE,
            })
            .map(|s| Hit::Series(s.key.clone()))
    }
}

/// Retained scene of one chart instance.
#[derive(Clone, Debug)]
pub struct Scene {
    duration_ms: f64,
    series: BTreeMap<SeriesKey, SeriesElement>,
    pub x_axis: AxisView,
    pub y_axis: AxisView,
    time_range: String,
    y_label_text: String,
    y_label_pending: Option<String>,
    y_label_target: f32,
    y_label: Tween<f32, LabelFade>,
}

impl Scene {
    pub fn new(opts: &ChartOptions) -> Self {
        let label_opacity = if opts.convert.is_some() { 0.0 } else { 1.0 };
        Self {
            duration_ms: opts.duration_ms,
            series: BTreeMap::new(),
            x_axis: AxisView::new(),
            y_axis: AxisView::new(),
            time_range: String::new(),
            y_label_text: opts.y_axis_label.clone(),
            y_label_pending: None,
            y_label_target: label_opacity,
            y_label: Tween::new(label_opacity),
        }
    }

    pub fn len(&self) -> usize { self.series.len() }
    pub fn is_empty(&self) -> bool { self.series.is_empty() }
    pub fn keys(&self) -> impl Iterator<Item = &SeriesKey> { self.series.keys() }
    pub fn element(&self, key: &SeriesKey) -> Option<&SeriesElement> { self.series.get(key) }

    /// Series elements in draw order.
    pub fn elements(&self) -> Vec<(&SeriesKey, &SeriesElement)> {
        let mut els: Vec<_> = self.series.iter().collect();
        els.sort_by_key(|(_, el)| el.index);
        els
    }

    pub fn set_time_range(&mut self, text: String) { self.time_range = text; }

    /// Reconcile series elements against `updates`. New series start with the
    /// opacity `visibility` reports; removed series are dropped at once.
    pub fn sync_series(&mut self, updates: Vec<SeriesUpdate>, visibility: &Visibility) -> Join<SeriesKey> {
        let duration = self.duration_ms;
        let join = reconcile(
            &mut self.series,
            updates.into_iter().map(|u| (u.key.clone(), u)),
            |key, u| SeriesElement::enter(u, visibility.opacity(key), duration),
            |_, el, u| el.update(u, duration),
            |_, _| Exit::Remove,
        );
        tracing::trace!(enter = join.enter.len(), update = join.update.len(), exit = join.exit.len(), "series reconciled");
        join
    }

    /// Animate one series' path and swatch to its toggled opacity.
    pub fn animate_toggle(&mut self, key: &SeriesKey, opacity: f32) {
        let duration = self.duration_ms;
        if let Some(el) = self.series.get_mut(key) {
            el.opacity.animate_to(opacity, duration);
            el.swatch_opacity.animate_to(opacity + SWATCH_OPACITY_BOOST, duration);
        }
    }

    /// Snap every series to its toggle state, e.g. after a dataset replacement.
    pub fn reset_visibility(&mut self, visibility: &Visibility) {
        for (key, el) in self.series.iter_mut() {
            el.opacity.set(visibility.opacity(key));
            el.swatch_opacity.set(visibility.base(key) + SWATCH_OPACITY_BOOST);
        }
    }

    /// Apply hover emphasis immediately.
    pub fn apply_highlight(&mut self, visibility: &Visibility) {
        for (key, el) in self.series.iter_mut() {
            el.opacity.set(visibility.opacity(key));
        }
    }

    /// Fade the y label to `opacity` (percentage mode hides it).
    pub fn fade_y_label(&mut self, opacity: f32) {
        self.y_label_target = opacity;
        if self.y_label_pending.is_some() {
            self.y_label.animate_then(0.0, self.duration_ms / 2.0, LabelFade::Reveal);
        } else {
            self.y_label.animate_to(opacity, self.duration_ms);
        }
    }

    /// Fade the y label out, swap its text, fade it back in.
    pub fn replace_y_label(&mut self, text: String) {
        self.y_label_pending = Some(text);
        self.y_label.animate_then(0.0, self.duration_ms / 2.0, LabelFade::Reveal);
    }

    /// Resolve every element at the current clock.
    pub fn frame(&self, opts: &ChartOptions, scales: &ScaleManager, visibility: &Visibility) -> Frame {
        let layout = LegendLayout::new(opts, self.series.len());
        let paint = match opts.chart_type {
            ChartType::Area => Paint::Fill,
            ChartType::Line => Paint::Stroke,
        };
        let elements = self.elements();
        let series = elements
            .iter()
            .map(|(key, el)| SeriesItem {
                key: (*key).clone(),
                color: el.color.value(),
                paint,
                path: el.path.value(),
                opacity: el.opacity.value(),
            })
            .collect();
        let null_regions = elements
            .iter()
            .filter(|(_, el)| !el.null_path.is_empty())
            .map(|(_, el)| NullRegionItem { path: el.null_path.clone(), opacity: el.null_opacity.value() })
            .collect();
        let legend = elements
            .iter()
            .map(|(key, el)| {
                let cx = el.legend_cx.value();
                LegendItem {
                    key: (*key).clone(),
                    label: el.label.clone(),
                    center: Point::new(cx, layout.cy),
                    radius: visibility.radius(key, layout.radius),
                    color: el.color.value(),
                    fill_opacity: el.swatch_opacity.value().min(1.0),
                    label_pos: Point::new(cx + 2.0 * layout.radius, layout.cy),
                }
            })
            .collect();
        let percentage = opts.convert.is_some();
        Frame {
            width: opts.width,
            height: opts.height,
            plot: Rect::new(opts.margin.left as f32, opts.margin.top as f32, opts.plot_width(), opts.plot_height()),
            title: opts.title.clone(),
            time_range: self.time_range.clone(),
            title_anchor: Point::new(opts.width as f32 / 2.0, opts.margin.top as f32 / 3.0),
            y_label: TextItem {
                text: self.y_label_text.clone(),
                pos: Point::new(20.0 - opts.margin.left as f32, -20.0),
                opacity: self.y_label.value(),
            },
            x_ticks: self.x_axis.resolve(),
            y_ticks: self.y_axis.resolve(),
            zero_tick: ResolvedTick { value: 0.0, pos: scales.plot_height, label: zero_label(percentage), opacity: 1.0 },
            null_regions,
            series,
            legend,
        }
    }
}

impl Animated for Scene {
    fn advance(&mut self, dt_ms: f64) {
        let duration = self.duration_ms;
        for el in self.series.values_mut() {
            el.advance(dt_ms, duration);
        }
        self.x_axis.advance(dt_ms);
        self.y_axis.advance(dt_ms);
        if let Some(LabelFade::Reveal) = self.y_label.advance(dt_ms) {
            if let Some(text) = self.y_label_pending.take() {
                self.y_label_text = text;
            }
            self.y_label.animate_to(self.y_label_target, duration / 2.0);
        }
    }

    fn is_idle(&self) -> bool {
        self.series.values().all(SeriesElement::is_idle)
            && self.x_axis.is_idle()
            && self.y_axis.is_idle()
            && self.y_label.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::settle;
    use crate::config::ScaleKind;
    use crate::types::CATEGORY10;

    fn scales() -> ScaleManager {
        let mut m = ScaleManager::new(ScaleKind::Lin, 100.0, 50.0);
        m.set_time_domain(Some((0.0, 2000.0)));
        m
    }

    fn update(key: usize, path: Path, null_path: Option<Path>) -> SeriesUpdate {
        SeriesUpdate {
            key: SeriesKey::Index(key),
            index: key,
            style: SeriesStyle { label: format!("path_{key}"), color: CATEGORY10[key] },
            path,
            null_path,
            legend_cx: 10.0 * key as f32,
        }
    }

    #[test]
    fn null_region_spans_gap_columns() {
        let s = scales();
        let samples = [Sample::value(0.0, 1.0), Sample::gap(1000.0), Sample::value(2000.0, 1.0)];
        let path = null_region_path(&samples, &s);
        assert!(!path.is_empty());
        assert!(path.contains(Point::new(50.0, 25.0)));
        assert!(!path.contains(Point::new(5.0, 25.0)));
        assert!(null_region_path(&[Sample::value(0.0, 1.0)], &s).is_empty());
    }

    #[test]
    fn null_region_swaps_geometry_only_after_fade_out() {
        let opts = ChartOptions { duration_ms: 100.0, ..ChartOptions::default() };
        let mut scene = Scene::new(&opts);
        let mut vis = Visibility::default();
        vis.reset(&[SeriesKey::Index(0)]);
        let mut first = Path::new();
        first.move_to(Point::new(0.0, 0.0));
        first.line_to(Point::new(1.0, 1.0));
        first.close();
        scene.sync_series(vec![update(0, Path::new(), Some(first.clone()))], &vis);
        settle(&mut scene);
        let el = scene.element(&SeriesKey::Index(0)).unwrap();
        assert_eq!(el.null_path, first);
        assert_eq!(el.null_opacity.value(), 1.0);

        scene.sync_series(vec![update(0, Path::new(), Some(Path::new()))], &vis);
        scene.advance(25.0);
        let el = scene.element(&SeriesKey::Index(0)).unwrap();
        assert_eq!(el.null_path, first, "old geometry kept while fading out");
        assert!(el.null_opacity.value() < 1.0);
        scene.advance(25.0);
        let el = scene.element(&SeriesKey::Index(0)).unwrap();
        assert!(el.null_path.is_empty());
        assert_eq!(el.null_opacity.value(), 0.0);
        settle(&mut scene);
        assert_eq!(scene.element(&SeriesKey::Index(0)).unwrap().null_opacity.value(), 1.0);
    }

    #[test]
    fn y_label_text_changes_while_hidden() {
        let opts = ChartOptions { duration_ms: 100.0, y_axis_label: "old".into(), ..ChartOptions::default() };
        let mut scene = Scene::new(&opts);
        let vis = Visibility::default();
        scene.replace_y_label("new".into());
        scene.advance(25.0);
        assert_eq!(scene.frame(&opts, &scales(), &vis).y_label.text, "old");
        scene.advance(25.0);
        let f = scene.frame(&opts, &scales(), &vis);
        assert_eq!(f.y_label.text, "new");
        assert_eq!(f.y_label.opacity, 0.0);
        settle(&mut scene);
        assert_eq!(scene.frame(&opts, &scales(), &vis).y_label.opacity, 1.0);
    }

    #[test]
    fn percentage_fade_keeps_pending_label() {
        let opts = ChartOptions { duration_ms: 100.0, ..ChartOptions::default() };
        let mut scene = Scene::new(&opts);
        let vis = Visibility::default();
        scene.replace_y_label("msg/s".into());
        scene.advance(10.0);
        scene.fade_y_label(0.0);
        settle(&mut scene);
        let f = scene.frame(&opts, &scales(), &vis);
        assert_eq!(f.y_label.text, "msg/s");
        assert_eq!(f.y_label.opacity, 0.0);
    }

    #[test]
    fn removed_series_leave_immediately() {
        let opts = ChartOptions::default();
        let mut scene = Scene::new(&opts);
        let mut vis = Visibility::default();
        vis.reset(&[SeriesKey::Index(0), SeriesKey::Index(1)]);
        scene.sync_series(vec![update(0, Path::new(), None), update(1, Path::new(), None)], &vis);
        let join = scene.sync_series(vec![update(0, Path::new(), None)], &vis);
        assert_eq!(join.exit, vec![SeriesKey::Index(1)]);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.frame(&opts, &scales(), &vis).legend.len(), 1);
    }
}

// File: crates/evolution-core/src/chart.rs
// Summary: Chart instance API: construction, dataset and option updates, pointer interaction, animation clock and frames.

use crate::animation::{self, Animated};
use crate::axis::{x_tick_specs, y_tick_specs};
use crate::config::{ChartOptions, ChartType, Normalization, PartialLegend, PartialOptions, ScaleKind};
use crate::curve::Curve;
use crate::error::ChartResult;
use crate::geometry::Vertex;
use crate::legend::{resolve_style, LegendLayout, Visibility};
use crate::scale::{ScaleManager, ScaleTransform};
use crate::scene::{null_region_path, series_path, series_vertices, Frame, Hit, Scene, SeriesUpdate};
use crate::series::{Dataset, SeriesKey, StackedSample};
use crate::stack::prepare;
use crate::time::format_iso;
use crate::types::Point;

/// One chart attached to a mount point.
///
/// Every mutation schedules transitions on the retained scene; drive them
/// with [`Chart::advance`] (or [`Chart::settle`]) and read the result with
/// [`Chart::frame`].
#[derive(Clone, Debug)]
pub struct Chart {
    mount_id: String,
    opts: ChartOptions,
    /// Current dataset, timestamps in milliseconds.
    source: Dataset,
    keys: Vec<SeriesKey>,
    data: Vec<Vec<StackedSample>>,
    scales: ScaleManager,
    visibility: Visibility,
    scene: Scene,
    rendered: bool,
    clock_ms: f64,
}

impl Chart {
    /// Resolve `partial` over the defaults and attach an empty chart to `mount_id`.
    pub fn new(mount_id: impl Into<String>, partial: &PartialOptions) -> ChartResult<Self> {
        let opts = ChartOptions::resolve(partial)?;
        let mount_id = mount_id.into();
        tracing::debug!(
            mount = %mount_id,
            width = opts.width,
            height = opts.height,
            chart_type = %opts.chart_type,
            y_scale = %opts.y_scale,
            curve = %opts.interpolate,
            "chart constructed"
        );
        Ok(Self {
            scales: ScaleManager::new(opts.y_scale, opts.plot_width(), opts.plot_height()),
            scene: Scene::new(&opts),
            mount_id,
            opts,
            source: Dataset::default(),
            keys: Vec::new(),
            data: Vec::new(),
            visibility: Visibility::default(),
            rendered: false,
            clock_ms: 0.0,
        })
    }

    pub fn mount_id(&self) -> &str { &self.mount_id }
    pub fn options(&self) -> &ChartOptions { &self.opts }
    pub fn scales(&self) -> &ScaleManager { &self.scales }
    pub fn visibility(&self) -> &Visibility { &self.visibility }
    pub fn keys(&self) -> &[SeriesKey] { &self.keys }
    /// Current dataset with timestamps in milliseconds.
    pub fn dataset(&self) -> &Dataset { &self.source }
    /// Plotting-ready samples of the last render, one vector per series.
    pub fn prepared(&self) -> &[Vec<StackedSample>] { &self.data }
    /// Milliseconds the animation clock has advanced since construction.
    pub fn clock_ms(&self) -> f64 { self.clock_ms }

    /// Plot-local vertices of series `index` under the current scales.
    pub fn vertices(&self, index: usize) -> Option<Vec<Vertex>> {
        self.data.get(index).map(|d| series_vertices(d, &self.scales, self.opts.chart_type))
    }

    /// Replace the dataset (timestamps in seconds). Resets every series to visible.
    pub fn set_data(&mut self, dataset: Dataset) -> &mut Self {
        self.source = dataset.seconds_to_millis();
        self.keys = self.source.keys();
        self.visibility.reset(&self.keys);
        let range = self
            .source
            .x_extent()
            .map(|(a, b)| format!("[ {} / {} ]", format_iso(a), format_iso(b)))
            .unwrap_or_default();
        self.scene.set_time_range(range);
        tracing::debug!(
            mount = %self.mount_id,
            series = self.source.len(),
            samples = self.source.series.iter().map(|s| s.len()).max().unwrap_or(0),
            "dataset replaced"
        );
        self.redraw(true);
        self.scene.reset_visibility(&self.visibility);
        self
    }

    /// Merge legend entries and layout, then restyle paths and legend.
    pub fn set_legend(&mut self, patch: &PartialLegend) -> &mut Self {
        self.opts.legend.merge(patch);
        tracing::debug!(entries = self.opts.legend.entries.len(), "legend merged");
        self.redraw(false);
        self
    }

    /// Switch percentage normalization on (`Some`) or off (`None`).
    pub fn set_normalization(&mut self, mode: Option<Normalization>) -> &mut Self {
        self.opts.convert = mode;
        tracing::debug!(percentage = mode.is_some(), "normalization changed");
        self.scene.fade_y_label(if mode.is_some() { 0.0 } else { 1.0 });
        self.redraw(false);
        self
    }

    pub fn set_interpolation(&mut self, curve: Curve) -> &mut Self {
        self.opts.interpolate = curve;
        tracing::debug!(curve = %curve, "interpolation changed");
        self.redraw(false);
        self
    }

    pub fn set_type(&mut self, chart_type: ChartType) -> &mut Self {
        self.opts.chart_type = chart_type;
        tracing::debug!(chart_type = %chart_type, "chart type changed");
        self.redraw(false);
        self
    }

    /// Fade the y-axis label out, replace its text, fade it back in.
    pub fn set_axis_label(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        tracing::debug!(label = %text, "axis label changed");
        self.opts.y_axis_label = text.clone();
        self.scene.replace_y_label(text);
        self
    }

    /// Rebuild both value scales for `kind` and re-floor zeros.
    pub fn set_scale_kind(&mut self, kind: ScaleKind) -> &mut Self {
        self.opts.y_scale = kind;
        let old = self.scales.clone();
        self.scales.rebuild(kind);
        tracing::debug!(kind = %kind, "scale kind changed");
        self.redraw_from(old, false);
        self
    }

    /// Detach from the mount point. The instance is consumed.
    pub fn destroy(self) {
        tracing::debug!(mount = %self.mount_id, "chart destroyed");
    }

    /// What surface point `(x, y)` lands on at the current clock.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<Hit> {
        self.frame().hit_test(Point::new(x, y))
    }

    /// Click: toggle the series under the pointer. Returns the toggled key.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<SeriesKey> {
        let key = self.hit_test(x, y)?.key().clone();
        let opacity = self.visibility.toggle(&key);
        self.scene.animate_toggle(&key, opacity);
        Some(key)
    }

    /// Hover tracking. Returns whether the highlighted series changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let key = self.hit_test(x, y).map(|h| h.key().clone());
        self.set_hover(key)
    }

    /// Pointer left the surface.
    pub fn pointer_leave(&mut self) -> bool { self.set_hover(None) }

    fn set_hover(&mut self, key: Option<SeriesKey>) -> bool {
        if !self.visibility.hover(key) {
            return false;
        }
        tracing::trace!(hovered = ?self.visibility.hovered(), "hover changed");
        self.scene.apply_highlight(&self.visibility);
        true
    }

    /// Move the animation clock forward.
    pub fn advance(&mut self, dt_ms: f64) {
        self.clock_ms += dt_ms.max(0.0);
        self.scene.advance(dt_ms);
    }

    /// Run every pending transition to completion.
    pub fn settle(&mut self) {
        animation::settle(&mut self.scene);
    }

    pub fn is_idle(&self) -> bool { self.scene.is_idle() }

    /// Display list at the current clock.
    pub fn frame(&self) -> Frame {
        self.scene.frame(&self.opts, &self.scales, &self.visibility)
    }

    /// Re-run the pipeline and push new targets to every element.
    fn redraw(&mut self, refresh_nulls: bool) {
        self.redraw_from(self.scales.clone(), refresh_nulls);
    }

    /// Like [`Chart::redraw`], animating axes from `old`, the scales last on screen.
    fn redraw_from(&mut self, old: ScaleManager, refresh_nulls: bool) {
        self.data = prepare(&self.source, &self.opts, &mut self.scales);
        let old = if self.rendered { old } else { self.scales.clone() };
        self.rendered = true;

        let layout = LegendLayout::new(&self.opts, self.keys.len());
        let updates = self
            .keys
            .iter()
            .zip(&self.data)
            .enumerate()
            .map(|(i, (key, data))| {
                let vertices = series_vertices(data, &self.scales, self.opts.chart_type);
                SeriesUpdate {
                    key: key.clone(),
                    index: i,
                    style: resolve_style(&self.opts.legend, i),
                    path: series_path(&vertices, self.opts.chart_type, self.opts.interpolate),
                    null_path: refresh_nulls.then(|| null_region_path(&self.source.series[i].samples, &self.scales)),
                    legend_cx: layout.swatch_center(i).x,
                }
            })
            .collect();
        self.scene.sync_series(updates, &self.visibility);

        let duration = self.opts.duration_ms;
        let new = &self.scales;
        self.scene.x_axis.update(x_tick_specs(new), |v| old.x.to_px(v), |v| new.x.to_px(v), duration);
        self.scene.y_axis.update(
            y_tick_specs(new, self.opts.convert.is_some()),
            |v| old.y_axis.to_px(v),
            |v| new.y_axis.to_px(v),
            duration,
        );
    }
}

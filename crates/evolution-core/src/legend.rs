// File: crates/evolution-core/src/legend.rs
// Summary: Per-series label/color resolution, legend layout, and visibility/highlight state keyed by series identity.

use std::collections::BTreeMap;

use crate::config::{ChartOptions, LegendOptions};
use crate::geometry::Rect;
use crate::series::SeriesKey;
use crate::types::{Color, Point, CATEGORY10};

/// Opacity of visible series while another one is hovered.
pub const DIMMED_OPACITY: f32 = 0.4;
/// Swatch radius multiplier while hovered.
pub const HOVER_RADIUS_SCALE: f32 = 1.3;
/// Extra fill opacity of a legend swatch over its series.
pub const SWATCH_OPACITY_BOOST: f32 = 0.2;
/// Approximate label glyph advance used for legend hit boxes.
pub const LABEL_CHAR_WIDTH: f32 = 7.0;
/// Legend label font size in pixels.
pub const LABEL_FONT_PX: f32 = 12.0;

/// Resolved label and color of the series at `index`.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesStyle {
    pub label: String,
    pub color: Color,
}

/// Explicit legend entry when present, else `path_<index>` and the categorical palette.
pub fn resolve_style(legend: &LegendOptions, index: usize) -> SeriesStyle {
    let entry = legend.entries.get(index);
    let label = entry.and_then(|e| e.label.clone()).unwrap_or_else(|| format!("path_{index}"));
    let color = entry.and_then(|e| e.color).unwrap_or(CATEGORY10[index % CATEGORY10.len()]);
    SeriesStyle { label, color }
}

/// Legend geometry for `n` series under `opts`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegendLayout {
    /// x of the first swatch center.
    pub x0: f32,
    /// Common y of swatch centers and label baselines.
    pub cy: f32,
    pub space: f32,
    pub radius: f32,
}

impl LegendLayout {
    pub fn new(opts: &ChartOptions, n: usize) -> Self {
        Self {
            x0: opts.width as f32 - opts.margin.right as f32 - opts.legend.space * n as f32,
            cy: opts.margin.top as f32 * 2.0 / 3.0,
            space: opts.legend.space,
            radius: opts.legend.button_radius,
        }
    }

    pub fn swatch_center(&self, index: usize) -> Point {
        Point::new(self.x0 + self.space * index as f32, self.cy)
    }

    /// Left edge of the label text.
    pub fn label_x(&self, index: usize) -> f32 {
        self.swatch_center(index).x + 2.0 * self.radius
    }

    /// Approximate box covered by `label` drawn at `label_x`.
    pub fn label_box(label_x: f32, cy: f32, label: &str) -> Rect {
        let w = label.chars().count() as f32 * LABEL_CHAR_WIDTH;
        Rect::new(label_x, cy - LABEL_FONT_PX * 0.5, w, LABEL_FONT_PX)
    }
}

/// Toggle state per series identity plus the current hover target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Visibility {
    toggled: BTreeMap<SeriesKey, f32>,
    hovered: Option<SeriesKey>,
}

impl Visibility {
    /// Every key visible, nothing hovered.
    pub fn reset(&mut self, keys: &[SeriesKey]) {
        self.toggled = keys.iter().map(|k| (k.clone(), 1.0)).collect();
        self.hovered = None;
    }

    /// Flip a series between hidden (0) and visible (1); returns the new value.
    pub fn toggle(&mut self, key: &SeriesKey) -> f32 {
        let v = self.toggled.entry(key.clone()).or_insert(1.0);
        *v = if *v != 0.0 { 0.0 } else { 1.0 };
        tracing::debug!(series = %key, opacity = *v, "series toggled");
        *v
    }

    /// Last toggled opacity; unknown keys are visible.
    pub fn base(&self, key: &SeriesKey) -> f32 {
        self.toggled.get(key).copied().unwrap_or(1.0)
    }

    pub fn is_visible(&self, key: &SeriesKey) -> bool { self.base(key) != 0.0 }

    pub fn hovered(&self) -> Option<&SeriesKey> { self.hovered.as_ref() }

    /// Set the hover target; returns whether it changed.
    pub fn hover(&mut self, key: Option<SeriesKey>) -> bool {
        if self.hovered == key { return false; }
        self.hovered = key;
        true
    }

    /// Displayed opacity: the hovered series at full emphasis, other visible
    /// series dimmed, hidden series hidden. Without hover, the toggled value.
    pub fn opacity(&self, key: &SeriesKey) -> f32 {
        match &self.hovered {
            None => self.base(key),
            Some(h) if h == key => 1.0,
            Some(_) if self.base(key) == 0.0 => 0.0,
            Some(_) => DIMMED_OPACITY,
        }
    }

    /// Legend swatch radius for `key`.
    pub fn radius(&self, key: &SeriesKey, base: f32) -> f32 {
        if self.hovered.as_ref() == Some(key) { base * HOVER_RADIUS_SCALE } else { base }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LegendEntry;

    fn keys(n: usize) -> Vec<SeriesKey> { (0..n).map(SeriesKey::Index).collect() }

    #[test]
    fn styles_fall_back_per_index() {
        let legend = LegendOptions {
            entries: vec![LegendEntry::new("Clean", Color::rgb(0x66, 0xcc, 0)), LegendEntry::default()],
            ..LegendOptions::default()
        };
        assert_eq!(resolve_style(&legend, 0).label, "Clean");
        assert_eq!(resolve_style(&legend, 1), SeriesStyle { label: "path_1".into(), color: CATEGORY10[1] });
        assert_eq!(resolve_style(&legend, 12).color, CATEGORY10[2]);
    }

    #[test]
    fn layout_matches_default_geometry() {
        let opts = ChartOptions::default();
        let l = LegendLayout::new(&opts, 3);
        assert_eq!(l.x0, 800.0 - 60.0 - 390.0);
        assert_eq!(l.swatch_center(2), Point::new(350.0 + 260.0, 80.0 * 2.0 / 3.0));
        assert_eq!(l.label_x(0), 364.0);
    }

    #[test]
    fn toggle_twice_restores() {
        let mut v = Visibility::default();
        let k = keys(2);
        v.reset(&k);
        assert_eq!(v.toggle(&k[0]), 0.0);
        assert_eq!(v.toggle(&k[0]), 1.0);
        assert!(v.is_visible(&k[0]));
    }

    #[test]
    fn hover_dims_visible_only() {
        let mut v = Visibility::default();
        let k = keys(3);
        v.reset(&k);
        v.toggle(&k[2]);
        assert!(v.hover(Some(k[0].clone())));
        assert_eq!(v.opacity(&k[0]), 1.0);
        assert_eq!(v.opacity(&k[1]), DIMMED_OPACITY);
        assert_eq!(v.opacity(&k[2]), 0.0);
        assert_eq!(v.radius(&k[0], 7.0), 7.0 * HOVER_RADIUS_SCALE);
        assert!(v.hover(None));
        assert_eq!(v.opacity(&k[1]), 1.0);
        assert_eq!(v.opacity(&k[2]), 0.0);
    }

    #[test]
    fn reset_makes_everything_visible() {
        let mut v = Visibility::default();
        let k = keys(1);
        v.reset(&k);
        v.toggle(&k[0]);
        v.reset(&k);
        assert!(v.is_visible(&k[0]));
    }
}

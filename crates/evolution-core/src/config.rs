// File: crates/evolution-core/src/config.rs
// Summary: Chart options with documented defaults, partial option documents, and deep merge.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::curve::Curve;
use crate::error::{ChartError, ChartResult};
use crate::types::{Color, Margin, DURATION_MS, HEIGHT, WIDTH};

/// Geometry used for series paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChartType {
    /// Stacked filled regions between `y0` and `y0 + y`.
    Area,
    /// Unstacked stroked lines.
    #[default]
    Line,
}

impl FromStr for ChartType {
    type Err = ChartError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "area" => Ok(Self::Area),
            "line" => Ok(Self::Line),
            _ => Err(ChartError::UnknownChartType(s.to_string())),
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Self::Area => "area", Self::Line => "line" })
    }
}

/// Value axis scale family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScaleKind {
    #[default]
    Lin,
    Log,
}

impl FromStr for ScaleKind {
    type Err = ChartError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lin" => Ok(Self::Lin),
            "log" => Ok(Self::Log),
            _ => Err(ChartError::UnknownScaleKind(s.to_string())),
        }
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Self::Lin => "lin", Self::Log => "log" })
    }
}

/// Optional value conversion applied before stacking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalization {
    /// Each value divided by the per-instant total across series.
    Percentage,
}

impl FromStr for Normalization {
    type Err = ChartError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            _ => Err(ChartError::UnknownNormalization(s.to_string())),
        }
    }
}

/// Optional per-series label/color override.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LegendEntry {
    pub label: Option<String>,
    pub color: Option<Color>,
}

impl LegendEntry {
    pub fn new(label: impl Into<String>, color: Color) -> Self {
        Self { label: Some(label.into()), color: Some(color) }
    }

    fn merge(&mut self, patch: &LegendEntry) {
        if let Some(label) = &patch.label { self.label = Some(label.clone()); }
        if let Some(color) = patch.color { self.color = Some(color); }
    }
}

/// Legend layout and entries.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendOptions {
    /// Swatch circle radius in pixels.
    pub button_radius: f32,
    /// Horizontal distance between consecutive entries.
    pub space: f32,
    pub entries: Vec<LegendEntry>,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self { button_radius: 7.0, space: 130.0, entries: Vec::new() }
    }
}

impl LegendOptions {
    /// Deep merge: scalar fields replace, entries merge index-wise.
    pub fn merge(&mut self, patch: &PartialLegend) {
        if let Some(r) = patch.button_radius { self.button_radius = r; }
        if let Some(s) = patch.space { self.space = s; }
        if let Some(entries) = &patch.entries {
            for (i, entry) in entries.iter().enumerate() {
                if i >= self.entries.len() {
                    self.entries.resize_with(i + 1, LegendEntry::default);
                }
                if let Some(entry) = entry {
                    self.entries[i].merge(entry);
                }
            }
        }
    }
}

/// Effective chart configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub margin: Margin,
    pub y_axis_label: String,
    pub chart_type: ChartType,
    pub y_scale: ScaleKind,
    /// Transition duration in milliseconds.
    pub duration_ms: f64,
    pub interpolate: Curve,
    pub convert: Option<Normalization>,
    pub legend: LegendOptions,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: WIDTH,
            height: HEIGHT,
            margin: Margin::default(),
            y_axis_label: String::new(),
            chart_type: ChartType::Line,
            y_scale: ScaleKind::Lin,
            duration_ms: DURATION_MS,
            interpolate: Curve::Linear,
            convert: None,
            legend: LegendOptions::default(),
        }
    }
}

impl ChartOptions {
    /// Defaults deep-merged with `partial`.
    pub fn resolve(partial: &PartialOptions) -> ChartResult<Self> {
        let mut opts = Self::default();
        opts.apply(partial)?;
        Ok(opts)
    }

    /// Deep-merge `partial` into these options. Enumerated names are
    /// validated before anything is written, so a failed merge leaves
    /// `self` untouched.
    pub fn apply(&mut self, partial: &PartialOptions) -> ChartResult<()> {
        let chart_type = partial.chart_type.as_deref().map(str::parse::<ChartType>).transpose()?;
        let y_scale = partial.y_scale.as_deref().map(str::parse::<ScaleKind>).transpose()?;
        let interpolate = partial.interpolate.as_deref().map(str::parse::<Curve>).transpose()?;
        let convert = partial.convert.as_deref().map(str::parse::<Normalization>).transpose()?;

        if let Some(t) = &partial.title { self.title = t.clone(); }
        if let Some(w) = partial.width { self.width = w; }
        if let Some(h) = partial.height { self.height = h; }
        if let Some(m) = &partial.margin {
            if let Some(v) = m.top { self.margin.top = v; }
            if let Some(v) = m.right { self.margin.right = v; }
            if let Some(v) = m.bottom { self.margin.bottom = v; }
            if let Some(v) = m.left { self.margin.left = v; }
        }
        if let Some(l) = &partial.y_axis_label { self.y_axis_label = l.clone(); }
        if let Some(t) = chart_type { self.chart_type = t; }
        if let Some(s) = y_scale { self.y_scale = s; }
        if let Some(d) = partial.duration { self.duration_ms = d.max(0.0); }
        if let Some(c) = interpolate { self.interpolate = c; }
        if convert.is_some() { self.convert = convert; }
        if let Some(legend) = &partial.legend { self.legend.merge(legend); }
        Ok(())
    }

    /// Plot area width (surface width minus horizontal margins).
    pub fn plot_width(&self) -> f32 {
        self.width.saturating_sub(self.margin.hsum()) as f32
    }

    /// Plot area height (surface height minus vertical margins).
    pub fn plot_height(&self) -> f32 {
        self.height.saturating_sub(self.margin.vsum()) as f32
    }
}

/// Partial option document; every field is optional and merged over the defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialOptions {
    pub title: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub margin: Option<PartialMargin>,
    pub y_axis_label: Option<String>,
    #[serde(rename = "type")]
    pub chart_type: Option<String>,
    pub y_scale: Option<String>,
    pub duration: Option<f64>,
    pub interpolate: Option<String>,
    pub convert: Option<String>,
    pub legend: Option<PartialLegend>,
}

impl PartialOptions {
    /// Parse an option document such as `{"type": "area", "legend": {"space": 100}}`.
    pub fn from_json(json: &str) -> ChartResult<Self> {
        serde_json::from_str(json).map_err(|e| ChartError::MalformedOptions(e.to_string()))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PartialMargin {
    pub top: Option<u32>,
    pub right: Option<u32>,
    pub bottom: Option<u32>,
    pub left: Option<u32>,
}

/// Legend patch. `null` entries leave the corresponding index untouched.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialLegend {
    pub button_radius: Option<f32>,
    pub space: Option<f32>,
    pub entries: Option<Vec<Option<LegendEntry>>>,
}

impl PartialLegend {
    /// Patch carrying only entries.
    pub fn entries(entries: Vec<LegendEntry>) -> Self {
        Self { entries: Some(entries.into_iter().map(Some).collect()), ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let o = ChartOptions::default();
        assert_eq!((o.width, o.height), (800, 400));
        assert_eq!(o.margin, Margin::new(80, 60, 40, 60));
        assert_eq!(o.chart_type, ChartType::Line);
        assert_eq!(o.y_scale, ScaleKind::Lin);
        assert_eq!(o.duration_ms, 1250.0);
        assert_eq!(o.interpolate, Curve::Linear);
        assert_eq!(o.legend.button_radius, 7.0);
        assert_eq!(o.legend.space, 130.0);
        assert!(o.legend.entries.is_empty());
        assert_eq!(o.plot_width(), 680.0);
        assert_eq!(o.plot_height(), 280.0);
    }

    #[test]
    fn nested_merge_keeps_untouched_fields() {
        let partial = PartialOptions {
            margin: Some(PartialMargin { left: Some(10), ..Default::default() }),
            legend: Some(PartialLegend { space: Some(90.0), ..Default::default() }),
            ..Default::default()
        };
        let o = ChartOptions::resolve(&partial).unwrap();
        assert_eq!(o.margin, Margin::new(80, 60, 40, 10));
        assert_eq!(o.legend.space, 90.0);
        assert_eq!(o.legend.button_radius, 7.0);
    }

    #[test]
    fn unknown_curve_fails_fast_without_partial_write() {
        let mut o = ChartOptions::default();
        let partial = PartialOptions {
            title: Some("changed".into()),
            interpolate: Some("curveWobbly".into()),
            ..Default::default()
        };
        assert_eq!(o.apply(&partial), Err(ChartError::UnknownCurve("curveWobbly".into())));
        assert_eq!(o.title, "");
    }

    #[test]
    fn legend_entries_merge_index_wise() {
        let mut legend = LegendOptions::default();
        legend.merge(&PartialLegend::entries(vec![
            LegendEntry::new("Clean", Color::rgb(0x66, 0xcc, 0)),
            LegendEntry::new("Greylisted", Color::rgb(0x43, 0x6e, 0xee)),
        ]));
        legend.merge(&PartialLegend {
            entries: Some(vec![None, Some(LegendEntry { label: None, color: Some(Color::rgb(1, 2, 3)) })]),
            ..Default::default()
        });
        assert_eq!(legend.entries[0].label.as_deref(), Some("Clean"));
        assert_eq!(legend.entries[1].label.as_deref(), Some("Greylisted"));
        assert_eq!(legend.entries[1].color, Some(Color::rgb(1, 2, 3)));
    }

    #[test]
    fn option_document_uses_camel_case_keys() {
        let p = PartialOptions::from_json(
            r##"{"type":"area","yScale":"log","yAxisLabel":"msg/s","convert":"percentage",
                "interpolate":"curveMonotoneX","legend":{"buttonRadius":5,
                "entries":[null,{"label":"Spam","color":"#f00"}]}}"##,
        )
        .unwrap();
        let o = ChartOptions::resolve(&p).unwrap();
        assert_eq!(o.chart_type, ChartType::Area);
        assert_eq!(o.y_scale, ScaleKind::Log);
        assert_eq!(o.convert, Some(Normalization::Percentage));
        assert_eq!(o.interpolate, Curve::MonotoneX);
        assert_eq!(o.legend.button_radius, 5.0);
        assert_eq!(o.legend.entries.len(), 2);
        assert_eq!(o.legend.entries[0], LegendEntry::default());
        assert_eq!(o.legend.entries[1].color, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn malformed_documents_are_configuration_errors() {
        assert!(matches!(PartialOptions::from_json(r#"{"width": -3}"#), Err(ChartError::MalformedOptions(_))));
        assert!(matches!(
            PartialOptions::from_json(r##"{"legend":{"entries":[{"color":"red"}]}}"##),
            Err(ChartError::MalformedOptions(_))
        ));
        let p = PartialOptions::from_json(r#"{"type":"pie"}"#).unwrap();
        assert_eq!(ChartOptions::resolve(&p), Err(ChartError::UnknownChartType("pie".into())));
    }
}

// File: crates/evolution-core/tests/scenarios.rs
// Purpose: End-to-end chart scenarios driven through the public API only.

use evolution_core::{
    Chart, ChartError, ChartType, Curve, Dataset, Hit, LegendEntry, PartialLegend, PartialOptions, Paint, ScaleKind,
    Sample, Series, SeriesKey, CATEGORY10,
};

fn example_feed() -> Dataset {
    Dataset::from_json(
        r#"[
            [{"x": 0, "y": 1}, {"x": 60, "y": 2}, {"x": 120, "y": null}],
            [{"x": 0, "y": 3}, {"x": 60, "y": 4}, {"x": 120, "y": 5}]
        ]"#,
    )
    .unwrap()
}

#[test]
fn stacked_area_with_a_gap() {
    let opts = PartialOptions::from_json(r#"{"type": "area", "title": "Traffic"}"#).unwrap();
    let mut c = Chart::new("traffic", &opts).unwrap();
    c.set_data(example_feed()).settle();

    let data = c.prepared();
    assert_eq!(data[1].iter().map(|d| d.y0).collect::<Vec<_>>(), vec![1.0, 2.0, 0.0]);
    assert_eq!(data[1].iter().map(|d| d.top()).collect::<Vec<_>>(), vec![Some(4.0), Some(6.0), Some(5.0)]);
    assert_eq!(c.scales().extent, (0.0, 6.0));

    let first = c.vertices(0).unwrap();
    assert_eq!(first.iter().map(|v| v.defined).collect::<Vec<_>>(), vec![true, true, false]);

    let f = c.frame();
    assert_eq!(f.title, "Traffic");
    assert_eq!(f.time_range, "[ 1970-01-01 00:00:00 / 1970-01-01 00:02:00 ]");
    assert_eq!(f.series.len(), 2);
    assert!(f.series.iter().all(|s| s.paint == Paint::Fill));
    // only the first series has a gap
    assert_eq!(f.null_regions.len(), 1);
    assert_eq!(f.null_regions[0].opacity, 1.0);
    assert_eq!(f.legend[0].label, "path_0");
    assert_eq!(f.legend[1].color, CATEGORY10[1]);
    assert_eq!(f.zero_tick.label, "0");
}

#[test]
fn shrinking_dataset_drops_legend_entries() {
    let mut c = Chart::new("evo", &PartialOptions::default()).unwrap();
    let three = Dataset::from(vec![
        vec![Sample::value(0.0, 1.0)],
        vec![Sample::value(0.0, 2.0)],
        vec![Sample::value(0.0, 3.0)],
    ]);
    c.set_data(three).settle();
    assert_eq!(c.frame().legend.len(), 3);
    c.set_data(Dataset::from(vec![vec![Sample::value(0.0, 1.0)]]));
    let f = c.frame();
    assert_eq!(f.legend.len(), 1);
    assert_eq!(f.series.len(), 1);
}

#[test]
fn named_series_keep_identity_across_reorder() {
    let mut c = Chart::new("evo", &PartialOptions::default()).unwrap();
    let a = Series::new(vec![Sample::value(0.0, 1.0), Sample::value(1.0, 2.0)]).with_key("a");
    let b = Series::new(vec![Sample::value(0.0, 3.0), Sample::value(1.0, 4.0)]).with_key("b");
    c.set_data(Dataset::new(vec![a.clone(), b.clone()])).settle();
    c.set_data(Dataset::new(vec![b, a]));
    assert_eq!(c.keys(), &[SeriesKey::Named("b".into()), SeriesKey::Named("a".into())]);
    let f = c.frame();
    assert_eq!(f.legend[0].key, SeriesKey::Named("b".into()));
    assert_eq!(f.legend[0].label, "path_0");
}

#[test]
fn all_zero_log_dataset_uses_fallback_domain() {
    let mut c = Chart::new("evo", &PartialOptions::default()).unwrap();
    c.set_scale_kind(ScaleKind::Log);
    c.set_data(Dataset::from(vec![vec![Sample::value(0.0, 0.0), Sample::value(60.0, 0.0)]])).settle();
    assert_eq!(c.scales().extent, (0.0095, 0.0105));
    let zero = c.scales().zero_px();
    for v in c.vertices(0).unwrap() {
        assert!(v.defined);
        assert!((v.y - zero).abs() < 1e-3);
    }
    let f = c.frame();
    assert!(!f.y_ticks.is_empty());
    assert!(f.y_ticks.iter().all(|t| t.pos.is_finite()));
}

#[test]
fn empty_dataset_renders_nothing_without_failing() {
    let mut c = Chart::new("evo", &PartialOptions::default()).unwrap();
    c.set_data(Dataset::default()).settle();
    let f = c.frame();
    assert!(f.series.is_empty());
    assert!(f.legend.is_empty());
    assert!(f.time_range.is_empty());
}

#[test]
fn option_document_merges_over_defaults() {
    let opts = PartialOptions::from_json(
        r##"{
            "width": 640,
            "margin": {"left": 40},
            "yScale": "log",
            "interpolate": "curveMonotoneX",
            "legend": {"space": 100, "entries": [null, {"label": "errors", "color": "#ff0000"}]}
        }"##,
    )
    .unwrap();
    let c = Chart::new("evo", &opts).unwrap();
    let o = c.options();
    assert_eq!(o.width, 640);
    assert_eq!(o.height, 400);
    assert_eq!(o.margin.left, 40);
    assert_eq!(o.margin.top, 80);
    assert_eq!(o.y_scale, ScaleKind::Log);
    assert_eq!(o.interpolate, Curve::MonotoneX);
    assert_eq!(o.legend.space, 100.0);
    assert_eq!(o.legend.button_radius, 7.0);
    assert_eq!(o.legend.entries[1], LegendEntry::new("errors", "#ff0000".parse().unwrap()));
    assert!(c.scales().y.is_log());
}

#[test]
fn malformed_documents_are_rejected() {
    assert!(matches!(PartialOptions::from_json("{"), Err(ChartError::MalformedOptions(_))));
    assert!(matches!(Dataset::from_json(r#"[[{"x": "now"}]]"#), Err(ChartError::MalformedFeed(_))));
    let bad = PartialOptions::from_json(r#"{"type": "bar"}"#).unwrap();
    assert!(Chart::new("evo", &bad).is_err());
}

#[test]
fn legend_patch_recolors_series() {
    let mut c = Chart::new("evo", &PartialOptions::default()).unwrap();
    c.set_data(example_feed()).settle();
    let red = "#d62728".parse().unwrap();
    c.set_legend(&PartialLegend::entries(vec![LegendEntry::new("cpu", red)]));
    assert!(!c.is_idle());
    c.settle();
    let f = c.frame();
    assert_eq!(f.legend[0].label, "cpu");
    assert_eq!(f.series[0].color, red);
    assert_eq!(f.legend[1].label, "path_1");
}

#[test]
fn switching_type_changes_paint_and_baselines() {
    let mut c = Chart::new("evo", &PartialOptions::default()).unwrap();
    c.set_data(example_feed()).settle();
    assert!(c.prepared()[1].iter().all(|d| d.y0 == 0.0));
    c.set_type(ChartType::Area).settle();
    assert_eq!(c.prepared()[1][0].y0, 1.0);
    assert!(c.frame().series.iter().all(|s| s.paint == Paint::Fill));
}

#[test]
fn axis_label_swaps_while_hidden() {
    let opts = PartialOptions::from_json(r#"{"yAxisLabel": "req/s", "duration": 1000}"#).unwrap();
    let mut c = Chart::new("evo", &opts).unwrap();
    c.set_data(example_feed()).settle();
    c.set_axis_label("bytes");
    c.advance(250.0);
    let f = c.frame();
    assert_eq!(f.y_label.text, "req/s");
    assert!(f.y_label.opacity < 1.0);
    c.advance(250.0);
    assert_eq!(c.frame().y_label.text, "bytes");
    c.settle();
    let f = c.frame();
    assert_eq!(f.y_label.text, "bytes");
    assert_eq!(f.y_label.opacity, 1.0);
}

#[test]
fn hovering_a_series_body_highlights_it() {
    let opts = PartialOptions::from_json(r#"{"type": "area"}"#).unwrap();
    let mut c = Chart::new("evo", &opts).unwrap();
    c.set_data(example_feed()).settle();
    let f = c.frame();
    // just above the plot bottom at the left edge: inside the first (lowest) band
    let p = (f.plot.x + 1.0, f.plot.y + f.plot.h - 1.0);
    assert_eq!(c.hit_test(p.0, p.1), Some(Hit::Series(SeriesKey::Index(0))));
    assert!(c.pointer_move(p.0, p.1));
    let f = c.frame();
    assert_eq!(f.series[0].opacity, 1.0);
    assert_eq!(f.series[1].opacity, 0.4);
    c.pointer_leave();
    assert_eq!(c.frame().series[1].opacity, 1.0);
}

#[test]
fn destroy_consumes_the_instance() {
    let c = Chart::new("gone", &PartialOptions::default()).unwrap();
    assert_eq!(c.mount_id(), "gone");
    c.destroy();
}

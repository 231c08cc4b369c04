// File: crates/evolution-core/src/stack.rs
// Summary: Transform pipeline from raw series to plotting-ready stacked samples.

use crate::config::{ChartOptions, ChartType, Normalization};
use crate::scale::ScaleManager;
use crate::series::{Dataset, Sample, Series, StackedSample};

/// Divide every value by the per-index total across series.
///
/// `None` counts as 0 in the total and stays `None`. Indices whose total is 0
/// keep their input values.
pub fn to_percentage(dataset: &Dataset) -> Dataset {
    let len = dataset.series.iter().map(Series::len).max().unwrap_or(0);
    let totals: Vec<f64> = (0..len)
        .map(|i| {
            dataset
                .series
                .iter()
                .filter_map(|s| s.samples.get(i).and_then(|d| d.y))
                .sum()
        })
        .collect();
    let series = dataset
        .series
        .iter()
        .map(|s| Series {
            key: s.key.clone(),
            samples: s
                .samples
                .iter()
                .zip(&totals)
                .map(|(d, &total)| match d.y {
                    Some(y) if total != 0.0 => Sample::value(d.x, y / total),
                    _ => *d,
                })
                .collect(),
        })
        .collect();
    Dataset { series }
}

/// Attach baselines. In area mode series `k`'s baseline at index `i` is the
/// sum of the values of series `0..k` at `i`, with `None` contributing 0. In
/// line mode every baseline is 0.
pub fn stack_layout(dataset: &Dataset, chart_type: ChartType) -> Vec<Vec<StackedSample>> {
    let mut running: Vec<f64> = Vec::new();
    dataset
        .series
        .iter()
        .map(|s| {
            if running.len() < s.len() {
                running.resize(s.len(), 0.0);
            }
            s.samples
                .iter()
                .zip(running.iter_mut())
                .map(|(d, base)| {
                    let y0 = match chart_type {
                        ChartType::Area => *base,
                        ChartType::Line => 0.0,
                    };
                    if chart_type == ChartType::Area {
                        *base += d.y.unwrap_or(0.0);
                    }
                    StackedSample { x: d.x, y: d.y, y0 }
                })
                .collect()
        })
        .collect()
}

/// Move samples whose plotted top is exactly zero onto the log floor.
/// Zero baselines are left alone; a log scale already places them on the zero line.
pub fn substitute_zero_floor(data: &mut [Vec<StackedSample>], floor: f64) {
    for d in data.iter_mut().flatten() {
        if d.top() == Some(0.0) {
            d.y = Some(floor - d.y0);
        }
    }
}

/// Run the whole pipeline for one render: normalize, stack, recompute the
/// scale domains, then re-floor zeros when the value scale is logarithmic.
///
/// `dataset` timestamps must already be in milliseconds.
pub fn prepare(dataset: &Dataset, opts: &ChartOptions, scales: &mut ScaleManager) -> Vec<Vec<StackedSample>> {
    let normalized;
    let source = match opts.convert {
        Some(Normalization::Percentage) => {
            normalized = to_percentage(dataset);
            &normalized
        }
        None => dataset,
    };
    let mut data = stack_layout(source, opts.chart_type);
    scales.set_time_domain(source.x_extent());
    scales.recompute_domain(&data, opts.chart_type);
    if let Some(floor) = scales.zero_floor() {
        substitute_zero_floor(&mut data, floor);
    }
    tracing::trace!(
        series = data.len(),
        chart_type = %opts.chart_type,
        percentage = opts.convert.is_some(),
        "pipeline prepared"
    );
    data
}

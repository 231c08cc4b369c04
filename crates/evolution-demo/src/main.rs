// File: crates/evolution-demo/src/main.rs
// Summary: Demo loads a multi-column CSV time series (or synthesizes one) and renders chart states to PNGs.

use anyhow::{Context, Result};
use evolution_core::{
    Chart, ChartType, Curve, Dataset, LegendEntry, Normalization, PartialLegend, PartialOptions, Sample, ScaleKind,
    Series,
};
use evolution_render_skia::{render_to_png, theme, RenderOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional CSV path, optional theme name
    let mut args = std::env::args().skip(1);
    let input = args.next();
    let theme_name = args.next().unwrap_or_else(|| "light".to_string());

    let (dataset, stem) = match input {
        Some(raw) => {
            let (path, used_alt) = resolve_path(&raw)?;
            tracing::info!(path = %path.display(), "using input file");
            if used_alt {
                tracing::info!("extension swapped between .csv/.cvs");
            }
            let dataset = load_series_csv(&path)
                .with_context(|| format!("failed to load CSV '{}'", path.display()))?;
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("chart").to_string();
            (dataset, stem)
        }
        None => {
            tracing::info!("no input given, synthesizing three series");
            (synthetic(3, 240), "synthetic".to_string())
        }
    };

    if dataset.is_empty() {
        anyhow::bail!("no series loaded; check headers/delimiter.");
    }
    tracing::info!(
        series = dataset.len(),
        samples = dataset.series.iter().map(|s| s.len()).max().unwrap_or(0),
        "dataset loaded"
    );

    let opts = RenderOptions { theme: theme::find(&theme_name), draw_labels: true };
    let partial = PartialOptions {
        title: Some(stem.clone()),
        y_axis_label: Some("value".to_string()),
        ..PartialOptions::default()
    };
    let mut chart = Chart::new("demo", &partial)?;
    chart.set_data(dataset.clone()).settle();
    write(&chart, &opts, &stem, "line")?;

    // 1) Stacked area with explicit legend labels taken from the columns
    let entries = dataset
        .series
        .iter()
        .enumerate()
        .map(|(i, s)| LegendEntry { label: s.key.clone().or_else(|| Some(format!("series {i}"))), color: None })
        .collect::<Vec<_>>();
    chart.set_legend(&PartialLegend { entries: Some(entries.into_iter().map(Some).collect()), ..Default::default() });
    chart.set_type(ChartType::Area).set_interpolation(Curve::MonotoneX).settle();
    write(&chart, &opts, &stem, "area")?;

    // 2) Halfway through the switch to percentages
    chart.set_normalization(Some(Normalization::Percentage));
    chart.advance(chart.options().duration_ms / 2.0);
    write(&chart, &opts, &stem, "percentage_mid")?;
    chart.settle();
    write(&chart, &opts, &stem, "percentage")?;

    // 3) Log lines with the first series toggled off via its legend swatch
    chart.set_normalization(None).set_type(ChartType::Line).set_scale_kind(ScaleKind::Log);
    chart.set_axis_label(format!("{stem} (log)")).settle();
    if let Some(center) = chart.frame().legend.first().map(|l| l.center) {
        if let Some(key) = chart.pointer_down(center.x, center.y) {
            tracing::info!(series = %key, "toggled series off");
        }
    }
    chart.settle();
    write(&chart, &opts, &stem, "log")?;

    chart.destroy();
    Ok(())
}

fn write(chart: &Chart, opts: &RenderOptions, stem: &str, suffix: &str) -> Result<()> {
    let out = out_name_with(stem, suffix);
    render_to_png(&chart.frame(), opts, &out)?;
    tracing::info!(path = %out.display(), clock_ms = chart.clock_ms(), "wrote chart");
    Ok(())
}

/// Resolve path, trying .csv/.cvs swap if needed.
/// Returns (actual_path, used_alt)
fn resolve_path(raw: &str) -> Result<(PathBuf, bool)> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok((p.to_path_buf(), false));
    }
    if let Some(alt) = swap_ext(p) {
        if alt.exists() {
            return Ok((alt, true));
        }
    }
    anyhow::bail!("file not found: {}", p.display());
}

/// Produce output file name like target/out/evolution_<stem>_<suffix>.png
fn out_name_with(stem: &str, suffix: &str) -> PathBuf {
    let short = stem.split('_').take(3).collect::<Vec<_>>().join("_");
    let mut out = PathBuf::from("target/out");
    if short.is_empty() {
        out.push(format!("evolution_{suffix}.png"));
    } else {
        out.push(format!("evolution_{short}_{suffix}.png"));
    }
    out
}

/// Load a CSV with one time column and one column per series.
/// Empty or unparsable cells become gaps.
fn load_series_csv(path: &Path) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect::<Vec<_>>();
    tracing::debug!(?headers, "csv headers");

    let i_time = headers
        .iter()
        .position(|h| ["time", "timestamp", "open_time", "date", "datetime"].contains(&h.to_lowercase().as_str()));
    if i_time.is_none() {
        tracing::warn!("no time column found, using row index as seconds");
    }
    let value_cols = (0..headers.len()).filter(|&i| Some(i) != i_time).collect::<Vec<_>>();
    let mut series = value_cols.iter().map(|&i| Series::new(Vec::new()).with_key(headers[i].clone())).collect::<Vec<_>>();

    for (row, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let x = i_time.and_then(|ix| rec.get(ix)).and_then(parse_time_to_f64).unwrap_or(row as f64);
        for (s, &col) in series.iter_mut().zip(&value_cols) {
            let y = rec.get(col).and_then(|v| v.trim().parse::<f64>().ok());
            s.samples.push(Sample::new(x, y));
        }
    }
    Ok(Dataset::new(series))
}

/// Epoch seconds from an integer or float cell; epoch milliseconds are scaled down.
fn parse_time_to_f64(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let n = s.parse::<f64>().ok()?;
    if n > 1e12 {
        return Some(n / 1000.0);
    } // epoch ms -> sec
    Some(n)
}

fn swap_ext(p: &Path) -> Option<PathBuf> {
    let mut alt = p.to_path_buf();
    let ext = p.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "cvs" => {
            alt.set_extension("csv");
            Some(alt)
        }
        "csv" => {
            alt.set_extension("cvs");
            Some(alt)
        }
        _ => None,
    }
}

/// Per-minute waveforms with an occasional outage and idle zeros.
fn synthetic(series: usize, n: usize) -> Dataset {
    let start = 1_700_000_000.0;
    let series = (0..series)
        .map(|k| {
            let samples = (0..n)
                .map(|i| {
                    let x = start + 60.0 * i as f64;
                    let phase = i as f64 * 0.05 + k as f64;
                    match i {
                        _ if (100..112).contains(&i) && k == 0 => Sample::gap(x),
                        _ if i % 53 == 0 => Sample::value(x, 0.0),
                        _ => Sample::value(x, (phase.sin() + 1.2) * 10f64.powi(k as i32 + 1)),
                    }
                })
                .collect();
            Series::new(samples).with_key(format!("metric_{k}"))
        })
        .collect();
    Dataset::new(series)
}

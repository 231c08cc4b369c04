// File: crates/evolution-core/src/series.rs
// Summary: Time/value samples, series identity, datasets, and the stacked samples derived from them.

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

use crate::error::{ChartError, ChartResult};

/// One instant of one metric. `y == None` means "no data", never zero.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Sample {
    /// Timestamp (seconds on input, milliseconds once inside the chart).
    pub x: f64,
    pub y: Option<f64>,
}

impl Sample {
    pub const fn new(x: f64, y: Option<f64>) -> Self { Self { x, y } }
    pub const fn value(x: f64, y: f64) -> Self { Self { x, y: Some(y) } }
    pub const fn gap(x: f64) -> Self { Self { x, y: None } }
}

/// Stable identity of a series across dataset updates.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesKey {
    /// Positional identity (the default).
    Index(usize),
    /// Caller-supplied identity; survives reordering.
    Named(String),
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKey::Index(i) => write!(f, "#{i}"),
            SeriesKey::Named(n) => f.write_str(n),
        }
    }
}

/// Ordered samples of one metric.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    /// Optional stable identity; positional when absent.
    pub key: Option<String>,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(samples: Vec<Sample>) -> Self { Self { key: None, samples } }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Zip timestamps with optional values.
    pub fn from_points(xs: &[f64], ys: &[Option<f64>]) -> Self {
        Self::new(xs.iter().zip(ys).map(|(&x, &y)| Sample::new(x, y)).collect())
    }

    pub fn len(&self) -> usize { self.samples.len() }
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }
}

/// Ordered collection of co-indexed series.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub series: Vec<Series>,
}

impl Dataset {
    pub fn new(series: Vec<Series>) -> Self { Self { series } }

    /// Parse the feed format: an array of per-series `[{"x": secs, "y": value|null}, ..]`.
    pub fn from_json(json: &str) -> ChartResult<Self> {
        let raw: Vec<Vec<Sample>> =
            serde_json::from_str(json).map_err(|e| ChartError::MalformedFeed(e.to_string()))?;
        Ok(Self::new(raw.into_iter().map(Series::new).collect()))
    }

    pub fn len(&self) -> usize { self.series.len() }
    pub fn is_empty(&self) -> bool { self.series.is_empty() }

    /// Identity per series position. Duplicate names fall back to the position.
    pub fn keys(&self) -> Vec<SeriesKey> {
        let mut seen = BTreeSet::new();
        self.series
            .iter()
            .enumerate()
            .map(|(i, s)| match &s.key {
                Some(name) if seen.insert(name.clone()) => SeriesKey::Named(name.clone()),
                Some(name) => {
                    tracing::warn!(series = i, key = %name, "duplicate series key, using position");
                    SeriesKey::Index(i)
                }
                None => SeriesKey::Index(i),
            })
            .collect()
    }

    /// Extent of all timestamps, if any sample exists.
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(self.series.iter().flat_map(|s| s.samples.iter().map(|d| d.x)))
    }

    /// Copy with every timestamp scaled from seconds to milliseconds.
    pub fn seconds_to_millis(&self) -> Dataset {
        let series = self
            .series
            .iter()
            .map(|s| Series {
                key: s.key.clone(),
                samples: s.samples.iter().map(|d| Sample::new(d.x * 1000.0, d.y)).collect(),
            })
            .collect();
        Dataset { series }
    }
}

impl From<Vec<Vec<Sample>>> for Dataset {
    fn from(raw: Vec<Vec<Sample>>) -> Self {
        Self::new(raw.into_iter().map(Series::new).collect())
    }
}

/// Sample with the cumulative baseline of all preceding series (area mode).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackedSample {
    pub x: f64,
    pub y: Option<f64>,
    pub y0: f64,
}

impl StackedSample {
    /// Plotted top edge: `y0 + y`, or `None` for a gap.
    pub fn top(&self) -> Option<f64> { self.y.map(|y| self.y0 + y) }
}

/// Min/max over the finite values of an iterator; NaN is skipped.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values.into_iter().filter(|v| !v.is_nan()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

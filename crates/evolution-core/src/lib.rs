// File: crates/evolution-core/src/lib.rs
// Summary: Core library entry point; exports the chart instance API and its building blocks.

pub mod animation;
pub mod axis;
pub mod chart;
pub mod config;
pub mod curve;
pub mod error;
pub mod geometry;
pub mod legend;
pub mod reconcile;
pub mod scale;
pub mod scene;
pub mod series;
pub mod stack;
pub mod time;
pub mod types;

pub use animation::{Animated, Easing, Tween};
pub use axis::{AxisView, ResolvedTick, TickSpec};
pub use chart::Chart;
pub use config::{ChartOptions, ChartType, LegendEntry, LegendOptions, Normalization, PartialLegend, PartialMargin, PartialOptions, ScaleKind};
pub use curve::Curve;
pub use error::{ChartError, ChartResult};
pub use geometry::{Path, PathCommand, Rect, Vertex};
pub use legend::{SeriesStyle, Visibility};
pub use scale::{LinearScale, LogScale, ScaleManager, ScaleTransform, ValueScale};
pub use scene::{Frame, Hit, LegendItem, NullRegionItem, Paint, SeriesItem, TextItem};
pub use series::{Dataset, Sample, Series, SeriesKey, StackedSample};
pub use stack::prepare;
pub use types::{Color, Margin, Point, CATEGORY10};

// File: crates/evolution-core/src/error.rs
// Summary: Configuration error taxonomy. Data edge cases are recovered internally and never land here.

use thiserror::Error;

/// Convenience alias for fallible chart configuration calls.
pub type ChartResult<T> = Result<T, ChartError>;

/// Errors raised when a caller passes an option the chart cannot interpret.
///
/// All variants fail fast at the point of use and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// Interpolation name outside the fixed curve set.
    #[error("unknown interpolation curve '{0}'")]
    UnknownCurve(String),

    /// Chart type other than `area` or `line`.
    #[error("unknown chart type '{0}' (expected \"area\" or \"line\")")]
    UnknownChartType(String),

    /// Scale kind other than `lin` or `log`.
    #[error("unknown scale kind '{0}' (expected \"lin\" or \"log\")")]
    UnknownScaleKind(String),

    /// Normalization mode other than `percentage`.
    #[error("unknown normalization mode '{0}' (expected \"percentage\")")]
    UnknownNormalization(String),

    /// Color literal that is not `#rgb`, `#rrggbb` or `#rrggbbaa`.
    #[error("malformed color '{0}'")]
    MalformedColor(String),

    /// Option document that does not deserialize.
    #[error("malformed options: {0}")]
    MalformedOptions(String),

    /// Feed document that is not an array of `{x, y}` sample arrays.
    #[error("malformed dataset: {0}")]
    MalformedFeed(String),
}

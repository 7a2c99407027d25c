use chrono::{DateTime, Utc};
use serde::Serialize;

/// Descriptive statistics over one chart line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesSummary {
    /// Number of points.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean of the values.
    pub mean: f64,
    /// Value at the earliest timestamp.
    pub first: f64,
    /// Value at the latest timestamp.
    pub last: f64,
    /// Earliest timestamp.
    pub start: DateTime<Utc>,
    /// Latest timestamp.
    pub end: DateTime<Utc>,
}

/// Summarize `(timestamp, value)` points, assumed ascending by timestamp.
/// Returns `None` for an empty line.
pub fn series_summary(points: &[(DateTime<Utc>, f64)]) -> Option<SeriesSummary> {
    let (start, first) = *points.first()?;
    let (end, last) = *points.last()?;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for (_, value) in points {
        min = min.min(*value);
        max = max.max(*value);
        sum += *value;
    }
    Some(SeriesSummary {
        count: points.len(),
        min,
        max,
        mean: sum / points.len() as f64,
        first,
        last,
        start,
        end,
    })
}

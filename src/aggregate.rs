use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::constants::columns::CREATION_TIME;
use crate::data::{Metric, Platform};
use crate::dataset::PlatformDataset;
use crate::table::Cell;
use crate::types::ColumnName;

/// Per-timestamp metric means for one platform.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Bucket timestamp shared by the grouped rows.
    pub timestamp: DateTime<Utc>,
    /// Number of rows grouped under this timestamp.
    pub rows: usize,
    /// Mean per numeric column over the rows that carried a value for it.
    /// Columns no row in the group carried are absent, not zero.
    pub values: BTreeMap<ColumnName, f64>,
}

impl SeriesPoint {
    /// Mean for `column`, if any row at this timestamp carried it.
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    /// Mean for a sentiment metric.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.value(metric.column())
    }
}

/// One point per distinct timestamp, ascending.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregatedSeries {
    /// Platform the points were aggregated for.
    pub platform: Platform,
    /// Numeric columns that survived aggregation, in dataset column order.
    pub columns: Vec<ColumnName>,
    /// Points in ascending timestamp order.
    pub points: Vec<SeriesPoint>,
}

impl AggregatedSeries {
    /// Series with no points and no columns.
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            columns: Vec::new(),
            points: Vec::new(),
        }
    }

    /// True when there are no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Point timestamps, ascending.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.points.iter().map(|point| point.timestamp)
    }

    /// Same platform and columns, no points.
    pub fn cleared(&self) -> Self {
        Self {
            platform: self.platform.clone(),
            columns: self.columns.clone(),
            points: Vec::new(),
        }
    }

    /// Points with `start <= timestamp <= end`.
    pub fn within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            platform: self.platform.clone(),
            columns: self.columns.clone(),
            points: self
                .points
                .iter()
                .filter(|point| start <= point.timestamp && point.timestamp <= end)
                .cloned()
                .collect(),
        }
    }
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

/// Group a normalized dataset by timestamp and average every numeric column.
///
/// A column is numeric when at least one row holds an integer or finite float.
/// Within a numeric column, non-numeric cells (text, booleans, NaN) are
/// skipped like absent values; normalization counts them in the diagnostics.
/// Rows without a timestamp cell are skipped (normalization removes them).
/// Sums run in row order, so equal inputs give bit-identical means.
pub fn aggregate(dataset: &PlatformDataset) -> AggregatedSeries {
    let columns = numeric_columns(dataset);
    let numeric: HashSet<&str> = columns.iter().map(String::as_str).collect();

    let mut groups: BTreeMap<DateTime<Utc>, (usize, BTreeMap<&str, Accumulator>)> =
        BTreeMap::new();
    for row in dataset.table.rows() {
        let Some(Cell::Timestamp(at)) = row.get(CREATION_TIME) else {
            continue;
        };
        let (rows, accumulators) = groups.entry(*at).or_default();
        *rows += 1;
        for (column, cell) in row {
            if !numeric.contains(column.as_str()) {
                continue;
            }
            if let Some(value) = cell.as_f64() {
                let acc = accumulators.entry(column.as_str()).or_default();
                acc.sum += value;
                acc.count += 1;
            }
        }
    }

    let points: Vec<SeriesPoint> = groups
        .into_iter()
        .map(|(timestamp, (rows, accumulators))| SeriesPoint {
            timestamp,
            rows,
            values: accumulators
                .into_iter()
                .filter(|(_, acc)| acc.count > 0)
                .map(|(column, acc)| (column.to_string(), acc.sum / acc.count as f64))
                .collect(),
        })
        .collect();

    debug!(
        "[trendlines:aggregate] platform='{}' rows={} points={} columns={:?}",
        dataset.platform,
        dataset.table.len(),
        points.len(),
        columns
    );
    AggregatedSeries {
        platform: dataset.platform.clone(),
        columns,
        points,
    }
}

fn numeric_columns(dataset: &PlatformDataset) -> Vec<ColumnName> {
    dataset
        .table
        .numeric_columns()
        .into_iter()
        .filter(|column| column != CREATION_TIME)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Row, Table};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    fn row(hour: u32, pairs: &[(&str, Cell)]) -> Row {
        let mut row: Row = pairs
            .iter()
            .map(|(name, cell)| (name.to_string(), cell.clone()))
            .collect();
        row.insert(CREATION_TIME.to_string(), Cell::Timestamp(at(hour)));
        row
    }

    fn dataset(rows: Vec<Row>) -> PlatformDataset {
        let mut dataset = PlatformDataset::empty(Platform::new("alpha").unwrap());
        dataset.table = Table::from_rows(rows);
        dataset
    }

    #[test]
    fn means_per_timestamp_in_ascending_order() {
        let series = aggregate(&dataset(vec![
            row(6, &[("sentiment_score", Cell::Float(1.0))]),
            row(0, &[("sentiment_score", Cell::Float(3.0))]),
            row(0, &[("sentiment_score", Cell::Int(5))]),
        ]));
        let summary: Vec<(DateTime<Utc>, usize, Option<f64>)> = series
            .points
            .iter()
            .map(|p| (p.timestamp, p.rows, p.value("sentiment_score")))
            .collect();
        assert_eq!(
            summary,
            vec![(at(0), 2, Some(4.0)), (at(6), 1, Some(1.0))]
        );
    }

    #[test]
    fn absent_values_do_not_count_as_zero() {
        let series = aggregate(&dataset(vec![
            row(0, &[("polarity", Cell::Float(0.5)), ("likes", Cell::Int(10))]),
            row(0, &[("polarity", Cell::Null)]),
            row(0, &[("likes", Cell::Int(20))]),
            row(6, &[("likes", Cell::Int(1))]),
        ]));
        assert_eq!(series.points[0].value("polarity"), Some(0.5));
        assert_eq!(series.points[0].value("likes"), Some(15.0));
        assert_eq!(series.points[1].value("polarity"), None);
        assert_eq!(series.points[1].value("likes"), Some(1.0));
    }

    #[test]
    fn non_numeric_columns_are_dropped_and_stray_values_skipped() {
        let series = aggregate(&dataset(vec![
            row(0, &[
                ("text", Cell::Text("hi".into())),
                ("flag", Cell::Bool(true)),
                ("sentiment_score", Cell::Int(1)),
                ("subjectivity", Cell::Float(0.2)),
            ]),
            row(0, &[("sentiment_score", Cell::Int(3))]),
            row(6, &[("sentiment_score", Cell::Text("n/a".into()))]),
            row(12, &[("sentiment_score", Cell::Float(2.0))]),
        ]));
        assert_eq!(
            series.columns,
            vec!["sentiment_score".to_string(), "subjectivity".to_string()]
        );
        let means: Vec<Option<f64>> = series
            .points
            .iter()
            .map(|p| p.metric(Metric::SentimentScore))
            .collect();
        assert_eq!(means, vec![Some(2.0), None, Some(2.0)]);
        assert_eq!(series.points[1].rows, 1);
    }

    #[test]
    fn single_timestamp_gives_single_point() {
        let series = aggregate(&dataset(vec![
            row(3, &[("sentiment_score", Cell::Float(2.0))]),
            row(3, &[("sentiment_score", Cell::Float(4.0))]),
        ]));
        assert_eq!(series.len(), 1);
        assert_eq!(series.points[0].metric(Metric::SentimentScore), Some(3.0));
    }

    #[test]
    fn within_is_inclusive_on_both_ends() {
        let series = aggregate(&dataset(vec![
            row(0, &[("x", Cell::Int(1))]),
            row(6, &[("x", Cell::Int(2))]),
            row(12, &[("x", Cell::Int(3))]),
        ]));
        let filtered = series.within(at(0), at(6));
        let stamps: Vec<DateTime<Utc>> = filtered.timestamps().collect();
        assert_eq!(stamps, vec![at(0), at(6)]);
    }
}

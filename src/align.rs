//! Cross-series alignment.
//!
//! Two independently sampled series share one selectable time axis: the
//! union of their timestamps defines the bounds and the step, and a single
//! inclusive window filters both.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::AggregatedSeries;
use crate::errors::SeriesError;

/// Range a caller asks the aligner to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeRequest {
    /// Everything between the derived bounds.
    Full,
    /// An explicit inclusive window. Must satisfy `start <= end`; parts
    /// outside the derived bounds are clamped away.
    Between {
        /// Inclusive start.
        start: DateTime<Utc>,
        /// Inclusive end.
        end: DateTime<Utc>,
    },
}

/// Seed values for a range-selection control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SelectableBounds {
    /// Earliest timestamp across both series.
    pub min: DateTime<Utc>,
    /// Latest timestamp across both series.
    pub max: DateTime<Utc>,
    /// Smallest gap between consecutive distinct timestamps, or the
    /// configured default when fewer than two exist. Always positive.
    #[serde(rename = "step_secs", serialize_with = "serialize_secs")]
    pub step: TimeDelta,
}

fn serialize_secs<S: serde::Serializer>(step: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(step.num_seconds())
}

/// Effective inclusive window applied to both series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Inclusive end.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// True if `at` falls inside the window, ends included.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Outcome classification of an alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    /// At least one series has points in the window.
    Ready,
    /// Neither platform has any data at all.
    NoData,
    /// Data exists, but the selected window holds none of it.
    NoDataInRange,
}

/// Two series restricted to a common window.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlignedView {
    /// Left series restricted to the window.
    pub left: AggregatedSeries,
    /// Right series restricted to the window.
    pub right: AggregatedSeries,
    /// `None` only when both inputs were empty.
    pub bounds: Option<SelectableBounds>,
    /// `None` only when both inputs were empty.
    pub window: Option<TimeWindow>,
    /// Whether the window shows data.
    pub status: ViewStatus,
}

impl AlignedView {
    /// True when neither platform has data.
    pub fn is_no_data(&self) -> bool {
        self.status == ViewStatus::NoData
    }

    /// True when data exists but the window selects none of it.
    pub fn is_empty_range(&self) -> bool {
        self.status == ViewStatus::NoDataInRange
    }
}

/// Derives bounds and filters series pairs.
#[derive(Clone, Copy, Debug)]
pub struct Aligner {
    default_step: TimeDelta,
}

impl Aligner {
    /// `default_step` is used when fewer than two distinct timestamps exist.
    pub fn new(default_step: TimeDelta) -> Result<Self, SeriesError> {
        if default_step <= TimeDelta::zero() {
            return Err(SeriesError::Configuration(
                "aligner default step must be positive".to_string(),
            ));
        }
        Ok(Self { default_step })
    }

    /// Step used when fewer than two distinct timestamps exist.
    pub fn default_step(&self) -> TimeDelta {
        self.default_step
    }

    /// Bounds over the union of both series' timestamps.
    pub fn bounds(
        &self,
        left: &AggregatedSeries,
        right: &AggregatedSeries,
    ) -> Option<SelectableBounds> {
        let all: BTreeSet<DateTime<Utc>> = left.timestamps().chain(right.timestamps()).collect();
        let min = *all.first()?;
        let max = *all.last()?;
        let step = all
            .iter()
            .zip(all.iter().skip(1))
            .map(|(earlier, later)| *later - *earlier)
            .min()
            .unwrap_or(self.default_step);
        Some(SelectableBounds { min, max, step })
    }

    /// Filter both series to the requested window.
    ///
    /// Empty inputs are not an error: they produce a `NoData` view. Only a
    /// window with `start > end` is rejected.
    pub fn align(
        &self,
        left: &AggregatedSeries,
        right: &AggregatedSeries,
        requested: RangeRequest,
    ) -> Result<AlignedView, SeriesError> {
        if let RangeRequest::Between { start, end } = requested {
            if start > end {
                return Err(SeriesError::InvalidRange {
                    start: start.to_rfc3339(),
                    end: end.to_rfc3339(),
                });
            }
        }

        let Some(bounds) = self.bounds(left, right) else {
            return Ok(AlignedView {
                left: left.clone(),
                right: right.clone(),
                bounds: None,
                window: None,
                status: ViewStatus::NoData,
            });
        };

        let (window, disjoint) = match requested {
            RangeRequest::Full => (
                TimeWindow {
                    start: bounds.min,
                    end: bounds.max,
                },
                false,
            ),
            RangeRequest::Between { start, end } => (
                clamp_window(start, end, &bounds),
                end < bounds.min || start > bounds.max,
            ),
        };
        let (left, right) = if disjoint {
            (left.cleared(), right.cleared())
        } else {
            (
                left.within(window.start, window.end),
                right.within(window.start, window.end),
            )
        };
        let status = if left.is_empty() && right.is_empty() {
            ViewStatus::NoDataInRange
        } else {
            ViewStatus::Ready
        };
        debug!(
            "[trendlines:align] window={}..={} left={} right={} step={}s status={:?}",
            window.start,
            window.end,
            left.len(),
            right.len(),
            bounds.step.num_seconds(),
            status
        );
        Ok(AlignedView {
            left,
            right,
            bounds: Some(bounds),
            window: Some(window),
            status,
        })
    }
}

/// Clamp `[start, end]` into `[min, max]`.
///
/// A window entirely outside the bounds collapses onto the nearest bound so
/// the `start <= end` and containment invariants hold; the caller treats such
/// a window as selecting nothing.
fn clamp_window(start: DateTime<Utc>, end: DateTime<Utc>, bounds: &SelectableBounds) -> TimeWindow {
    let start = start.clamp(bounds.min, bounds.max);
    let end = end.clamp(bounds.min, bounds.max);
    TimeWindow { start, end }
}

//! Presentation-facing projection of an aligned view.
//!
//! Charting and widgets live outside this crate. `ChartFrame` is what they
//! consume: one line per visible platform for the selected metric, plus the
//! seed values for a date-range control.

use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::align::{AlignedView, SelectableBounds, TimeWindow, ViewStatus};
use crate::aggregate::AggregatedSeries;
use crate::data::{Metric, Platform};
use crate::metrics::{SeriesSummary, series_summary};

/// Per-platform visibility toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Visibility {
    /// Show the left platform.
    pub left: bool,
    /// Show the right platform.
    pub right: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            left: true,
            right: true,
        }
    }
}

/// What a frame can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameState {
    /// At least one visible line may have points.
    Ready,
    /// Neither platform has any data.
    NoData,
    /// Data exists outside the selected window only.
    NoDataInRange,
    /// Data exists, but every platform is toggled off.
    AllHidden,
}

/// One platform's values for the selected metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartLine {
    /// Platform the line belongs to.
    pub platform: Platform,
    /// `(timestamp, value)` pairs; points without the metric are skipped.
    pub points: Vec<(DateTime<Utc>, f64)>,
}

/// Everything a chart needs to render one comparison.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartFrame {
    /// Metric the lines plot.
    pub metric: Metric,
    /// One line per visible platform, left first.
    pub lines: Vec<ChartLine>,
    /// Range-control seed (`min`, `max`, `step`).
    pub bounds: Option<SelectableBounds>,
    /// Window currently applied.
    pub window: Option<TimeWindow>,
    /// What the frame can show.
    pub state: FrameState,
}

impl ChartFrame {
    /// Project an aligned view onto one metric.
    pub fn from_view(view: &AlignedView, metric: Metric, visibility: Visibility) -> Self {
        let mut lines = Vec::new();
        if visibility.left {
            lines.push(chart_line(&view.left, metric));
        }
        if visibility.right {
            lines.push(chart_line(&view.right, metric));
        }
        let state = match view.status {
            ViewStatus::NoData => FrameState::NoData,
            ViewStatus::NoDataInRange => FrameState::NoDataInRange,
            ViewStatus::Ready if lines.is_empty() => FrameState::AllHidden,
            ViewStatus::Ready => FrameState::Ready,
        };
        Self {
            metric,
            lines,
            bounds: view.bounds,
            window: view.window,
            state,
        }
    }
}

fn chart_line(series: &AggregatedSeries, metric: Metric) -> ChartLine {
    ChartLine {
        platform: series.platform.clone(),
        points: series
            .points
            .iter()
            .filter_map(|point| point.metric(metric).map(|value| (point.timestamp, value)))
            .collect(),
    }
}

/// Renders chart frames somewhere.
pub trait Presenter {
    /// Render one frame.
    fn present(&mut self, frame: &ChartFrame) -> io::Result<()>;
}

/// Plain-text table presenter used by the CLI.
pub struct TextPresenter<W: Write> {
    out: W,
}

impl<W: Write> TextPresenter<W> {
    /// Presenter writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, frame: &ChartFrame) -> io::Result<()> {
        writeln!(self.out, "metric: {}", frame.metric.label())?;
        if let (Some(bounds), Some(window)) = (frame.bounds, frame.window) {
            writeln!(
                self.out,
                "range: {} .. {} (selectable {} .. {}, step {}s)",
                stamp(window.start),
                stamp(window.end),
                stamp(bounds.min),
                stamp(bounds.max),
                bounds.step.num_seconds()
            )?;
        }
        match frame.state {
            FrameState::NoData => return writeln!(self.out, "no data available"),
            FrameState::NoDataInRange => {
                return writeln!(self.out, "no data in selected range");
            }
            FrameState::AllHidden => return writeln!(self.out, "all platforms hidden"),
            FrameState::Ready => {}
        }
        for line in &frame.lines {
            writeln!(self.out, "[{}]", line.platform)?;
            match series_summary(&line.points) {
                Some(summary) => writeln!(self.out, "  {}", format_summary(&summary))?,
                None => {
                    writeln!(self.out, "  no values")?;
                    continue;
                }
            }
            for (at, value) in &line.points {
                writeln!(self.out, "  {}  {:>10.4}", stamp(*at), value)?;
            }
        }
        Ok(())
    }
}

fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn format_summary(summary: &SeriesSummary) -> String {
    format!(
        "points={} mean={:.4} min={:.4} max={:.4} change={:+.4}",
        summary.count,
        summary.mean,
        summary.min,
        summary.max,
        summary.last - summary.first
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SeriesPoint;
    use chrono::{TimeDelta, TimeZone};
    use std::collections::BTreeMap;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    fn point(hour: u32, values: &[(&str, f64)]) -> SeriesPoint {
        SeriesPoint {
            timestamp: at(hour),
            rows: 1,
            values: values
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn view(status: ViewStatus) -> AlignedView {
        AlignedView {
            left: AggregatedSeries {
                platform: Platform::twitter(),
                columns: vec!["sentiment_score".into(), "polarity".into()],
                points: vec![
                    point(0, &[("sentiment_score", 4.0)]),
                    point(6, &[("sentiment_score", 1.0), ("polarity", 0.2)]),
                ],
            },
            right: AggregatedSeries::empty(Platform::reddit()),
            bounds: Some(SelectableBounds {
                min: at(0),
                max: at(6),
                step: TimeDelta::hours(6),
            }),
            window: Some(TimeWindow {
                start: at(0),
                end: at(6),
            }),
            status,
        }
    }

    #[test]
    fn frame_selects_metric_and_respects_visibility() {
        let frame = ChartFrame::from_view(&view(ViewStatus::Ready), Metric::Polarity, Visibility::default());
        assert_eq!(frame.lines.len(), 2);
        assert_eq!(frame.lines[0].points, vec![(at(6), 0.2)]);
        assert!(frame.lines[1].points.is_empty());

        let hidden = ChartFrame::from_view(
            &view(ViewStatus::Ready),
            Metric::SentimentScore,
            Visibility {
                left: false,
                right: false,
            },
        );
        assert_eq!(hidden.state, FrameState::AllHidden);
        assert!(hidden.lines.is_empty());
    }

    #[test]
    fn text_presenter_distinguishes_empty_states() {
        for (status, expected) in [
            (ViewStatus::NoData, "no data available"),
            (ViewStatus::NoDataInRange, "no data in selected range"),
        ] {
            let frame = ChartFrame::from_view(&view(status), Metric::SentimentScore, Visibility::default());
            let mut presenter = TextPresenter::new(Vec::new());
            presenter.present(&frame).unwrap();
            let text = String::from_utf8(presenter.into_inner()).unwrap();
            assert!(text.contains(expected), "missing '{expected}' in {text}");
        }
    }

    #[test]
    fn text_presenter_renders_points() {
        let frame = ChartFrame::from_view(&view(ViewStatus::Ready), Metric::SentimentScore, Visibility::default());
        let mut presenter = TextPresenter::new(Vec::new());
        presenter.present(&frame).unwrap();
        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(text.contains("[twitter]"));
        assert!(text.contains("points=2 mean=2.5000"));
        assert!(text.contains("2024-01-01T06:00:00Z"));
        assert!(text.contains("[reddit]\n  no values"));
    }
}

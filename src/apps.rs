//! Command-line entry points shared by the demo binaries.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, error::ErrorKind};
use tracing::warn;

use crate::align::RangeRequest;
use crate::codec::PartitionFormat;
use crate::config::{EngineConfig, PartitionLayout, StorageSettings};
use crate::constants::naming::DEFAULT_ROOT_PREFIX;
use crate::data::{Metric, Platform, RawRecord};
use crate::engine::TrendEngine;
use crate::errors::SeriesError;
use crate::naming::{parse_bucket_label, truncate_to_minute};
use crate::partition::PartitionWriter;
use crate::present::{ChartFrame, Presenter, TextPresenter, Visibility};
use crate::transport::FsObjectStore;

#[derive(Debug, Parser)]
#[command(
    name = "compare_platforms",
    disable_help_subcommand = true,
    about = "Compare sentiment trends between two platforms",
    long_about = "Reconstruct per-platform sentiment time series from time-partitioned storage and show them on a shared time window.",
    after_help = "The storage root is resolved from --storage-root, then the TRENDLINES_STORAGE_ROOT environment variable."
)]
struct CompareCli {
    #[arg(long = "storage-root", value_name = "PATH")]
    storage_root: Option<PathBuf>,
    #[arg(long, default_value = "twitter", value_parser = parse_platform_arg)]
    left: Platform,
    #[arg(long, default_value = "reddit", value_parser = parse_platform_arg)]
    right: Platform,
    #[arg(long, value_enum, default_value_t = Metric::SentimentScore)]
    metric: Metric,
    #[arg(
        long,
        value_parser = parse_timestamp_arg,
        requires = "end",
        help = "Window start (RFC 3339 or YYYY-MM-DD_HH-MM, UTC)"
    )]
    start: Option<DateTime<Utc>>,
    #[arg(
        long,
        value_parser = parse_timestamp_arg,
        requires = "start",
        help = "Window end (RFC 3339 or YYYY-MM-DD_HH-MM, UTC)"
    )]
    end: Option<DateTime<Utc>>,
    #[arg(long = "hide-left")]
    hide_left: bool,
    #[arg(long = "hide-right")]
    hide_right: bool,
    #[arg(long, help = "Print the chart frame as JSON instead of a table")]
    json: bool,
    #[arg(long = "root-prefix", default_value = DEFAULT_ROOT_PREFIX)]
    root_prefix: String,
    #[arg(
        long = "default-step-hours",
        value_name = "HOURS",
        default_value = "6",
        value_parser = parse_hours_arg,
        help = "Range-control step when fewer than two timestamps exist"
    )]
    default_step: TimeDelta,
    #[arg(long, help = "Load partitions one at a time")]
    sequential: bool,
}

#[derive(Debug, Parser)]
#[command(
    name = "seed_partitions",
    disable_help_subcommand = true,
    about = "Write sample sentiment partitions",
    long_about = "Write deterministic sample partitions for one or more platforms using the creation_time naming convention.",
    after_help = "The storage root is resolved from --storage-root, then the TRENDLINES_STORAGE_ROOT environment variable."
)]
struct SeedCli {
    #[arg(long = "storage-root", value_name = "PATH")]
    storage_root: Option<PathBuf>,
    #[arg(
        long = "platform",
        value_parser = parse_platform_arg,
        help = "Platform to seed, repeat as needed (default: twitter and reddit)"
    )]
    platforms: Vec<Platform>,
    #[arg(long, value_parser = parse_timestamp_arg, default_value = "2024-01-01_00-00")]
    start: DateTime<Utc>,
    #[arg(long, default_value_t = 8, value_parser = parse_positive_usize)]
    buckets: usize,
    #[arg(long = "rows-per-bucket", default_value_t = 5, value_parser = parse_positive_usize)]
    rows_per_bucket: usize,
    #[arg(
        long = "interval-hours",
        value_name = "HOURS",
        default_value = "6",
        value_parser = parse_hours_arg
    )]
    interval: TimeDelta,
    #[arg(long, value_enum, default_value_t = PartitionFormat::Parquet)]
    format: PartitionFormat,
    #[arg(long = "root-prefix", default_value = DEFAULT_ROOT_PREFIX)]
    root_prefix: String,
}

/// Run the `compare_platforms` CLI.
pub fn run_compare_platforms<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<CompareCli, _>(
        std::iter::once("compare_platforms".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let settings = StorageSettings::resolve(cli.storage_root.clone())?;
    let store = Arc::new(FsObjectStore::open(&settings.root)?);
    let config = EngineConfig {
        layout: PartitionLayout {
            root_prefix: cli.root_prefix.clone(),
            ..PartitionLayout::default()
        },
        default_step: cli.default_step,
        parallel_loads: !cli.sequential,
    };
    let engine = TrendEngine::new(store, config)?;

    let range = match (cli.start, cli.end) {
        (Some(start), Some(end)) => RangeRequest::Between { start, end },
        _ => RangeRequest::Full,
    };
    let comparison = engine.compare(&cli.left, &cli.right, range)?;
    if comparison.has_warnings() {
        warn!(
            "[trendlines:cli] partial load: {}='{}' {}='{}'",
            cli.left,
            comparison.left.summary(),
            cli.right,
            comparison.right.summary()
        );
    }

    let frame = ChartFrame::from_view(
        &comparison.view,
        cli.metric,
        Visibility {
            left: !cli.hide_left,
            right: !cli.hide_right,
        },
    );
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&frame)?);
    } else {
        let mut presenter = TextPresenter::new(io::stdout().lock());
        presenter.present(&frame)?;
    }
    Ok(())
}

/// Run the `seed_partitions` CLI.
pub fn run_seed_partitions<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<SeedCli, _>(
        std::iter::once("seed_partitions".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let settings = StorageSettings::resolve(cli.storage_root.clone())?;
    let store = Arc::new(FsObjectStore::open(&settings.root)?);
    let root = store.root().display().to_string();
    let writer = PartitionWriter::new(
        store,
        PartitionLayout {
            root_prefix: cli.root_prefix.clone(),
            ..PartitionLayout::default()
        },
    );
    let platforms = if cli.platforms.is_empty() {
        vec![Platform::twitter(), Platform::reddit()]
    } else {
        cli.platforms.clone()
    };

    let start = truncate_to_minute(cli.start);
    let buckets = (0..cli.buckets)
        .map(|bucket_idx| bucket_start(start, cli.interval, bucket_idx))
        .collect::<Result<Vec<_>, _>>()?;
    let mut written = 0usize;
    let mut skipped = 0usize;
    for (platform_idx, platform) in platforms.iter().enumerate() {
        for (bucket_idx, bucket) in buckets.iter().copied().enumerate() {
            let records = sample_records(platform, platform_idx, bucket_idx, bucket, cli.rows_per_bucket);
            match writer.write(platform, bucket, &records, cli.format) {
                Ok(reference) => {
                    println!("wrote {} ({} records)", reference.object, records.len());
                    written += 1;
                }
                Err(SeriesError::PartitionExists(object)) => {
                    warn!("[trendlines:cli] skipping existing partition '{}'", object);
                    skipped += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    println!(
        "seeded {} partitions under {} ({} already present)",
        written, root, skipped
    );
    Ok(())
}

/// Start of the `bucket_idx`-th bucket after `start`.
fn bucket_start(
    start: DateTime<Utc>,
    interval: TimeDelta,
    bucket_idx: usize,
) -> Result<DateTime<Utc>, SeriesError> {
    i32::try_from(bucket_idx)
        .ok()
        .and_then(|idx| interval.checked_mul(idx))
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| {
            SeriesError::InvalidArgument(format!(
                "bucket {bucket_idx} at {}h intervals from {start} is out of range",
                interval.num_hours()
            ))
        })
}

/// Deterministic sample records: a slow per-platform wave plus small
/// per-row offsets, kept inside the scorer's [-1, 1] / [0, 1] ranges.
fn sample_records(
    platform: &Platform,
    platform_idx: usize,
    bucket_idx: usize,
    bucket: DateTime<Utc>,
    rows: usize,
) -> Vec<RawRecord> {
    let phase = platform_idx as f64 * 1.3;
    (0..rows)
        .map(|row_idx| {
            let wave = ((bucket_idx as f64) * 0.7 + phase).sin();
            let jitter = (row_idx as f64 - rows as f64 / 2.0) * 0.05;
            let polarity = (wave * 0.8 + jitter).clamp(-1.0, 1.0);
            let subjectivity = (0.5 + wave * 0.3 - jitter).clamp(0.0, 1.0);
            let posted = i64::try_from(row_idx)
                .ok()
                .and_then(TimeDelta::try_minutes)
                .and_then(|offset| bucket.checked_add_signed(offset))
                .unwrap_or(bucket);
            let mut record = RawRecord::new(
                platform.clone(),
                format!("sample post {bucket_idx}-{row_idx} for {platform}"),
                posted,
            )
            .with_sentiment(polarity * 5.0)
            .with_polarity_subjectivity(polarity, subjectivity);
            record.likes = Some((row_idx * 3 + bucket_idx) as i64);
            record
        })
        .collect()
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_platform_arg(raw: &str) -> Result<Platform, String> {
    Platform::new(raw).map_err(|err| err.to_string())
}

/// Accept RFC 3339 (`2024-01-01T06:00:00Z`) or a bucket label
/// (`2024-01-01_06-00`), both read as UTC.
fn parse_timestamp_arg(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Some(at) = parse_bucket_label(raw) {
        return Ok(at);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| {
            format!(
                "Could not parse '{}' as RFC 3339 or YYYY-MM-DD_HH-MM",
                raw
            )
        })
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

/// Positive whole hours that fit a `TimeDelta`.
fn parse_hours_arg(raw: &str) -> Result<TimeDelta, String> {
    let hours = raw
        .parse::<i64>()
        .map_err(|_| format!("Could not parse '{}' as a positive number of hours", raw))?;
    if hours <= 0 {
        return Err("hours must be greater than zero".to_string());
    }
    TimeDelta::try_hours(hours).ok_or_else(|| format!("{} hours is out of range", hours))
}

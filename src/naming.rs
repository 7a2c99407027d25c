//! Partition naming contract.
//!
//! Partition object names embed `creation_time=YYYY-MM-DD_HH-MM`. This format
//! is shared with upstream ingestion and must stay bit-exact: the locator
//! extracts the label, the normalizer parses it, and the writer renders it.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use regex::Regex;

use crate::constants::naming::{
    BUCKET_LABEL_FORMAT, BUCKET_LABEL_PATTERN, CREATION_TIME_KEY, CREATION_TIME_PATTERN,
};
use crate::types::BucketLabel;

static CREATION_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CREATION_TIME_PATTERN).expect("creation_time pattern is valid"));
static BUCKET_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BUCKET_LABEL_PATTERN).expect("bucket label pattern is valid"));

/// Extract the bucket label from an object name, if the name carries one.
///
/// The first `creation_time=` occurrence wins. Returns `None` when the name
/// does not follow the convention.
pub fn extract_bucket_label(object: &str) -> Option<BucketLabel> {
    CREATION_TIME_RE
        .captures(object)
        .and_then(|captures| captures.get(1))
        .map(|label| label.as_str().to_string())
}

/// Parse a bucket label (`YYYY-MM-DD_HH-MM`, zero-padded) as a UTC timestamp.
///
/// Returns `None` for anything that is not exactly that shape or that names
/// an impossible date/time (e.g. month 13, hour 24).
pub fn parse_bucket_label(label: &str) -> Option<DateTime<Utc>> {
    if !BUCKET_LABEL_RE.is_match(label) {
        return None;
    }
    NaiveDateTime::parse_from_str(label, BUCKET_LABEL_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Render a timestamp as a bucket label, truncated to the minute.
pub fn render_bucket_label(at: DateTime<Utc>) -> BucketLabel {
    truncate_to_minute(at).format(BUCKET_LABEL_FORMAT).to_string()
}

/// Object-name segment for a bucket: `creation_time=<label>`.
pub fn bucket_segment(at: DateTime<Utc>) -> String {
    format!("{CREATION_TIME_KEY}={}", render_bucket_label(at))
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_second(0)
        .and_then(|at| at.with_nanosecond(0))
        .unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn extracts_label_anywhere_in_name() {
        assert_eq!(
            extract_bucket_label("processed/alpha/creation_time=2024-01-01_06-00/part-00000.parquet"),
            Some("2024-01-01_06-00".to_string())
        );
        assert_eq!(
            extract_bucket_label("processed/alpha/alpha_creation_time=2024-03-09_23-59.parquet"),
            Some("2024-03-09_23-59".to_string())
        );
        assert_eq!(extract_bucket_label("processed/alpha/alpha_sentiment.parquet"), None);
        assert_eq!(
            extract_bucket_label("processed/alpha/creation_time=2024-1-1_6-0/part.parquet"),
            None
        );
    }

    #[test]
    fn parses_only_exact_labels() {
        assert_eq!(
            parse_bucket_label("2024-01-01_06-00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap())
        );
        assert_eq!(parse_bucket_label("2024-1-01_06-00"), None);
        assert_eq!(parse_bucket_label(" 2024-01-01_06-00"), None);
        assert_eq!(parse_bucket_label("2024-01-01T06:00"), None);
        assert_eq!(parse_bucket_label("2024-13-01_06-00"), None);
        assert_eq!(parse_bucket_label("2024-02-30_06-00"), None);
        assert_eq!(parse_bucket_label("2024-01-01_24-00"), None);
        assert_eq!(parse_bucket_label(""), None);
    }

    #[test]
    fn render_truncates_and_round_trips() {
        let at = Utc.with_ymd_and_hms(2024, 5, 7, 9, 41, 37).unwrap();
        assert_eq!(render_bucket_label(at), "2024-05-07_09-41");
        assert_eq!(bucket_segment(at), "creation_time=2024-05-07_09-41");
        assert_eq!(
            parse_bucket_label(&render_bucket_label(at)),
            Some(truncate_to_minute(at))
        );
    }
}
